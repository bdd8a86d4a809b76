//! docsift CLI - extract documentation text and generate setup guides

use clap::{Parser, Subcommand, ValueEnum};
use docsift::{
    normalize_url, AnthropicSummarizer, ExtractOptions, ExtractRequest, ExtractionResult,
    Extractor, GuideReport, GuideService, Tool, TOOL_LLMTXT,
};
use serde::Serialize;
use std::io::{self, Write};
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Output format for subcommands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    /// Markdown with YAML frontmatter
    #[default]
    Md,
    /// JSON format
    Json,
}

/// docsift - documentation text extraction for LLM summarization
#[derive(Parser, Debug)]
#[command(name = "docsift")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Print full help with examples (llmtxt)
    #[arg(long)]
    llmtxt: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract documentation text from a URL
    Extract {
        /// URL to extract (https:// is assumed when no scheme is given)
        url: String,

        /// Output format
        #[arg(long, short, default_value = "md")]
        output: OutputFormat,

        /// Custom User-Agent
        #[arg(long)]
        user_agent: Option<String>,

        /// JS rendering service key (enables the rendering fallback)
        #[arg(long, env = "DOCSIFT_RENDER_API_KEY", hide_env_values = true)]
        render_api_key: Option<String>,

        /// JS rendering service endpoint
        #[arg(long, env = "DOCSIFT_RENDER_ENDPOINT")]
        render_endpoint: Option<String>,
    },
    /// Extract a page and generate a carrier billing & tax ID setup guide
    Guide {
        /// URL of the platform's documentation page
        url: String,

        /// Output format
        #[arg(long, short, default_value = "md")]
        output: OutputFormat,

        /// Anthropic API key
        #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
        anthropic_api_key: Option<String>,

        /// Model used for the assessment
        #[arg(long, env = "DOCSIFT_MODEL")]
        model: Option<String>,

        /// Custom User-Agent
        #[arg(long)]
        user_agent: Option<String>,

        /// JS rendering service key (enables the rendering fallback)
        #[arg(long, env = "DOCSIFT_RENDER_API_KEY", hide_env_values = true)]
        render_api_key: Option<String>,

        /// JS rendering service endpoint
        #[arg(long, env = "DOCSIFT_RENDER_ENDPOINT")]
        render_endpoint: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    // Handle --llmtxt flag
    if cli.llmtxt {
        writeln_safe(TOOL_LLMTXT);
        std::process::exit(0);
    }

    match cli.command {
        Some(Commands::Extract {
            url,
            output,
            user_agent,
            render_api_key,
            render_endpoint,
        }) => {
            run_extract(&url, output, user_agent, render_api_key, render_endpoint).await;
        }
        Some(Commands::Guide {
            url,
            output,
            anthropic_api_key,
            model,
            user_agent,
            render_api_key,
            render_endpoint,
        }) => {
            let options = ExtractOptions {
                user_agent,
                render_api_key,
                render_endpoint,
                ..Default::default()
            };
            run_guide(&url, output, options, anthropic_api_key, model).await;
        }
        None => {
            eprintln!("Usage: docsift extract <URL>");
            eprintln!("   or: docsift guide <URL>");
            eprintln!("   or: docsift --help");
            std::process::exit(1);
        }
    }
}

/// Log to stderr; `RUST_LOG` overrides the default `warn` level
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

async fn run_extract(
    url: &str,
    output: OutputFormat,
    user_agent: Option<String>,
    render_api_key: Option<String>,
    render_endpoint: Option<String>,
) {
    let mut builder = Tool::builder();

    if let Some(ua) = user_agent {
        builder = builder.user_agent(ua);
    }
    if let Some(key) = render_api_key {
        builder = builder.render_api_key(key);
    }
    if let Some(endpoint) = render_endpoint {
        builder = builder.render_endpoint(endpoint);
    }

    let tool = builder.build();
    let request = ExtractRequest::new(url);

    match tool.execute(request).await {
        Ok(result) => match output {
            OutputFormat::Md => writeln_safe(&format_extract_md(&normalize_url(url), &result)),
            OutputFormat::Json => print_json(&result),
        },
        Err(e) => fail(e),
    }
}

async fn run_guide(
    url: &str,
    output: OutputFormat,
    options: ExtractOptions,
    anthropic_api_key: Option<String>,
    model: Option<String>,
) {
    let extractor = match Extractor::new(options) {
        Ok(extractor) => extractor,
        Err(e) => fail(e),
    };

    let mut summarizer = AnthropicSummarizer::new(anthropic_api_key);
    if let Some(model) = model {
        summarizer = summarizer.with_model(model);
    }

    let service = GuideService::new(extractor, Arc::new(summarizer));
    match service.generate(url).await {
        Ok(report) => match output {
            OutputFormat::Md => writeln_safe(&format_guide_md(&report)),
            OutputFormat::Json => print_json(&report),
        },
        Err(e) => fail(e),
    }
}

fn print_json<T: Serialize>(value: &T) {
    let json = serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Error serializing response: {}", e);
        std::process::exit(1);
    });
    writeln_safe(&json);
}

fn fail(e: docsift::ExtractError) -> ! {
    eprintln!("Error: {}", e);
    std::process::exit(1);
}

/// Format an extraction as markdown with YAML frontmatter
fn format_extract_md(url: &str, result: &ExtractionResult) -> String {
    let mut output = String::new();

    output.push_str("---\n");
    output.push_str(&format!("url: {}\n", url));
    if let Some(ref strategy) = result.strategy {
        output.push_str(&format!("strategy: {}\n", strategy));
    }
    if result.used_rendering {
        output.push_str("used_rendering: true\n");
    }
    output.push_str(&format!("chars: {}\n", result.char_count()));
    output.push_str("---\n");

    output.push_str(&result.text);
    output
}

/// Format a guide report as markdown with YAML frontmatter
///
/// The guide (or the missing-capability explanation) is the body.
fn format_guide_md(report: &GuideReport) -> String {
    let outcome = &report.outcome;
    let mut output = String::new();

    output.push_str("---\n");
    output.push_str(&format!("url: {}\n", report.source_url));
    if !outcome.platform.is_empty() {
        output.push_str(&format!("platform: {}\n", outcome.platform));
    }
    output.push_str(&format!("supported: {}\n", outcome.supported));
    if report.used_rendering {
        output.push_str("used_rendering: true\n");
    }
    if !report.structured {
        output.push_str("structured: false\n");
    }
    output.push_str("---\n");

    let body = if outcome.supported {
        outcome.guide.as_deref()
    } else {
        outcome.missing.as_deref()
    };
    output.push_str(body.unwrap_or_default());
    output
}

/// Write to stdout, exit silently on broken pipe
fn writeln_safe(s: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", s) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        eprintln!("Error writing to stdout: {}", e);
        std::process::exit(1);
    }
}
