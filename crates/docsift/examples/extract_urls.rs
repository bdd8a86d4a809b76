//! Example: Extract documentation text from a few live pages
//!
//! Run with: cargo run -p docsift --example extract_urls
//!
//! Set DOCSIFT_RENDER_API_KEY to enable the rendering fallback.

use docsift::{extract_with_options, ExtractOptions, ExtractRequest, ExtractionResult};

/// Page to try
struct Case {
    url: &'static str,
    description: &'static str,
    expect_strategy: Option<&'static str>,
}

const CASES: &[Case] = &[
    Case {
        url: "https://example.com",
        description: "Static HTML page",
        expect_strategy: Some("plain_text"),
    },
    Case {
        url: "https://petstore.swagger.io/",
        description: "Swagger UI portal",
        expect_strategy: Some("openapi"),
    },
    Case {
        url: "https://nextjs.org/docs",
        description: "Next.js documentation site",
        expect_strategy: None,
    },
];

#[tokio::main]
async fn main() {
    println!("docsift extraction examples");
    println!("===========================\n");

    let options = ExtractOptions {
        render_api_key: std::env::var("DOCSIFT_RENDER_API_KEY").ok(),
        ..Default::default()
    };

    let mut passed = 0;
    let mut failed = 0;

    for (i, case) in CASES.iter().enumerate() {
        println!("{}. {}", i + 1, case.description);
        println!("   URL: {}", case.url);

        match extract_with_options(ExtractRequest::new(case.url), options.clone()).await {
            Ok(result) => {
                print_summary(&result);
                if meets_expectation(case, &result) {
                    println!("   PASS\n");
                    passed += 1;
                } else {
                    println!("   FAIL (expected strategy {:?})\n", case.expect_strategy);
                    failed += 1;
                }
            }
            Err(e) => {
                println!("   Error: {}", e);
                println!("   FAIL\n");
                failed += 1;
            }
        }
    }

    println!("===========================");
    println!("Results: {} passed, {} failed", passed, failed);

    if failed > 0 {
        std::process::exit(1);
    }
}

fn print_summary(result: &ExtractionResult) {
    if let Some(ref strategy) = result.strategy {
        println!("   Strategy: {}", strategy);
    }
    println!("   Rendered: {}", result.used_rendering);
    println!("   Chars: {}", result.char_count());

    let preview: String = result.text.chars().take(100).collect();
    println!(
        "   Preview: {}{}",
        preview.replace('\n', " "),
        if result.char_count() > 100 { "..." } else { "" }
    );
}

fn meets_expectation(case: &Case, result: &ExtractionResult) -> bool {
    match case.expect_strategy {
        Some(expected) => result.strategy.as_deref() == Some(expected),
        None => true,
    }
}
