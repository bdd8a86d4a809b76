//! Topical keyword vocabulary used to rank API endpoints and data models
//!
//! The vocabulary is data, not logic: callers can replace it through
//! [`ExtractOptions::keywords`](crate::ExtractOptions). Two kinds of entries
//! exist:
//!
//! - `terms` are regex fragments matched anywhere, case-insensitively
//!   (`billing` also matches `billingAccount` and `/v1/billing`).
//! - `acronyms` are short words that would produce false positives as plain
//!   substrings (`vat` in `private`). They only match when not surrounded by
//!   lowercase letters, so `vat_id`, `VAT`, `vatNumber` and `taxVat` match
//!   but `private` does not.

use regex::Regex;

/// Default substring terms
pub const DEFAULT_TERMS: &[&str] = &[
    "billing",
    r"third[-_ ]?party",
    r"dut(?:y|ies)",
    "tax",
    "customs",
    "carrier",
    "shipping",
    "freight",
    "account",
    "invoice",
    "tariff",
    r"hs[-_ ]?code",
    r"landed[-_ ]?cost",
    "incoterm",
    "charge",
    "fee",
    "cost",
];

/// Default bounded acronyms (incoterm abbreviations and tax identifiers)
pub const DEFAULT_ACRONYMS: &[&str] = &[
    "vat", "eori", "ioss", "ddp", "ddu", "dap", "dpu", "exw", "fca", "fob", "cif", "cpt", "cip",
];

/// Keyword vocabulary for relevance filtering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSet {
    /// Regex fragments matched as case-insensitive substrings
    pub terms: Vec<String>,
    /// Plain words matched only at lowercase-letter boundaries
    pub acronyms: Vec<String>,
}

impl Default for KeywordSet {
    fn default() -> Self {
        Self {
            terms: DEFAULT_TERMS.iter().map(|s| s.to_string()).collect(),
            acronyms: DEFAULT_ACRONYMS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl KeywordSet {
    /// Create a vocabulary from explicit lists
    pub fn new(terms: Vec<String>, acronyms: Vec<String>) -> Self {
        Self { terms, acronyms }
    }

    /// Compile the vocabulary into a matcher
    pub fn compile(&self) -> Result<KeywordMatcher, regex::Error> {
        let mut alternatives = Vec::new();

        let terms: Vec<&str> = self
            .terms
            .iter()
            .map(String::as_str)
            .filter(|t| !t.is_empty())
            .collect();
        if !terms.is_empty() {
            alternatives.push(format!("(?i:{})", terms.join("|")));
        }

        let acronyms: Vec<String> = self
            .acronyms
            .iter()
            .filter(|a| !a.is_empty())
            .map(|a| regex::escape(&a.to_lowercase()))
            .collect();
        if !acronyms.is_empty() {
            // Standalone: not preceded by any letter, not followed by a lowercase one
            alternatives.push(format!(
                "(?:^|[^A-Za-z])(?i:{})(?:[^a-z]|$)",
                acronyms.join("|")
            ));
            // camelCase tail: `taxVat`, `shipperEori`
            let capitalized: Vec<String> = acronyms.iter().map(|a| capitalize(a)).collect();
            alternatives.push(format!(
                "[a-z](?:{}|{})(?:[^a-z]|$)",
                capitalized.join("|"),
                acronyms
                    .iter()
                    .map(|a| a.to_uppercase())
                    .collect::<Vec<_>>()
                    .join("|")
            ));
        }

        if alternatives.is_empty() {
            return Ok(KeywordMatcher { regex: None });
        }

        let regex = Regex::new(&alternatives.join("|"))?;
        Ok(KeywordMatcher { regex: Some(regex) })
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Compiled form of a [`KeywordSet`]
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    regex: Option<Regex>,
}

impl KeywordMatcher {
    /// True if any keyword occurs in `text`
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.as_ref().is_some_and(|re| re.is_match(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> KeywordMatcher {
        KeywordSet::default().compile().unwrap()
    }

    #[test]
    fn test_terms_match_substrings() {
        let m = matcher();
        assert!(m.is_match("/v1/billing/accounts"));
        assert!(m.is_match("Set the Third-Party payer"));
        assert!(m.is_match("third_party_account"));
        assert!(m.is_match("Duties and taxes"));
        assert!(m.is_match("HS Code lookup"));
        assert!(m.is_match("landedCost"));
        assert!(m.is_match("INVOICE"));
    }

    #[test]
    fn test_terms_do_not_match_unrelated() {
        let m = matcher();
        assert!(!m.is_match("/pets/{petId}"));
        assert!(!m.is_match("List all pets in the store"));
    }

    #[test]
    fn test_acronyms_respect_boundaries() {
        let m = matcher();
        assert!(m.is_match("VAT number"));
        assert!(m.is_match("vat_id"));
        assert!(m.is_match("vatNumber"));
        assert!(m.is_match("shipperEori"));
        assert!(m.is_match("importerIOSS"));
        assert!(m.is_match("Incoterms: DDP or DAP"));
        assert!(!m.is_match("private"));
        assert!(!m.is_match("innovation"));
        assert!(!m.is_match("elevated"));
    }

    #[test]
    fn test_custom_vocabulary() {
        let set = KeywordSet::new(vec!["warehouse".into()], vec!["sku".into()]);
        let m = set.compile().unwrap();
        assert!(m.is_match("/warehouses"));
        assert!(m.is_match("SKU list"));
        assert!(!m.is_match("/billing"));
    }

    #[test]
    fn test_empty_vocabulary_matches_nothing() {
        let m = KeywordSet::new(vec![], vec![]).compile().unwrap();
        assert!(!m.is_match("billing"));
    }

    #[test]
    fn test_invalid_term_is_error() {
        let set = KeywordSet::new(vec!["(unclosed".into()], vec![]);
        assert!(set.compile().is_err());
    }
}
