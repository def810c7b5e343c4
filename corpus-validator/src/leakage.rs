//! Leakage rejection: the case text must never mention the raw schema
//! vocabulary, whether a multi-segment `snake_case` identifier or an
//! enum-style `SCREAMING_SNAKE_CASE` code.

use once_cell::sync::Lazy;
use regex::Regex;

static SCHEMA_KEY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[a-z][a-z0-9]*(?:_[a-z0-9]+){1,}\b").unwrap());

static ENUM_CODE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z]{2,}(?:_[A-Z0-9]{2,})+\b").unwrap());

/// Returns the first leaked token found, checking the enum-code pattern
/// first since a `SCREAMING_SNAKE_CASE` token also matches the looser
/// lowercase `snake_case` pattern once case-folded, and the enum form
/// is the more specific (and more damning) of the two.
pub fn first_leaked_token(case_text: &str) -> Option<&str> {
    if let Some(m) = ENUM_CODE_PATTERN.find(case_text) {
        return Some(m.as_str());
    }
    SCHEMA_KEY_PATTERN.find(case_text).map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_snake_case_schema_key() {
        assert_eq!(first_leaked_token("the contrats_assurance_vie field matters"), Some("contrats_assurance_vie"));
    }

    #[test]
    fn detects_screaming_snake_enum_code() {
        assert_eq!(first_leaked_token("status is ASSURANCE_VIE here"), Some("ASSURANCE_VIE"));
    }

    #[test]
    fn clean_prose_has_no_leakage() {
        assert_eq!(first_leaked_token("Jean Dupont passed away last spring, leaving a life insurance policy."), None);
    }

    #[test]
    fn single_segment_lowercase_word_is_not_leakage() {
        assert_eq!(first_leaked_token("the notary reviewed the donation carefully"), None);
    }
}
