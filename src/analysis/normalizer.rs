//! Skill and job-title text normalization

use regex::Regex;
use std::collections::{HashMap, HashSet};

/// Canonicalizes raw skill strings: casing, edge punctuation, synonym folding.
///
/// The synonym table is loaded once and held for the process lifetime. Pure
/// lookups, no failure modes beyond empty results.
pub struct SkillNormalizer {
    synonyms: HashMap<String, String>,
    paren_regex: Regex,
}

impl SkillNormalizer {
    pub fn new(synonyms: HashMap<String, String>) -> Self {
        let paren_regex = Regex::new(r"\s*\(.*?\)\s*").expect("Invalid parenthetical regex");
        Self { synonyms, paren_regex }
    }

    /// Normalize a single skill string.
    ///
    /// Lowercases, trims whitespace and edge punctuation, then applies the
    /// synonym mapping. Blank input yields an empty string; callers must
    /// drop empties.
    pub fn normalize(&self, raw: &str) -> String {
        let s = raw.trim().to_lowercase();
        let s = s.trim_matches(|c: char| c.is_whitespace() || c == '-' || c == '.' || c == ',');
        if s.is_empty() {
            return String::new();
        }
        match self.synonyms.get(s) {
            Some(canonical) => canonical.clone(),
            None => s.to_string(),
        }
    }

    /// Parse a separated skills string into a deduplicated list of
    /// normalized skills, preserving first-seen order.
    pub fn parse_list(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let mut seen: HashSet<String> = HashSet::new();
        let mut result = Vec::new();
        for raw in text.split(',') {
            let s = self.normalize(raw);
            if !s.is_empty() && seen.insert(s.clone()) {
                result.push(s);
            }
        }
        result
    }

    /// Normalize a job title: lowercase, strip parenthetical suffixes,
    /// collapse whitespace.
    pub fn normalize_job_title(&self, title: &str) -> String {
        let t = title.trim().to_lowercase();
        let t = self.paren_regex.replace_all(&t, " ");
        t.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// Clean free-form text for extraction: trim and collapse whitespace runs.
pub fn preprocess_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> SkillNormalizer {
        let mut synonyms = HashMap::new();
        synonyms.insert("js".to_string(), "javascript".to_string());
        synonyms.insert("ml".to_string(), "machine learning".to_string());
        SkillNormalizer::new(synonyms)
    }

    #[test]
    fn test_normalize_lowercases_and_trims() {
        let n = normalizer();
        assert_eq!(n.normalize("  Python.  "), "python");
        assert_eq!(n.normalize("-docker,"), "docker");
    }

    #[test]
    fn test_normalize_applies_synonyms() {
        let n = normalizer();
        assert_eq!(n.normalize("JS"), "javascript");
        assert_eq!(n.normalize("ML"), "machine learning");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let n = normalizer();
        for raw in ["  Python.  ", "JS", "machine learning", "", " - "] {
            let once = n.normalize(raw);
            assert_eq!(n.normalize(&once), once);
        }
    }

    #[test]
    fn test_blank_input_yields_empty() {
        let n = normalizer();
        assert_eq!(n.normalize(""), "");
        assert_eq!(n.normalize("  ,.- "), "");
    }

    #[test]
    fn test_parse_list_dedups_preserving_order() {
        let n = normalizer();
        let skills = n.parse_list("Python, JS, python, , javascript, Docker");
        assert_eq!(skills, vec!["python", "javascript", "docker"]);
    }

    #[test]
    fn test_parse_list_empty_input() {
        let n = normalizer();
        assert!(n.parse_list("").is_empty());
        assert!(n.parse_list("  ").is_empty());
    }

    #[test]
    fn test_normalize_job_title() {
        let n = normalizer();
        assert_eq!(n.normalize_job_title("  Senior   Backend Engineer (Remote) "), "senior backend engineer");
        assert_eq!(n.normalize_job_title("Data Scientist (NLP) (Contract)"), "data scientist");
    }

    #[test]
    fn test_preprocess_text_collapses_whitespace() {
        assert_eq!(preprocess_text("  a\n\nb\t c  "), "a b c");
        assert_eq!(preprocess_text("   "), "");
    }
}
