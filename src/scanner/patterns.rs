use anyhow::{bail, Result};
use lazy_static::lazy_static;
use regex::Regex;

use super::types::{Page, Sentence};

/// Sentences mentioning "hello" or "world", case-insensitively. Illustrative,
/// not a real sentence grammar.
pub const DEFAULT_SENTENCE_PATTERN: &str =
    r#"\s{0,2}[A-Za-z,;'\\"\s]*((?i)hello|world)[A-Za-z,;'\\"\s]*[.!?]"#;

lazy_static! {
    static ref DEFAULT_SENTENCE_REGEX: Regex =
        Regex::new(DEFAULT_SENTENCE_PATTERN).expect("default sentence pattern is valid");
}

/// Compiled sentence patterns applied to each page
#[derive(Debug, Clone)]
pub struct SentenceMatcher {
    patterns: Vec<Regex>,
}

impl Default for SentenceMatcher {
    fn default() -> Self {
        Self {
            patterns: vec![DEFAULT_SENTENCE_REGEX.clone()],
        }
    }
}

impl SentenceMatcher {
    /// Matcher for `patterns`, or the built-in pattern when none are given.
    /// Invalid patterns are skipped with a warning.
    pub fn new(patterns: &[String]) -> Result<Self> {
        if patterns.is_empty() {
            return Ok(Self::default());
        }

        let mut compiled = Vec::new();
        for pattern in patterns {
            match Regex::new(pattern) {
                Ok(regex) => compiled.push(regex),
                Err(e) => tracing::warn!("Skipping invalid sentence pattern '{}': {}", pattern, e),
            }
        }

        if compiled.is_empty() {
            bail!("None of the {} configured sentence patterns compiled", patterns.len());
        }
        Ok(Self { patterns: compiled })
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Every match on the page, pattern by pattern, in text order.
    pub fn find_sentences(&self, page: &Page) -> Vec<Sentence> {
        let text = page.text();
        self.patterns
            .iter()
            .flat_map(|regex| regex.find_iter(&text))
            .map(|m| Sentence {
                page: page.number,
                text: m.as_str().trim().to_string(),
            })
            .collect()
    }
}
