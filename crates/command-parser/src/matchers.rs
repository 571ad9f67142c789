//! Matching strategies and utterance tokenisation

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;

/// How a phrase is weighted when found in an utterance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchingStrategy {
    /// Ordinary parameter words
    #[default]
    #[serde(rename = "default")]
    Default,
    /// Command verbs
    #[serde(rename = "verb")]
    Verb,
    /// Object adjectives (color, location, size)
    #[serde(rename = "adj")]
    Adjective,
    /// Object nouns
    #[serde(rename = "noun")]
    Noun,
}

static TOKEN_REGEX: OnceLock<Regex> = OnceLock::new();

fn token_regex() -> &'static Regex {
    TOKEN_REGEX.get_or_init(|| {
        #[allow(clippy::expect_used)]
        Regex::new(r"[\w'-]+").expect("Invalid regex pattern - this is a bug")
    })
}

/// A lowercased, tokenised utterance.
#[derive(Debug, Clone, Default)]
pub struct Utterance {
    text: String,
    tokens: HashSet<String>,
}

impl Utterance {
    pub fn new(text: &str) -> Self {
        let text = text.trim().to_lowercase();
        let tokens = token_regex()
            .find_iter(&text)
            .map(|m| m.as_str().to_string())
            .collect();
        Self { text, tokens }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether every word appears as a whole token.
    pub fn contains_all<S: AsRef<str>>(&self, words: &[S]) -> bool {
        !words.is_empty() && words.iter().all(|w| self.tokens.contains(w.as_ref()))
    }
}
