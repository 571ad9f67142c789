//! Phrases: the atomic matchable units of the grammar

use std::fmt;

use crate::matchers::{MatchingStrategy, Utterance};

/// Index of a phrase in its compiled grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhraseId(pub usize);

/// A fixed word sequence plus the strategy that weights it.
///
/// Phrases are shared: two options that list the same words with the same
/// strategy point at one phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phrase {
    words: String,
    tokens: Vec<String>,
    strategy: MatchingStrategy,
}

impl Phrase {
    pub fn new(words: &str, strategy: MatchingStrategy) -> Self {
        let tokens: Vec<String> = words.split_whitespace().map(str::to_lowercase).collect();
        Self {
            words: tokens.join(" "),
            tokens,
            strategy,
        }
    }

    pub fn words(&self) -> &str {
        &self.words
    }

    pub fn strategy(&self) -> MatchingStrategy {
        self.strategy
    }

    /// All of the phrase's words appear in the utterance.
    pub fn found_in(&self, utterance: &Utterance) -> bool {
        utterance.contains_all(&self.tokens)
    }
}

impl fmt::Display for Phrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalises_words() {
        let p = Phrase::new("  Look   AT ", MatchingStrategy::Verb);
        assert_eq!(p.words(), "look at");
        assert_eq!(p.to_string(), "look at");
        assert_eq!(p.strategy(), MatchingStrategy::Verb);
    }

    #[test]
    fn test_found_in() {
        let p = Phrase::new("look at", MatchingStrategy::Verb);
        assert!(p.found_in(&Utterance::new("please look at the cup")));
        assert!(!p.found_in(&Utterance::new("look-at the cup")));
    }
}
