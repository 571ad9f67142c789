//! Commands and their paraphrase sentences

use std::collections::BTreeSet;
use std::fmt;
use std::ops::Range;

use crate::combinatorics::{product, product_concat};
use crate::config::MatcherScores;
use crate::grammar::{CommandTemplate, Grammar};
use crate::numbers;
use crate::options::OptionId;
use crate::phrase::PhraseId;

/// One parameter bound to one option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub param: String,
    pub option: OptionId,
}

/// A fully bound instantiation of a [`CommandTemplate`].
#[derive(Debug, Clone)]
pub struct Command {
    pub name: String,
    /// Index of the owning template.
    pub template: usize,
    /// One binding per template parameter, in template order.
    pub bindings: Vec<Binding>,
    /// World/robot prior.
    pub score: f64,
    /// Language posterior for the last utterance.
    pub lang_score: f64,
    /// This command's slice of the engine's sentence list.
    pub sentences: Range<usize>,
    /// P(sentence | command), uniform over the command's sentences.
    pub sentence_prior: f64,
}

impl CommandTemplate {
    /// Every binding combination, first parameter varying slowest.
    pub fn generate_commands(&self, template: usize) -> Vec<Command> {
        let option_lists: Vec<Vec<OptionId>> =
            self.params.iter().map(|p| p.options.clone()).collect();
        product(&option_lists)
            .into_iter()
            .map(|combo| Command {
                name: self.name.clone(),
                template,
                bindings: self
                    .params
                    .iter()
                    .zip(combo)
                    .map(|(p, option)| Binding {
                        param: p.name.clone(),
                        option,
                    })
                    .collect(),
                score: 0.0,
                lang_score: 0.0,
                sentences: 0..0,
                sentence_prior: 0.0,
            })
            .collect()
    }
}

impl Command {
    pub fn binding(&self, param: &str) -> Option<OptionId> {
        self.bindings
            .iter()
            .find(|b| b.param == param)
            .map(|b| b.option)
    }

    /// Bound option names after the leading verb.
    pub fn args(&self, grammar: &Grammar) -> Vec<String> {
        self.bindings
            .iter()
            .skip(1)
            .map(|b| grammar.option_name(b.option).to_string())
            .collect()
    }

    /// Every phrase sequence that says this command.
    pub fn generate_sentences(&self, grammar: &Grammar) -> Vec<Vec<PhraseId>> {
        let lists: Vec<Vec<Vec<PhraseId>>> = self
            .bindings
            .iter()
            .map(|b| grammar.phrasings(b.option))
            .collect();
        product_concat(&lists)
    }

    /// Sets the uniform sentence prior. Done once per generation.
    pub fn score_sentences(&mut self) {
        let n = self.sentences.len();
        self.sentence_prior = if n == 0 { 0.0 } else { 1.0 / n as f64 };
    }

    /// Marginalises this command's sentences into `lang_score`.
    pub fn apply_language(&mut self, sentences: &[Sentence]) {
        self.lang_score = sentences[self.sentences.clone()]
            .iter()
            .map(|s| s.score * self.sentence_prior)
            .sum();
    }

    pub fn display<'a>(&'a self, grammar: &'a Grammar) -> CommandDisplay<'a> {
        CommandDisplay {
            command: self,
            grammar,
        }
    }
}

pub struct CommandDisplay<'a> {
    command: &'a Command,
    grammar: &'a Grammar,
}

impl fmt::Display for CommandDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let opts: Vec<&str> = self
            .command
            .bindings
            .iter()
            .map(|b| self.grammar.option_name(b.option))
            .collect();
        write!(
            f,
            "{}({}) lang={:.4} score={:.4}",
            self.command.name,
            opts.join(", "),
            self.command.lang_score,
            self.command.score
        )
    }
}

/// One paraphrase of a command.
#[derive(Debug, Clone)]
pub struct Sentence {
    pub phrases: Vec<PhraseId>,
    /// Index of the owning command.
    pub command: usize,
    pub score: f64,
}

impl Sentence {
    pub fn new(phrases: Vec<PhraseId>, command: usize) -> Self {
        Self {
            phrases,
            command,
            score: 0.0,
        }
    }

    fn phrase_set(&self) -> BTreeSet<PhraseId> {
        self.phrases.iter().copied().collect()
    }
}

/// Sentences are equal when they use the same phrases, whatever the order
/// or owner.
impl PartialEq for Sentence {
    fn eq(&self, other: &Self) -> bool {
        self.phrase_set() == other.phrase_set()
    }
}

/// Scores every sentence against the phrases found in an utterance.
///
/// A sentence's raw score is the sum of the match scores of its found
/// phrases; raw scores are then mapped through [`numbers::make_prob`].
pub fn compute_sentence_scores(
    sentences: &mut [Sentence],
    found: &[bool],
    grammar: &Grammar,
    matchers: &MatcherScores,
    length_exp: f64,
) {
    let phrase_scores: Vec<f64> = grammar
        .phrases()
        .iter()
        .zip(found)
        .map(|(p, &seen)| {
            if seen {
                matchers.for_strategy(p.strategy()).match_score
            } else {
                0.0
            }
        })
        .collect();

    let mut raw: Vec<f64> = sentences
        .iter()
        .map(|s| s.phrases.iter().map(|p| phrase_scores[p.0]).sum())
        .collect();
    numbers::make_prob(&mut raw, length_exp);
    for (s, score) in sentences.iter_mut().zip(raw) {
        s.score = score;
    }
}
