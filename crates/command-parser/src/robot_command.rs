//! The parser's output: a command for the robot, or a clarification request

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::command::Command;
use crate::config::MatcherScores;
use crate::grammar::Grammar;
use crate::options::GrammarOption;

/// Name of the pseudo-command asking the user to disambiguate.
pub const CLARIFY: &str = "clarify";

/// Canonical, de-scored projection of a winning command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotCommand {
    pub name: String,
    /// Bound option names after the verb, or parameter names to clarify.
    pub args: Vec<String>,
    /// Per binding, the phrase heard for it (objects give their name).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phrases: Vec<String>,
}

impl RobotCommand {
    pub fn new(name: &str, args: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            phrases: Vec::new(),
        }
    }

    pub fn clarify(params: Vec<String>) -> Self {
        Self {
            name: CLARIFY.to_string(),
            args: params,
            phrases: Vec::new(),
        }
    }

    pub fn is_clarify(&self) -> bool {
        self.name == CLARIFY
    }

    /// Builds the output for `command`, picking for each bound word option
    /// the phrase that scored best against the utterance.
    pub fn from_command(
        command: &Command,
        grammar: &Grammar,
        found: &[bool],
        matchers: &MatcherScores,
    ) -> Self {
        let phrases = command
            .bindings
            .iter()
            .map(|b| match grammar.option(b.option) {
                GrammarOption::Object(o) => o.name.clone(),
                GrammarOption::Word(w) => {
                    let mut best = w.phrases.first().copied();
                    let mut best_score = -1.0;
                    for &p in &w.phrases {
                        let phrase = grammar.phrase(p);
                        let score = if found[p.0] {
                            matchers.for_strategy(phrase.strategy()).match_score
                        } else {
                            0.0
                        };
                        if score > best_score {
                            best_score = score;
                            best = Some(p);
                        }
                    }
                    best.map(|p| grammar.phrase(p).words().to_string())
                        .unwrap_or_default()
                }
            })
            .collect();
        Self {
            name: command.name.clone(),
            args: command.args(grammar),
            phrases,
        }
    }
}

/// Commands compare by name and arguments only.
impl PartialEq for RobotCommand {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.args == other.args
    }
}

impl Eq for RobotCommand {}

impl fmt::Display for RobotCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.args.join(", "))
    }
}
