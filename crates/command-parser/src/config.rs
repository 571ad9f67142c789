//! Parser configuration: score tables, penalties and reserved grammar names.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::matchers::MatchingStrategy;

/// Top-level configuration owned by one [`crate::Engine`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub scoring: ScoringConfig,
    pub matchers: MatcherScores,
    pub vocabulary: Vocabulary,
}

impl ParserConfig {
    pub fn from_yaml_str(raw: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(raw).context("decoding parser config")
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading parser config: {}", path.display()))?;
        serde_yaml::from_str(&raw)
            .with_context(|| format!("decoding parser config: {}", path.display()))
    }
}

/// World/robot prior and language normalisation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Commands are boosted so the lowest prior is at least this before normalising.
    pub min_score: f64,
    /// Prior every command starts from before penalties.
    pub start_score: f64,
    /// Exponent for the length-biased sentence normalisation.
    pub length_exp: f64,
    pub penalties: Penalties,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_score: 0.1,
            start_score: 1.0,
            length_exp: 10.0,
            penalties: Penalties::default(),
        }
    }
}

/// Additive penalties applied to a command's prior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Penalties {
    /// Requested location is unreachable.
    pub location_unreachable: f64,
    /// Requested object cannot be picked up.
    pub object_unreachable: f64,
    /// Side differs from the last commanded side.
    pub not_last_side: f64,
    /// Object differs from the last referred object.
    pub not_last_referred_object: f64,
    /// Nonsensical gripper transition (opening an open gripper).
    pub gripper_state: f64,
    pub stop_not_executing: f64,
    pub execute_while_executing: f64,
    /// Pick-up or place against an incompatible gripper state.
    pub bad_pick_place: f64,
}

impl Default for Penalties {
    fn default() -> Self {
        Self {
            location_unreachable: -5.0,
            object_unreachable: -5.0,
            not_last_side: -0.1,
            not_last_referred_object: -0.1,
            gripper_state: -8.0,
            stop_not_executing: -10.0,
            execute_while_executing: -10.0,
            bad_pick_place: -5.0,
        }
    }
}

/// Scores a found phrase contributes, when parsing and when grounding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyScores {
    pub match_score: f64,
    pub ground_score: f64,
}

impl StrategyScores {
    pub const fn new(match_score: f64, ground_score: f64) -> Self {
        Self {
            match_score,
            ground_score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherScores {
    pub default: StrategyScores,
    pub verb: StrategyScores,
    pub adj: StrategyScores,
    pub noun: StrategyScores,
}

impl MatcherScores {
    pub fn for_strategy(&self, strategy: MatchingStrategy) -> StrategyScores {
        match strategy {
            MatchingStrategy::Default => self.default,
            MatchingStrategy::Verb => self.verb,
            MatchingStrategy::Adjective => self.adj,
            MatchingStrategy::Noun => self.noun,
        }
    }
}

impl Default for MatcherScores {
    fn default() -> Self {
        Self {
            // Plain words and verbs carry no weight in grounding.
            default: StrategyScores::new(1.0, 0.0),
            verb: StrategyScores::new(5.0, 0.0),
            adj: StrategyScores::new(1.0, 0.4),
            noun: StrategyScores::new(1.0, 0.2),
        }
    }
}

/// Names in the grammar that the engine gives special meaning to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    /// Parameter whose options are the current world objects.
    pub object_param: String,
    /// Parameter whose option order indexes the per-side property pairs.
    pub side_param: String,
    /// Option every object description starts with.
    pub determiner: String,
    /// `last_cmd_side` value meaning no side was commanded yet.
    pub no_side: String,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            object_param: "obj".to_string(),
            side_param: "side".to_string(),
            determiner: "the".to_string(),
            no_side: "neither".to_string(),
        }
    }
}
