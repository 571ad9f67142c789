use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::definition::GrammarDefinition;
use crate::error::Result;
use crate::world::{Robot, WorldObject};

/// World shipped with the crate.
pub const DEFAULT_WORLD: &str = include_str!("../data/world_default.yml");

/// Objects plus robot, as stored in a world file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSnapshot {
    pub objects: Vec<WorldObject>,
    pub robot: Robot,
}

impl WorldSnapshot {
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn builtin() -> Result<Self> {
        Self::from_yaml_str(DEFAULT_WORLD)
    }
}

pub fn load_grammar_file(path: impl AsRef<Path>) -> anyhow::Result<GrammarDefinition> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading grammar: {}", path.display()))?;
    GrammarDefinition::from_yaml_str(&raw)
        .with_context(|| format!("decoding grammar: {}", path.display()))
}

pub fn load_world_file(path: impl AsRef<Path>) -> anyhow::Result<WorldSnapshot> {
    let path = path.as_ref();
    let raw =
        fs::read_to_string(path).with_context(|| format!("reading world: {}", path.display()))?;
    WorldSnapshot::from_yaml_str(&raw)
        .with_context(|| format!("decoding world: {}", path.display()))
}
