//! Declarative grammar description, read from YAML in declaration order

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::error::{ParserError, Result};
use crate::matchers::MatchingStrategy;

/// Grammar shipped with the crate.
pub const BUILTIN_GRAMMAR: &str = include_str!("../data/commands.yml");

/// A lexical option: its phrases and how they are matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionDef {
    pub phrases: Vec<String>,
    #[serde(default)]
    pub strategy: MatchingStrategy,
    #[serde(default)]
    pub optional: bool,
}

/// An object property and the options naming its values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptorDef {
    pub options: Vec<String>,
    /// Adjective values may be left unsaid when referring to an object.
    #[serde(default)]
    pub adjective: bool,
}

/// The four grammar sections, each kept as an ordered list of entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GrammarDefinition {
    pub options: Vec<(String, OptionDef)>,
    pub parameters: Vec<(String, Vec<String>)>,
    pub commands: Vec<(String, Vec<String>)>,
    pub descriptors: Vec<(String, DescriptorDef)>,
}

impl GrammarDefinition {
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let doc: Value = serde_yaml::from_str(raw)?;
        let def = Self {
            options: section(&doc, "options", true)?,
            parameters: section(&doc, "parameters", false)?,
            commands: section(&doc, "commands", true)?,
            descriptors: section(&doc, "descriptors", false)?,
        };
        def.validate()?;
        Ok(def)
    }

    pub fn builtin() -> Result<Self> {
        Self::from_yaml_str(BUILTIN_GRAMMAR)
    }

    pub fn option(&self, name: &str) -> Option<&OptionDef> {
        self.options.iter().find(|(n, _)| n == name).map(|(_, o)| o)
    }

    pub fn parameter(&self, name: &str) -> Option<&[String]> {
        self.parameters
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, opts)| opts.as_slice())
    }

    /// Declared optional, or a value of an adjective descriptor.
    pub fn is_optional(&self, option: &str) -> bool {
        self.option(option).is_some_and(|o| o.optional)
            || self
                .descriptors
                .iter()
                .any(|(_, d)| d.adjective && d.options.iter().any(|o| o == option))
    }

    /// Parameter names in first-use order across all commands.
    pub fn referenced_parameters(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for (_, params) in &self.commands {
            for p in params {
                if !names.contains(&p.as_str()) {
                    names.push(p);
                }
            }
        }
        names
    }

    /// Every option named by a parameter list or descriptor must exist.
    fn validate(&self) -> Result<()> {
        let lists = self
            .parameters
            .iter()
            .map(|(name, opts)| (format!("parameter `{name}`"), opts))
            .chain(
                self.descriptors
                    .iter()
                    .map(|(name, d)| (format!("descriptor `{name}`"), &d.options)),
            );
        for (owner, opts) in lists {
            if let Some(missing) = opts.iter().find(|o| self.option(o).is_none()) {
                return Err(ParserError::UnknownOption {
                    option: missing.clone(),
                    referenced_by: owner,
                });
            }
        }
        Ok(())
    }
}

fn section<T: DeserializeOwned>(
    doc: &Value,
    key: &'static str,
    required: bool,
) -> Result<Vec<(String, T)>> {
    let map = match doc.get(key) {
        Some(Value::Mapping(map)) => map,
        None | Some(Value::Null) if !required => return Ok(Vec::new()),
        _ => return Err(ParserError::MissingSection(key)),
    };
    map.iter()
        .map(|(k, v)| {
            let name = k.as_str().ok_or(ParserError::InvalidKey(key))?;
            let value = serde_yaml::from_value(v.clone())?;
            Ok((name.to_string(), value))
        })
        .collect()
}
