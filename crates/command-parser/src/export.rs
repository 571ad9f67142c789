//! Enumerates what the grammar can say, e.g. for building a speech
//! recogniser's language model.

use serde::Serialize;
use std::collections::BTreeSet;
use tracing::info;

use crate::config::ParserConfig;
use crate::definition::GrammarDefinition;
use crate::error::Result;
use crate::grammar::Grammar;
use crate::world::synthetic_objects;

#[derive(Debug, Clone, Default, Serialize)]
pub struct SentenceExport {
    /// Every sentence of the command space with no objects present.
    pub command_sentences: Vec<String>,
    /// Sorted, deduplicated ways of referring to any describable object.
    pub object_phrasings: Vec<String>,
    /// Every phrase of the grammar.
    pub phrases: Vec<String>,
}

/// Exports sentences, object phrasings and phrases as separate lists.
///
/// Sentences with objects are not expanded: the object phrasings times the
/// object commands is far too large to enumerate.
pub fn export_sentences(def: &GrammarDefinition, config: &ParserConfig) -> Result<SentenceExport> {
    let bare = Grammar::compile(def, &[], &config.vocabulary)?;
    let command_sentences: Vec<String> = bare
        .templates()
        .iter()
        .enumerate()
        .flat_map(|(i, t)| t.generate_commands(i))
        .flat_map(|cmd| cmd.generate_sentences(&bare))
        .map(|phrases| bare.render(&phrases))
        .collect();

    let objects = synthetic_objects(def);
    let described = Grammar::compile(def, &objects, &config.vocabulary)?;
    let object_phrasings: BTreeSet<String> = described
        .object_option_ids()
        .flat_map(|id| described.phrasings(id))
        .map(|phrases| described.render(&phrases))
        .collect();

    let phrases = described
        .phrases()
        .iter()
        .map(|p| p.words().to_string())
        .collect();

    info!(
        sentences = command_sentences.len(),
        objects = objects.len(),
        object_phrasings = object_phrasings.len(),
        "exported sentences"
    );
    Ok(SentenceExport {
        command_sentences,
        object_phrasings: object_phrasings.into_iter().collect(),
        phrases,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_builtin() {
        let def = GrammarDefinition::builtin().unwrap();
        let export = export_sentences(&def, &ParserConfig::default()).unwrap();

        assert_eq!(export.command_sentences.len(), 124);
        assert!(export.command_sentences.iter().any(|s| s == "open right-hand"));
        assert!(export.command_sentences.iter().any(|s| s == "stop"));

        assert!(export.object_phrasings.iter().any(|s| s == "the red box"));
        assert!(export.object_phrasings.iter().any(|s| s == "the box"));
        assert!(export
            .object_phrasings
            .iter()
            .any(|s| s == "the left-most blue cup"));
        let mut sorted = export.object_phrasings.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted, export.object_phrasings);

        assert!(export.phrases.iter().any(|p| p == "pick-up"));
        assert!(export.phrases.iter().any(|p| p == "crimson"));
    }

    #[test]
    fn test_export_small_grammar() {
        let def = GrammarDefinition::from_yaml_str(
            "options:\n  stop: {phrases: [stop, halt], strategy: verb}\ncommands:\n  stop: [stop]\n",
        )
        .unwrap();
        let export = export_sentences(&def, &ParserConfig::default()).unwrap();
        assert_eq!(export.command_sentences, vec!["stop", "halt"]);
        assert!(export.object_phrasings.is_empty());
        assert_eq!(export.phrases, vec!["stop", "halt"]);
    }
}
