//! Grammar compiler: phrases, options, parameters and command templates
//! built from a [`GrammarDefinition`] and the current world objects.

use std::collections::HashMap;
use tracing::{debug, info};

use crate::combinatorics::product_concat;
use crate::config::Vocabulary;
use crate::definition::GrammarDefinition;
use crate::error::{ParserError, Result};
use crate::matchers::MatchingStrategy;
use crate::options::{GrammarOption, ObjectOption, OptionId, WordOption};
use crate::phrase::{Phrase, PhraseId};
use crate::world::{WorldObject, UNIQUE_DESCRIPTORS};

/// A named command slot and the options legal for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub options: Vec<OptionId>,
}

/// An uninstantiated command: a name plus ordered parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandTemplate {
    pub name: String,
    pub params: Vec<Parameter>,
}

impl CommandTemplate {
    pub fn has_param(&self, name: &str) -> bool {
        self.params.iter().any(|p| p.name == name)
    }
}

/// The compiled grammar for one object set.
#[derive(Debug, Clone)]
pub struct Grammar {
    phrases: Vec<Phrase>,
    options: Vec<GrammarOption>,
    option_index: HashMap<String, OptionId>,
    parameters: Vec<Parameter>,
    templates: Vec<CommandTemplate>,
    sides: Vec<String>,
}

impl Grammar {
    /// Compiles a grammar. Pure: the same inputs give the same output order.
    pub fn compile(
        def: &GrammarDefinition,
        objects: &[WorldObject],
        vocab: &Vocabulary,
    ) -> Result<Self> {
        let mut grammar = Grammar {
            phrases: Vec::new(),
            options: Vec::new(),
            option_index: HashMap::new(),
            parameters: Vec::new(),
            templates: Vec::new(),
            sides: def
                .parameter(&vocab.side_param)
                .map(<[String]>::to_vec)
                .unwrap_or_default(),
        };
        grammar.build_word_options(def);
        grammar.build_object_options(objects, vocab)?;
        grammar.build_parameters(def, vocab)?;
        grammar.build_templates(def);

        info!(
            phrases = grammar.phrases.len(),
            options = grammar.options.len(),
            templates = grammar.templates.len(),
            "compiled grammar"
        );
        Ok(grammar)
    }

    fn build_word_options(&mut self, def: &GrammarDefinition) {
        let mut phrase_keys: HashMap<(String, MatchingStrategy), PhraseId> = HashMap::new();
        for (name, opt) in &def.options {
            let mut ids = Vec::with_capacity(opt.phrases.len());
            for words in &opt.phrases {
                let phrase = Phrase::new(words, opt.strategy);
                let key = (phrase.words().to_string(), opt.strategy);
                let id = *phrase_keys.entry(key).or_insert_with(|| {
                    self.phrases.push(phrase);
                    PhraseId(self.phrases.len() - 1)
                });
                ids.push(id);
            }
            self.push_option(GrammarOption::Word(WordOption {
                name: name.clone(),
                phrases: ids,
                optional: def.is_optional(name),
            }));
        }
    }

    fn build_object_options(&mut self, objects: &[WorldObject], vocab: &Vocabulary) -> Result<()> {
        if objects.is_empty() {
            return Ok(());
        }
        let determiner = self.require_option(&vocab.determiner, "object descriptions")?;
        for obj in objects {
            let name = obj
                .name
                .clone()
                .filter(|n| !n.is_empty())
                .ok_or(ParserError::UnnamedObject)?;
            if self.option_index.contains_key(&name) {
                return Err(ParserError::DuplicateObject(name));
            }

            let value_option = |property: &'static str, value: &str| {
                self.option_id(value)
                    .ok_or_else(|| ParserError::UnknownPropertyValue {
                        object: name.clone(),
                        property,
                        value: value.to_string(),
                    })
            };
            let mut uniques = Vec::new();
            for unique in UNIQUE_DESCRIPTORS {
                if obj.unique_flag(unique) == Some(true) {
                    uniques.push(value_option("unique descriptor", unique)?);
                }
            }
            let color = obj
                .color
                .as_deref()
                .map(|c| value_option("color", c))
                .transpose()?;
            let kind = obj
                .kind
                .as_deref()
                .map(|k| value_option("type", k))
                .transpose()?;

            self.push_option(GrammarOption::Object(ObjectOption {
                name,
                determiner,
                uniques,
                color,
                kind,
            }));
        }
        Ok(())
    }

    fn build_parameters(&mut self, def: &GrammarDefinition, vocab: &Vocabulary) -> Result<()> {
        for pname in def.referenced_parameters() {
            let options = if pname == vocab.object_param {
                let objects: Vec<OptionId> = self.object_option_ids().collect();
                if objects.is_empty() {
                    debug!(param = pname, "no objects; parameter omitted");
                    continue;
                }
                objects
            } else if let Some(names) = def.parameter(pname) {
                names
                    .iter()
                    .map(|n| self.require_option(n, &format!("parameter `{pname}`")))
                    .collect::<Result<Vec<_>>>()?
            } else {
                vec![self
                    .option_id(pname)
                    .ok_or_else(|| ParserError::UnknownParameter(pname.to_string()))?]
            };
            self.parameters.push(Parameter {
                name: pname.to_string(),
                options,
            });
        }
        Ok(())
    }

    fn build_templates(&mut self, def: &GrammarDefinition) {
        for (name, pnames) in &def.commands {
            let params: Option<Vec<Parameter>> =
                pnames.iter().map(|p| self.parameter(p).cloned()).collect();
            match params {
                Some(params) => self.templates.push(CommandTemplate {
                    name: name.clone(),
                    params,
                }),
                None => debug!(command = %name, "template dropped: parameter without options"),
            }
        }
    }

    fn push_option(&mut self, option: GrammarOption) {
        let id = OptionId(self.options.len());
        self.option_index.insert(option.name().to_string(), id);
        self.options.push(option);
    }

    fn require_option(&self, name: &str, referenced_by: &str) -> Result<OptionId> {
        self.option_id(name).ok_or_else(|| ParserError::UnknownOption {
            option: name.to_string(),
            referenced_by: referenced_by.to_string(),
        })
    }

    pub fn phrases(&self) -> &[Phrase] {
        &self.phrases
    }

    pub fn phrase(&self, id: PhraseId) -> &Phrase {
        &self.phrases[id.0]
    }

    pub fn options(&self) -> &[GrammarOption] {
        &self.options
    }

    pub fn option(&self, id: OptionId) -> &GrammarOption {
        &self.options[id.0]
    }

    pub fn option_id(&self, name: &str) -> Option<OptionId> {
        self.option_index.get(name).copied()
    }

    pub fn option_name(&self, id: OptionId) -> &str {
        self.option(id).name()
    }

    pub fn object_option_ids(&self) -> impl Iterator<Item = OptionId> + '_ {
        self.options
            .iter()
            .enumerate()
            .filter(|(_, o)| matches!(o, GrammarOption::Object(_)))
            .map(|(i, _)| OptionId(i))
    }

    pub fn object_options(&self) -> impl Iterator<Item = &ObjectOption> + '_ {
        self.options.iter().filter_map(GrammarOption::as_object)
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn templates(&self) -> &[CommandTemplate] {
        &self.templates
    }

    /// Side option names; their order indexes per-side property pairs.
    pub fn sides(&self) -> &[String] {
        &self.sides
    }

    pub fn side_index(&self, side: &str) -> Option<usize> {
        self.sides.iter().position(|s| s == side)
    }

    /// Every phrase list that can say an option.
    ///
    /// A word option gives one single-phrase list per phrase, plus an empty
    /// list when it may be skipped. An object gives the product of its
    /// derived word options' lists.
    pub fn phrasings(&self, id: OptionId) -> Vec<Vec<PhraseId>> {
        match self.option(id) {
            GrammarOption::Word(w) => word_phrasings(w),
            GrammarOption::Object(o) => {
                let lists: Vec<Vec<Vec<PhraseId>>> = o
                    .word_options()
                    .into_iter()
                    .filter_map(|wid| self.option(wid).as_word().map(word_phrasings))
                    .collect();
                product_concat(&lists)
            }
        }
    }

    pub fn render(&self, phrases: &[PhraseId]) -> String {
        phrases
            .iter()
            .map(|p| self.phrase(*p).words())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn word_phrasings(option: &WordOption) -> Vec<Vec<PhraseId>> {
    let mut out: Vec<Vec<PhraseId>> = option.phrases.iter().map(|p| vec![*p]).collect();
    if option.optional {
        out.push(Vec::new());
    }
    out
}
