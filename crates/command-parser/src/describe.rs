//! Referring expressions: the shortest description that singles out each
//! object, and grounding a description back onto objects.

use serde::Serialize;
use std::collections::HashMap;

use crate::config::MatcherScores;
use crate::grammar::Grammar;
use crate::matchers::Utterance;
use crate::numbers;
use crate::options::{ObjectOption, OptionId};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectDescription {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grounding {
    pub name: String,
    pub probability: f64,
}

/// Describes every object with as few words as possible.
///
/// The type alone is used when no other object shares it. Otherwise color
/// is added if it is unique and the object has no unique descriptor;
/// failing that, the object's highest-priority unique descriptor is used.
pub fn describe(grammar: &Grammar) -> Vec<ObjectDescription> {
    let objects: Vec<&ObjectOption> = grammar.object_options().collect();
    let mut counts: HashMap<OptionId, usize> = HashMap::new();
    for o in &objects {
        for id in o.color.iter().chain(o.kind.iter()) {
            *counts.entry(*id).or_default() += 1;
        }
    }
    let count = |id: &OptionId| counts.get(id).copied().unwrap_or(0);

    objects
        .iter()
        .map(|o| {
            let mut words = vec![o.determiner];
            let type_ambiguous = o.kind.as_ref().map_or(true, |k| count(k) > 1);
            if type_ambiguous {
                match o.color.filter(|c| o.uniques.is_empty() && count(c) == 1) {
                    Some(color) => words.push(color),
                    None => words.extend(o.uniques.first().copied()),
                }
            }
            words.extend(o.kind);
            ObjectDescription {
                name: o.name.clone(),
                description: first_phrases(grammar, &words),
            }
        })
        .collect()
}

fn first_phrases(grammar: &Grammar, options: &[OptionId]) -> String {
    options
        .iter()
        .filter_map(|id| grammar.option(*id).as_word())
        .filter_map(|w| w.phrases.first())
        .map(|p| grammar.phrase(*p).words())
        .collect::<Vec<_>>()
        .join(" ")
}

/// A probability over objects for a referring expression.
///
/// Each derived word option of an object contributes the best ground score
/// among its phrases found in the query. Falls back to uniform when nothing
/// in the query refers to any object.
pub fn ground(grammar: &Grammar, query: &str, matchers: &MatcherScores) -> Vec<Grounding> {
    let utterance = Utterance::new(query);
    let objects: Vec<&ObjectOption> = grammar.object_options().collect();
    let mut scores: Vec<f64> = objects
        .iter()
        .map(|o| {
            o.word_options()
                .into_iter()
                .filter_map(|id| grammar.option(id).as_word())
                .map(|w| {
                    w.phrases
                        .iter()
                        .map(|p| grammar.phrase(*p))
                        .filter(|p| p.found_in(&utterance))
                        .map(|p| matchers.for_strategy(p.strategy()).ground_score)
                        .fold(0.0, f64::max)
                })
                .sum()
        })
        .collect();

    if scores.iter().all(|s| *s == 0.0) {
        scores.iter_mut().for_each(|s| *s = 1.0);
    }
    numbers::normalize(&mut scores, 0.0);

    objects
        .iter()
        .zip(scores)
        .map(|(o, probability)| Grounding {
            name: o.name.clone(),
            probability,
        })
        .collect()
}
