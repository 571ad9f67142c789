//! command-parser: natural-language commands for a dual-arm robot
//!
//! A YAML grammar of phrases, options, parameters and command templates is
//! compiled against the objects the robot currently sees. Every command the
//! robot could execute is generated together with every sentence that says
//! it. Parsing scores those sentences against the words of an utterance,
//! weights the commands by a prior from the world and robot state, and
//! returns the single best command or a request to clarify.

mod combinatorics;
mod numbers;

mod error;
pub use error::{ParserError, Result};

mod config;
pub use config::{
    MatcherScores, ParserConfig, Penalties, ScoringConfig, StrategyScores, Vocabulary,
};

mod matchers;
pub use matchers::{MatchingStrategy, Utterance};

mod phrase;
pub use phrase::{Phrase, PhraseId};

mod options;
pub use options::{GrammarOption, ObjectOption, OptionId, WordOption};

mod definition;
pub use definition::{DescriptorDef, GrammarDefinition, OptionDef, BUILTIN_GRAMMAR};

mod world;
pub use world::{
    objects_match, synthetic_objects, GripperState, Robot, SidePair, WorldObject,
    UNIQUE_DESCRIPTORS,
};

mod grammar;
pub use grammar::{CommandTemplate, Grammar, Parameter};

mod command;
pub use command::{Binding, Command, Sentence};

mod scoring;
pub use scoring::PriorScorer;

mod robot_command;
pub use robot_command::{RobotCommand, CLARIFY};

mod ranking;

mod describe;
pub use describe::{Grounding, ObjectDescription};

mod export;
pub use export::{export_sentences, SentenceExport};

mod loader;
pub use loader::{load_grammar_file, load_world_file, WorldSnapshot, DEFAULT_WORLD};

mod engine;
pub use engine::{CanonicalSentence, Engine, RankedCommand};

/// Initialize the command parser
pub fn init() -> Result<()> {
    tracing::info!("Initializing command parser");
    Ok(())
}

/// Engine over the built-in grammar, loaded with the built-in world.
pub fn create_engine() -> Result<Engine> {
    let engine = Engine::builtin()?;
    engine.set_default_world()?;
    Ok(engine)
}
