//! Options: the fillers a command parameter can bind to

use crate::phrase::PhraseId;

/// Index of an option in its compiled grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OptionId(pub usize);

/// A lexical concept said by any one of several interchangeable phrases.
#[derive(Debug, Clone, PartialEq)]
pub struct WordOption {
    pub name: String,
    pub phrases: Vec<PhraseId>,
    /// May be left unsaid (adjectives).
    pub optional: bool,
}

/// A world object, referred to by the word options that describe it.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectOption {
    /// Equals the backing object's name.
    pub name: String,
    pub determiner: OptionId,
    /// Unique descriptors the object satisfies, in priority order.
    pub uniques: Vec<OptionId>,
    pub color: Option<OptionId>,
    pub kind: Option<OptionId>,
}

impl ObjectOption {
    /// Derived word options in description order.
    pub fn word_options(&self) -> Vec<OptionId> {
        let mut out = Vec::with_capacity(self.uniques.len() + 3);
        out.push(self.determiner);
        out.extend(self.uniques.iter().copied());
        out.extend(self.color);
        out.extend(self.kind);
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GrammarOption {
    Word(WordOption),
    Object(ObjectOption),
}

impl GrammarOption {
    pub fn name(&self) -> &str {
        match self {
            GrammarOption::Word(w) => &w.name,
            GrammarOption::Object(o) => &o.name,
        }
    }

    /// Objects are never optional.
    pub fn is_optional(&self) -> bool {
        match self {
            GrammarOption::Word(w) => w.optional,
            GrammarOption::Object(_) => false,
        }
    }

    pub fn as_word(&self) -> Option<&WordOption> {
        match self {
            GrammarOption::Word(w) => Some(w),
            GrammarOption::Object(_) => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectOption> {
        match self {
            GrammarOption::Object(o) => Some(o),
            GrammarOption::Word(_) => None,
        }
    }
}
