use thiserror::Error;

pub type Result<T, E = ParserError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("malformed grammar: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("grammar section missing or not a mapping: {0}")]
    MissingSection(&'static str),
    #[error("non-string key in grammar section `{0}`")]
    InvalidKey(&'static str),
    #[error("unknown option `{option}` referenced by {referenced_by}")]
    UnknownOption {
        option: String,
        referenced_by: String,
    },
    #[error("parameter `{0}` has no option list and no option of the same name")]
    UnknownParameter(String),
    #[error("world object without a name")]
    UnnamedObject,
    #[error("duplicate world object name: {0}")]
    DuplicateObject(String),
    #[error("object {object}: {property} `{value}` is not an option in the grammar")]
    UnknownPropertyValue {
        object: String,
        property: &'static str,
        value: String,
    },
    #[error("world objects and robot must both be set before {0}")]
    NotReady(&'static str),
}
