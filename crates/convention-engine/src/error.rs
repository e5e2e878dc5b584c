use thiserror::Error;

/// A bidding-system document whose shape cannot be turned into a tree.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to parse document: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("document root must be a mapping")]
    RootNotMapping,

    #[error("`{key}` must hold a {expected}")]
    ReservedKey { key: String, expected: &'static str },

    #[error("unsupported entry with key {key}")]
    UnexpectedEntry { key: String },

    #[error("bidding sequence lists may only contain strings, found {found}")]
    NonScalarSequenceKey { found: String },

    #[error("macro definitions must map a pattern string to a replacement string, found {found}")]
    MalformedMacro { found: String },

    #[error("invalid macro pattern `{pattern}`")]
    InvalidMacro {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("a step must be a description or a mapping, found {found}")]
    MalformedStep { found: String },
}
