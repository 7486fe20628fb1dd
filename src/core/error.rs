use thiserror::Error;

/// Errors surfaced at the engine's API boundary.
///
/// Nothing inside a running roll can fail; these only come from parsing
/// host input (die tokens, config JSON).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("unknown die type token: {0:?}")]
    UnknownDieType(String),

    #[error("config parse error: {0}")]
    Config(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::Config(e.to_string())
    }
}
