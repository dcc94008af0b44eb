use thiserror::Error;

#[derive(Error, Debug)]
pub enum DtoError {
    #[error("Unknown cast kind: {0}")]
    UnknownCastKind(String),

    #[error("Invalid date value {value:?}: {reason}")]
    InvalidDate { value: String, reason: String },

    #[error("Invalid date format: {0}")]
    InvalidDateFormat(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, DtoError>;

impl From<confique::Error> for DtoError {
    fn from(e: confique::Error) -> Self {
        Self::Config(e.to_string())
    }
}
