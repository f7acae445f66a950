use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid subject id: '{0}'")]
    InvalidSubjectId(String),
    #[error("invalid concept id: '{0}'")]
    InvalidConceptId(String),
    #[error("unknown form: '{0}'")]
    UnknownForm(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
