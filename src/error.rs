use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrudpathError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Schema error in model '{model}': {message}")]
    Schema { model: String, message: String },
    #[error("Type declaration error in '{declaration}': {message}")]
    TypeDeclaration { declaration: String, message: String },
    #[error("Duplicate noun: {0}")]
    DuplicateNoun(String),
    #[error("Path error: {0}")]
    Path(String),
    #[error("Unknown model: {0}")]
    UnknownModel(String),
    #[error("Internal invariant violated: {0}")]
    Invariant(String),
}

pub type Result<T> = std::result::Result<T, CrudpathError>;

// Helper conversions
impl From<config::ConfigError> for CrudpathError {
    fn from(e: config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}
