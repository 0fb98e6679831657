use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),
}

impl CoreError {
    /// The name of the field the user has to correct.
    pub fn field(&self) -> &str {
        match self {
            CoreError::MissingField(field) => field,
            CoreError::InvalidInput(field, _) => field,
        }
    }
}
