use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read the tradelog configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    /// A value is present but unusable, e.g. an empty gateway key.
    #[error("Invalid tradelog configuration: {0}")]
    ValidationError(String),
}
