use crate::error::ConfigError;
use crate::settings::Config;
use config::{Environment, File, FileFormat};
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{ChartConfig, GatewayConfig, LoggingConfig, SessionConfig};

/// Loads the application configuration.
///
/// Reads `path` if it exists, then layers `TRADELOG__SECTION__KEY` environment
/// variables on top (e.g. `TRADELOG__GATEWAY__ANON_KEY`), deserializes into
/// our strongly-typed `Config` struct and validates it.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(File::from(path).required(false))
        .add_source(
            Environment::with_prefix("TRADELOG")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    validate(&config)?;
    tracing::debug!(path = %path.display(), "Configuration loaded.");
    Ok(config)
}

/// Parses a configuration from TOML text only. Environment variables are ignored.
pub fn load_config_from_toml(toml: &str) -> Result<Config, ConfigError> {
    let config = config::Config::builder()
        .add_source(File::from_str(toml, FileFormat::Toml))
        .build()?
        .try_deserialize::<Config>()?;
    validate(&config)?;
    Ok(config)
}

/// Missing credentials are a setup problem the user has to fix, so they are
/// rejected here instead of surfacing later as failed requests.
fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.gateway.url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "gateway.url must be set (TRADELOG__GATEWAY__URL)".to_string(),
        ));
    }
    if !config.gateway.url.starts_with("http://") && !config.gateway.url.starts_with("https://") {
        return Err(ConfigError::ValidationError(format!(
            "gateway.url must be an http(s) URL, got '{}'",
            config.gateway.url
        )));
    }
    if config.gateway.anon_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "gateway.anon_key must be set (TRADELOG__GATEWAY__ANON_KEY)".to_string(),
        ));
    }
    if config.chart.width == 0 || config.chart.height == 0 {
        return Err(ConfigError::ValidationError(
            "chart.width and chart.height must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_a_full_configuration() {
        let config = load_config_from_toml(
            r#"
            [gateway]
            url = "https://example.supabase.co"
            anon_key = "public-anon-key"

            [session]
            user_id = "9f3b2c1e-8d7a-4b6c-9e5f-1a2b3c4d5e6f"
            access_token = "jwt"

            [logging]
            level = "debug"

            [chart]
            width = 1200
            "#,
        )
        .unwrap();

        assert_eq!(config.gateway.url, "https://example.supabase.co");
        assert_eq!(
            config.session.user_id.unwrap().to_string(),
            "9f3b2c1e-8d7a-4b6c-9e5f-1a2b3c4d5e6f"
        );
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.directory, "logs");
        assert_eq!(config.chart.width, 1200);
        assert_eq!(config.chart.height, 400);
    }

    #[test]
    fn session_is_optional() {
        let config = load_config_from_toml(
            r#"
            [gateway]
            url = "https://example.supabase.co"
            anon_key = "public-anon-key"
            "#,
        )
        .unwrap();

        assert!(config.session.user_id.is_none());
        assert!(config.session.access_token.is_none());
    }

    #[test]
    fn missing_credentials_are_rejected() {
        let err = load_config_from_toml(
            r#"
            [gateway]
            url = "https://example.supabase.co"
            anon_key = ""
            "#,
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::ValidationError(msg) if msg.contains("anon_key")));
    }
}
