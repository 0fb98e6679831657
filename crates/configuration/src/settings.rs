use core_types::UserId;
use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub chart: ChartConfig,
}

/// Connection details for the hosted backend.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Project URL, e.g. `https://<project>.supabase.co`.
    pub url: String,
    /// The project's public (anon) API key.
    pub anon_key: String,
}

/// The authenticated user context.
///
/// Both values come from the auth provider after sign-in. A missing `user_id`
/// means there is no data to show, not an error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionConfig {
    pub user_id: Option<UserId>,
    /// The user's JWT. Without it requests run with the anon key only and
    /// row-level security will deny them.
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Directory for the daily rolling log file.
    #[serde(default = "default_log_directory")]
    pub directory: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: default_log_directory(),
        }
    }
}

/// Canvas size used when rendering the capital chart.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "default_chart_width")]
    pub width: u32,
    #[serde(default = "default_chart_height")]
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: default_chart_width(),
            height: default_chart_height(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_directory() -> String {
    "logs".to_string()
}

fn default_chart_width() -> u32 {
    800
}

fn default_chart_height() -> u32 {
    400
}
