use crate::error::DbError;
use configuration::settings::Config;
use gateway::{PersistenceGateway, SupabaseClient};
use std::sync::Arc;

/// Builds the shared gateway from configuration.
///
/// The returned handle is cloned into every repository; it is created once per
/// process. The session's access token, when present, becomes the bearer so
/// row-level security sees the signed-in user.
pub fn connect(config: &Config) -> Result<Arc<dyn PersistenceGateway>, DbError> {
    let token = config.session.access_token.as_deref();
    if token.is_none() {
        tracing::warn!("No session access token configured; requests will use the anon key only.");
    }

    let client = SupabaseClient::new(&config.gateway, token)
        .map_err(|e| DbError::ConnectionConfigError(e.to_string()))?;

    tracing::info!(url = %config.gateway.url, "Gateway client initialized.");
    Ok(Arc::new(client))
}
