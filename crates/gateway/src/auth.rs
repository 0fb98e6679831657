use crate::error::GatewayError;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};

/// Builds the headers every PostgREST request carries.
///
/// The anon key identifies the project. The bearer token identifies the user;
/// row-level security evaluates `auth.uid()` from it. Without a user token the
/// anon key is sent as the bearer, which only reaches public rows.
pub fn auth_headers(anon_key: &str, access_token: Option<&str>) -> Result<HeaderMap, GatewayError> {
    let mut headers = HeaderMap::new();

    headers.insert(
        "apikey",
        HeaderValue::from_str(anon_key)
            .map_err(|_| GatewayError::Configuration("anon key is not a valid header value".to_string()))?,
    );

    let bearer = format!("Bearer {}", access_token.unwrap_or(anon_key));
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&bearer)
            .map_err(|_| GatewayError::Configuration("access token is not a valid header value".to_string()))?,
    );

    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    Ok(headers)
}
