use crate::auth::auth_headers;
use crate::error::GatewayError;
use crate::responses::PostgrestErrorResponse;
use crate::table::{Order, Table};
use crate::{OWNER_COLUMN, PersistenceGateway};
use async_trait::async_trait;
use configuration::GatewayConfig;
use core_types::UserId;
use reqwest::header::{ACCEPT, HeaderValue};
use reqwest::RequestBuilder;
use serde_json::Value;
use uuid::Uuid;

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";
const RETURN_REPRESENTATION: &str = "return=representation";
const MERGE_DUPLICATES: &str = "return=representation,resolution=merge-duplicates";

/// PostgREST client for a Supabase project.
#[derive(Clone)]
pub struct SupabaseClient {
    client: reqwest::Client,
    rest_url: String,
}

/// Parses a success body. Numeric columns keep their literal digits so
/// decimals are never read through `f64`.
fn parse_body(text: &str) -> Result<Option<Value>, GatewayError> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str::<Value>(text)
        .map(Some)
        .map_err(|e| GatewayError::Deserialization(e.to_string()))
}

impl SupabaseClient {
    pub fn new(config: &GatewayConfig, access_token: Option<&str>) -> Result<Self, GatewayError> {
        let headers = auth_headers(&config.anon_key, access_token)?;
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            rest_url: format!("{}/rest/v1", config.url.trim_end_matches('/')),
        })
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/{}", self.rest_url, table.as_str())
    }

    fn owner_filter(owner: &UserId) -> (&'static str, String) {
        (OWNER_COLUMN, format!("eq.{}", owner))
    }

    /// Sends the request and parses the body, mapping failures by status and code.
    async fn execute(&self, table: Table, request: RequestBuilder) -> Result<Option<Value>, GatewayError> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            return parse_body(&text);
        }

        let body: PostgrestErrorResponse = serde_json::from_str(&text).unwrap_or_else(|_| PostgrestErrorResponse {
            message: if text.is_empty() {
                status.canonical_reason().unwrap_or("unknown error").to_string()
            } else {
                text.clone()
            },
            ..Default::default()
        });
        let error = body.into_error(status.as_u16(), table);
        tracing::warn!(table = %table, status = status.as_u16(), error = %error, "Gateway request failed.");
        Err(error)
    }

    /// Unwraps a `return=representation` body that must contain at least one row.
    fn first_row(table: Table, body: Option<Value>) -> Result<Value, GatewayError> {
        match body {
            Some(Value::Array(mut rows)) => {
                if rows.is_empty() {
                    Err(GatewayError::NoRows(table))
                } else {
                    Ok(rows.swap_remove(0))
                }
            }
            Some(row @ Value::Object(_)) => Ok(row),
            Some(other) => Err(GatewayError::Deserialization(format!(
                "expected a row from '{}', got {}",
                table, other
            ))),
            None => Err(GatewayError::NoRows(table)),
        }
    }
}

#[async_trait]
impl PersistenceGateway for SupabaseClient {
    async fn select_by_owner(
        &self,
        table: Table,
        owner: &UserId,
        order: Option<Order>,
    ) -> Result<Vec<Value>, GatewayError> {
        let mut query = vec![("select", "*".to_string()), Self::owner_filter(owner)];
        if let Some(order) = order {
            query.push(("order", order.to_query_value()));
        }

        let request = self.client.get(self.table_url(table)).query(&query);
        match self.execute(table, request).await? {
            Some(Value::Array(rows)) => {
                tracing::debug!(table = %table, rows = rows.len(), "Selected rows.");
                Ok(rows)
            }
            None => Ok(Vec::new()),
            Some(other) => Err(GatewayError::Deserialization(format!(
                "expected an array from '{}', got {}",
                table, other
            ))),
        }
    }

    async fn select_one_by_owner(&self, table: Table, owner: &UserId) -> Result<Value, GatewayError> {
        let request = self
            .client
            .get(self.table_url(table))
            .query(&[("select", "*".to_string()), Self::owner_filter(owner)])
            .header(ACCEPT, HeaderValue::from_static(SINGLE_OBJECT));

        self.execute(table, request)
            .await?
            .ok_or(GatewayError::NoRows(table))
    }

    async fn insert(&self, table: Table, row: Value) -> Result<Value, GatewayError> {
        let request = self
            .client
            .post(self.table_url(table))
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&row);

        let body = self.execute(table, request).await?;
        Self::first_row(table, body)
    }

    async fn update_by_id(
        &self,
        table: Table,
        owner: &UserId,
        id: Uuid,
        patch: Value,
    ) -> Result<Value, GatewayError> {
        let request = self
            .client
            .patch(self.table_url(table))
            .query(&[("id", format!("eq.{}", id)), Self::owner_filter(owner)])
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&patch);

        let body = self.execute(table, request).await?;
        Self::first_row(table, body)
    }

    async fn delete_by_id(&self, table: Table, owner: &UserId, id: Uuid) -> Result<(), GatewayError> {
        let request = self
            .client
            .delete(self.table_url(table))
            .query(&[("id", format!("eq.{}", id)), Self::owner_filter(owner)])
            .header("Prefer", RETURN_REPRESENTATION);

        // The deleted rows come back; an empty array means nothing matched.
        let body = self.execute(table, request).await?;
        Self::first_row(table, body).map(|_| ())
    }

    async fn upsert(&self, table: Table, row: Value, on_conflict: &str) -> Result<Value, GatewayError> {
        let request = self
            .client
            .post(self.table_url(table))
            .query(&[("on_conflict", on_conflict)])
            .header("Prefer", MERGE_DUPLICATES)
            .json(&row);

        let body = self.execute(table, request).await?;
        Self::first_row(table, body)
    }
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("rest_url", &self.rest_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use serde_json::json;

    fn config(url: &str) -> GatewayConfig {
        GatewayConfig {
            url: url.to_string(),
            anon_key: "anon".to_string(),
        }
    }

    #[test]
    fn numeric_columns_keep_every_digit() {
        let body = r#"[{"quantity":0.123456789012345678,"open_price":65432.123456789012}]"#;
        let rows = parse_body(body).unwrap().unwrap();
        assert_eq!(rows[0]["quantity"].to_string(), "0.123456789012345678");
        assert_eq!(rows[0]["open_price"].to_string(), "65432.123456789012");
    }

    #[test]
    fn blank_success_body_is_none() {
        assert!(parse_body("  ").unwrap().is_none());
        assert!(matches!(parse_body("{oops"), Err(GatewayError::Deserialization(_))));
    }

    #[test]
    fn rest_url_ignores_trailing_slash() {
        let client = SupabaseClient::new(&config("https://demo.supabase.co/"), None).unwrap();
        assert_eq!(client.table_url(Table::Trades), "https://demo.supabase.co/rest/v1/trades");
    }

    #[test]
    fn empty_representation_means_no_rows() {
        let err = SupabaseClient::first_row(Table::Trades, Some(json!([]))).unwrap_err();
        assert!(matches!(err, GatewayError::NoRows(Table::Trades)));
    }

    #[test]
    fn first_row_unwraps_the_array() {
        let row = SupabaseClient::first_row(Table::Trades, Some(json!([{"id": 1}, {"id": 2}]))).unwrap();
        assert_eq!(row["id"], 1);
    }

    #[test]
    fn status_codes_survive_into_errors() {
        let err = PostgrestErrorResponse::default().into_error(StatusCode::FORBIDDEN.as_u16(), Table::Trades);
        assert!(matches!(err, GatewayError::PermissionDenied { .. }));
    }
}
