use crate::error::{ErrorClass, GatewayError};
use crate::table::{Order, Table};
use crate::{OWNER_COLUMN, PersistenceGateway};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use core_types::UserId;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

/// A process-local gateway with the same observable behavior as the hosted
/// backend: it assigns ids and server timestamps, scopes reads by owner and
/// merges upserts on the conflict column.
///
/// Failures can be injected per table to exercise setup and permission paths.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    tables: Mutex<HashMap<Table, Vec<Value>>>,
    failures: Mutex<HashMap<Table, ErrorClass>>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every subsequent request touching `table` fails with `class`.
    pub async fn fail_table(&self, table: Table, class: ErrorClass) {
        self.failures.lock().await.insert(table, class);
    }

    pub async fn clear_failures(&self) {
        self.failures.lock().await.clear();
    }

    /// A snapshot of the raw rows stored in `table`, regardless of owner.
    pub async fn rows(&self, table: Table) -> Vec<Value> {
        self.tables.lock().await.get(&table).cloned().unwrap_or_default()
    }

    async fn check(&self, table: Table) -> Result<(), GatewayError> {
        let failures = self.failures.lock().await;
        match failures.get(&table) {
            None => Ok(()),
            Some(ErrorClass::RelationMissing) => Err(GatewayError::RelationMissing {
                table,
                message: format!("relation \"public.{}\" does not exist", table),
            }),
            Some(ErrorClass::PermissionDenied) => Err(GatewayError::PermissionDenied {
                table,
                message: "new row violates row-level security policy".to_string(),
            }),
            Some(ErrorClass::NoRows) => Err(GatewayError::NoRows(table)),
            Some(ErrorClass::Configuration) => {
                Err(GatewayError::Configuration("gateway is not configured".to_string()))
            }
            Some(ErrorClass::Other) => Err(GatewayError::Api {
                status: 500,
                code: None,
                message: "injected failure".to_string(),
            }),
        }
    }
}

fn now_string() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn into_object(table: Table, row: Value) -> Result<Map<String, Value>, GatewayError> {
    match row {
        Value::Object(map) => Ok(map),
        other => Err(GatewayError::Api {
            status: 400,
            code: Some("PGRST102".to_string()),
            message: format!("expected a JSON object for '{}', got {}", table, other),
        }),
    }
}

fn owned_by(row: &Value, owner: &str) -> bool {
    row.get(OWNER_COLUMN).and_then(Value::as_str) == Some(owner)
}

fn has_id(row: &Value, id: &str) -> bool {
    row.get("id").and_then(Value::as_str) == Some(id)
}

/// Timestamps compare chronologically, numbers numerically, everything else as text.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::String(a)), Some(Value::String(b))) => {
            match (DateTime::parse_from_rfc3339(a), DateTime::parse_from_rfc3339(b)) {
                (Ok(a), Ok(b)) => a.cmp(&b),
                _ => a.cmp(b),
            }
        }
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(a), Some(b)) => a.to_string().cmp(&b.to_string()),
        // Postgres sorts nulls last in ascending order.
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

/// Server-side defaults the real tables fill in.
fn stamp_insert(table: Table, row: &mut Map<String, Value>) {
    row.entry("id").or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
    let now = now_string();
    match table {
        Table::WithdrawalTransactions => {
            row.entry("timestamp").or_insert_with(|| Value::String(now));
        }
        Table::Trades | Table::UserSettings | Table::SmartWithdrawalSettings => {
            row.entry("created_at").or_insert_with(|| Value::String(now.clone()));
            row.insert("updated_at".to_string(), Value::String(now));
        }
    }
}

fn merge(target: &mut Value, patch: Map<String, Value>) {
    if let Value::Object(existing) = target {
        for (key, value) in patch {
            existing.insert(key, value);
        }
        existing.insert("updated_at".to_string(), Value::String(now_string()));
    }
}

#[async_trait]
impl PersistenceGateway for InMemoryGateway {
    async fn select_by_owner(
        &self,
        table: Table,
        owner: &UserId,
        order: Option<Order>,
    ) -> Result<Vec<Value>, GatewayError> {
        self.check(table).await?;
        let owner = owner.to_string();
        let tables = self.tables.lock().await;
        let mut rows: Vec<Value> = tables
            .get(&table)
            .map(|rows| rows.iter().filter(|r| owned_by(r, &owner)).cloned().collect())
            .unwrap_or_default();

        if let Some(order) = order {
            // Rows stamped within the same microsecond keep newest-inserted first.
            if !order.ascending {
                rows.reverse();
            }
            rows.sort_by(|a, b| {
                let ordering = compare_values(a.get(order.column), b.get(order.column));
                if order.ascending { ordering } else { ordering.reverse() }
            });
        }
        Ok(rows)
    }

    async fn select_one_by_owner(&self, table: Table, owner: &UserId) -> Result<Value, GatewayError> {
        self.check(table).await?;
        let owner = owner.to_string();
        let tables = self.tables.lock().await;
        tables
            .get(&table)
            .and_then(|rows| rows.iter().find(|r| owned_by(r, &owner)).cloned())
            .ok_or(GatewayError::NoRows(table))
    }

    async fn insert(&self, table: Table, row: Value) -> Result<Value, GatewayError> {
        self.check(table).await?;
        let mut row = into_object(table, row)?;
        stamp_insert(table, &mut row);
        let row = Value::Object(row);
        self.tables
            .lock()
            .await
            .entry(table)
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    async fn update_by_id(
        &self,
        table: Table,
        owner: &UserId,
        id: Uuid,
        patch: Value,
    ) -> Result<Value, GatewayError> {
        self.check(table).await?;
        let patch = into_object(table, patch)?;
        let (owner, id) = (owner.to_string(), id.to_string());
        let mut tables = self.tables.lock().await;
        let row = tables
            .get_mut(&table)
            .and_then(|rows| rows.iter_mut().find(|r| has_id(r, &id) && owned_by(r, &owner)))
            .ok_or(GatewayError::NoRows(table))?;
        merge(row, patch);
        Ok(row.clone())
    }

    async fn delete_by_id(&self, table: Table, owner: &UserId, id: Uuid) -> Result<(), GatewayError> {
        self.check(table).await?;
        let (owner, id) = (owner.to_string(), id.to_string());
        let mut tables = self.tables.lock().await;
        let rows = tables.get_mut(&table).ok_or(GatewayError::NoRows(table))?;
        let before = rows.len();
        rows.retain(|r| !(has_id(r, &id) && owned_by(r, &owner)));
        if rows.len() == before {
            return Err(GatewayError::NoRows(table));
        }
        Ok(())
    }

    async fn upsert(&self, table: Table, row: Value, on_conflict: &str) -> Result<Value, GatewayError> {
        self.check(table).await?;
        let mut row = into_object(table, row)?;
        let key = row.get(on_conflict).cloned().ok_or_else(|| GatewayError::Api {
            status: 400,
            code: Some("42P10".to_string()),
            message: format!("row has no '{}' column to resolve conflicts on", on_conflict),
        })?;

        let mut tables = self.tables.lock().await;
        let rows = tables.entry(table).or_default();
        if let Some(existing) = rows.iter_mut().find(|r| r.get(on_conflict) == Some(&key)) {
            // The stored id survives a merge.
            row.remove("id");
            merge(existing, row);
            return Ok(existing.clone());
        }

        stamp_insert(table, &mut row);
        let row = Value::Object(row);
        rows.push(row.clone());
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn owner() -> UserId {
        UserId::new(Uuid::new_v4())
    }

    #[tokio::test]
    async fn insert_assigns_server_columns() {
        let gateway = InMemoryGateway::new();
        let user = owner();
        let row = gateway
            .insert(Table::Trades, json!({"user_id": user.to_string(), "asset": "BTC"}))
            .await
            .unwrap();
        assert!(row["id"].as_str().is_some());
        assert!(row["created_at"].as_str().is_some());

        let tx = gateway
            .insert(Table::WithdrawalTransactions, json!({"user_id": user.to_string()}))
            .await
            .unwrap();
        assert!(tx["timestamp"].as_str().is_some());
    }

    #[tokio::test]
    async fn reads_are_scoped_to_the_owner() {
        let gateway = InMemoryGateway::new();
        let (alice, bob) = (owner(), owner());
        gateway
            .insert(Table::Trades, json!({"user_id": alice.to_string(), "asset": "BTC"}))
            .await
            .unwrap();
        gateway
            .insert(Table::Trades, json!({"user_id": bob.to_string(), "asset": "ETH"}))
            .await
            .unwrap();

        let rows = gateway.select_by_owner(Table::Trades, &alice, None).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["asset"], "BTC");
    }

    #[tokio::test]
    async fn order_compares_timestamps_chronologically() {
        let gateway = InMemoryGateway::new();
        let user = owner();
        for ts in ["2024-03-01T10:00:00Z", "2024-03-01T10:00:00.500Z", "2024-02-01T00:00:00Z"] {
            gateway
                .insert(Table::Trades, json!({"user_id": user.to_string(), "created_at": ts}))
                .await
                .unwrap();
        }

        let rows = gateway
            .select_by_owner(Table::Trades, &user, Some(Order::desc("created_at")))
            .await
            .unwrap();
        let order: Vec<&str> = rows.iter().map(|r| r["created_at"].as_str().unwrap()).collect();
        assert_eq!(
            order,
            vec!["2024-03-01T10:00:00.500Z", "2024-03-01T10:00:00Z", "2024-02-01T00:00:00Z"]
        );
    }

    #[tokio::test]
    async fn upsert_merges_on_the_conflict_column() {
        let gateway = InMemoryGateway::new();
        let user = owner();
        let first = gateway
            .upsert(
                Table::UserSettings,
                json!({"user_id": user.to_string(), "starting_capital": "100"}),
                "user_id",
            )
            .await
            .unwrap();
        let second = gateway
            .upsert(
                Table::UserSettings,
                json!({"user_id": user.to_string(), "starting_capital": "250"}),
                "user_id",
            )
            .await
            .unwrap();

        assert_eq!(first["id"], second["id"]);
        assert_eq!(second["starting_capital"], "250");
        assert_eq!(gateway.rows(Table::UserSettings).await.len(), 1);
    }

    #[tokio::test]
    async fn missing_rows_are_reported() {
        let gateway = InMemoryGateway::new();
        let user = owner();
        let err = gateway
            .select_one_by_owner(Table::SmartWithdrawalSettings, &user)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::NoRows(Table::SmartWithdrawalSettings)));

        let err = gateway
            .delete_by_id(Table::Trades, &user, Uuid::new_v4())
            .await
            .unwrap_err();
        assert_eq!(err.class(), ErrorClass::NoRows);
    }

    #[tokio::test]
    async fn another_owner_cannot_delete_a_row() {
        let gateway = InMemoryGateway::new();
        let (alice, mallory) = (owner(), owner());
        let row = gateway
            .insert(Table::Trades, json!({"user_id": alice.to_string()}))
            .await
            .unwrap();
        let id = Uuid::parse_str(row["id"].as_str().unwrap()).unwrap();

        assert!(gateway.delete_by_id(Table::Trades, &mallory, id).await.is_err());
        assert!(gateway.delete_by_id(Table::Trades, &alice, id).await.is_ok());
    }

    #[tokio::test]
    async fn injected_failures_carry_the_table() {
        let gateway = InMemoryGateway::new();
        gateway
            .fail_table(Table::WithdrawalTransactions, ErrorClass::RelationMissing)
            .await;

        let err = gateway
            .select_by_owner(Table::WithdrawalTransactions, &owner(), None)
            .await
            .unwrap_err();
        match err {
            GatewayError::RelationMissing { table, .. } => {
                assert_eq!(table, Table::WithdrawalTransactions)
            }
            other => panic!("unexpected error: {:?}", other),
        }

        // Other tables are unaffected.
        assert!(gateway.select_by_owner(Table::Trades, &owner(), None).await.is_ok());
    }
}
