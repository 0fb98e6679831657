//! Row shapes as they exist in the hosted tables.
//!
//! Column names follow the backend schema (`type`, `open_time`, `selected_tags`),
//! which differs from the domain names in `core_types`.

use chrono::{DateTime, Utc};
use core_types::{
    NewTrade, NewWithdrawalTransaction, PnlType, SmartWithdrawalSettings, Trade, TradeSide,
    TradeUpdate, UserId, UserSettings, WithdrawalAction, WithdrawalTransaction,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A row fetched from the `trades` table.
#[derive(Debug, Clone, Deserialize)]
pub struct DbTrade {
    pub id: Uuid,
    pub user_id: UserId,
    pub asset: String,
    #[serde(rename = "type")]
    pub side: TradeSide,
    pub leverage: u32,
    pub quantity: Decimal,
    pub open_price: Option<Decimal>,
    pub close_price: Option<Decimal>,
    pub pnl: Decimal,
    #[serde(default)]
    pub pnl_type: PnlType,
    pub open_time: DateTime<Utc>,
    pub close_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub selected_tags: Option<Vec<String>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<DbTrade> for Trade {
    fn from(row: DbTrade) -> Self {
        Trade {
            id: row.id,
            owner: row.user_id,
            asset: row.asset,
            side: row.side,
            leverage: row.leverage,
            quantity: row.quantity,
            open_price: row.open_price,
            close_price: row.close_price,
            pnl: row.pnl,
            pnl_type: row.pnl_type,
            opened_at: row.open_time,
            closed_at: row.close_time,
            notes: row.notes.unwrap_or_default(),
            tags: row.selected_tags.unwrap_or_default(),
            created_at: row.created_at,
        }
    }
}

/// The body of a `trades` insert. `id` and `created_at` are assigned by the backend.
#[derive(Debug, Clone, Serialize)]
pub struct DbTradeInsert {
    pub user_id: UserId,
    pub asset: String,
    #[serde(rename = "type")]
    pub side: TradeSide,
    pub leverage: u32,
    pub quantity: Decimal,
    pub open_price: Option<Decimal>,
    pub close_price: Option<Decimal>,
    pub pnl: Decimal,
    pub pnl_type: PnlType,
    pub open_time: DateTime<Utc>,
    pub close_time: Option<DateTime<Utc>>,
    pub notes: String,
    pub selected_tags: Vec<String>,
}

impl From<&NewTrade> for DbTradeInsert {
    fn from(trade: &NewTrade) -> Self {
        Self {
            user_id: trade.owner,
            asset: trade.asset.trim().to_string(),
            side: trade.side,
            leverage: trade.leverage,
            quantity: trade.quantity,
            open_price: trade.open_price,
            close_price: trade.close_price,
            pnl: trade.resolved_pnl(),
            pnl_type: trade.pnl_type,
            open_time: trade.opened_at,
            close_time: trade.closed_at,
            notes: trade.notes.trim().to_string(),
            selected_tags: trade.normalized_tags(),
        }
    }
}

/// Builds a PATCH body containing only the columns the update sets.
pub fn trade_patch(update: &TradeUpdate) -> Result<Value, serde_json::Error> {
    let mut patch = Map::new();
    if let Some(close_price) = update.close_price {
        patch.insert("close_price".to_string(), serde_json::to_value(close_price)?);
    }
    if let Some(pnl) = update.pnl {
        patch.insert("pnl".to_string(), serde_json::to_value(pnl)?);
    }
    if let Some(pnl_type) = update.pnl_type {
        patch.insert("pnl_type".to_string(), serde_json::to_value(pnl_type)?);
    }
    if let Some(closed_at) = update.closed_at {
        patch.insert("close_time".to_string(), serde_json::to_value(closed_at)?);
    }
    if let Some(notes) = &update.notes {
        patch.insert("notes".to_string(), Value::String(notes.clone()));
    }
    if let Some(tags) = update.normalized_tags() {
        patch.insert("selected_tags".to_string(), serde_json::to_value(tags)?);
    }
    Ok(Value::Object(patch))
}

/// A row of `user_settings`. Nullable columns fall back to the defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbUserSettings {
    pub user_id: UserId,
    #[serde(default)]
    pub starting_capital: Option<Decimal>,
    #[serde(default)]
    pub notifications: Option<bool>,
    #[serde(default)]
    pub email_updates: Option<bool>,
    #[serde(default)]
    pub auto_backup: Option<bool>,
    #[serde(default)]
    pub theme: Option<String>,
}

impl From<DbUserSettings> for UserSettings {
    fn from(row: DbUserSettings) -> Self {
        let defaults = UserSettings::defaults_for(row.user_id);
        UserSettings {
            owner: row.user_id,
            starting_capital: row.starting_capital.unwrap_or(defaults.starting_capital),
            notifications: row.notifications.unwrap_or(defaults.notifications),
            email_updates: row.email_updates.unwrap_or(defaults.email_updates),
            auto_backup: row.auto_backup.unwrap_or(defaults.auto_backup),
            theme: row.theme.unwrap_or(defaults.theme),
        }
    }
}

impl From<&UserSettings> for DbUserSettings {
    fn from(settings: &UserSettings) -> Self {
        Self {
            user_id: settings.owner,
            starting_capital: Some(settings.starting_capital),
            notifications: Some(settings.notifications),
            email_updates: Some(settings.email_updates),
            auto_backup: Some(settings.auto_backup),
            theme: Some(settings.theme.clone()),
        }
    }
}

/// A row of `smart_withdrawal_settings`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbSmartWithdrawalSettings {
    pub user_id: UserId,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub reinvest_percentage: Option<Decimal>,
}

impl From<DbSmartWithdrawalSettings> for SmartWithdrawalSettings {
    fn from(row: DbSmartWithdrawalSettings) -> Self {
        let defaults = SmartWithdrawalSettings::defaults_for(row.user_id);
        SmartWithdrawalSettings {
            owner: row.user_id,
            enabled: row.enabled.unwrap_or(defaults.enabled),
            reinvest_percentage: row
                .reinvest_percentage
                .unwrap_or(defaults.reinvest_percentage),
        }
    }
}

impl From<&SmartWithdrawalSettings> for DbSmartWithdrawalSettings {
    fn from(settings: &SmartWithdrawalSettings) -> Self {
        Self {
            user_id: settings.owner,
            enabled: Some(settings.enabled),
            reinvest_percentage: Some(settings.reinvest_percentage),
        }
    }
}

/// A row of `withdrawal_transactions`.
#[derive(Debug, Clone, Deserialize)]
pub struct DbWithdrawalTransaction {
    pub id: Uuid,
    pub user_id: UserId,
    pub amount: Decimal,
    pub action: WithdrawalAction,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub reverts_transaction_id: Option<Uuid>,
}

impl From<DbWithdrawalTransaction> for WithdrawalTransaction {
    fn from(row: DbWithdrawalTransaction) -> Self {
        WithdrawalTransaction {
            id: row.id,
            owner: row.user_id,
            amount: row.amount,
            action: row.action,
            timestamp: row.timestamp,
            description: row.description.unwrap_or_default(),
            reverts_transaction_id: row.reverts_transaction_id,
        }
    }
}

/// The body of a ledger insert. The link column is omitted on WITHDRAW entries
/// so projects created before it existed keep accepting withdrawals.
#[derive(Debug, Clone, Serialize)]
pub struct DbWithdrawalInsert {
    pub user_id: UserId,
    pub amount: Decimal,
    pub action: WithdrawalAction,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reverts_transaction_id: Option<Uuid>,
}

impl From<&NewWithdrawalTransaction> for DbWithdrawalInsert {
    fn from(tx: &NewWithdrawalTransaction) -> Self {
        Self {
            user_id: tx.owner,
            amount: tx.amount,
            action: tx.action,
            description: tx.description.clone(),
            reverts_transaction_id: tx.reverts_transaction_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn trade_rows_use_backend_column_names() {
        let row: DbTrade = serde_json::from_value(json!({
            "id": "5b1f0a4e-3c2d-4e5f-8a9b-0c1d2e3f4a5b",
            "user_id": "9f3b2c1e-8d7a-4b6c-9e5f-1a2b3c4d5e6f",
            "asset": "ETH",
            "type": "SHORT",
            "leverage": 5,
            "quantity": 1.25,
            "open_price": "3200.10",
            "close_price": null,
            "pnl": 0,
            "pnl_type": "UNREALIZED",
            "open_time": "2024-05-01T12:00:00+00:00",
            "close_time": null,
            "notes": null,
            "selected_tags": ["swing"],
            "created_at": "2024-05-01T12:00:01.123456+00:00"
        }))
        .unwrap();

        let trade = Trade::from(row);
        assert_eq!(trade.side, TradeSide::Short);
        assert_eq!(trade.quantity, dec!(1.25));
        assert_eq!(trade.open_price, Some(dec!(3200.10)));
        assert!(trade.is_open());
        assert_eq!(trade.notes, "");
        assert_eq!(trade.tags, vec!["swing"]);
    }

    #[test]
    fn numeric_columns_decode_without_float_rounding() {
        let body = r#"[{
            "id": "5b1f0a4e-3c2d-4e5f-8a9b-0c1d2e3f4a5b",
            "user_id": "9f3b2c1e-8d7a-4b6c-9e5f-1a2b3c4d5e6f",
            "asset": "BTC",
            "type": "LONG",
            "leverage": 3,
            "quantity": 0.123456789012345678,
            "open_price": 65432.123456789012,
            "close_price": null,
            "pnl": 1234567.891234567891,
            "open_time": "2024-05-01T12:00:00+00:00",
            "close_time": null
        }]"#;
        let rows: Vec<DbTrade> = serde_json::from_value(serde_json::from_str(body).unwrap()).unwrap();
        let trade = Trade::from(rows.into_iter().next().unwrap());
        assert_eq!(trade.quantity, dec!(0.123456789012345678));
        assert_eq!(trade.open_price, Some(dec!(65432.123456789012)));
        assert_eq!(trade.pnl, dec!(1234567.891234567891));
    }

    #[test]
    fn patch_tags_are_normalized() {
        let update = TradeUpdate {
            tags: Some(vec![" scalp".to_string(), "".to_string(), "scalp".to_string()]),
            ..Default::default()
        };
        assert_eq!(trade_patch(&update).unwrap()["selected_tags"], json!(["scalp"]));
    }

    #[test]
    fn patch_contains_only_the_set_columns() {
        let update = TradeUpdate {
            close_price: Some(dec!(101.5)),
            notes: Some("closed early".to_string()),
            ..Default::default()
        };
        let patch = trade_patch(&update).unwrap();
        let keys: Vec<&String> = patch.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 2);
        assert_eq!(patch["close_price"], "101.5");
        assert_eq!(patch["notes"], "closed early");
    }

    #[test]
    fn null_settings_columns_fall_back_to_defaults() {
        let row: DbUserSettings = serde_json::from_value(json!({
            "user_id": "9f3b2c1e-8d7a-4b6c-9e5f-1a2b3c4d5e6f",
            "starting_capital": "2500.00",
            "theme": null
        }))
        .unwrap();
        let settings = UserSettings::from(row);
        assert_eq!(settings.starting_capital, dec!(2500.00));
        assert_eq!(settings.theme, "dark");
        assert!(settings.notifications);
    }

    #[test]
    fn withdraw_inserts_omit_the_link_column() {
        let owner: UserId = "9f3b2c1e-8d7a-4b6c-9e5f-1a2b3c4d5e6f".parse().unwrap();
        let insert = DbWithdrawalInsert::from(&NewWithdrawalTransaction {
            owner,
            amount: dec!(200),
            action: WithdrawalAction::Withdraw,
            description: "Withdrawal of 200.00 USD".to_string(),
            reverts_transaction_id: None,
        });
        let body = serde_json::to_value(&insert).unwrap();
        assert!(body.get("reverts_transaction_id").is_none());
        assert_eq!(body["action"], "WITHDRAW");
        assert_eq!(body["amount"], "200");
    }
}
