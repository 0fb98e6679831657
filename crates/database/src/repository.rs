use crate::DbError;
use crate::rows::{
    DbSmartWithdrawalSettings, DbTrade, DbTradeInsert, DbUserSettings, DbWithdrawalInsert,
    DbWithdrawalTransaction, trade_patch,
};
use core_types::{
    NewTrade, NewWithdrawalTransaction, SmartWithdrawalSettings, Trade, TradeUpdate, UserId,
    UserSettings, WithdrawalTransaction,
};
use futures::future::join_all;
use gateway::{GatewayError, OWNER_COLUMN, Order, PersistenceGateway, Table};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, DbError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(DbError::from))
        .collect()
}

/// `None` when the single-row select matched nothing.
async fn select_optional(
    gateway: &dyn PersistenceGateway,
    table: Table,
    owner: &UserId,
) -> Result<Option<Value>, DbError> {
    match gateway.select_one_by_owner(table, owner).await {
        Ok(row) => Ok(Some(row)),
        Err(GatewayError::NoRows(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Data access for the `trades` table.
#[derive(Clone)]
pub struct TradeRepository {
    gateway: Arc<dyn PersistenceGateway>,
}

/// The result of a "clear all": every delete is attempted, failures are collected.
#[derive(Debug, Default)]
pub struct ClearOutcome {
    pub deleted: usize,
    pub failed: Vec<(Uuid, DbError)>,
}

impl TradeRepository {
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self { gateway }
    }

    /// Inserts a trade. The caller is expected to have validated it.
    pub async fn create(&self, trade: &NewTrade) -> Result<Trade, DbError> {
        let body = serde_json::to_value(DbTradeInsert::from(trade))?;
        let row = self.gateway.insert(Table::Trades, body).await?;
        let trade: Trade = serde_json::from_value::<DbTrade>(row)?.into();
        tracing::info!(trade_id = %trade.id, asset = %trade.asset, "Trade saved.");
        Ok(trade)
    }

    /// All of the owner's trades, most recently created first.
    pub async fn list(&self, owner: &UserId) -> Result<Vec<Trade>, DbError> {
        let rows = self
            .gateway
            .select_by_owner(Table::Trades, owner, Some(Order::desc("created_at")))
            .await?;
        tracing::debug!(count = rows.len(), "Fetched trades.");
        let trades: Vec<DbTrade> = decode_rows(rows)?;
        Ok(trades.into_iter().map(Trade::from).collect())
    }

    /// One of the owner's trades. `DbError::NotFound` if the id does not exist.
    pub async fn get(&self, owner: &UserId, id: Uuid) -> Result<Trade, DbError> {
        self.list(owner)
            .await?
            .into_iter()
            .find(|trade| trade.id == id)
            .ok_or(DbError::NotFound)
    }

    /// Applies a partial update. `DbError::NotFound` if the id does not exist.
    pub async fn update(
        &self,
        owner: &UserId,
        id: Uuid,
        update: &TradeUpdate,
    ) -> Result<Trade, DbError> {
        let patch = trade_patch(update)?;
        let row = self
            .gateway
            .update_by_id(Table::Trades, owner, id, patch)
            .await?;
        tracing::info!(trade_id = %id, "Trade updated.");
        Ok(serde_json::from_value::<DbTrade>(row)?.into())
    }

    pub async fn delete(&self, owner: &UserId, id: Uuid) -> Result<(), DbError> {
        self.gateway.delete_by_id(Table::Trades, owner, id).await?;
        tracing::info!(trade_id = %id, "Trade deleted.");
        Ok(())
    }

    /// Deletes every trade the owner has, issuing the deletes concurrently.
    ///
    /// `on_each` is called once per trade as its delete completes.
    pub async fn delete_all<F>(&self, owner: &UserId, on_each: F) -> Result<ClearOutcome, DbError>
    where
        F: Fn(Uuid, bool) + Sync,
    {
        let trades = self.list(owner).await?;
        let on_each = &on_each;

        let deletions = trades.iter().map(|trade| async move {
            let result = self.gateway.delete_by_id(Table::Trades, owner, trade.id).await;
            on_each(trade.id, result.is_ok());
            (trade.id, result)
        });

        let mut outcome = ClearOutcome::default();
        for (id, result) in join_all(deletions).await {
            match result {
                Ok(()) => outcome.deleted += 1,
                Err(e) => {
                    tracing::warn!(trade_id = %id, error = %e, "Failed to delete trade.");
                    outcome.failed.push((id, e.into()));
                }
            }
        }

        tracing::info!(
            deleted = outcome.deleted,
            failed = outcome.failed.len(),
            "Cleared trades."
        );
        Ok(outcome)
    }
}

/// Data access for `user_settings` and `smart_withdrawal_settings`.
#[derive(Clone)]
pub struct SettingsRepository {
    gateway: Arc<dyn PersistenceGateway>,
}

impl SettingsRepository {
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self { gateway }
    }

    /// `None` when the owner has never saved settings.
    pub async fn get_user_settings(&self, owner: &UserId) -> Result<Option<UserSettings>, DbError> {
        match select_optional(self.gateway.as_ref(), Table::UserSettings, owner).await? {
            Some(row) => Ok(Some(serde_json::from_value::<DbUserSettings>(row)?.into())),
            None => Ok(None),
        }
    }

    pub async fn get_user_settings_or_default(&self, owner: &UserId) -> Result<UserSettings, DbError> {
        Ok(self
            .get_user_settings(owner)
            .await?
            .unwrap_or_else(|| UserSettings::defaults_for(*owner)))
    }

    /// Upserts on `user_id`; the last write wins.
    pub async fn save_user_settings(&self, settings: &UserSettings) -> Result<UserSettings, DbError> {
        let body = serde_json::to_value(DbUserSettings::from(settings))?;
        let row = self
            .gateway
            .upsert(Table::UserSettings, body, OWNER_COLUMN)
            .await?;
        tracing::info!(owner = %settings.owner, "User settings saved.");
        Ok(serde_json::from_value::<DbUserSettings>(row)?.into())
    }

    pub async fn get_smart_withdrawal(
        &self,
        owner: &UserId,
    ) -> Result<Option<SmartWithdrawalSettings>, DbError> {
        match select_optional(self.gateway.as_ref(), Table::SmartWithdrawalSettings, owner).await? {
            Some(row) => Ok(Some(
                serde_json::from_value::<DbSmartWithdrawalSettings>(row)?.into(),
            )),
            None => Ok(None),
        }
    }

    pub async fn get_smart_withdrawal_or_default(
        &self,
        owner: &UserId,
    ) -> Result<SmartWithdrawalSettings, DbError> {
        Ok(self
            .get_smart_withdrawal(owner)
            .await?
            .unwrap_or_else(|| SmartWithdrawalSettings::defaults_for(*owner)))
    }

    pub async fn save_smart_withdrawal(
        &self,
        settings: &SmartWithdrawalSettings,
    ) -> Result<SmartWithdrawalSettings, DbError> {
        let body = serde_json::to_value(DbSmartWithdrawalSettings::from(settings))?;
        let row = self
            .gateway
            .upsert(Table::SmartWithdrawalSettings, body, OWNER_COLUMN)
            .await?;
        tracing::info!(
            owner = %settings.owner,
            enabled = settings.enabled,
            reinvest_percentage = %settings.reinvest_percentage,
            "Smart withdrawal settings saved."
        );
        Ok(serde_json::from_value::<DbSmartWithdrawalSettings>(row)?.into())
    }
}

/// Data access for the append-only `withdrawal_transactions` ledger.
#[derive(Clone)]
pub struct WithdrawalRepository {
    gateway: Arc<dyn PersistenceGateway>,
}

impl WithdrawalRepository {
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self { gateway }
    }

    /// The owner's ledger, newest first.
    pub async fn list(&self, owner: &UserId) -> Result<Vec<WithdrawalTransaction>, DbError> {
        let rows = self
            .gateway
            .select_by_owner(
                Table::WithdrawalTransactions,
                owner,
                Some(Order::desc("timestamp")),
            )
            .await?;
        tracing::debug!(count = rows.len(), "Fetched withdrawal transactions.");
        let rows: Vec<DbWithdrawalTransaction> = decode_rows(rows)?;
        Ok(rows.into_iter().map(WithdrawalTransaction::from).collect())
    }

    pub async fn append(
        &self,
        tx: &NewWithdrawalTransaction,
    ) -> Result<WithdrawalTransaction, DbError> {
        let body = serde_json::to_value(DbWithdrawalInsert::from(tx))?;
        let row = self
            .gateway
            .insert(Table::WithdrawalTransactions, body)
            .await?;
        let stored: WithdrawalTransaction =
            serde_json::from_value::<DbWithdrawalTransaction>(row)?.into();
        tracing::info!(
            transaction_id = %stored.id,
            action = %stored.action,
            amount = %stored.amount,
            "Withdrawal ledger entry appended."
        );
        Ok(stored)
    }
}
