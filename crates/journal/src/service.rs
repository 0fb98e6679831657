use crate::error::JournalError;
use crate::query::TradeQuery;
use analytics::{AnalyticsEngine, DashboardSummary, PerformanceReport, TimeWindow, capital_curve};
use chrono::{DateTime, NaiveDate, Utc};
use core_types::{CapitalPoint, CoreError, NewTrade, Trade, TradeUpdate, UserId, UserSettings};
use database::{ClearOutcome, SettingsRepository, TradeRepository};
use gateway::PersistenceGateway;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Everything the dashboard shows, fetched and derived in one go.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub settings: UserSettings,
    pub summary: DashboardSummary,
    pub capital_curve: Vec<CapitalPoint>,
}

/// Changes to the user's preferences. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsPatch {
    pub starting_capital: Option<Decimal>,
    pub notifications: Option<bool>,
    pub email_updates: Option<bool>,
    pub auto_backup: Option<bool>,
    pub theme: Option<String>,
}

impl SettingsPatch {
    fn apply(self, settings: &mut UserSettings) {
        if let Some(capital) = self.starting_capital {
            settings.starting_capital = capital;
        }
        if let Some(notifications) = self.notifications {
            settings.notifications = notifications;
        }
        if let Some(email_updates) = self.email_updates {
            settings.email_updates = email_updates;
        }
        if let Some(auto_backup) = self.auto_backup {
            settings.auto_backup = auto_backup;
        }
        if let Some(theme) = self.theme {
            settings.theme = theme;
        }
    }
}

/// The signed-in user's journal.
///
/// With no signed-in user, reads come back empty and deletes do nothing;
/// writes that need an owner fail with `JournalError::NotSignedIn`.
#[derive(Clone)]
pub struct JournalService {
    trades: TradeRepository,
    settings: SettingsRepository,
    engine: AnalyticsEngine,
    owner: Option<UserId>,
}

impl JournalService {
    pub fn new(gateway: Arc<dyn PersistenceGateway>, owner: Option<UserId>) -> Self {
        Self {
            trades: TradeRepository::new(gateway.clone()),
            settings: SettingsRepository::new(gateway),
            engine: AnalyticsEngine::new(),
            owner,
        }
    }

    pub fn owner(&self) -> Option<&UserId> {
        self.owner.as_ref()
    }

    fn require_owner(&self) -> Result<UserId, JournalError> {
        self.owner.ok_or(JournalError::NotSignedIn)
    }

    /// Validates and stores a trade for the signed-in user.
    ///
    /// The submission's `owner` is replaced by the session user. Nothing is
    /// sent to the backend when validation fails.
    pub async fn record_trade(&self, mut trade: NewTrade) -> Result<Trade, JournalError> {
        trade.owner = self.require_owner()?;
        trade.validate()?;
        Ok(self.trades.create(&trade).await?)
    }

    pub async fn list_trades(&self) -> Result<Vec<Trade>, JournalError> {
        match &self.owner {
            Some(owner) => Ok(self.trades.list(owner).await?),
            None => Ok(Vec::new()),
        }
    }

    pub async fn query_trades(&self, query: &TradeQuery) -> Result<Vec<Trade>, JournalError> {
        Ok(query.apply(self.list_trades().await?))
    }

    /// The trades matching `query` as pretty-printed JSON.
    pub async fn export_json(&self, query: &TradeQuery) -> Result<String, JournalError> {
        let trades = self.query_trades(query).await?;
        tracing::info!(count = trades.len(), "Exporting trades.");
        Ok(serde_json::to_string_pretty(&trades)?)
    }

    /// Checks the changes against the stored trade before writing them.
    /// `Ok(None)` when nobody is signed in.
    pub async fn update_trade(&self, id: Uuid, update: &TradeUpdate) -> Result<Option<Trade>, JournalError> {
        if update.is_empty() {
            return Err(JournalError::EmptyUpdate);
        }
        let Some(owner) = &self.owner else {
            return Ok(None);
        };
        let current = self.trades.get(owner, id).await?;
        if let Err(e) = update.validate(&current) {
            tracing::warn!(trade_id = %id, field = e.field(), error = %e, "Trade update rejected.");
            return Err(e.into());
        }
        Ok(Some(self.trades.update(owner, id, update).await?))
    }

    pub async fn delete_trade(&self, id: Uuid) -> Result<(), JournalError> {
        if let Some(owner) = &self.owner {
            self.trades.delete(owner, id).await?;
        }
        Ok(())
    }

    /// Deletes every trade, calling `on_each(id, succeeded)` as each delete settles.
    pub async fn clear_trades<F>(&self, on_each: F) -> Result<ClearOutcome, JournalError>
    where
        F: Fn(Uuid, bool) + Sync,
    {
        match &self.owner {
            Some(owner) => Ok(self.trades.delete_all(owner, on_each).await?),
            None => Ok(ClearOutcome::default()),
        }
    }

    /// Stored preferences, or the defaults when none were saved yet.
    pub async fn settings(&self) -> Result<Option<UserSettings>, JournalError> {
        match &self.owner {
            Some(owner) => Ok(Some(self.settings.get_user_settings_or_default(owner).await?)),
            None => Ok(None),
        }
    }

    pub async fn update_settings(&self, patch: SettingsPatch) -> Result<UserSettings, JournalError> {
        let owner = self.require_owner()?;
        if patch.starting_capital.is_some_and(|capital| capital < Decimal::ZERO) {
            return Err(CoreError::InvalidInput(
                "starting_capital".to_string(),
                "must not be negative".to_string(),
            )
            .into());
        }

        let mut settings = self.settings.get_user_settings_or_default(&owner).await?;
        patch.apply(&mut settings);
        Ok(self.settings.save_user_settings(&settings).await?)
    }

    /// Fetches settings and trades and derives the summary and capital curve.
    ///
    /// `Ok(None)` when nobody is signed in.
    pub async fn load_dashboard(&self, today: NaiveDate) -> Result<Option<Dashboard>, JournalError> {
        let Some(owner) = &self.owner else {
            return Ok(None);
        };
        let settings = self.settings.get_user_settings_or_default(owner).await?;
        let trades = self.trades.list(owner).await?;

        let summary = DashboardSummary::build(settings.starting_capital, &trades);
        let capital_curve = capital_curve(settings.starting_capital, &trades, today);
        Ok(Some(Dashboard {
            settings,
            summary,
            capital_curve,
        }))
    }

    /// Runs the engine over the trades opened within `window` of `now`.
    ///
    /// Trades keep the fetched order (newest created first), which is the
    /// order the drawdown walks.
    pub async fn analytics_for(
        &self,
        window: TimeWindow,
        now: DateTime<Utc>,
    ) -> Result<PerformanceReport, JournalError> {
        let trades = window.filter(&self.list_trades().await?, now);
        tracing::debug!(window = %window, count = trades.len(), "Calculating analytics.");
        Ok(self.engine.calculate(&trades, now)?)
    }
}
