use crate::error::WithdrawalError;
use crate::evaluator::{WithdrawalPolicy, WithdrawalSummary, revert_target, validate_percentage};
use core_types::{
    NewWithdrawalTransaction, SmartWithdrawalSettings, UserId, WithdrawalAction,
    WithdrawalTransaction,
};
use database::{SettingsRepository, TradeRepository, WithdrawalRepository};
use gateway::PersistenceGateway;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

/// Reads the policy, profit and ledger for an owner and records withdrawals.
///
/// Every call re-fetches from the backend; nothing is cached between calls.
#[derive(Clone)]
pub struct SmartWithdrawal {
    trades: TradeRepository,
    settings: SettingsRepository,
    ledger: WithdrawalRepository,
}

/// Policy, profit and ledger fetched together.
struct Snapshot {
    policy: WithdrawalPolicy,
    total_profit: Decimal,
    ledger: Vec<WithdrawalTransaction>,
}

impl SmartWithdrawal {
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self {
            trades: TradeRepository::new(gateway.clone()),
            settings: SettingsRepository::new(gateway.clone()),
            ledger: WithdrawalRepository::new(gateway),
        }
    }

    async fn snapshot(&self, owner: &UserId) -> Result<Snapshot, WithdrawalError> {
        let settings = self.settings.get_smart_withdrawal_or_default(owner).await?;
        let total_profit: Decimal = self.trades.list(owner).await?.iter().map(|t| t.pnl).sum();
        let ledger = self.ledger.list(owner).await?;
        Ok(Snapshot {
            policy: WithdrawalPolicy::new(settings)?,
            total_profit,
            ledger,
        })
    }

    pub async fn summary(&self, owner: &UserId) -> Result<WithdrawalSummary, WithdrawalError> {
        let snapshot = self.snapshot(owner).await?;
        Ok(snapshot.policy.summary(snapshot.total_profit, &snapshot.ledger))
    }

    pub async fn history(&self, owner: &UserId) -> Result<Vec<WithdrawalTransaction>, WithdrawalError> {
        Ok(self.ledger.list(owner).await?)
    }

    /// Appends a WITHDRAW entry if the policy allows `amount`.
    pub async fn withdraw(
        &self,
        owner: &UserId,
        amount: Decimal,
    ) -> Result<WithdrawalTransaction, WithdrawalError> {
        let snapshot = self.snapshot(owner).await?;
        if let Err(e) = snapshot
            .policy
            .evaluate_request(amount, snapshot.total_profit, &snapshot.ledger)
        {
            tracing::warn!(owner = %owner, amount = %amount, error = %e, "Withdrawal rejected.");
            return Err(e);
        }

        let entry = NewWithdrawalTransaction {
            owner: *owner,
            amount,
            action: WithdrawalAction::Withdraw,
            description: format!("Withdrawal of {:.2} USD", amount),
            reverts_transaction_id: None,
        };
        Ok(self.ledger.append(&entry).await?)
    }

    /// Offsets an earlier withdrawal with a linked REVERT entry. The original
    /// entry stays in the ledger.
    pub async fn revert(
        &self,
        owner: &UserId,
        transaction_id: Uuid,
    ) -> Result<WithdrawalTransaction, WithdrawalError> {
        let ledger = self.ledger.list(owner).await?;
        let target = revert_target(&ledger, transaction_id)?;

        let entry = NewWithdrawalTransaction {
            owner: *owner,
            amount: target.amount,
            action: WithdrawalAction::Revert,
            description: format!("Reverted withdrawal of {:.2} USD", target.amount),
            reverts_transaction_id: Some(target.id),
        };
        Ok(self.ledger.append(&entry).await?)
    }

    /// Updates the policy. `None` keeps the stored (or default) value.
    pub async fn configure(
        &self,
        owner: &UserId,
        enabled: Option<bool>,
        reinvest_percentage: Option<Decimal>,
    ) -> Result<SmartWithdrawalSettings, WithdrawalError> {
        if let Some(percentage) = reinvest_percentage {
            validate_percentage(percentage)?;
        }

        let mut settings = self.settings.get_smart_withdrawal_or_default(owner).await?;
        if let Some(enabled) = enabled {
            settings.enabled = enabled;
        }
        if let Some(percentage) = reinvest_percentage {
            settings.reinvest_percentage = percentage;
        }
        Ok(self.settings.save_smart_withdrawal(&settings).await?)
    }
}
