use crate::error::WithdrawalError;
use core_types::{SmartWithdrawalSettings, WithdrawalAction, WithdrawalTransaction};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use uuid::Uuid;

/// Decimal places kept by the ledger's amount column.
pub const LEDGER_SCALE: u32 = 2;

/// Withdrawn and reverted totals over a ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LedgerTotals {
    pub withdrawn: Decimal,
    pub reverted: Decimal,
}

impl LedgerTotals {
    pub fn from_ledger(ledger: &[WithdrawalTransaction]) -> Self {
        ledger.iter().fold(Self::default(), |mut totals, tx| {
            match tx.action {
                WithdrawalAction::Withdraw => totals.withdrawn += tx.amount,
                WithdrawalAction::Revert => totals.reverted += tx.amount,
            }
            totals
        })
    }

    pub fn net_withdrawn(&self) -> Decimal {
        self.withdrawn - self.reverted
    }
}

/// Everything the withdrawal view shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WithdrawalSummary {
    pub enabled: bool,
    pub reinvest_percentage: Decimal,
    pub total_profit: Decimal,
    /// The share of profit that may be taken out.
    pub protected_profit: Decimal,
    /// The share of profit that stays invested.
    pub reinvest_amount: Decimal,
    pub total_withdrawn: Decimal,
    pub total_reverted: Decimal,
    pub net_withdrawn: Decimal,
    pub available: Decimal,
}

/// Evaluates a smart-withdrawal policy against the owner's profit and ledger.
///
/// Pure: it never reads or writes the ledger itself.
#[derive(Debug, Clone)]
pub struct WithdrawalPolicy {
    settings: SmartWithdrawalSettings,
}

impl WithdrawalPolicy {
    pub fn new(settings: SmartWithdrawalSettings) -> Result<Self, WithdrawalError> {
        validate_percentage(settings.reinvest_percentage)?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &SmartWithdrawalSettings {
        &self.settings
    }

    /// max(0, profit × (1 − reinvest/100)). Losses protect nothing.
    pub fn protected_profit(&self, total_profit: Decimal) -> Decimal {
        let keep_share = dec!(1) - self.settings.reinvest_percentage / dec!(100);
        (total_profit * keep_share).max(Decimal::ZERO)
    }

    /// The amount that can be withdrawn right now. Zero while disabled.
    pub fn available(&self, total_profit: Decimal, ledger: &[WithdrawalTransaction]) -> Decimal {
        if !self.settings.enabled {
            return Decimal::ZERO;
        }
        let net_withdrawn = LedgerTotals::from_ledger(ledger).net_withdrawn();
        (self.protected_profit(total_profit) - net_withdrawn).max(Decimal::ZERO)
    }

    pub fn summary(&self, total_profit: Decimal, ledger: &[WithdrawalTransaction]) -> WithdrawalSummary {
        let totals = LedgerTotals::from_ledger(ledger);
        let protected_profit = self.protected_profit(total_profit);
        WithdrawalSummary {
            enabled: self.settings.enabled,
            reinvest_percentage: self.settings.reinvest_percentage,
            total_profit,
            protected_profit,
            reinvest_amount: (total_profit.max(Decimal::ZERO) - protected_profit).max(Decimal::ZERO),
            total_withdrawn: totals.withdrawn,
            total_reverted: totals.reverted,
            net_withdrawn: totals.net_withdrawn(),
            available: self.available(total_profit, ledger),
        }
    }

    /// Checks a withdrawal request. Nothing is recorded; a rejected request can
    /// be repeated and is rejected the same way.
    pub fn evaluate_request(
        &self,
        amount: Decimal,
        total_profit: Decimal,
        ledger: &[WithdrawalTransaction],
    ) -> Result<(), WithdrawalError> {
        // The ledger column holds cents; anything finer would be rounded on write.
        if amount <= Decimal::ZERO || amount.normalize().scale() > LEDGER_SCALE {
            return Err(WithdrawalError::InvalidAmount(amount));
        }
        if !self.settings.enabled {
            return Err(WithdrawalError::Disabled);
        }
        let available = self.available(total_profit, ledger);
        if amount > available {
            return Err(WithdrawalError::ExceedsAvailable {
                requested: amount,
                available,
            });
        }
        Ok(())
    }
}

pub fn validate_percentage(percentage: Decimal) -> Result<(), WithdrawalError> {
    if percentage < Decimal::ZERO || percentage > dec!(100) {
        return Err(WithdrawalError::InvalidPercentage(percentage));
    }
    Ok(())
}

/// Finds the WITHDRAW entry a revert would offset.
///
/// Rejects ids that are unknown, that name a REVERT entry, or that an earlier
/// REVERT already offsets.
pub fn revert_target(ledger: &[WithdrawalTransaction], id: Uuid) -> Result<&WithdrawalTransaction, WithdrawalError> {
    let target = ledger
        .iter()
        .find(|tx| tx.id == id)
        .ok_or(WithdrawalError::TransactionNotFound(id))?;

    if target.action != WithdrawalAction::Withdraw {
        return Err(WithdrawalError::NotAWithdrawal(id));
    }
    if ledger.iter().any(|tx| tx.reverts_transaction_id == Some(id)) {
        return Err(WithdrawalError::AlreadyReverted(id));
    }
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use core_types::UserId;

    fn owner() -> UserId {
        UserId::new(Uuid::nil())
    }

    fn policy(enabled: bool, reinvest: Decimal) -> WithdrawalPolicy {
        WithdrawalPolicy::new(SmartWithdrawalSettings {
            owner: owner(),
            enabled,
            reinvest_percentage: reinvest,
        })
        .unwrap()
    }

    fn entry(action: WithdrawalAction, amount: Decimal, reverts: Option<Uuid>) -> WithdrawalTransaction {
        WithdrawalTransaction {
            id: Uuid::new_v4(),
            owner: owner(),
            amount,
            action,
            timestamp: Utc::now(),
            description: String::new(),
            reverts_transaction_id: reverts,
        }
    }

    #[test]
    fn half_of_the_profit_is_available_at_fifty_percent() {
        let policy = policy(true, dec!(50));
        assert_eq!(policy.available(dec!(1000), &[]), dec!(500));
    }

    #[test]
    fn withdrawals_and_reverts_move_the_available_amount() {
        let policy = policy(true, dec!(50));
        let withdrawal = entry(WithdrawalAction::Withdraw, dec!(200), None);
        let mut ledger = vec![withdrawal.clone()];
        assert_eq!(policy.available(dec!(1000), &ledger), dec!(300));

        ledger.push(entry(WithdrawalAction::Revert, dec!(200), Some(withdrawal.id)));
        assert_eq!(policy.available(dec!(1000), &ledger), dec!(500));
    }

    #[test]
    fn disabled_policy_makes_nothing_available() {
        let policy = policy(false, dec!(50));
        assert_eq!(policy.available(dec!(1000), &[]), Decimal::ZERO);
        assert!(matches!(
            policy.evaluate_request(dec!(1), dec!(1000), &[]),
            Err(WithdrawalError::Disabled)
        ));
    }

    #[test]
    fn losses_never_produce_a_negative_amount() {
        let policy = policy(true, dec!(20));
        assert_eq!(policy.protected_profit(dec!(-500)), Decimal::ZERO);
        assert_eq!(policy.available(dec!(-500), &[]), Decimal::ZERO);

        let over_withdrawn = vec![entry(WithdrawalAction::Withdraw, dec!(900), None)];
        assert_eq!(policy.available(dec!(1000), &over_withdrawn), Decimal::ZERO);
    }

    #[test]
    fn requests_are_checked_against_the_available_amount() {
        let policy = policy(true, dec!(50));
        assert!(policy.evaluate_request(dec!(500), dec!(1000), &[]).is_ok());

        for _ in 0..2 {
            match policy.evaluate_request(dec!(500.01), dec!(1000), &[]) {
                Err(WithdrawalError::ExceedsAvailable { requested, available }) => {
                    assert_eq!(requested, dec!(500.01));
                    assert_eq!(available, dec!(500));
                }
                other => panic!("unexpected result: {:?}", other),
            }
        }

        assert!(matches!(
            policy.evaluate_request(Decimal::ZERO, dec!(1000), &[]),
            Err(WithdrawalError::InvalidAmount(_))
        ));
        assert!(matches!(
            policy.evaluate_request(dec!(-5), dec!(1000), &[]),
            Err(WithdrawalError::InvalidAmount(_))
        ));
    }

    #[test]
    fn sub_cent_amounts_are_rejected_even_when_available() {
        let policy = policy(true, dec!(50));
        assert_eq!(policy.available(dec!(200.01), &[]), dec!(100.005));

        for amount in [dec!(0.004), dec!(100.005)] {
            assert!(matches!(
                policy.evaluate_request(amount, dec!(200.01), &[]),
                Err(WithdrawalError::InvalidAmount(a)) if a == amount
            ));
        }
        assert!(policy.evaluate_request(dec!(100.00), dec!(200.01), &[]).is_ok());
    }

    #[test]
    fn out_of_range_percentages_are_rejected() {
        assert!(validate_percentage(dec!(0)).is_ok());
        assert!(validate_percentage(dec!(100)).is_ok());
        assert!(matches!(
            validate_percentage(dec!(100.5)),
            Err(WithdrawalError::InvalidPercentage(_))
        ));
        assert!(WithdrawalPolicy::new(SmartWithdrawalSettings {
            owner: owner(),
            enabled: true,
            reinvest_percentage: dec!(-1),
        })
        .is_err());
    }

    #[test]
    fn summary_splits_profit_between_reinvest_and_withdrawable() {
        let policy = policy(true, dec!(30));
        let ledger = vec![entry(WithdrawalAction::Withdraw, dec!(100), None)];
        let summary = policy.summary(dec!(1000), &ledger);

        assert_eq!(summary.protected_profit, dec!(700));
        assert_eq!(summary.reinvest_amount, dec!(300));
        assert_eq!(summary.total_withdrawn, dec!(100));
        assert_eq!(summary.net_withdrawn, dec!(100));
        assert_eq!(summary.available, dec!(600));
    }

    #[test]
    fn revert_targets_must_be_unreverted_withdrawals() {
        let withdrawal = entry(WithdrawalAction::Withdraw, dec!(200), None);
        let revert = entry(WithdrawalAction::Revert, dec!(200), Some(withdrawal.id));
        let pending = entry(WithdrawalAction::Withdraw, dec!(50), None);
        let ledger = vec![withdrawal.clone(), revert.clone(), pending.clone()];

        assert_eq!(revert_target(&ledger, pending.id).unwrap().amount, dec!(50));
        assert!(matches!(
            revert_target(&ledger, withdrawal.id),
            Err(WithdrawalError::AlreadyReverted(_))
        ));
        assert!(matches!(
            revert_target(&ledger, revert.id),
            Err(WithdrawalError::NotAWithdrawal(_))
        ));
        assert!(matches!(
            revert_target(&ledger, Uuid::new_v4()),
            Err(WithdrawalError::TransactionNotFound(_))
        ));
    }
}
