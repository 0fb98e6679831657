use chrono::Utc;
use core_types::{NewTrade, PnlType, TradeSide, UserId, WithdrawalAction};
use database::TradeRepository;
use gateway::{ErrorClass, InMemoryGateway, PersistenceGateway, Table};
use rust_decimal_macros::dec;
use std::sync::Arc;
use uuid::Uuid;
use withdrawal::{SmartWithdrawal, WithdrawalError};

struct Fixture {
    memory: Arc<InMemoryGateway>,
    service: SmartWithdrawal,
    owner: UserId,
}

/// An owner with 1000 of profit and the policy enabled at 50%.
async fn fixture() -> Fixture {
    let memory = Arc::new(InMemoryGateway::new());
    let gateway: Arc<dyn PersistenceGateway> = memory.clone();
    let owner = UserId::new(Uuid::new_v4());

    let trades = TradeRepository::new(gateway.clone());
    for pnl in [dec!(1200), dec!(-200)] {
        trades
            .create(&NewTrade {
                owner,
                asset: "BTC".to_string(),
                side: TradeSide::Long,
                leverage: 1,
                quantity: dec!(1),
                open_price: Some(dec!(100)),
                close_price: None,
                pnl: Some(pnl),
                pnl_type: PnlType::Realized,
                opened_at: Utc::now(),
                closed_at: None,
                notes: String::new(),
                tags: Vec::new(),
            })
            .await
            .unwrap();
    }

    let service = SmartWithdrawal::new(gateway);
    service
        .configure(&owner, Some(true), Some(dec!(50)))
        .await
        .unwrap();

    Fixture { memory, service, owner }
}

#[tokio::test]
async fn withdraw_then_revert_restores_the_available_amount() {
    let Fixture { service, owner, .. } = fixture().await;

    assert_eq!(service.summary(&owner).await.unwrap().available, dec!(500));

    let withdrawal = service.withdraw(&owner, dec!(200)).await.unwrap();
    assert_eq!(withdrawal.action, WithdrawalAction::Withdraw);
    assert_eq!(withdrawal.description, "Withdrawal of 200.00 USD");
    assert_eq!(service.summary(&owner).await.unwrap().available, dec!(300));

    let revert = service.revert(&owner, withdrawal.id).await.unwrap();
    assert_eq!(revert.action, WithdrawalAction::Revert);
    assert_eq!(revert.amount, dec!(200));
    assert_eq!(revert.reverts_transaction_id, Some(withdrawal.id));

    let summary = service.summary(&owner).await.unwrap();
    assert_eq!(summary.available, dec!(500));
    assert_eq!(summary.total_withdrawn, dec!(200));
    assert_eq!(summary.total_reverted, dec!(200));
}

#[tokio::test]
async fn rejected_requests_leave_the_ledger_unchanged() {
    let Fixture { memory, service, owner } = fixture().await;

    for _ in 0..2 {
        let err = service.withdraw(&owner, dec!(500.01)).await.unwrap_err();
        assert!(matches!(err, WithdrawalError::ExceedsAvailable { .. }));
    }
    for amount in [dec!(0), dec!(0.004), dec!(100.005)] {
        let err = service.withdraw(&owner, amount).await.unwrap_err();
        assert!(matches!(err, WithdrawalError::InvalidAmount(_)));
    }

    assert!(memory.rows(Table::WithdrawalTransactions).await.is_empty());
}

#[tokio::test]
async fn a_withdrawal_can_only_be_reverted_once() {
    let Fixture { service, owner, .. } = fixture().await;

    let withdrawal = service.withdraw(&owner, dec!(100)).await.unwrap();
    let revert = service.revert(&owner, withdrawal.id).await.unwrap();

    let err = service.revert(&owner, withdrawal.id).await.unwrap_err();
    assert!(matches!(err, WithdrawalError::AlreadyReverted(id) if id == withdrawal.id));
    let err = service.revert(&owner, revert.id).await.unwrap_err();
    assert!(matches!(err, WithdrawalError::NotAWithdrawal(_)));

    let history = service.history(&owner).await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(history.iter().any(|tx| tx.id == withdrawal.id));
}

#[tokio::test]
async fn configuration_rejects_bad_percentages_before_saving() {
    let Fixture { service, owner, .. } = fixture().await;

    let err = service
        .configure(&owner, None, Some(dec!(150)))
        .await
        .unwrap_err();
    assert!(matches!(err, WithdrawalError::InvalidPercentage(_)));

    let summary = service.summary(&owner).await.unwrap();
    assert_eq!(summary.reinvest_percentage, dec!(50));
    assert!(summary.enabled);
}

#[tokio::test]
async fn missing_ledger_table_surfaces_as_a_setup_problem() {
    let Fixture { memory, service, owner } = fixture().await;
    memory
        .fail_table(Table::WithdrawalTransactions, ErrorClass::RelationMissing)
        .await;

    match service.summary(&owner).await.unwrap_err() {
        WithdrawalError::Db(db) => assert!(db.is_setup_problem()),
        other => panic!("unexpected error: {:?}", other),
    }
}
