//! Ledger repository tests against an in-memory database.

mod common;

use topup_core::ledger::{EntryStatus, LedgerError};
use topup_db::{BalanceQuery, LedgerRepository};
use topup_shared::types::{MinorUnits, UserId};

#[tokio::test]
async fn test_open_account_creates_zero_active_entry() {
    let db = common::setup_db().await;
    let repo = LedgerRepository::new(db);

    let entry = repo.open_account(UserId::new(1)).await.unwrap();

    assert_eq!(entry.user_id, UserId::new(1));
    assert_eq!(entry.amount, MinorUnits::ZERO);
    assert_eq!(entry.status, EntryStatus::Active);
    assert_eq!(entry.version, 1);
    assert_eq!(entry.payment_method_id, None);
}

#[tokio::test]
async fn test_open_account_is_idempotent() {
    let db = common::setup_db().await;
    let repo = LedgerRepository::new(db.clone());
    let query = BalanceQuery::new(db);

    let first = repo.open_account(UserId::new(1)).await.unwrap();
    let second = repo.open_account(UserId::new(1)).await.unwrap();

    assert_eq!(first.id, second.id);
    assert!(query.history(UserId::new(1)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_current_balance_without_entries_is_not_found() {
    let db = common::setup_db().await;
    let query = BalanceQuery::new(db);

    let err = query.current_balance(UserId::new(9)).await.unwrap_err();
    assert!(matches!(err, LedgerError::BalanceNotFound(id) if id == UserId::new(9)));
}

#[tokio::test]
async fn test_append_entry_advances_version_and_balance() {
    let db = common::setup_db().await;
    let repo = LedgerRepository::new(db.clone());
    let query = BalanceQuery::new(db);
    let user = UserId::new(2);

    repo.open_account(user).await.unwrap();
    let appended = repo
        .append_entry(user, MinorUnits::new(25_000), EntryStatus::Topup)
        .await
        .unwrap();

    assert_eq!(appended.version, 2);
    let current = query.current_balance(user).await.unwrap();
    assert_eq!(current.id, appended.id);
    assert_eq!(current.amount, MinorUnits::new(25_000));
}

#[tokio::test]
async fn test_append_negative_amount_is_rejected() {
    let db = common::setup_db().await;
    let repo = LedgerRepository::new(db.clone());
    let query = BalanceQuery::new(db);
    let user = UserId::new(3);

    repo.open_account(user).await.unwrap();
    let err = repo
        .append_entry(user, MinorUnits::new(-1), EntryStatus::Topup)
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::NegativeAmount(_)));
    assert_eq!(query.current_balance(user).await.unwrap().amount, MinorUnits::ZERO);
}

#[tokio::test]
async fn test_history_excludes_active_and_caps_at_100() {
    let db = common::setup_db().await;
    let repo = LedgerRepository::new(db.clone());
    let query = BalanceQuery::new(db);
    let user = UserId::new(4);

    repo.open_account(user).await.unwrap();
    for i in 1..=105 {
        repo.append_entry(user, MinorUnits::new(i * 10), EntryStatus::Topup)
            .await
            .unwrap();
    }

    let history = query.history(user).await.unwrap();

    assert_eq!(history.len(), 100);
    assert!(history.iter().all(|e| e.status == EntryStatus::Topup));
    assert_eq!(history[0].amount, MinorUnits::new(1_050));
    assert!(history.windows(2).all(|w| w[0].id > w[1].id));
}

#[tokio::test]
async fn test_ledgers_are_isolated_per_user() {
    let db = common::setup_db().await;
    let repo = LedgerRepository::new(db.clone());
    let query = BalanceQuery::new(db);

    repo.open_account(UserId::new(10)).await.unwrap();
    repo.open_account(UserId::new(11)).await.unwrap();
    repo.append_entry(UserId::new(10), MinorUnits::new(500), EntryStatus::Topup)
        .await
        .unwrap();

    assert_eq!(
        query.current_balance(UserId::new(11)).await.unwrap().amount,
        MinorUnits::ZERO
    );
    assert!(query.history(UserId::new(11)).await.unwrap().is_empty());
}
