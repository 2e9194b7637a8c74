//! Property-based tests for LedgerService and BalanceStatement.
//!
//! - Credited balance equals the sum of its parts
//! - Versions increase by exactly one per append
//! - Statement deltas add back up to the closing balance

use chrono::Utc;
use proptest::prelude::*;
use topup_shared::types::{LedgerEntryId, MinorUnits, UserId};

use super::balance::BalanceStatement;
use super::entry::{EntryStatus, LedgerEntry};
use super::error::LedgerError;
use super::service::{FIRST_VERSION, LedgerService};

/// Strategy to generate valid nominals (1 to 10,000,000).
fn nominal() -> impl Strategy<Value = MinorUnits> {
    (1i64..10_000_000i64).prop_map(MinorUnits::new)
}

/// Replays a sequence of credits the way reconciliation would.
fn replay(user_id: UserId, nominals: &[MinorUnits]) -> Vec<LedgerEntry> {
    let opening = LedgerService::opening_entry(user_id);
    let mut entries = vec![LedgerEntry {
        id: LedgerEntryId::new(1),
        user_id,
        version: opening.version,
        amount: opening.amount,
        status: opening.status,
        payment_method_id: None,
        created_at: Utc::now(),
    }];

    for (offset, nominal) in nominals.iter().enumerate() {
        let latest = entries.last().unwrap();
        let balance = LedgerService::credit(latest.amount, *nominal).unwrap();
        let next =
            LedgerService::next_entry(user_id, Some(latest), balance, EntryStatus::Topup, None)
                .unwrap();
        entries.push(LedgerEntry {
            id: LedgerEntryId::new(i64::try_from(offset).unwrap() + 2),
            user_id,
            version: next.version,
            amount: next.amount,
            status: next.status,
            payment_method_id: None,
            created_at: Utc::now(),
        });
    }

    entries
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_credit_adds_exactly(balance in 0i64..1_000_000_000i64, nominal in nominal()) {
        let credited = LedgerService::credit(MinorUnits::new(balance), nominal).unwrap();
        prop_assert_eq!(credited.value(), balance + nominal.value());
        prop_assert!(credited > MinorUnits::new(balance));
    }

    #[test]
    fn prop_non_positive_nominal_rejected(balance in 0i64..1_000_000i64, nominal in i64::MIN..=0i64) {
        let result = LedgerService::credit(MinorUnits::new(balance), MinorUnits::new(nominal));
        prop_assert!(matches!(result, Err(LedgerError::NonPositiveNominal(_))));
    }

    #[test]
    fn prop_credit_never_overflows_silently(nominal in nominal()) {
        let balance = MinorUnits::new(i64::MAX - nominal.value() + 1);
        let result = LedgerService::credit(balance, nominal);
        prop_assert!(
            matches!(result, Err(LedgerError::BalanceOverflow { .. })),
            "expected overflow error"
        );
    }

    #[test]
    fn prop_versions_are_contiguous(nominals in prop::collection::vec(nominal(), 0..20)) {
        let entries = replay(UserId::new(7), &nominals);
        for (index, entry) in entries.iter().enumerate() {
            prop_assert_eq!(entry.version, FIRST_VERSION + i64::try_from(index).unwrap());
        }
    }

    #[test]
    fn prop_statement_reconstructs_credits(nominals in prop::collection::vec(nominal(), 0..20)) {
        let user_id = UserId::new(7);
        let mut entries = replay(user_id, &nominals);
        let expected: i64 = nominals.iter().map(|n| n.value()).sum();
        entries.reverse();

        let statement = BalanceStatement::from_entries(user_id, entries).unwrap();

        prop_assert!(statement.is_consistent());
        prop_assert_eq!(statement.total_credited.value(), expected);
        prop_assert_eq!(statement.closing_balance.value(), expected);
        let deltas: Vec<MinorUnits> =
            statement.lines.iter().skip(1).map(|line| line.delta).collect();
        prop_assert_eq!(deltas, nominals);
    }
}
