//! Property-based tests for TopUpService.

use chrono::Utc;
use proptest::prelude::*;
use topup_shared::types::{LedgerEntryId, MinorUnits, PaymentMethodId, UserId};

use super::service::{ReconciliationPlan, TopUpService};
use super::types::{PaymentMethod, PaymentStatus};
use crate::ledger::{EntryStatus, LedgerEntry, LedgerError};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_positive_literals_parse(value in 1i64..=i64::MAX) {
        let parsed = TopUpService::parse_nominal(&value.to_string()).unwrap();
        prop_assert_eq!(parsed.value(), value);
    }

    #[test]
    fn prop_negative_literals_rejected(value in i64::MIN..=0i64) {
        let result = TopUpService::parse_nominal(&value.to_string());
        prop_assert!(matches!(result, Err(LedgerError::NonPositiveNominal(_))));
    }

    #[test]
    fn prop_non_numeric_rejected(raw in "[a-zA-Z_ .]{1,12}") {
        prop_assume!(!raw.trim().is_empty());
        let result = TopUpService::parse_nominal(&raw);
        prop_assert!(matches!(result, Err(LedgerError::MalformedNominal(_))));
    }

    #[test]
    fn prop_plan_advances_by_nominal(
        balance in 0i64..1_000_000_000i64,
        nominal in 1i64..1_000_000_000i64,
        version in 1i64..1_000i64,
    ) {
        let current = LedgerEntry {
            id: LedgerEntryId::new(version),
            user_id: UserId::new(1),
            version,
            amount: MinorUnits::new(balance),
            status: EntryStatus::Topup,
            payment_method_id: None,
            created_at: Utc::now(),
        };
        let payment = PaymentMethod {
            id: PaymentMethodId::new(1),
            user_id: UserId::new(1),
            holder_name: "Alice".to_string(),
            va: "va".to_string(),
            nominal: MinorUnits::new(nominal),
            status: PaymentStatus::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        match TopUpService::plan(&current, &payment).unwrap() {
            ReconciliationPlan::Credit(entry) => {
                prop_assert_eq!(entry.amount.value(), balance + nominal);
                prop_assert_eq!(entry.version, version + 1);
            }
            ReconciliationPlan::AlreadySettled(_) => prop_assert!(false, "pending must credit"),
        }
    }
}
