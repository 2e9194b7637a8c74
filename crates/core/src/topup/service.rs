//! Top-up rules: nominal parsing, VA issuance, and reconciliation planning.
//!
//! Like the ledger service this is pure logic. Repositories load the current
//! entry and payment method inside a transaction, ask for a plan, and persist
//! whatever the plan says.

use chrono::{DateTime, Utc};
use topup_shared::types::{MinorUnits, PaymentMethodId};

use super::types::{IssueVaInput, NewPaymentMethod, PaymentMethod, PaymentStatus};
use super::va::VaGenerator;
use crate::ledger::{EntryStatus, LedgerEntry, LedgerError, LedgerService, NewLedgerEntry};

/// Maximum holder name length, in characters.
pub const HOLDER_NAME_MAX_LEN: usize = 255;

/// What reconciling a payment method against the current balance should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationPlan {
    /// Claim the payment method and append this entry.
    Credit(NewLedgerEntry),
    /// Already settled; return the entry linked to this payment method.
    AlreadySettled(PaymentMethodId),
}

/// Stateless top-up rules.
pub struct TopUpService;

impl TopUpService {
    /// Parses a nominal supplied as text.
    ///
    /// # Errors
    ///
    /// Returns `MalformedNominal` for anything that is not an integer literal
    /// and `NonPositiveNominal` for zero or negative values.
    pub fn parse_nominal(raw: &str) -> Result<MinorUnits, LedgerError> {
        let nominal: MinorUnits = raw
            .trim()
            .parse()
            .map_err(|_| LedgerError::MalformedNominal(raw.to_string()))?;
        Self::validate_nominal(nominal)
    }

    /// Checks that a nominal is strictly positive.
    pub fn validate_nominal(nominal: MinorUnits) -> Result<MinorUnits, LedgerError> {
        if nominal.is_positive() {
            Ok(nominal)
        } else {
            Err(LedgerError::NonPositiveNominal(nominal))
        }
    }

    /// Trims a holder name and checks its length.
    pub fn validate_holder_name(name: &str) -> Result<String, LedgerError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(LedgerError::InvalidHolderName(
                "holder name cannot be empty".to_string(),
            ));
        }
        if trimmed.chars().count() > HOLDER_NAME_MAX_LEN {
            return Err(LedgerError::InvalidHolderName(format!(
                "holder name cannot exceed {HOLDER_NAME_MAX_LEN} characters"
            )));
        }
        Ok(trimmed.to_string())
    }

    /// Validates an issue request and assigns it a VA.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a non-positive nominal or a bad holder
    /// name. The generator is not called in that case.
    pub fn prepare_issue(
        input: IssueVaInput,
        generator: &dyn VaGenerator,
        now: DateTime<Utc>,
    ) -> Result<NewPaymentMethod, LedgerError> {
        let nominal = Self::validate_nominal(input.nominal)?;
        let holder_name = Self::validate_holder_name(&input.holder_name)?;

        Ok(NewPaymentMethod {
            user_id: input.user_id,
            holder_name,
            va: generator.generate(now),
            nominal,
            status: PaymentStatus::Pending,
        })
    }

    /// Decides how to reconcile `payment` against the user's latest entry.
    ///
    /// # Errors
    ///
    /// Returns `VirtualAccountNotFound` if the payment method belongs to
    /// another user, and the credit errors from [`LedgerService::credit`].
    pub fn plan(
        current: &LedgerEntry,
        payment: &PaymentMethod,
    ) -> Result<ReconciliationPlan, LedgerError> {
        if payment.user_id != current.user_id {
            return Err(LedgerError::VirtualAccountNotFound(payment.va.clone()));
        }

        if payment.status.is_terminal() {
            return Ok(ReconciliationPlan::AlreadySettled(payment.id));
        }

        let amount = LedgerService::credit(current.amount, payment.nominal)?;
        let entry = LedgerService::next_entry(
            current.user_id,
            Some(current),
            amount,
            EntryStatus::Topup,
            Some(payment.id),
        )?;
        Ok(ReconciliationPlan::Credit(entry))
    }
}
