//! Virtual-account top-ups.
//!
//! # Modules
//!
//! - `types` - Payment method domain types (PaymentStatus, PaymentMethod)
//! - `va` - Virtual-account reference generators
//! - `service` - Issuance validation and reconciliation planning

pub mod service;
pub mod types;
pub mod va;

#[cfg(test)]
mod service_props;

pub use service::{HOLDER_NAME_MAX_LEN, ReconciliationPlan, TopUpService};
pub use types::{IssueVaInput, NewPaymentMethod, PaymentMethod, PaymentStatus};
pub use va::{RandomVaGenerator, TimestampVaGenerator, VaGenerator, generator_for};
