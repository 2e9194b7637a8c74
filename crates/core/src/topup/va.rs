//! Virtual-account reference generators.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Timelike, Utc};
use topup_shared::VaScheme;
use uuid::Uuid;

/// Produces virtual-account references.
///
/// Uniqueness is enforced by storage, not by the generator.
pub trait VaGenerator: Send + Sync {
    /// Generates a reference for a request issued at `now`.
    fn generate(&self, now: DateTime<Utc>) -> String;
}

/// Year, unpadded month, then the first three digits of the nanosecond field.
///
/// Two requests in the same month whose nanosecond fields share a prefix get
/// the same reference.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampVaGenerator;

impl VaGenerator for TimestampVaGenerator {
    fn generate(&self, now: DateTime<Utc>) -> String {
        let nanos = format!("{:0>3}", now.nanosecond());
        format!("{}{}{}", now.year(), now.month(), &nanos[..3])
    }
}

/// Decimal rendering of a random 128-bit value.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomVaGenerator;

impl VaGenerator for RandomVaGenerator {
    fn generate(&self, _now: DateTime<Utc>) -> String {
        Uuid::new_v4().as_u128().to_string()
    }
}

/// Returns the generator for a configured scheme.
#[must_use]
pub fn generator_for(scheme: VaScheme) -> Arc<dyn VaGenerator> {
    match scheme {
        VaScheme::Random => Arc::new(RandomVaGenerator),
        VaScheme::Timestamp => Arc::new(TimestampVaGenerator),
    }
}
