//! Balance statements derived from a user's ledger.
//!
//! Entries store running totals. A statement turns them back into per-entry
//! deltas so the credited sum can be checked against the closing balance.

use serde::Serialize;
use topup_shared::types::{MinorUnits, UserId};

use super::entry::{EntryStatus, LedgerEntry};
use super::error::LedgerError;

/// One ledger entry together with the change it introduced.
#[derive(Debug, Clone, Serialize)]
pub struct StatementLine {
    /// The entry as stored.
    pub entry: LedgerEntry,
    /// `entry.amount` minus the previous entry's amount.
    pub delta: MinorUnits,
}

/// Every entry of one user's ledger in insertion order.
#[derive(Debug, Clone, Serialize)]
pub struct BalanceStatement {
    /// Owner of the ledger.
    pub user_id: UserId,
    /// Amount of the opening `active` entry (zero if none).
    pub opening_balance: MinorUnits,
    /// Sum of `topup` deltas.
    pub total_credited: MinorUnits,
    /// Amount of the most recent entry (zero if none).
    pub closing_balance: MinorUnits,
    /// Entries with their deltas, oldest first.
    pub lines: Vec<StatementLine>,
}

impl BalanceStatement {
    /// Builds a statement from a user's entries, in any order.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::CorruptRecord` if an entry belongs to another
    /// user or a delta cannot be represented.
    pub fn from_entries(user_id: UserId, mut entries: Vec<LedgerEntry>) -> Result<Self, LedgerError> {
        entries.sort_by_key(|e| e.id);

        let mut lines = Vec::with_capacity(entries.len());
        let mut previous = MinorUnits::ZERO;
        let mut total_credited = MinorUnits::ZERO;
        let mut opening_balance = MinorUnits::ZERO;

        for (index, entry) in entries.into_iter().enumerate() {
            if entry.user_id != user_id {
                return Err(LedgerError::CorruptRecord(format!(
                    "entry {} belongs to user {}, not {user_id}",
                    entry.id, entry.user_id
                )));
            }

            let delta = entry.amount.checked_sub(previous).ok_or_else(|| {
                LedgerError::CorruptRecord(format!("delta of entry {} overflows", entry.id))
            })?;

            match entry.status {
                EntryStatus::Active if index == 0 => opening_balance = entry.amount,
                EntryStatus::Active => {}
                EntryStatus::Topup => {
                    total_credited = total_credited.checked_add(delta).ok_or_else(|| {
                        LedgerError::CorruptRecord("credited total overflows".to_string())
                    })?;
                }
            }

            previous = entry.amount;
            lines.push(StatementLine { entry, delta });
        }

        Ok(Self {
            user_id,
            opening_balance,
            total_credited,
            closing_balance: previous,
            lines,
        })
    }

    /// Returns true if opening balance plus credits equals the closing balance.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.opening_balance.checked_add(self.total_credited) == Some(self.closing_balance)
    }
}
