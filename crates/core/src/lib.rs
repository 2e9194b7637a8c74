//! Core business logic for the top-up ledger.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `ledger` - Append-only balance entries, error kinds, balance statements
//! - `topup` - Virtual-account issuance and reconciliation rules

pub mod ledger;
pub mod topup;
