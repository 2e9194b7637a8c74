//! Shared types, errors, and configuration for the top-up ledger.
//!
//! This crate provides common types used across all other crates:
//! - Minor-unit money type with exact integer arithmetic
//! - Typed IDs for type-safe entity references
//! - Application-wide error types
//! - Configuration management
//! - JWT verification for the already-authenticated caller

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::Claims;
pub use config::{AppConfig, VaScheme};
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
