//! Shared setup for database tests.

#![allow(dead_code)]

use std::sync::Arc;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tempfile::TempDir;
use topup_core::topup::{TimestampVaGenerator, VaGenerator};
use topup_db::migration::Migrator;

/// Opens a fresh in-memory database with the schema applied.
///
/// A single pooled connection keeps the in-memory database alive and
/// serializes transactions.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

/// A file-backed database shared by several pooled connections.
///
/// Transactions on different connections really overlap, unlike the
/// single-connection in-memory pool. The directory is removed on drop.
pub struct SharedDb {
    pub db: DatabaseConnection,
    _dir: TempDir,
}

/// Opens a fresh file-backed database with `connections` pooled connections.
pub async fn setup_shared_db(connections: u32) -> SharedDb {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let url = format!("sqlite:{}?mode=rwc", dir.path().join("topup.db").display());

    let mut options = ConnectOptions::new(url);
    options
        .max_connections(connections)
        .min_connections(connections)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("Failed to open database file");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    SharedDb { db, _dir: dir }
}

/// Generator that always yields the same VA.
pub struct FixedVaGenerator(pub &'static str);

impl VaGenerator for FixedVaGenerator {
    fn generate(&self, _now: chrono::DateTime<chrono::Utc>) -> String {
        self.0.to_string()
    }
}

/// Generator that counts upwards from 1000.
#[derive(Default)]
pub struct SequentialVaGenerator(std::sync::atomic::AtomicU64);

impl VaGenerator for SequentialVaGenerator {
    fn generate(&self, _now: chrono::DateTime<chrono::Utc>) -> String {
        let n = self
            .0
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        (1000 + n).to_string()
    }
}

pub fn sequential() -> Arc<dyn VaGenerator> {
    Arc::new(SequentialVaGenerator::default())
}

pub fn timestamp() -> Arc<dyn VaGenerator> {
    Arc::new(TimestampVaGenerator)
}
