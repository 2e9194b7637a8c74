//! Initial schema: ledger entries and payment methods.
//!
//! Built with the schema builder so the same migration runs on Postgres and
//! on the SQLite databases used by tests.

use sea_orm::DatabaseBackend;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();

        manager
            .create_table(
                Table::create()
                    .table(PaymentMethods::Table)
                    .if_not_exists()
                    .col(id_column(backend, PaymentMethods::Id))
                    .col(ColumnDef::new(PaymentMethods::UserId).big_integer().not_null())
                    .col(ColumnDef::new(PaymentMethods::HolderName).string_len(255).not_null())
                    .col(ColumnDef::new(PaymentMethods::Va).string_len(64).not_null())
                    .col(ColumnDef::new(PaymentMethods::Nominal).big_integer().not_null())
                    .col(ColumnDef::new(PaymentMethods::Status).string_len(16).not_null())
                    .col(
                        ColumnDef::new(PaymentMethods::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PaymentMethods::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .check(Expr::col(PaymentMethods::Nominal).gt(0))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_payment_methods_va")
                    .table(PaymentMethods::Table)
                    .col(PaymentMethods::Va)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_payment_methods_user")
                    .table(PaymentMethods::Table)
                    .col(PaymentMethods::UserId)
                    .col(PaymentMethods::Id)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LedgerEntries::Table)
                    .if_not_exists()
                    .col(id_column(backend, LedgerEntries::Id))
                    .col(ColumnDef::new(LedgerEntries::UserId).big_integer().not_null())
                    .col(ColumnDef::new(LedgerEntries::Version).big_integer().not_null())
                    .col(ColumnDef::new(LedgerEntries::Amount).big_integer().not_null())
                    .col(ColumnDef::new(LedgerEntries::Status).string_len(16).not_null())
                    .col(ColumnDef::new(LedgerEntries::PaymentMethodId).big_integer().null())
                    .col(
                        ColumnDef::new(LedgerEntries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .check(Expr::col(LedgerEntries::Amount).gte(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ledger_entries_payment_method")
                            .from(LedgerEntries::Table, LedgerEntries::PaymentMethodId)
                            .to(PaymentMethods::Table, PaymentMethods::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // One entry per (user, version): the loser of an append race fails here.
        manager
            .create_index(
                Index::create()
                    .name("idx_ledger_entries_user_version")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::UserId)
                    .col(LedgerEntries::Version)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // A payment method credits at most one entry.
        manager
            .create_index(
                Index::create()
                    .name("idx_ledger_entries_payment_method")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::PaymentMethodId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ledger_entries_user_id")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::UserId)
                    .col(LedgerEntries::Id)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LedgerEntries::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PaymentMethods::Table).if_exists().to_owned())
            .await
    }
}

/// Auto-increment primary key.
///
/// SQLite only auto-assigns `INTEGER PRIMARY KEY`, so BIGINT is used elsewhere.
fn id_column<T: IntoIden>(backend: DatabaseBackend, name: T) -> ColumnDef {
    let mut column = ColumnDef::new(name);
    match backend {
        DatabaseBackend::Sqlite => column.integer(),
        _ => column.big_integer(),
    };
    column.not_null().auto_increment().primary_key();
    column
}

#[derive(DeriveIden)]
enum LedgerEntries {
    Table,
    Id,
    UserId,
    Version,
    Amount,
    Status,
    PaymentMethodId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PaymentMethods {
    Table,
    Id,
    UserId,
    HolderName,
    Va,
    Nominal,
    Status,
    CreatedAt,
    UpdatedAt,
}
