//! Initial schema for the savings-plan engine.
//!
//! - `clients`: plan holders, unique by CPF and by e-mail
//! - `products`: sellable plans with their limits and last withdrawal date
//! - `plans`: a client enrolled in a product, with the accumulated balance
//! - `top_ups`: extra contributions applied to a plan
//! - `withdrawals`: withdrawal requests accepted for a plan
//!
//! Money columns hold minor units (cents). Every foreign key restricts
//! deletes: a referenced row can never be removed.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Clients {
    Table,
    Id,
    Cpf,
    Name,
    Email,
    BirthDate,
    Sex,
    MonthlyIncome,
}

#[derive(Iden)]
enum Products {
    Table,
    Id,
    Name,
    Susep,
    SaleExpiration,
    MinInitialContribution,
    MinExtraContribution,
    MinEntryAge,
    MaxExitAge,
    InitialWithdrawalCooldownDays,
    BetweenWithdrawalsCooldownDays,
    LastWithdrawalOn,
    Version,
}

#[derive(Iden)]
enum Plans {
    Table,
    Id,
    ClientId,
    ProductId,
    Balance,
    ContractedOn,
    Version,
}

#[derive(Iden)]
enum TopUps {
    Table,
    Id,
    ClientId,
    PlanId,
    Amount,
}

#[derive(Iden)]
enum Withdrawals {
    Table,
    Id,
    PlanId,
    Amount,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Clients
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Clients::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Clients::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Clients::Cpf).string_len(11).not_null())
                    .col(ColumnDef::new(Clients::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Clients::Email).string().not_null())
                    .col(ColumnDef::new(Clients::BirthDate).date().not_null())
                    .col(ColumnDef::new(Clients::Sex).string_len(1).not_null())
                    .col(
                        ColumnDef::new(Clients::MonthlyIncome)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-clients-cpf-unique")
                    .table(Clients::Table)
                    .col(Clients::Cpf)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-clients-email-unique")
                    .table(Clients::Table)
                    .col(Clients::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Products
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Products::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Products::Name).string_len(150).not_null())
                    .col(ColumnDef::new(Products::Susep).string_len(20).not_null())
                    .col(ColumnDef::new(Products::SaleExpiration).date().not_null())
                    .col(
                        ColumnDef::new(Products::MinInitialContribution)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Products::MinExtraContribution)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Products::MinEntryAge).integer().not_null())
                    .col(ColumnDef::new(Products::MaxExitAge).integer().not_null())
                    .col(
                        ColumnDef::new(Products::InitialWithdrawalCooldownDays)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Products::BetweenWithdrawalsCooldownDays)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Products::LastWithdrawalOn).date())
                    .col(
                        ColumnDef::new(Products::Version)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Plans
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Plans::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Plans::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Plans::ClientId).string().not_null())
                    .col(ColumnDef::new(Plans::ProductId).string().not_null())
                    .col(ColumnDef::new(Plans::Balance).big_integer().not_null())
                    .col(ColumnDef::new(Plans::ContractedOn).date().not_null())
                    .col(
                        ColumnDef::new(Plans::Version)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-plans-client_id")
                            .from(Plans::Table, Plans::ClientId)
                            .to(Clients::Table, Clients::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-plans-product_id")
                            .from(Plans::Table, Plans::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-plans-product_id")
                    .table(Plans::Table)
                    .col(Plans::ProductId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Top-ups
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(TopUps::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TopUps::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(TopUps::ClientId).string().not_null())
                    .col(ColumnDef::new(TopUps::PlanId).string().not_null())
                    .col(ColumnDef::new(TopUps::Amount).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-top_ups-client_id")
                            .from(TopUps::Table, TopUps::ClientId)
                            .to(Clients::Table, Clients::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-top_ups-plan_id")
                            .from(TopUps::Table, TopUps::PlanId)
                            .to(Plans::Table, Plans::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Withdrawals
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Withdrawals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Withdrawals::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Withdrawals::PlanId).string().not_null())
                    .col(ColumnDef::new(Withdrawals::Amount).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-withdrawals-plan_id")
                            .from(Withdrawals::Table, Withdrawals::PlanId)
                            .to(Plans::Table, Plans::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(Withdrawals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TopUps::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Plans::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Clients::Table).to_owned())
            .await?;
        Ok(())
    }
}
