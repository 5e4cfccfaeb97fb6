//! Initial schema.
//!
//! - `accounts`: loyalty profiles (points balance and lifetime spend)
//! - `orders`: one row per checkout, guest orders have no account
//! - `order_ingredients`: the priced line items of each order

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
    FirstName,
    LastName,
    LoyaltyPoints,
    MoneySpentMinor,
    CreatedAt,
}

#[derive(Iden)]
enum Orders {
    Table,
    Id,
    AccountId,
    Size,
    Delivery,
    TotalMinor,
    OriginalMinor,
    PointsEarned,
    CreatedAt,
}

#[derive(Iden)]
enum OrderIngredients {
    Table,
    Id,
    OrderId,
    Position,
    Name,
    Kind,
    PriceMinor,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Accounts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Accounts::FirstName).string().not_null())
                    .col(ColumnDef::new(Accounts::LastName).string().not_null())
                    .col(
                        ColumnDef::new(Accounts::LoyaltyPoints)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Accounts::MoneySpentMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Accounts::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Orders
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Orders::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Orders::AccountId).string())
                    .col(ColumnDef::new(Orders::Size).string().not_null())
                    .col(ColumnDef::new(Orders::Delivery).string().not_null())
                    .col(ColumnDef::new(Orders::TotalMinor).big_integer().not_null())
                    .col(
                        ColumnDef::new(Orders::OriginalMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Orders::PointsEarned)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Orders::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-orders-account_id")
                            .from(Orders::Table, Orders::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-orders-account_id-created_at")
                    .table(Orders::Table)
                    .col(Orders::AccountId)
                    .col(Orders::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Order ingredients
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(OrderIngredients::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrderIngredients::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OrderIngredients::OrderId).string().not_null())
                    .col(
                        ColumnDef::new(OrderIngredients::Position)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(OrderIngredients::Name).string().not_null())
                    .col(ColumnDef::new(OrderIngredients::Kind).string().not_null())
                    .col(
                        ColumnDef::new(OrderIngredients::PriceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-order_ingredients-order_id")
                            .from(OrderIngredients::Table, OrderIngredients::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-order_ingredients-order_id-position")
                    .table(OrderIngredients::Table)
                    .col(OrderIngredients::OrderId)
                    .col(OrderIngredients::Position)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OrderIngredients::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        Ok(())
    }
}
