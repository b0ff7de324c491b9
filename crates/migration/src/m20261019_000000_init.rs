//! Initial schema.
//!
//! - `users`: who records Lekkas and owns pools
//! - `friends`: per-user contact book
//! - `lekkas`: one row per debt, with its pending confirmation token
//! - `lekka_events`: append-only timeline per Lekka
//! - `group_pools`: shared funds with a target and an optimistic `version`
//! - `contributions`: append-only log per pool

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Id,
    DisplayName,
    Phone,
    CreatedAt,
}

#[derive(Iden)]
enum Friends {
    Table,
    Id,
    OwnerId,
    Name,
    Phone,
    CreatedAt,
}

#[derive(Iden)]
enum Lekkas {
    Table,
    Id,
    CreatorId,
    FriendId,
    FriendName,
    FriendPhone,
    Kind,
    AmountMinor,
    Currency,
    Description,
    DueDate,
    Status,
    ConfirmationToken,
    TokenIssuedAt,
    ProofRef,
    CreatedAt,
}

#[derive(Iden)]
enum LekkaEvents {
    Table,
    Id,
    LekkaId,
    Seq,
    Action,
    Description,
    OccurredAt,
}

#[derive(Iden)]
enum GroupPools {
    Table,
    Id,
    OwnerId,
    Name,
    Description,
    TargetMinor,
    Currency,
    Status,
    Version,
    CreatedAt,
    ClosedAt,
}

#[derive(Iden)]
enum Contributions {
    Table,
    Id,
    PoolId,
    ContributorRef,
    AmountMinor,
    Currency,
    RecordedBy,
    Seq,
    CreatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Users::DisplayName).string().not_null())
                    .col(ColumnDef::new(Users::Phone).string())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Friends
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Friends::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Friends::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Friends::OwnerId).string().not_null())
                    .col(ColumnDef::new(Friends::Name).string().not_null())
                    .col(ColumnDef::new(Friends::Phone).string())
                    .col(
                        ColumnDef::new(Friends::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-friends-owner_id")
                            .from(Friends::Table, Friends::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-friends-owner_id-phone-unique")
                    .table(Friends::Table)
                    .col(Friends::OwnerId)
                    .col(Friends::Phone)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Lekkas
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Lekkas::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Lekkas::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Lekkas::CreatorId).string().not_null())
                    .col(ColumnDef::new(Lekkas::FriendId).string())
                    .col(ColumnDef::new(Lekkas::FriendName).string().not_null())
                    .col(ColumnDef::new(Lekkas::FriendPhone).string())
                    .col(ColumnDef::new(Lekkas::Kind).string().not_null())
                    .col(ColumnDef::new(Lekkas::AmountMinor).big_integer().not_null())
                    .col(
                        ColumnDef::new(Lekkas::Currency)
                            .string()
                            .not_null()
                            .default("INR"),
                    )
                    .col(ColumnDef::new(Lekkas::Description).string())
                    .col(ColumnDef::new(Lekkas::DueDate).date())
                    .col(ColumnDef::new(Lekkas::Status).string().not_null())
                    .col(ColumnDef::new(Lekkas::ConfirmationToken).string())
                    .col(ColumnDef::new(Lekkas::TokenIssuedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Lekkas::ProofRef).string())
                    .col(
                        ColumnDef::new(Lekkas::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-lekkas-creator_id")
                            .from(Lekkas::Table, Lekkas::CreatorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-lekkas-friend_id")
                            .from(Lekkas::Table, Lekkas::FriendId)
                            .to(Friends::Table, Friends::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-lekkas-confirmation_token-unique")
                    .table(Lekkas::Table)
                    .col(Lekkas::ConfirmationToken)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-lekkas-creator_id-created_at")
                    .table(Lekkas::Table)
                    .col(Lekkas::CreatorId)
                    .col(Lekkas::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-lekkas-friend_id")
                    .table(Lekkas::Table)
                    .col(Lekkas::FriendId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Lekka timeline
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(LekkaEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LekkaEvents::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LekkaEvents::LekkaId).string().not_null())
                    .col(ColumnDef::new(LekkaEvents::Seq).integer().not_null())
                    .col(ColumnDef::new(LekkaEvents::Action).string().not_null())
                    .col(ColumnDef::new(LekkaEvents::Description).string().not_null())
                    .col(
                        ColumnDef::new(LekkaEvents::OccurredAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-lekka_events-lekka_id")
                            .from(LekkaEvents::Table, LekkaEvents::LekkaId)
                            .to(Lekkas::Table, Lekkas::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-lekka_events-lekka_id-seq-unique")
                    .table(LekkaEvents::Table)
                    .col(LekkaEvents::LekkaId)
                    .col(LekkaEvents::Seq)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Group pools
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(GroupPools::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GroupPools::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GroupPools::OwnerId).string().not_null())
                    .col(ColumnDef::new(GroupPools::Name).string().not_null())
                    .col(ColumnDef::new(GroupPools::Description).string())
                    .col(
                        ColumnDef::new(GroupPools::TargetMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GroupPools::Currency)
                            .string()
                            .not_null()
                            .default("INR"),
                    )
                    .col(ColumnDef::new(GroupPools::Status).string().not_null())
                    .col(
                        ColumnDef::new(GroupPools::Version)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(GroupPools::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GroupPools::ClosedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-group_pools-owner_id")
                            .from(GroupPools::Table, GroupPools::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-group_pools-owner_id")
                    .table(GroupPools::Table)
                    .col(GroupPools::OwnerId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Contributions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Contributions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Contributions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Contributions::PoolId).string().not_null())
                    .col(
                        ColumnDef::new(Contributions::ContributorRef)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Contributions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Contributions::Currency)
                            .string()
                            .not_null()
                            .default("INR"),
                    )
                    .col(ColumnDef::new(Contributions::RecordedBy).string().not_null())
                    .col(ColumnDef::new(Contributions::Seq).integer().not_null())
                    .col(
                        ColumnDef::new(Contributions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-contributions-pool_id")
                            .from(Contributions::Table, Contributions::PoolId)
                            .to(GroupPools::Table, GroupPools::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-contributions-pool_id-seq-unique")
                    .table(Contributions::Table)
                    .col(Contributions::PoolId)
                    .col(Contributions::Seq)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(Contributions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GroupPools::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LekkaEvents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Lekkas::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Friends::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
