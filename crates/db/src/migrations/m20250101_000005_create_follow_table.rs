//! Create follow table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Follow::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Follow::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Follow::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Follow::FollowingId).big_integer().not_null())
                    // A user cannot follow themselves
                    .check(Expr::col(Follow::UserId).ne(Expr::col(Follow::FollowingId)))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_follow_user")
                            .from(Follow::Table, Follow::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_follow_following")
                            .from(Follow::Table, Follow::FollowingId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (user_id, following_id) - prevent duplicate follows
        manager
            .create_index(
                Index::create()
                    .name("idx_follow_user_following")
                    .table(Follow::Table)
                    .col(Follow::UserId)
                    .col(Follow::FollowingId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: following_id (for listing followers)
        manager
            .create_index(
                Index::create()
                    .name("idx_follow_following_id")
                    .table(Follow::Table)
                    .col(Follow::FollowingId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Follow::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Follow {
    Table,
    Id,
    UserId,
    FollowingId,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
