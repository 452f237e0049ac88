use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Leaderboards::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Leaderboards::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Leaderboards::JoinId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Leaderboards::Name).string().not_null())
                    .col(ColumnDef::new(Leaderboards::OwnerId).string().not_null())
                    .col(ColumnDef::new(Leaderboards::MemberIds).json().not_null())
                    .col(
                        ColumnDef::new(Leaderboards::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Boards are shared and joined by their short code
        manager
            .create_index(
                Index::create()
                    .name("idx_leaderboards_join_id")
                    .table(Leaderboards::Table)
                    .col(Leaderboards::JoinId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Leaderboards::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Leaderboards {
    Table,
    Id,
    JoinId,
    Name,
    OwnerId,
    MemberIds,
    CreatedAt,
}
