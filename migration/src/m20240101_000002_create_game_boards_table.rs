use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GameBoards::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GameBoards::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GameBoards::UserId).string().not_null())
                    .col(ColumnDef::new(GameBoards::Day).integer().not_null())
                    .col(ColumnDef::new(GameBoards::Guesses).json().not_null())
                    .col(
                        ColumnDef::new(GameBoards::GuessCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(GameBoards::State).string().not_null())
                    .col(
                        ColumnDef::new(GameBoards::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // One board per user per day; insert races surface here
        manager
            .create_index(
                Index::create()
                    .name("idx_game_boards_user_day")
                    .table(GameBoards::Table)
                    .col(GameBoards::UserId)
                    .col(GameBoards::Day)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GameBoards::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum GameBoards {
    Table,
    Id,
    UserId,
    Day,
    Guesses,
    GuessCount,
    State,
    UpdatedAt,
}
