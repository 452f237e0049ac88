use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveValue::{NotSet, Set},
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, SqlErr,
};
use uuid::Uuid;

use crate::entities::{game_boards, prelude::*};
use crate::repositories::{parse_uuid, repo_err, state_from_str, state_to_str};
use wordboard_types::{GameBoard, GameBoardStore, GameState, GuessRow, RepoError};

pub struct GameBoardRepository {
    db: DatabaseConnection,
}

impl GameBoardRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_board(model: game_boards::Model) -> Result<GameBoard, RepoError> {
        let guesses: Vec<GuessRow> = serde_json::from_value(model.guesses)
            .map_err(|err| RepoError::Failure(format!("malformed guess rows: {err}")))?;

        Ok(GameBoard {
            user_id: parse_uuid(&model.user_id)?,
            day: model.day,
            guesses,
            state: state_from_str(&model.state)?,
        })
    }

    fn guesses_to_json(board: &GameBoard) -> Result<serde_json::Value, RepoError> {
        serde_json::to_value(&board.guesses)
            .map_err(|err| RepoError::Failure(format!("unencodable guess rows: {err}")))
    }
}

#[async_trait]
impl GameBoardStore for GameBoardRepository {
    async fn find_by_user_and_day(
        &self,
        user_id: Uuid,
        day: i32,
    ) -> Result<GameBoard, RepoError> {
        let model = GameBoards::find()
            .filter(game_boards::Column::UserId.eq(user_id.to_string()))
            .filter(game_boards::Column::Day.eq(day))
            .one(&self.db)
            .await
            .map_err(repo_err)?;

        match model {
            Some(model) => Self::model_to_board(model),
            None => Err(RepoError::NotFound),
        }
    }

    async fn insert(&self, board: &GameBoard) -> Result<(), RepoError> {
        let model = game_boards::ActiveModel {
            id: NotSet,
            user_id: Set(board.user_id.to_string()),
            day: Set(board.day),
            guesses: Set(Self::guesses_to_json(board)?),
            guess_count: Set(board.guesses.len() as i32),
            state: Set(state_to_str(board.state).to_string()),
            updated_at: Set(chrono::Utc::now().into()),
        };

        match GameBoards::insert(model).exec(&self.db).await {
            Ok(_) => Ok(()),
            // the (user_id, day) unique index turns a creation race into a
            // conflict the engine resolves by re-fetching
            Err(err) => match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Err(RepoError::Conflict),
                _ => Err(repo_err(err)),
            },
        }
    }

    async fn update_by_user_and_day(
        &self,
        user_id: Uuid,
        day: i32,
        board: &GameBoard,
    ) -> Result<(), RepoError> {
        // the caller appended exactly one row onto the state it observed,
        // so the stored board must still be in progress with one fewer row
        let prior_count = board.guesses.len() as i32 - 1;

        let result = GameBoards::update_many()
            .col_expr(
                game_boards::Column::Guesses,
                Expr::value(Self::guesses_to_json(board)?),
            )
            .col_expr(
                game_boards::Column::GuessCount,
                Expr::value(board.guesses.len() as i32),
            )
            .col_expr(
                game_boards::Column::State,
                Expr::value(state_to_str(board.state)),
            )
            .col_expr(
                game_boards::Column::UpdatedAt,
                Expr::value(sea_orm::prelude::DateTimeWithTimeZone::from(
                    chrono::Utc::now(),
                )),
            )
            .filter(game_boards::Column::UserId.eq(user_id.to_string()))
            .filter(game_boards::Column::Day.eq(day))
            .filter(game_boards::Column::State.eq(state_to_str(GameState::InProgress)))
            .filter(game_boards::Column::GuessCount.eq(prior_count))
            .exec(&self.db)
            .await
            .map_err(repo_err)?;

        if result.rows_affected == 0 {
            // zero matches is either a lost write race or a vanished board
            let exists = GameBoards::find()
                .filter(game_boards::Column::UserId.eq(user_id.to_string()))
                .filter(game_boards::Column::Day.eq(day))
                .one(&self.db)
                .await
                .map_err(repo_err)?;
            return Err(if exists.is_some() {
                RepoError::Conflict
            } else {
                RepoError::NotFound
            });
        }

        Ok(())
    }

    async fn find_boards_for_user(&self, user_id: Uuid) -> Result<Vec<GameBoard>, RepoError> {
        let models = GameBoards::find()
            .filter(game_boards::Column::UserId.eq(user_id.to_string()))
            .order_by_asc(game_boards::Column::Day)
            .all(&self.db)
            .await
            .map_err(repo_err)?;

        models.into_iter().map(Self::model_to_board).collect()
    }
}
