pub mod game_board_repository;
pub mod leaderboard_repository;
pub mod user_repository;

pub use game_board_repository::GameBoardRepository;
pub use leaderboard_repository::LeaderboardRepository;
pub use user_repository::UserRepository;

use sea_orm::DbErr;
use uuid::Uuid;

use crate::entities::users;
use wordboard_types::{GameState, RepoError, User};

pub(crate) fn repo_err(err: DbErr) -> RepoError {
    tracing::error!("database operation failed: {err}");
    RepoError::Failure(err.to_string())
}

pub(crate) fn parse_uuid(raw: &str) -> Result<Uuid, RepoError> {
    Uuid::parse_str(raw)
        .map_err(|err| RepoError::Failure(format!("malformed stored id {raw}: {err}")))
}

pub(crate) fn state_to_str(state: GameState) -> &'static str {
    match state {
        GameState::InProgress => "IN_PROGRESS",
        GameState::Won => "WON",
        GameState::Lost => "LOST",
    }
}

pub(crate) fn state_from_str(raw: &str) -> Result<GameState, RepoError> {
    match raw {
        "IN_PROGRESS" => Ok(GameState::InProgress),
        "WON" => Ok(GameState::Won),
        "LOST" => Ok(GameState::Lost),
        other => Err(RepoError::Failure(format!("unknown game state {other}"))),
    }
}

pub(crate) fn model_to_user(model: users::Model) -> Result<User, RepoError> {
    Ok(User {
        id: parse_uuid(&model.id)?,
        display_name: model.display_name,
        oauth_id: model.oauth_id,
    })
}
