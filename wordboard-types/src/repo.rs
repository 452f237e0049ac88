use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::board::GameBoard;
use crate::errors::RepoError;
use crate::leaderboard::{Leaderboard, UserStat};
use crate::user::User;

/// Store contract for per-(user, day) game boards. Implementations must
/// enforce uniqueness on (user_id, day); `insert` reports a violation as
/// `RepoError::Conflict` so callers can resolve creation races by
/// re-fetching.
#[async_trait]
pub trait GameBoardStore: Send + Sync {
    async fn find_by_user_and_day(&self, user_id: Uuid, day: i32)
    -> Result<GameBoard, RepoError>;

    async fn insert(&self, board: &GameBoard) -> Result<(), RepoError>;

    /// Conditional update: succeeds only if the stored board still matches
    /// the prior state the caller observed (one fewer guess row, still in
    /// progress). A concurrent writer losing the race gets
    /// `RepoError::Conflict`; a vanished board gets `RepoError::NotFound`.
    async fn update_by_user_and_day(
        &self,
        user_id: Uuid,
        day: i32,
        board: &GameBoard,
    ) -> Result<(), RepoError>;

    async fn find_boards_for_user(&self, user_id: Uuid) -> Result<Vec<GameBoard>, RepoError>;
}

/// Store contract for leaderboards and the member-history reads the
/// aggregator depends on.
#[async_trait]
pub trait LeaderboardStore: Send + Sync {
    async fn find_by_join_id(&self, join_id: &str) -> Result<Leaderboard, RepoError>;

    /// Returns the stored leaderboard with its persistence identity filled
    /// in. A join-id collision surfaces as `RepoError::Conflict`.
    async fn insert(&self, leaderboard: &Leaderboard) -> Result<Leaderboard, RepoError>;

    async fn update_by_id(
        &self,
        stored_id: &str,
        leaderboard: &Leaderboard,
    ) -> Result<(), RepoError>;

    async fn find_members(&self, member_ids: &[Uuid]) -> Result<Vec<User>, RepoError>;

    /// Batched history fetch: every member's per-day stats in one call.
    async fn find_stats_for_members(
        &self,
        member_ids: &[Uuid],
    ) -> Result<HashMap<User, Vec<UserStat>>, RepoError>;

    async fn find_leaderboards_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Leaderboard>, RepoError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<User, RepoError>;

    async fn find_by_oauth_id(&self, oauth_id: &str) -> Result<User, RepoError>;

    async fn create(&self, user: &User) -> Result<User, RepoError>;
}
