use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::board::{GameState, GuessRow};
use crate::user::User;

/// A social leaderboard. `join_id` is the short URL-safe code shared with
/// friends; `stored_id` is the persistence-layer identity used for updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Leaderboard {
    pub join_id: String,
    pub stored_id: String,
    pub name: String,
    pub owner_id: Uuid,
    pub member_ids: Vec<Uuid>,
}

impl Leaderboard {
    /// The owner is always implicitly a member.
    pub fn has_member(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id || self.member_ids.contains(&user_id)
    }
}

/// One member's board for one day, as exposed to the rest of the
/// leaderboard. `visible` is cleared by the aggregator for days the viewer
/// has not finished yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserStat {
    pub day: i32,
    pub guesses: Vec<GuessRow>,
    pub state: GameState,
    pub user: User,
    pub visible: bool,
}

/// Day-grouped aggregate across members. Recomputed on every read, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LeaderboardStat {
    pub day: i32,
    pub stats: Vec<UserStat>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum LeaderboardError {
    DoesNotExist,
    CouldNotCreate,
    NotAuthorized,
}

/// Outcome of leaderboard operations whose failures are user-facing states
/// rather than errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum LeaderboardResult {
    Leaderboard(Leaderboard),
    Error { error: LeaderboardError },
}
