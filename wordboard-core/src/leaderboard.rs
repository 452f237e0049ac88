use std::collections::HashMap;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use wordboard_types::{
    GameState, Leaderboard, LeaderboardError, LeaderboardResult, LeaderboardStat,
    LeaderboardStore, RepoError, User, UserStat,
};

use crate::engine::{EngineError, GameEngine};

/// Leaderboard operations plus the day-grouped stats aggregation. Depends
/// on the game engine for the viewer's notion of "today" and its board
/// state, which gates visibility of in-progress days.
pub struct LeaderboardService {
    store: Arc<dyn LeaderboardStore>,
    engine: Arc<GameEngine>,
}

impl LeaderboardService {
    pub fn new(store: Arc<dyn LeaderboardStore>, engine: Arc<GameEngine>) -> Self {
        Self { store, engine }
    }

    pub async fn create_leaderboard(
        &self,
        owner_id: Uuid,
        name: &str,
    ) -> Result<LeaderboardResult, RepoError> {
        let leaderboard = Leaderboard {
            join_id: new_join_id(),
            stored_id: String::new(),
            name: name.to_string(),
            owner_id,
            member_ids: vec![owner_id],
        };
        match self.store.insert(&leaderboard).await {
            Ok(stored) => Ok(LeaderboardResult::Leaderboard(stored)),
            Err(err) => {
                warn!(%owner_id, "leaderboard insert failed: {err}");
                Ok(LeaderboardResult::Error {
                    error: LeaderboardError::CouldNotCreate,
                })
            }
        }
    }

    /// Joining twice is a no-op that returns the unchanged leaderboard.
    pub async fn join_leaderboard(
        &self,
        user_id: Uuid,
        join_id: &str,
    ) -> Result<LeaderboardResult, RepoError> {
        let mut leaderboard = match self.store.find_by_join_id(join_id).await {
            Ok(board) => board,
            Err(RepoError::NotFound) => {
                return Ok(LeaderboardResult::Error {
                    error: LeaderboardError::DoesNotExist,
                });
            }
            Err(err) => return Err(err),
        };

        if leaderboard.has_member(user_id) {
            return Ok(LeaderboardResult::Leaderboard(leaderboard));
        }

        leaderboard.member_ids.push(user_id);
        let stored_id = leaderboard.stored_id.clone();
        self.store.update_by_id(&stored_id, &leaderboard).await?;
        Ok(LeaderboardResult::Leaderboard(leaderboard))
    }

    /// Only the owner or a member may read a leaderboard.
    pub async fn get_leaderboard(
        &self,
        user_id: Uuid,
        join_id: &str,
    ) -> Result<LeaderboardResult, RepoError> {
        let leaderboard = match self.store.find_by_join_id(join_id).await {
            Ok(board) => board,
            Err(RepoError::NotFound) => {
                return Ok(LeaderboardResult::Error {
                    error: LeaderboardError::DoesNotExist,
                });
            }
            Err(err) => return Err(err),
        };

        if leaderboard.has_member(user_id) {
            Ok(LeaderboardResult::Leaderboard(leaderboard))
        } else {
            Ok(LeaderboardResult::Error {
                error: LeaderboardError::NotAuthorized,
            })
        }
    }

    pub async fn leaderboards_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Leaderboard>, RepoError> {
        self.store.find_leaderboards_for_user(user_id).await
    }

    pub async fn members(&self, leaderboard: &Leaderboard) -> Result<Vec<User>, RepoError> {
        self.store.find_members(&leaderboard.member_ids).await
    }

    /// Day-grouped stats for every member. The member-history fetch and
    /// the viewer's today-board resolution are independent and run as a
    /// concurrent pair; the first failure aborts the whole call and the
    /// sibling result is discarded, so no partial leaderboard escapes.
    pub async fn stats_for_leaderboard(
        &self,
        leaderboard: &Leaderboard,
        viewer_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<LeaderboardStat>, EngineError> {
        let histories = async {
            self.store
                .find_stats_for_members(&leaderboard.member_ids)
                .await
                .map_err(EngineError::from)
        };
        let viewer_board = async {
            self.engine
                .today_board_or_create(viewer_id, now)
                .await
                .map_err(EngineError::from)
        };
        let (histories, viewer_board) = tokio::try_join!(histories, viewer_board)?;

        // Hide today's aggregate from the viewer while their own puzzle is
        // unfinished; completed historical days stay visible.
        let hide_day = (viewer_board.state == GameState::InProgress).then_some(viewer_board.day);

        let mut by_day: HashMap<i32, Vec<UserStat>> = HashMap::new();
        for (_, stats) in histories {
            for mut stat in stats {
                if hide_day == Some(stat.day) {
                    stat.visible = false;
                }
                by_day.entry(stat.day).or_default().push(stat);
            }
        }

        let mut grouped: Vec<LeaderboardStat> = by_day
            .into_iter()
            .map(|(day, stats)| LeaderboardStat { day, stats })
            .collect();
        grouped.sort_by(|a, b| b.day.cmp(&a.day));
        Ok(grouped)
    }
}

/// Short, URL-safe join code: base64 over fresh UUID bytes (22 chars).
fn new_join_id() -> String {
    URL_SAFE_NO_PAD.encode(Uuid::new_v4().as_bytes())
}
