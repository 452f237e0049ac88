use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use wordboard_core::{Dictionary, GameEngine, LeaderboardService};
use wordboard_types::{
    GameBoard, GameBoardStore, GameState, Leaderboard, LeaderboardStore, RepoError, User,
    UserStat,
};

/// Puzzle-day 0 starts at Unix 1624086000; tests address days relative to
/// that instant instead of the wall clock.
pub fn day_instant(day: i32) -> DateTime<Utc> {
    Utc.timestamp_opt(1_624_086_000 + i64::from(day) * 86_400, 0)
        .unwrap()
}

/// Fixture dictionary: solutions are scheduled crate, alloy, stone, bread
/// for days 0..=3.
pub fn test_dictionary() -> Arc<Dictionary> {
    let guesses = "crate\ntrace\nreact\ncater\nalloy\nlolly\nstone\nbread\ncream\nmouse\nhouse\ntrain\nplane\nwater";
    let solutions = "crate\nalloy\nstone\nbread";
    Arc::new(Dictionary::from_word_lists(guesses, solutions).unwrap())
}

/// In-memory board store. Counts writes so tests can assert that rejected
/// guesses never reach the store, and simulates creation races and update
/// conflicts.
#[derive(Default)]
pub struct MemoryBoardStore {
    boards: Mutex<HashMap<(Uuid, i32), GameBoard>>,
    pub inserts: AtomicUsize,
    pub updates: AtomicUsize,
    race_winner: Mutex<Option<GameBoard>>,
    fail_updates_with_conflict: AtomicUsize,
}

impl MemoryBoardStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn put(&self, board: GameBoard) {
        self.boards
            .lock()
            .unwrap()
            .insert((board.user_id, board.day), board);
    }

    pub fn get(&self, user_id: Uuid, day: i32) -> Option<GameBoard> {
        self.boards.lock().unwrap().get(&(user_id, day)).cloned()
    }

    /// The next insert loses: the given board is stored as if a concurrent
    /// task created it first, and the insert reports a conflict.
    pub fn lose_next_insert_race_to(&self, winner: GameBoard) {
        *self.race_winner.lock().unwrap() = Some(winner);
    }

    pub fn fail_next_update_with_conflict(&self) {
        self.fail_updates_with_conflict.store(1, Ordering::SeqCst);
    }

    pub fn insert_count(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GameBoardStore for MemoryBoardStore {
    async fn find_by_user_and_day(
        &self,
        user_id: Uuid,
        day: i32,
    ) -> Result<GameBoard, RepoError> {
        self.boards
            .lock()
            .unwrap()
            .get(&(user_id, day))
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    async fn insert(&self, board: &GameBoard) -> Result<(), RepoError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);

        if let Some(winner) = self.race_winner.lock().unwrap().take() {
            self.boards
                .lock()
                .unwrap()
                .insert((winner.user_id, winner.day), winner);
            return Err(RepoError::Conflict);
        }

        let mut boards = self.boards.lock().unwrap();
        if boards.contains_key(&(board.user_id, board.day)) {
            return Err(RepoError::Conflict);
        }
        boards.insert((board.user_id, board.day), board.clone());
        Ok(())
    }

    async fn update_by_user_and_day(
        &self,
        user_id: Uuid,
        day: i32,
        board: &GameBoard,
    ) -> Result<(), RepoError> {
        self.updates.fetch_add(1, Ordering::SeqCst);

        if self.fail_updates_with_conflict.swap(0, Ordering::SeqCst) != 0 {
            return Err(RepoError::Conflict);
        }

        let mut boards = self.boards.lock().unwrap();
        let existing = boards.get(&(user_id, day)).ok_or(RepoError::NotFound)?;

        // the same conditional check the SQL adapter enforces: one new row
        // appended onto the still-in-progress state the caller observed
        if existing.state != GameState::InProgress
            || existing.guesses.len() + 1 != board.guesses.len()
        {
            return Err(RepoError::Conflict);
        }

        boards.insert((user_id, day), board.clone());
        Ok(())
    }

    async fn find_boards_for_user(&self, user_id: Uuid) -> Result<Vec<GameBoard>, RepoError> {
        let mut boards: Vec<GameBoard> = self
            .boards
            .lock()
            .unwrap()
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        boards.sort_by_key(|b| b.day);
        Ok(boards)
    }
}

/// In-memory leaderboard store with canned member histories.
#[derive(Default)]
pub struct MemoryLeaderboardStore {
    leaderboards: Mutex<HashMap<String, Leaderboard>>,
    users: Mutex<Vec<User>>,
    stats: Mutex<HashMap<User, Vec<UserStat>>>,
    next_id: AtomicUsize,
    fail_insert: AtomicUsize,
    fail_stats: AtomicUsize,
}

impl MemoryLeaderboardStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_user(&self, user: User) {
        self.users.lock().unwrap().push(user);
    }

    pub fn add_stats(&self, user: User, stats: Vec<UserStat>) {
        self.add_user(user.clone());
        self.stats.lock().unwrap().insert(user, stats);
    }

    pub fn fail_next_insert(&self) {
        self.fail_insert.store(1, Ordering::SeqCst);
    }

    pub fn fail_next_stats_fetch(&self) {
        self.fail_stats.store(1, Ordering::SeqCst);
    }

    pub fn stored(&self, stored_id: &str) -> Option<Leaderboard> {
        self.leaderboards.lock().unwrap().get(stored_id).cloned()
    }
}

#[async_trait]
impl LeaderboardStore for MemoryLeaderboardStore {
    async fn find_by_join_id(&self, join_id: &str) -> Result<Leaderboard, RepoError> {
        self.leaderboards
            .lock()
            .unwrap()
            .values()
            .find(|lb| lb.join_id == join_id)
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    async fn insert(&self, leaderboard: &Leaderboard) -> Result<Leaderboard, RepoError> {
        if self.fail_insert.swap(0, Ordering::SeqCst) != 0 {
            return Err(RepoError::Failure("insert failed".to_string()));
        }
        let stored_id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
        let mut stored = leaderboard.clone();
        stored.stored_id = stored_id.clone();
        self.leaderboards
            .lock()
            .unwrap()
            .insert(stored_id, stored.clone());
        Ok(stored)
    }

    async fn update_by_id(
        &self,
        stored_id: &str,
        leaderboard: &Leaderboard,
    ) -> Result<(), RepoError> {
        let mut leaderboards = self.leaderboards.lock().unwrap();
        if !leaderboards.contains_key(stored_id) {
            return Err(RepoError::NotFound);
        }
        leaderboards.insert(stored_id.to_string(), leaderboard.clone());
        Ok(())
    }

    async fn find_members(&self, member_ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| member_ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn find_stats_for_members(
        &self,
        member_ids: &[Uuid],
    ) -> Result<HashMap<User, Vec<UserStat>>, RepoError> {
        if self.fail_stats.swap(0, Ordering::SeqCst) != 0 {
            return Err(RepoError::Failure("stats fetch failed".to_string()));
        }
        Ok(self
            .stats
            .lock()
            .unwrap()
            .iter()
            .filter(|(user, _)| member_ids.contains(&user.id))
            .map(|(user, stats)| (user.clone(), stats.clone()))
            .collect())
    }

    async fn find_leaderboards_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Leaderboard>, RepoError> {
        Ok(self
            .leaderboards
            .lock()
            .unwrap()
            .values()
            .filter(|lb| lb.has_member(user_id))
            .cloned()
            .collect())
    }
}

pub fn test_user(name: &str) -> User {
    User {
        id: Uuid::new_v4(),
        display_name: name.to_string(),
        oauth_id: format!("oauth-{}", name.to_lowercase()),
    }
}

pub fn test_engine(boards: Arc<MemoryBoardStore>) -> Arc<GameEngine> {
    Arc::new(GameEngine::new(test_dictionary(), boards))
}

pub fn test_leaderboard_service(
    store: Arc<MemoryLeaderboardStore>,
    boards: Arc<MemoryBoardStore>,
) -> LeaderboardService {
    LeaderboardService::new(store, test_engine(boards))
}

pub fn stat_for(user: &User, board: &GameBoard) -> UserStat {
    UserStat {
        day: board.day,
        guesses: board.guesses.clone(),
        state: board.state,
        user: user.clone(),
        visible: true,
    }
}
