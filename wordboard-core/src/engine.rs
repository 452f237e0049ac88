use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use wordboard_types::{
    GameBoard, GameBoardStore, GameState, GuessResult, MAX_GUESSES, RepoError,
};

use crate::calendar::PuzzleCalendar;
use crate::dictionary::Dictionary;
use crate::evaluation::{GuessEvaluator, GuessVerdict};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no puzzle is scheduled for day {0}")]
    NoPuzzleForDay(i32),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Orchestrates the per-(user, day) board state machine against the board
/// store. The dictionary is the immutable process-wide resource handed in
/// at construction; the engine itself holds no mutable state.
pub struct GameEngine {
    dictionary: Arc<Dictionary>,
    boards: Arc<dyn GameBoardStore>,
}

impl GameEngine {
    pub fn new(dictionary: Arc<Dictionary>, boards: Arc<dyn GameBoardStore>) -> Self {
        Self { dictionary, boards }
    }

    /// Fetch the caller's board for the current puzzle day, creating a
    /// fresh one on first access. Only "today" creates lazily; an insert
    /// conflict means another task won the creation race, so the stored
    /// board is re-fetched rather than surfacing an error.
    pub async fn today_board_or_create(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<GameBoard, RepoError> {
        let day = PuzzleCalendar::day_index(now);
        match self.boards.find_by_user_and_day(user_id, day).await {
            Ok(board) => Ok(board),
            Err(RepoError::NotFound) => {
                let board = GameBoard::new(user_id, day);
                match self.boards.insert(&board).await {
                    Ok(()) => Ok(board),
                    Err(RepoError::Conflict) => {
                        self.boards.find_by_user_and_day(user_id, day).await
                    }
                    Err(err) => {
                        error!(%user_id, day, "failed to insert new game board: {err}");
                        Err(err)
                    }
                }
            }
            Err(err) => {
                error!(%user_id, day, "game board lookup failed: {err}");
                Err(err)
            }
        }
    }

    /// Plain fetch; absence is a distinct error kind, never an implicit
    /// creation.
    pub async fn board_by_day(&self, user_id: Uuid, day: i32) -> Result<GameBoard, RepoError> {
        self.boards.find_by_user_and_day(user_id, day).await
    }

    pub async fn boards_for_user(&self, user_id: Uuid) -> Result<Vec<GameBoard>, RepoError> {
        self.boards.find_boards_for_user(user_id).await
    }

    /// Apply one guess to today's board. A finished board is returned
    /// unchanged; a rejected guess returns a typed result without touching
    /// the store; an accepted guess appends its row, advances the state
    /// machine, and persists through the conditional update.
    pub async fn guess(
        &self,
        user_id: Uuid,
        guess: &str,
        now: DateTime<Utc>,
    ) -> Result<GuessResult, EngineError> {
        let mut board = self.today_board_or_create(user_id, now).await?;

        if board.is_finished() {
            return Ok(GuessResult::Board(board));
        }

        let solution = self
            .dictionary
            .solution_for_day(board.day)
            .ok_or(EngineError::NoPuzzleForDay(board.day))?;

        match GuessEvaluator::evaluate(guess, solution, &self.dictionary) {
            GuessVerdict::Rejected(error) => Ok(GuessResult::Invalid { error }),
            GuessVerdict::Accepted { row, exact_match } => {
                board.guesses.push(row);
                if exact_match {
                    board.state = GameState::Won;
                } else if board.guesses.len() == MAX_GUESSES {
                    board.state = GameState::Lost;
                }
                self.boards
                    .update_by_user_and_day(user_id, board.day, &board)
                    .await?;
                Ok(GuessResult::Board(board))
            }
        }
    }
}
