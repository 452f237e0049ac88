use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Maximum number of guess rows a board accepts before the game is lost.
pub const MAX_GUESSES: usize = 6;

/// Number of letters in every solution and every valid guess.
pub const WORD_LENGTH: usize = 5;

/// One submitted guess: five letters, each with its classification.
pub type GuessRow = Vec<LetterResult>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LetterGuess {
    InLocation, // correct letter in the correct position
    InWord,     // letter occurs elsewhere in the solution
    Incorrect,  // letter not in the solution (or all occurrences spent)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LetterResult {
    pub letter: char,
    pub guess: LetterGuess,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameState {
    InProgress,
    Won,
    Lost,
}

/// A user's board for one puzzle day. Exactly one exists per (user, day);
/// guess rows are append-only and the board never changes again once the
/// state leaves `InProgress`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GameBoard {
    pub user_id: Uuid,
    pub day: i32,
    pub guesses: Vec<GuessRow>,
    pub state: GameState,
}

impl GameBoard {
    pub fn new(user_id: Uuid, day: i32) -> Self {
        Self {
            user_id,
            day,
            guesses: Vec::new(),
            state: GameState::InProgress,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state != GameState::InProgress
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GuessError {
    WrongLength,
    NotAWord,
}

/// Outcome of a guess submission. Rejected guesses never touch the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum GuessResult {
    Board(GameBoard),
    Invalid { error: GuessError },
}
