use wordboard_types::{GuessError, GuessRow, LetterGuess, LetterResult, WORD_LENGTH};

use crate::dictionary::Dictionary;

/// Verdict for one submitted guess. Rejections are user-facing states, not
/// errors; `exact_match` is true only when every letter is in location.
#[derive(Debug, Clone, PartialEq)]
pub enum GuessVerdict {
    Rejected(GuessError),
    Accepted { row: GuessRow, exact_match: bool },
}

pub struct GuessEvaluator;

impl GuessEvaluator {
    /// Validate and classify a guess against the day's solution. The length
    /// check runs before the dictionary lookup; the two rejections are
    /// distinct user-facing kinds and must stay distinct.
    pub fn evaluate(guess: &str, solution: &str, dictionary: &Dictionary) -> GuessVerdict {
        let guess = guess.trim().to_lowercase();

        if guess.chars().count() != WORD_LENGTH {
            return GuessVerdict::Rejected(GuessError::WrongLength);
        }
        if !dictionary.is_valid_guess(&guess) {
            return GuessVerdict::Rejected(GuessError::NotAWord);
        }

        let row = classify(&guess, &solution.to_lowercase());
        let exact_match = row.iter().all(|l| l.guess == LetterGuess::InLocation);
        GuessVerdict::Accepted { row, exact_match }
    }
}

/// Two-pass classification. Each solution slot can be consumed by at most
/// one guess letter, which caps IN_LOCATION + IN_WORD marks for a repeated
/// letter at its occurrence count in the solution. The consumption array
/// lives and dies inside this call.
fn classify(guess: &str, solution: &str) -> GuessRow {
    let guess_chars: Vec<char> = guess.chars().collect();
    let solution_chars: Vec<char> = solution.chars().collect();

    let mut consumed = vec![false; solution_chars.len()];
    let mut row: GuessRow = guess_chars
        .iter()
        .map(|&letter| LetterResult {
            letter,
            guess: LetterGuess::Incorrect,
        })
        .collect();

    // First pass: exact positions consume their own slot.
    for (i, &letter) in guess_chars.iter().enumerate() {
        if solution_chars.get(i) == Some(&letter) {
            row[i].guess = LetterGuess::InLocation;
            consumed[i] = true;
        }
    }

    // Second pass: remaining letters take the first unconsumed slot that
    // still holds them, otherwise they are incorrect.
    for (i, &letter) in guess_chars.iter().enumerate() {
        if row[i].guess == LetterGuess::InLocation {
            continue;
        }
        let free_slot = solution_chars
            .iter()
            .enumerate()
            .position(|(j, &s)| s == letter && !consumed[j]);
        if let Some(j) = free_slot {
            consumed[j] = true;
            row[i].guess = LetterGuess::InWord;
        }
    }

    row
}
