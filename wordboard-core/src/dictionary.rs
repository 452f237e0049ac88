use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result, bail};

use wordboard_types::WORD_LENGTH;

/// The process-wide word lists: the set of guessable words and the ordered
/// solution schedule. Loaded once at startup and never mutated afterwards,
/// so it is safe to share across request tasks without synchronization.
pub struct Dictionary {
    valid_guesses: HashSet<String>,
    solutions: Vec<String>,
}

impl Dictionary {
    /// Parse word lists in the usual one-word-per-line format. Blank lines
    /// and `#` comments are skipped, words are lowercased, and anything
    /// that is not exactly five letters is dropped. Solutions are always
    /// guessable, whether or not the guess list repeats them.
    pub fn from_word_lists(guess_list: &str, solution_list: &str) -> Result<Self> {
        let mut valid_guesses: HashSet<String> = parse_words(guess_list).collect();
        let solutions: Vec<String> = parse_words(solution_list).collect();

        if solutions.is_empty() {
            bail!("solution list contains no usable words");
        }
        for solution in &solutions {
            valid_guesses.insert(solution.clone());
        }

        Ok(Self {
            valid_guesses,
            solutions,
        })
    }

    pub fn from_files(guesses_path: &Path, solutions_path: &Path) -> Result<Self> {
        let guess_list = std::fs::read_to_string(guesses_path)
            .with_context(|| format!("failed to read guess list {}", guesses_path.display()))?;
        let solution_list = std::fs::read_to_string(solutions_path).with_context(|| {
            format!("failed to read solution list {}", solutions_path.display())
        })?;
        Self::from_word_lists(&guess_list, &solution_list)
    }

    pub fn is_valid_guess(&self, word: &str) -> bool {
        self.valid_guesses.contains(&word.trim().to_lowercase())
    }

    /// The solution scheduled for a puzzle day, or `None` once the
    /// schedule runs out (or for pre-epoch days).
    pub fn solution_for_day(&self, day: i32) -> Option<&str> {
        if day < 0 {
            return None;
        }
        self.solutions.get(day as usize).map(String::as_str)
    }

    pub fn solution_count(&self) -> usize {
        self.solutions.len()
    }
}

fn parse_words(list: &str) -> impl Iterator<Item = String> + '_ {
    list.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_lowercase)
        .filter(|word| word.chars().count() == WORD_LENGTH)
}
