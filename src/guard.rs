//! Input screening for chatbot queries.
//!
//! This is hygiene, not a security boundary. It bounds the size of what we pay
//! to send upstream and turns away the most obvious junk and injection attempts,
//! but a determined caller can phrase around a substring denylist. Anything
//! that reaches the model must still be treated as untrusted text.

use thiserror::Error;

pub const MAX_INPUT_CHARS: usize = 500;
pub const MAX_CHARACTER_RUN: usize = 10;

const DENYLIST: &[&str] = &[
    "hack",
    "exploit",
    "attack",
    "inject",
    "<script",
    "javascript:",
    "data:",
    "vbscript:",
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputRejection {
    #[error("input cannot be empty")]
    Empty,

    #[error("input too long (max {max} characters)")]
    TooLong { max: usize },

    #[error("input repeats a character more than {max} times in a row")]
    RepeatedCharacters { max: usize },

    #[error("invalid input detected")]
    Denylisted,
}

// Length is in characters on the raw text; first failing rule wins
pub fn validate(text: &str) -> Result<(), InputRejection> {
    if text.trim().is_empty() {
        return Err(InputRejection::Empty);
    }

    if text.chars().count() > MAX_INPUT_CHARS {
        return Err(InputRejection::TooLong {
            max: MAX_INPUT_CHARS,
        });
    }

    if longest_run(text) > MAX_CHARACTER_RUN {
        return Err(InputRejection::RepeatedCharacters {
            max: MAX_CHARACTER_RUN,
        });
    }

    let lowered = text.to_lowercase();
    if DENYLIST.iter().any(|term| lowered.contains(term)) {
        return Err(InputRejection::Denylisted);
    }

    Ok(())
}

fn longest_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    let mut previous = None;

    for c in text.chars() {
        if previous == Some(c) {
            current += 1;
        } else {
            current = 1;
            previous = Some(c);
        }
        longest = longest.max(current);
    }

    longest
}
