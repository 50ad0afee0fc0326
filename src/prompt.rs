use anyhow::Result;
use dialoguer::{Confirm, Input, Select};

/// Result of one prompting loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Confirmed(String),
    Skipped,
}

enum State {
    Prompting(usize),
    Confirmed(String),
    Skipped,
}

/// Asks for a text field, re-prompting on empty input until
/// `max_attempts` is spent. Leaving the field empty that many times
/// means the caller should move on.
pub fn text_field(label: &str, initial: Option<&str>, max_attempts: usize) -> Result<Outcome> {
    let mut state = State::Prompting(0);
    loop {
        state = match state {
            State::Prompting(attempt) if attempt >= max_attempts => State::Skipped,
            State::Prompting(attempt) => {
                let mut input = Input::<String>::new();
                input.with_prompt(label).allow_empty(true);
                if let Some(text) = initial {
                    input.with_initial_text(text);
                }
                let value = input.interact_text()?;
                let value = value.trim().to_string();
                if value.is_empty() {
                    State::Prompting(attempt + 1)
                } else {
                    State::Confirmed(value)
                }
            }
            State::Confirmed(value) => return Ok(Outcome::Confirmed(value)),
            State::Skipped => return Ok(Outcome::Skipped),
        };
    }
}

pub fn confirm(label: &str, default: bool) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(label)
        .default(default)
        .interact()?)
}

/// Index of the picked item.
pub fn choose(label: &str, items: &[&str]) -> Result<usize> {
    Ok(Select::new()
        .with_prompt(label)
        .items(items)
        .default(0)
        .interact()?)
}
