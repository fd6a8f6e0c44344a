//! Console helpers for command handlers. Messages go through the styled
//! output layer; prompts use dialoguer and are only reached in
//! interactive mode.

use std::fmt;

use dialoguer::{theme::ColorfulTheme, Confirm, Input};

use crate::cli::core::{parse_amount, CommandError};
use crate::cli::output;
use crate::domain::common::{IMPULSE_MAX, IMPULSE_MIN};

pub fn print_info(message: impl fmt::Display) {
    output::info(message);
}

pub fn print_success(message: impl fmt::Display) {
    output::success(message);
}

pub fn print_warning(message: impl fmt::Display) {
    output::warning(message);
}

pub fn print_error(message: impl fmt::Display) {
    output::error(message);
}

pub fn print_hint(message: impl fmt::Display) {
    output::hint(message);
}

/// Yes/no question; a bare Enter takes `default`.
pub fn confirm_action(
    theme: &ColorfulTheme,
    prompt: &str,
    default: bool,
) -> Result<bool, CommandError> {
    Ok(Confirm::with_theme(theme)
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}

/// Asks again until the answer reads as a positive amount, in any
/// notation `price` accepts.
pub fn prompt_amount(theme: &ColorfulTheme, prompt: &str) -> Result<f64, CommandError> {
    loop {
        let answer: String = Input::with_theme(theme)
            .with_prompt(prompt)
            .interact_text()?;
        match parse_amount(&answer) {
            Ok(amount) if amount > 0.0 => return Ok(amount),
            Ok(_) => print_warning("Enter an amount greater than zero."),
            Err(err) => print_warning(err),
        }
    }
}

/// Optional text; an empty answer comes back as `None`.
pub fn prompt_optional(theme: &ColorfulTheme, prompt: &str) -> Result<Option<String>, CommandError> {
    let answer: String = Input::with_theme(theme)
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    let trimmed = answer.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}

/// Impulse score on the 1-10 scale; blank keeps `current`.
pub fn prompt_impulse(theme: &ColorfulTheme, current: Option<u8>) -> Result<Option<u8>, CommandError> {
    let prompt = match current {
        Some(score) => format!("Impulse {}-{} (now {})", IMPULSE_MIN, IMPULSE_MAX, score),
        None => format!("Impulse {}-{} (optional)", IMPULSE_MIN, IMPULSE_MAX),
    };
    loop {
        let answer = match prompt_optional(theme, &prompt)? {
            Some(answer) => answer,
            None => return Ok(current),
        };
        match answer.parse::<u8>() {
            Ok(score) if (IMPULSE_MIN..=IMPULSE_MAX).contains(&score) => return Ok(Some(score)),
            _ => print_warning(format!(
                "Impulse must be a whole number from {} to {}.",
                IMPULSE_MIN, IMPULSE_MAX
            )),
        }
    }
}
