use std::{
    fmt::Display,
    io::Write,
    sync::{LazyLock, PoisonError, RwLock},
};

use nu_ansi_term::Color::{self, Green, Red, Yellow};
use serde::Serialize;
use shelf_config::{config::get_config, display::DisplaySettings};
use shelf_core::{
    error::{ErrorContext, ShelfError},
    ShelfResult,
};

pub struct Icons;

impl Icons {
    pub const ARROW: &str = "→";
    pub const CALENDAR: &str = "📅";
    pub const CATEGORY: &str = "📁";
    pub const CHECK: &str = "✓";
    pub const CODE: &str = "📃";
    pub const CROSS: &str = "✗";
    pub const DESCRIPTION: &str = "📝";
    pub const FORK: &str = "🍴";
    pub const ISSUE: &str = "🐛";
    pub const LINK: &str = "🔗";
    pub const NOTE: &str = "📌";
    pub const PACKAGE: &str = "📦";
    pub const SCORE: &str = "📊";
    pub const STAR: &str = "★";
    pub const SYNC: &str = "🔄";
    pub const WATCH: &str = "👁";
}

pub fn icon_or<'a>(icon: &'a str, fallback: &'a str) -> &'a str {
    if get_config().display().icons() {
        icon
    } else {
        fallback
    }
}

pub fn display_settings() -> DisplaySettings {
    get_config().display()
}

pub fn term_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80)
}

pub static COLOR: LazyLock<RwLock<bool>> = LazyLock::new(|| RwLock::new(true));
pub static PROGRESS: LazyLock<RwLock<bool>> = LazyLock::new(|| RwLock::new(true));
pub static JSON: LazyLock<RwLock<bool>> = LazyLock::new(|| RwLock::new(false));

fn flag(lock: &RwLock<bool>) -> bool {
    *lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub fn set_flag(lock: &RwLock<bool>, value: bool) {
    *lock.write().unwrap_or_else(PoisonError::into_inner) = value;
}

pub fn progress_enabled() -> bool {
    flag(&PROGRESS) && !json_output()
}

pub fn json_output() -> bool {
    flag(&JSON)
}

pub fn interactive_ask(ques: &str) -> ShelfResult<String> {
    print!("{ques}");

    std::io::stdout()
        .flush()
        .with_context(|| "flushing stdout stream".to_string())?;

    let mut response = String::new();
    std::io::stdin()
        .read_line(&mut response)
        .with_context(|| "reading input from stdin".to_string())?;

    Ok(response.trim().to_owned())
}

pub fn confirm_action(message: &str) -> ShelfResult<bool> {
    let response = interactive_ask(&format!(
        "{} [{}/{}]: ",
        message,
        Colored(Green, "y"),
        Colored(Red, "N")
    ))?;
    Ok(matches!(response.to_lowercase().as_str(), "y" | "yes"))
}

pub struct Colored<T: Display>(pub Color, pub T);

impl<T: Display> Display for Colored<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if flag(&COLOR) {
            write!(f, "{}", self.0.prefix())?;
            self.1.fmt(f)?;
            write!(f, "{}", self.0.suffix())
        } else {
            self.1.fmt(f)
        }
    }
}

/// Prints `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> ShelfResult<()> {
    let out = serde_json::to_string_pretty(value)
        .map_err(|err| ShelfError::Custom(format!("Failed to serialize output: {err}")))?;
    crate::progress::suspend(|| println!("{out}"));
    Ok(())
}

/// Formats an optional metric, or a dimmed dash when the entry was never synced.
pub fn metric<T: Display>(value: Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => Colored(Color::DarkGray, "-").to_string(),
    }
}

/// Colors a 0-100 score by band.
pub fn score(value: Option<i32>) -> String {
    match value {
        Some(v) if v >= 70 => Colored(Green, v).to_string(),
        Some(v) if v >= 40 => Colored(Yellow, v).to_string(),
        Some(v) => Colored(Red, v).to_string(),
        None => metric::<i32>(None),
    }
}

/// Keeps the date part of an RFC 3339 timestamp.
pub fn short_date(timestamp: &str) -> &str {
    timestamp.split('T').next().unwrap_or(timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_date() {
        assert_eq!(short_date("2025-01-15T08:30:00Z"), "2025-01-15");
        assert_eq!(short_date("never"), "never");
    }

    #[test]
    fn test_colored_without_color() {
        set_flag(&COLOR, false);
        assert_eq!(Colored(Green, 42).to_string(), "42");
        assert_eq!(score(Some(90)), "90");
        assert_eq!(metric::<i64>(None), "-");
        set_flag(&COLOR, true);
    }
}
