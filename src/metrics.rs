//! Derived text metrics for the active project.
//!
//! Pure and recomputed on every content change; nothing here is persisted.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use ts_rs::TS;

/// Assumed silent-reading pace used for the reading-time estimate.
pub const WORDS_PER_MINUTE: usize = 200;

static NEWLINE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n+").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TextMetrics {
    pub words: usize,
    pub chars: usize,
    pub paragraphs: usize,
    /// Estimated reading time in whole minutes, rounded up.
    pub reading_time: usize,
    /// Progress towards the word goal in percent, clamped to 100.
    pub progress: f64,
}

/// Compute every metric from the raw content and the optional word goal.
/// A goal of zero counts as "no goal set".
pub fn measure(content: &str, word_goal: Option<u64>) -> TextMetrics {
    let text = content.trim();
    if text.is_empty() {
        return TextMetrics {
            words: 0,
            chars: 0,
            paragraphs: 0,
            reading_time: 0,
            progress: 0.0,
        };
    }

    let words = text.split_whitespace().count();
    let chars = text.chars().count();
    let paragraphs = NEWLINE_RUN.split(text).count();
    let reading_time = words.div_ceil(WORDS_PER_MINUTE);
    let progress = match word_goal {
        Some(goal) if goal > 0 => (words as f64 / goal as f64 * 100.0).min(100.0),
        _ => 0.0,
    };

    TextMetrics {
        words,
        chars,
        paragraphs,
        reading_time,
        progress,
    }
}
