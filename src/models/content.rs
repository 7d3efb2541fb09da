use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Rating placeholder used for titles that have not aired yet
pub const UNRATED: &str = "N/A";

/// A single title in the catalog or a community post
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentItem {
    pub id: String,
    pub title: String,
    /// Comma-joined genre tags, e.g. "Fantasy, Romance"
    pub genre: String,
    pub cast: String,
    /// String-encoded score out of 10, or "N/A"
    pub rating: String,
    pub platform: String,
    pub image: String,
    pub description: String,
    /// Upcoming headline releases are shown in the featured carousel
    #[serde(default)]
    pub anticipated_release: bool,
}

impl ContentItem {
    /// Case-insensitive substring match against the genre string
    pub fn matches_genre(&self, genre: &str) -> bool {
        self.genre.to_lowercase().contains(&genre.to_lowercase())
    }

    /// Individual genre tags
    pub fn genres(&self) -> Vec<&str> {
        self.genre
            .split(',')
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .collect()
    }

    /// Numeric rating, `None` when unrated
    pub fn rating_value(&self) -> Option<f32> {
        parse_rating(&self.rating).ok().flatten()
    }
}

/// Parses a string-encoded rating.
///
/// Accepts "N/A" (returns `None`) or a decimal between 0 and 10.
pub fn parse_rating(raw: &str) -> AppResult<Option<f32>> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case(UNRATED) {
        return Ok(None);
    }

    let value: f32 = raw
        .parse()
        .map_err(|_| AppError::InvalidInput(format!("Malformed rating: {:?}", raw)))?;

    if !value.is_finite() || !(0.0..=10.0).contains(&value) {
        return Err(AppError::InvalidInput(format!(
            "Rating must be between 0 and 10, got {}",
            raw
        )));
    }

    Ok(Some(value))
}
