//! Homepage hero banners.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::BannerId;

/// Subtitles shown above each hero slide, by position. Positions past the
/// end reuse the last entry.
pub const HERO_SUBTITLES: [&str; 3] = ["TOP SELLER IN THE WEEK", "SEASONAL DEALS", "WELLNESS TIPS"];

/// A hero banner. `title` and `description` are HTML authored in the
/// store backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Banner {
    pub id: BannerId,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Banner {
    /// The subtitle for the slide at `position`.
    #[must_use]
    pub fn subtitle_for(position: usize) -> &'static str {
        HERO_SUBTITLES
            .get(position)
            .or(HERO_SUBTITLES.last())
            .copied()
            .unwrap_or_default()
    }
}
