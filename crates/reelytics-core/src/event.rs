use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A rating produces a Like when it reaches this value.
pub const LIKE_THRESHOLD: f64 = 4.0;
/// A rating produces a Comment when it reaches this value.
pub const COMMENT_THRESHOLD: f64 = 4.5;

/// One row of the raw ratings table.
///
/// Wire field names follow the MovieLens CSV header
/// (`userId,movieId,rating,timestamp`); `timestamp` is unix seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingRow {
    #[serde(rename = "userId")]
    pub user_id: u32,
    #[serde(rename = "movieId")]
    pub item_id: u32,
    pub rating: f64,
    pub timestamp: i64,
}

/// User dimension row (`users.csv`). Carried for dataset summaries; no
/// analytics computation joins against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRow {
    #[serde(rename = "userId")]
    pub user_id: u32,
    pub gender: String,
    pub age: u32,
    pub occupation: u32,
    pub zip: String,
}

/// Movie dimension row (`movies.csv`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieRow {
    #[serde(rename = "movieId")]
    pub item_id: u32,
    pub title: String,
    pub genres: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    View,
    Like,
    Comment,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::View => "view",
            EventType::Like => "like",
            EventType::Comment => "comment",
        }
    }
}

/// One normalized engagement event, derived from a rating row.
///
/// Every rating yields a `view`; ratings ≥ [`LIKE_THRESHOLD`] additionally a
/// `like`; ratings ≥ [`COMMENT_THRESHOLD`] additionally a `comment`. All
/// three share the originating rating's timestamp. Immutable once derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub user_id: u32,
    pub item_id: u32,
    pub event_type: EventType,
    pub ts: DateTime<Utc>,
}
