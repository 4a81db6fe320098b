//! Error types for story loading and chapter lookup.

use thiserror::Error;

/// Errors surfaced by the chapter registry and the story loader.
///
/// Navigation never produces these: `scroll_to_chapter`, `next_chapter`,
/// and `previous_chapter` clamp or no-op instead.
#[derive(Debug, Error)]
pub enum StoryError {
    /// Chapter index outside `[0, count - 1]`
    #[error("chapter index {index} out of range (count = {count})")]
    IndexOutOfRange { index: i64, count: usize },

    /// Lookup by id missed
    #[error("chapter not found: {0}")]
    ChapterNotFound(String),

    /// Two chapters share an id
    #[error("duplicate chapter id: {0}")]
    DuplicateChapterId(String),

    /// Story document failed validation
    #[error("invalid story: {0}")]
    InvalidStory(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoryResult<T> = Result<T, StoryError>;
