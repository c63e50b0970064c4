// File: src/error.rs

/// Errors surfaced by the lesson sources and the persistence layer.
/// Matching and lookup never fail; misses are reported as values.
#[derive(Debug, thiserror::Error)]
pub enum StenoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to encode or decode preferences: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to encode or decode dictionary snapshot: {0}")]
    Snapshot(#[from] bincode::Error),
    #[error("Failed to persist file: {0}")]
    Persist(#[from] tempfile::PersistError),
    /// Lesson text was empty or not a lesson at all (e.g. an HTML error page).
    #[error("Lesson not found at {0}")]
    LessonNotFound(String),
}

pub type Result<T> = std::result::Result<T, StenoError>;
