use thiserror::Error;

#[derive(Debug, Error)]
pub enum LyricFlipError {
    // Transport errors
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{method} {url} returned status {status}: {body}")]
    BackendStatus {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },

    // Backend preconditions
    #[error("Backend not initialized")]
    BackendNotInitialized,

    #[error("Answer submitted too soon, wait {remaining_ms}ms")]
    SubmitTooSoon { remaining_ms: u64 },

    // Song pack errors
    #[error("Unknown genre pack: {genre}")]
    UnknownGenre { genre: String },

    #[error("Genre pack {genre} has fewer than {needed} songs")]
    PackTooSmall { genre: String, needed: usize },

    #[error("Failed to parse song pack {name}: {source}")]
    PackParse {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LyricFlipError>;
