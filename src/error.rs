use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("page not found: {0}")]
    NotFound(String),

    #[error("no content found for page: {0}")]
    NoContent(String),

    #[error("no character infobox found in page: {0}")]
    NoInfobox(String),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Wiki API error: {0}")]
    WikiApi(String),

    #[error("no characters available")]
    NoCharactersAvailable,

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("character not found: {0}")]
    RecordNotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] tokio_rusqlite::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
