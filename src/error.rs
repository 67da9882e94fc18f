use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Groq API error: {0}")]
    GroqApi(String),

    #[error("History write error: {0}")]
    StoreWrite(String),

    #[error("History read error: {0}")]
    StoreRead(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
