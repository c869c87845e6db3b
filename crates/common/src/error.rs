use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Execution error: {0}")]
    Execution(String),

    #[error("Market data error: {0}")]
    MarketData(String),

    #[error("Invalid price series: {0}")]
    InvalidSeries(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
