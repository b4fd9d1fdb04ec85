/// Failures of a record source. The dashboard never propagates these into
/// the filtering core: they are logged and replaced by an empty collection.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("backend not configured: {0}")]
    NotConfigured(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0:#}")]
    Load(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, SourceError>;
