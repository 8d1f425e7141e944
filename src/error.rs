use std::path::PathBuf;

/// Failure to retrieve a single page or image. Callers log it and move on.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Unexpected status {0}")]
    Status(reqwest::StatusCode),
    #[error("Empty response body")]
    EmptyBody,
}

/// Errors that end a run.
#[derive(Debug, thiserror::Error)]
pub enum CrawlerError {
    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error")]
    Csv(#[from] csv::Error),
    #[error("Serialization error")]
    Json(#[from] serde_json::Error),
    #[error("HTTP client error")]
    Client(#[from] reqwest::Error),
    #[error("Invalid noise pattern")]
    Pattern(#[from] regex::Error),
}

impl CrawlerError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> CrawlerError {
        let path = path.into();
        move |source| CrawlerError::Io { path, source }
    }
}
