use thiserror::Error;

/// Why a single file could not be acquired.  These never escape the pipeline: each one is
/// logged and counted as a failed download.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid filename {0:?}: must be a single path component")]
    InvalidFilename(String),

    #[error("{0} was already downloaded earlier in this batch")]
    DuplicateFilename(String),

    #[error("downloaded file {0} is missing")]
    Missing(String),

    #[error("downloaded file {0} is empty")]
    Empty(String),

    #[error("error downloading {url}")]
    Transfer {
        url: String,
        #[source]
        source: anyhow::Error,
    },
}
