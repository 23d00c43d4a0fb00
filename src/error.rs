use thiserror::Error;

/// Failure of a single classification call. Always surfaced to the sync caller.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("request to classification service failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("classification service returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("no text in classification response")]
    EmptyResponse,
    #[error("malformed classification response: {0}")]
    Malformed(String),
}

/// A single bad entry. Rejected and skipped; never aborts a batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    #[error("duplicate company id {0:?} in raw records")]
    DuplicateRecordId(String),
    #[error("invalid response entry #{index}: {reason}")]
    InvalidEntry { index: usize, reason: String },
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("a sync is already in flight")]
    AlreadySyncing,
    #[error("failed to fetch raw records: {0:#}")]
    Source(anyhow::Error),
    #[error(transparent)]
    Classify(#[from] ClassifyError),
}
