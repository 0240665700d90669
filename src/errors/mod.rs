use thiserror::Error;

/// Failures surfaced by rating submission and aggregation.
///
/// Validation variants are returned before any store I/O happens; store
/// variants propagate unmodified and leave the caller to message and retry.
#[derive(Debug, Error, PartialEq)]
pub enum RatingError {
    #[error("score {0} is out of range, expected 1-5")]
    InvalidScore(i32),

    #[error("missing {0} reference")]
    InvalidReference(&'static str),

    #[error("subject not found: {0}")]
    UnknownSubject(String),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

/// Failures raised by the store backends themselves.
#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("ordered queries not supported by this backend")]
    UnsupportedQuery,
}

impl From<StoreError> for RatingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => RatingError::StoreUnavailable(msg),
            StoreError::UnsupportedQuery => {
                RatingError::StoreUnavailable("ordered queries not supported".to_string())
            }
        }
    }
}
