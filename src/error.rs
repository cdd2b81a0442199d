use thiserror::Error;

/// Failure taxonomy for every backend-facing operation.
///
/// `Validation` is raised locally before any request goes out; the
/// remaining variants map a transport failure or backend response.
/// Nothing here is fatal: every operation can be retried by invoking
/// it again.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("request to {url} failed: {reason}")]
    FetchFailed { url: String, reason: String },

    #[error("not found")]
    NotFound,

    #[error("you have already rated this recipe")]
    AlreadyRated,

    #[error("only the recipe owner may modify or delete it")]
    NotOwner,
}

impl ApiError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        ApiError::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn fetch_failed(url: impl Into<String>, reason: impl ToString) -> Self {
        ApiError::FetchFailed {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}
