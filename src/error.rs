use crate::domain::PageId;
use reqwest::StatusCode;
use thiserror::Error;

/// Failure talking to the REST API, before any domain meaning is attached.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message} (status {status})")]
    Status { status: StatusCode, message: String },
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("unexpected response body: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("invalid endpoint '{0}'")]
    Endpoint(String),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("page {0} not found")]
    NotFound(PageId),
    #[error("not authenticated")]
    Unauthorized,
    #[error(transparent)]
    Api(ApiError),
}

impl RepositoryError {
    /// Attaches page meaning to a raw api failure. `id` is the page the call addressed.
    pub fn from_api(err: ApiError, id: Option<PageId>) -> Self {
        match (err.status(), id) {
            (Some(StatusCode::NOT_FOUND), Some(id)) => RepositoryError::NotFound(id),
            (Some(StatusCode::UNAUTHORIZED), _) => RepositoryError::Unauthorized,
            _ => RepositoryError::Api(err),
        }
    }
}

impl From<ApiError> for RepositoryError {
    fn from(err: ApiError) -> Self {
        RepositoryError::from_api(err, None)
    }
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("please select an image file (got '{0}')")]
    NotAnImage(String),
    #[error("image size must be less than 5MB (got {0} bytes)")]
    TooLarge(usize),
    #[error("object storage is not configured")]
    NotConfigured,
    #[error("failed to upload image")]
    Failed(#[source] ApiError),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("not authenticated")]
    NotAuthenticated,
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("session file error: {0}")]
    Store(#[from] std::io::Error),
    #[error("session file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}
