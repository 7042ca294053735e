use std::error::Error;

use library_api::model::{error::LibraryError, parse::RequestError};
use thiserror::Error;
use tonic::{Code, Status, transport};
use tracing::error;

/// Application error types.
///
/// Represents all possible errors that can occur in the library service.
#[derive(Debug, Error)]
pub enum AppError {
    /// Internal application error.
    ///
    /// Represents unexpected internal errors that occur during service operation.
    #[error("internal error: {0}")]
    Internal(#[from] Box<dyn Error + Send + Sync>),

    /// Domain error.
    ///
    /// Caller-correctable outcomes of catalog operations.
    #[error("library error: {0}")]
    Library(#[from] LibraryError),

    /// Storage backend failure.
    ///
    /// Any backend fault that is not a domain error, tagged with the phase
    /// that failed.
    #[error("storage error: {context}: {source}")]
    Storage {
        context: &'static str,
        source: Box<dyn Error + Send + Sync>,
    },

    /// Request processing error.
    ///
    /// Represents errors that occur during request validation and processing.
    #[error("request error: {0}")]
    Request(#[from] RequestError),

    /// gRPC status error.
    ///
    /// Represents gRPC protocol-level errors.
    #[error("status error: {0}")]
    Status(#[from] Status),
}

/// Application result type.
///
/// Type alias for Result with `AppError` as the error type.
/// Used throughout the application for consistent error handling.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn storage<E>(context: &'static str, source: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        Self::Storage {
            context,
            source: source.into(),
        }
    }

    /// Returns a `map_err` adapter that wraps a backend error as a storage fault.
    pub fn storage_with<E>(context: &'static str) -> impl FnOnce(E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        move |source| Self::storage(context, source)
    }

    pub fn library_error(&self) -> Option<LibraryError> {
        match self {
            Self::Library(err) => Some(*err),
            _ => None,
        }
    }
}

macro_rules! impl_internal_errors {
    ( $( $type:ty ),* $(,)? ) => {
        $(
        impl From<$type> for AppError {
            fn from(err: $type) -> Self {
                AppError::Internal(Box::new(err))
            }
        }
        )*
    };
}
impl_internal_errors!(config::ConfigError, transport::Error);

impl From<AppError> for Status {
    /// Converts application errors to gRPC status codes.
    ///
    /// Storage and internal errors are logged and reported without detail.
    fn from(err: AppError) -> Self {
        match err {
            AppError::Library(err) => err.into(),
            AppError::Request(err) => err.into(),
            AppError::Status(status) => status,
            AppError::Internal(_) | AppError::Storage { .. } => {
                error!("internal service error: {}", err);
                Self::internal(Code::Internal.description())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use library_api::model::{
        error::Entity,
        parse::{CommonError, FieldError},
    };

    use super::*;

    #[test]
    fn status_mapping() {
        let status = Status::from(AppError::from(LibraryError::NotFound(Entity::Book)));
        assert_eq!(status.code(), Code::NotFound);

        let status = Status::from(AppError::from(LibraryError::ReferentialViolation(
            Entity::Author,
        )));
        assert_eq!(status.code(), Code::NotFound);
        assert_eq!(status.message(), "referenced author not found");

        let status = Status::from(AppError::from(LibraryError::AlreadyExists(Entity::Author)));
        assert_eq!(status.code(), Code::AlreadyExists);

        let status = Status::from(AppError::from(RequestError::bad_request(
            "GetBookInfo",
            [FieldError::new("id", CommonError::InvalidId)],
        )));
        assert_eq!(status.code(), Code::InvalidArgument);

        let status = Status::from(AppError::storage("commit transaction", "connection reset"));
        assert_eq!(status.code(), Code::Internal);
        assert_eq!(status.message(), Code::Internal.description());

        let status = Status::from(AppError::from(Status::unavailable("channel closed")));
        assert_eq!(status.code(), Code::Unavailable);
        assert_eq!(status.message(), "channel closed");
    }

    #[test]
    fn storage_context() {
        let err = AppError::storage("insert book", "duplicate key");
        assert_eq!(err.to_string(), "storage error: insert book: duplicate key");
        assert!(err.library_error().is_none());
    }
}
