use std::fmt::{self, Display, Formatter};

use thiserror::Error;
use tonic::{Code, Status};

/// Entities managed by the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Author,
    Book,
}

/// Domain errors of catalog operations.
///
/// These are caller-correctable outcomes. Storage and transport faults are
/// not part of this vocabulary.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryError {
    #[error("{0} not found")]
    NotFound(Entity),
    #[error("{0} already exists")]
    AlreadyExists(Entity),
    /// A write referenced a row of this entity that does not exist.
    #[error("referenced {0} not found")]
    ReferentialViolation(Entity),
}

impl Display for Entity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Author => f.write_str("author"),
            Self::Book => f.write_str("book"),
        }
    }
}

impl LibraryError {
    pub fn code(&self) -> Code {
        match self {
            Self::NotFound(_) | Self::ReferentialViolation(_) => Code::NotFound,
            Self::AlreadyExists(_) => Code::AlreadyExists,
        }
    }
}

impl From<LibraryError> for Status {
    fn from(err: LibraryError) -> Self {
        Status::new(err.code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        let status = Status::from(LibraryError::NotFound(Entity::Book));
        assert_eq!(status.code(), Code::NotFound);
        assert_eq!(status.message(), "book not found");

        let status = Status::from(LibraryError::AlreadyExists(Entity::Author));
        assert_eq!(status.code(), Code::AlreadyExists);
        assert_eq!(status.message(), "author already exists");

        let status = Status::from(LibraryError::ReferentialViolation(Entity::Author));
        assert_eq!(status.code(), Code::NotFound);
        assert_eq!(status.message(), "referenced author not found");
    }
}
