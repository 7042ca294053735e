//! Store adapters.
//!
//! The repositories are the only readers and writers of persisted authors and
//! books, and own every transaction boundary:
//! - [`postgres`]: the relational store backed by `PostgreSQL`
//! - [`memory`]: an in-process store with the same contract
//! - [`transaction`]: the shared begin/commit/rollback discipline

use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;
use library_api::model::{
    author::{AuthorId, AuthorModel},
    book::{BookId, BookModel},
};

use crate::error::AppResult;

/// In-memory repository implementation.
pub mod memory;

/// `PostgreSQL` repository implementation.
pub mod postgres;

/// Transaction helper shared by all repository implementations.
pub mod transaction;

/// Book record for insertion operations.
#[derive(Debug, Clone, Copy)]
pub struct BookRecordInsert<'a> {
    /// Name of the book
    pub name: &'a str,
    /// Authors to associate with the book
    pub author_ids: &'a [AuthorId],
}

/// Book record for update operations.
///
/// The author set replaces the current one entirely.
#[derive(Debug, Clone, Copy)]
pub struct BookRecordUpdate<'a> {
    /// Unique identifier for the book to update
    pub id: BookId,
    /// New name
    pub name: &'a str,
    /// New set of authors
    pub author_ids: &'a [AuthorId],
}

/// Repository trait for author data operations.
#[async_trait]
pub trait AuthorRepository: Debug {
    /// Inserts a new author and returns it with its assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyExists(Author)` if a uniqueness rule rejects the
    /// author, or a storage error if the insertion fails.
    async fn create_author(&self, name: &str) -> AppResult<AuthorModel>;

    /// Selects an author by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound(Author)` if no author matches.
    async fn get_author(&self, id: AuthorId) -> AppResult<AuthorModel>;

    /// Renames an existing author.
    ///
    /// # Errors
    ///
    /// Returns `NotFound(Author)` if no author matches at update time.
    async fn rename_author(&self, id: AuthorId, name: &str) -> AppResult<AuthorModel>;
}

/// Repository trait for book data operations.
#[async_trait]
pub trait BookRepository: Debug {
    /// Inserts a new book together with its author associations.
    ///
    /// # Errors
    ///
    /// Returns `ReferentialViolation(Author)` if any author does not exist.
    /// Nothing is persisted on error.
    async fn create_book(&self, record: BookRecordInsert<'_>) -> AppResult<BookModel>;

    /// Selects a book by ID, with all of its authors.
    ///
    /// # Errors
    ///
    /// Returns `NotFound(Book)` if no book matches.
    async fn get_book(&self, id: BookId) -> AppResult<BookModel>;

    /// Renames a book and replaces its author set.
    ///
    /// # Errors
    ///
    /// Returns `NotFound(Book)` if no book matches, or
    /// `ReferentialViolation(Author)` if any author does not exist.
    /// Nothing is persisted on error.
    async fn update_book(&self, update: BookRecordUpdate<'_>) -> AppResult<BookModel>;

    /// Selects all books associated with an author.
    ///
    /// Each book carries its full author set. Unknown authors yield an empty
    /// list.
    ///
    /// # Errors
    ///
    /// Returns an error if the selection fails.
    async fn list_books_by_author(&self, author_id: AuthorId) -> AppResult<Vec<BookModel>>;
}

/// Thread-safe shared reference to an author repository.
pub type AuthorRepositoryArc = Arc<dyn AuthorRepository + Send + Sync>;

/// Thread-safe shared reference to a book repository.
pub type BookRepositoryArc = Arc<dyn BookRepository + Send + Sync>;
