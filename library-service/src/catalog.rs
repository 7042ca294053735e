use library_api::model::{
    author::{AuthorId, AuthorModel},
    book::{BookId, BookModel},
};

use crate::{
    error::AppResult,
    repository::{AuthorRepositoryArc, BookRecordInsert, BookRecordUpdate, BookRepositoryArc},
};

/// Catalog operations.
///
/// One repository call per client intent. Errors are propagated unchanged.
#[derive(Debug, Clone)]
pub struct Catalog {
    author_repository: AuthorRepositoryArc,
    book_repository: BookRepositoryArc,
}

impl Catalog {
    pub fn new(author_repository: AuthorRepositoryArc, book_repository: BookRepositoryArc) -> Self {
        Self {
            author_repository,
            book_repository,
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn register_author(&self, name: &str) -> AppResult<AuthorModel> {
        self.author_repository.create_author(name).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_author_info(&self, id: AuthorId) -> AppResult<AuthorModel> {
        self.author_repository.get_author(id).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn change_author_info(&self, id: AuthorId, name: &str) -> AppResult<AuthorModel> {
        self.author_repository.rename_author(id, name).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn add_book(&self, name: &str, author_ids: &[AuthorId]) -> AppResult<BookModel> {
        self.book_repository
            .create_book(BookRecordInsert { name, author_ids })
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_book_info(&self, id: BookId) -> AppResult<BookModel> {
        self.book_repository.get_book(id).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_book(
        &self,
        id: BookId,
        name: &str,
        author_ids: &[AuthorId],
    ) -> AppResult<BookModel> {
        self.book_repository
            .update_book(BookRecordUpdate {
                id,
                name,
                author_ids,
            })
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_author_books(&self, author_id: AuthorId) -> AppResult<Vec<BookModel>> {
        self.book_repository.list_books_by_author(author_id).await
    }
}
