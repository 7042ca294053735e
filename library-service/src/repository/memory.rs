use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use library_api::model::{
    author::{AuthorId, AuthorModel},
    book::{BookId, BookModel},
    error::{Entity, LibraryError},
};
use time::{Duration, OffsetDateTime};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{
    error::{AppError, AppResult},
    repository::{
        AuthorRepository, BookRecordInsert, BookRecordUpdate, BookRepository,
        transaction::{Transaction, with_transaction},
    },
};

/// In-memory implementation of the author and book repositories.
///
/// Meant for tests and single-user local runs: every write stages a full copy
/// of the state, which becomes visible on commit. Associations to missing
/// authors are rejected like a foreign key would.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    authors: HashMap<AuthorId, String>,
    books: HashMap<BookId, BookRow>,
    /// Author ids of each book, in insertion order.
    associations: HashMap<BookId, Vec<AuthorId>>,
}

#[derive(Debug, Clone)]
struct BookRow {
    name: String,
    create_time: OffsetDateTime,
    update_time: OffsetDateTime,
}

#[derive(Debug)]
struct MemoryTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    staged: MemoryState,
}

impl MemoryRepository {
    /// Creates a new empty memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    async fn begin(&self) -> AppResult<MemoryTransaction> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let staged = guard.clone();
        Ok(MemoryTransaction { guard, staged })
    }
}

#[async_trait]
impl Transaction for MemoryTransaction {
    async fn commit(self) -> AppResult<()> {
        let Self { mut guard, staged } = self;
        *guard = staged;
        Ok(())
    }

    async fn rollback(self) -> AppResult<()> {
        Ok(())
    }
}

impl MemoryState {
    fn book(&self, id: BookId) -> Option<BookModel> {
        let row = self.books.get(&id)?;
        Some(BookModel {
            id,
            name: row.name.clone(),
            author_ids: self.book_authors(id),
            create_time: row.create_time,
            update_time: row.update_time,
        })
    }

    fn book_authors(&self, book_id: BookId) -> Vec<AuthorId> {
        self.associations
            .get(&book_id)
            .cloned()
            .unwrap_or_default()
    }

    fn insert_associations(&mut self, book_id: BookId, author_ids: &[AuthorId]) -> AppResult<()> {
        let linked = self.associations.entry(book_id).or_default();
        for author_id in author_ids {
            if !self.authors.contains_key(author_id) {
                return Err(LibraryError::ReferentialViolation(Entity::Author).into());
            }
            if linked.contains(author_id) {
                return Err(AppError::storage(
                    "insert association",
                    format!("duplicate association of book {book_id} and author {author_id}"),
                ));
            }
            linked.push(*author_id);
        }
        Ok(())
    }
}

#[async_trait]
impl AuthorRepository for MemoryRepository {
    async fn create_author(&self, name: &str) -> AppResult<AuthorModel> {
        let id = AuthorId::generate();
        self.state
            .lock()
            .await
            .authors
            .insert(id, name.to_string());
        Ok(AuthorModel {
            id,
            name: name.to_string(),
        })
    }

    async fn get_author(&self, id: AuthorId) -> AppResult<AuthorModel> {
        let state = self.state.lock().await;
        let name = state
            .authors
            .get(&id)
            .ok_or(LibraryError::NotFound(Entity::Author))?;
        Ok(AuthorModel {
            id,
            name: name.clone(),
        })
    }

    async fn rename_author(&self, id: AuthorId, name: &str) -> AppResult<AuthorModel> {
        let name = name.to_string();
        with_transaction(self.begin(), move |tx| {
            Box::pin(async move {
                let author = tx
                    .staged
                    .authors
                    .get_mut(&id)
                    .ok_or(LibraryError::NotFound(Entity::Author))?;
                author.clone_from(&name);
                Ok(AuthorModel { id, name })
            })
        })
        .await
    }
}

#[async_trait]
impl BookRepository for MemoryRepository {
    async fn create_book(&self, record: BookRecordInsert<'_>) -> AppResult<BookModel> {
        let name = record.name.to_string();
        let author_ids = record.author_ids.to_vec();
        with_transaction(self.begin(), move |tx| {
            Box::pin(async move {
                let id = BookId::generate();
                let now = OffsetDateTime::now_utc();
                tx.staged.books.insert(
                    id,
                    BookRow {
                        name: name.clone(),
                        create_time: now,
                        update_time: now,
                    },
                );
                tx.staged.insert_associations(id, &author_ids)?;
                Ok(BookModel {
                    id,
                    name,
                    author_ids,
                    create_time: now,
                    update_time: now,
                })
            })
        })
        .await
    }

    async fn get_book(&self, id: BookId) -> AppResult<BookModel> {
        let state = self.state.lock().await;
        state
            .book(id)
            .ok_or_else(|| LibraryError::NotFound(Entity::Book).into())
    }

    async fn update_book(&self, update: BookRecordUpdate<'_>) -> AppResult<BookModel> {
        let id = update.id;
        let name = update.name.to_string();
        let author_ids = update.author_ids.to_vec();
        with_transaction(self.begin(), move |tx| {
            Box::pin(async move {
                let row = tx
                    .staged
                    .books
                    .get_mut(&id)
                    .ok_or(LibraryError::NotFound(Entity::Book))?;
                row.name.clone_from(&name);
                row.update_time =
                    OffsetDateTime::now_utc().max(row.update_time + Duration::MICROSECOND);
                let (create_time, update_time) = (row.create_time, row.update_time);

                tx.staged.associations.remove(&id);
                tx.staged.insert_associations(id, &author_ids)?;

                Ok(BookModel {
                    id,
                    name,
                    author_ids,
                    create_time,
                    update_time,
                })
            })
        })
        .await
    }

    async fn list_books_by_author(&self, author_id: AuthorId) -> AppResult<Vec<BookModel>> {
        let state = self.state.lock().await;
        Ok(state
            .associations
            .iter()
            .filter(|(_, author_ids)| author_ids.contains(&author_id))
            .filter_map(|(book_id, _)| state.book(*book_id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    async fn create_author(repository: &MemoryRepository, name: &str) -> AuthorId {
        repository.create_author(name).await.unwrap().id
    }

    fn author_set(ids: &[AuthorId]) -> HashSet<AuthorId> {
        ids.iter().copied().collect()
    }

    #[tokio::test]
    async fn author_lifecycle() {
        let repository = MemoryRepository::new();
        let id = create_author(&repository, "Alice").await;

        assert_eq!(repository.get_author(id).await.unwrap().name, "Alice");

        let renamed = repository.rename_author(id, "Alice Smith").await.unwrap();
        assert_eq!(renamed.name, "Alice Smith");
        assert_eq!(repository.get_author(id).await.unwrap().name, "Alice Smith");
    }

    #[tokio::test]
    async fn missing_author() {
        let repository = MemoryRepository::new();
        let id = AuthorId::generate();

        let err = repository.get_author(id).await.unwrap_err();
        assert_eq!(err.library_error(), Some(LibraryError::NotFound(Entity::Author)));

        let err = repository.rename_author(id, "Bob").await.unwrap_err();
        assert_eq!(err.library_error(), Some(LibraryError::NotFound(Entity::Author)));
        assert!(repository.get_author(id).await.is_err());
    }

    #[tokio::test]
    async fn create_and_get_book() {
        let repository = MemoryRepository::new();
        let alice = create_author(&repository, "Alice").await;
        let bob = create_author(&repository, "Bob").await;

        let book = repository
            .create_book(BookRecordInsert {
                name: "Go in Practice",
                author_ids: &[alice, bob],
            })
            .await
            .unwrap();
        assert_eq!(book.create_time, book.update_time);

        let fetched = repository.get_book(book.id).await.unwrap();
        assert_eq!(fetched.name, "Go in Practice");
        assert_eq!(author_set(&fetched.author_ids), author_set(&[alice, bob]));
        assert_eq!(fetched.create_time, fetched.update_time);
    }

    #[tokio::test]
    async fn create_book_with_missing_author() {
        let repository = MemoryRepository::new();
        let alice = create_author(&repository, "Alice").await;

        let err = repository
            .create_book(BookRecordInsert {
                name: "Orphan",
                author_ids: &[alice, AuthorId::generate()],
            })
            .await
            .unwrap_err();
        assert_eq!(
            err.library_error(),
            Some(LibraryError::ReferentialViolation(Entity::Author))
        );

        let state = repository.state.lock().await;
        assert!(state.books.is_empty());
        assert!(state.associations.is_empty());
    }

    #[tokio::test]
    async fn update_book_replaces_authors() {
        let repository = MemoryRepository::new();
        let alice = create_author(&repository, "Alice").await;
        let bob = create_author(&repository, "Bob").await;
        let carol = create_author(&repository, "Carol").await;

        let book = repository
            .create_book(BookRecordInsert {
                name: "Go in Practice",
                author_ids: &[alice, bob],
            })
            .await
            .unwrap();

        let updated = repository
            .update_book(BookRecordUpdate {
                id: book.id,
                name: "Go in Practice, 2e",
                author_ids: &[bob, carol],
            })
            .await
            .unwrap();
        assert!(updated.update_time > book.update_time);

        let fetched = repository.get_book(book.id).await.unwrap();
        assert_eq!(fetched.name, "Go in Practice, 2e");
        assert_eq!(author_set(&fetched.author_ids), author_set(&[bob, carol]));
        assert_eq!(fetched.create_time, book.create_time);
        assert!(fetched.update_time > book.update_time);

        assert!(
            repository
                .list_books_by_author(alice)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn update_book_leaves_other_books_untouched() {
        let repository = MemoryRepository::new();
        let alice = create_author(&repository, "Alice").await;
        let bob = create_author(&repository, "Bob").await;

        let first = repository
            .create_book(BookRecordInsert {
                name: "Book 1",
                author_ids: &[alice],
            })
            .await
            .unwrap();
        let second = repository
            .create_book(BookRecordInsert {
                name: "Book 2",
                author_ids: &[alice, bob],
            })
            .await
            .unwrap();

        repository
            .update_book(BookRecordUpdate {
                id: first.id,
                name: "Book 1",
                author_ids: &[bob],
            })
            .await
            .unwrap();

        let fetched = repository.get_book(second.id).await.unwrap();
        assert_eq!(author_set(&fetched.author_ids), author_set(&[alice, bob]));

        let books = repository.list_books_by_author(alice).await.unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].id, second.id);
        assert_eq!(repository.list_books_by_author(bob).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn update_book_with_missing_author_rolls_back() {
        let repository = MemoryRepository::new();
        let alice = create_author(&repository, "Alice").await;

        let book = repository
            .create_book(BookRecordInsert {
                name: "Go in Practice",
                author_ids: &[alice],
            })
            .await
            .unwrap();

        let err = repository
            .update_book(BookRecordUpdate {
                id: book.id,
                name: "Go in Practice, 2e",
                author_ids: &[alice, AuthorId::generate()],
            })
            .await
            .unwrap_err();
        assert_eq!(
            err.library_error(),
            Some(LibraryError::ReferentialViolation(Entity::Author))
        );

        let fetched = repository.get_book(book.id).await.unwrap();
        assert_eq!(fetched, book);
    }

    #[tokio::test]
    async fn update_missing_book() {
        let repository = MemoryRepository::new();
        let alice = create_author(&repository, "Alice").await;
        let id = BookId::generate();

        let err = repository
            .update_book(BookRecordUpdate {
                id,
                name: "Ghost",
                author_ids: &[alice],
            })
            .await
            .unwrap_err();
        assert_eq!(err.library_error(), Some(LibraryError::NotFound(Entity::Book)));

        let state = repository.state.lock().await;
        assert!(state.books.is_empty());
        assert!(state.associations.is_empty());
    }

    #[tokio::test]
    async fn update_book_with_no_authors() {
        let repository = MemoryRepository::new();
        let alice = create_author(&repository, "Alice").await;
        let book = repository
            .create_book(BookRecordInsert {
                name: "Go in Practice",
                author_ids: &[alice],
            })
            .await
            .unwrap();

        repository
            .update_book(BookRecordUpdate {
                id: book.id,
                name: "Go in Practice",
                author_ids: &[],
            })
            .await
            .unwrap();
        assert!(
            repository
                .get_book(book.id)
                .await
                .unwrap()
                .author_ids
                .is_empty()
        );
    }

    #[tokio::test]
    async fn list_books_by_author() {
        let repository = MemoryRepository::new();
        let alice = create_author(&repository, "Alice").await;
        let bob = create_author(&repository, "Bob").await;

        assert!(
            repository
                .list_books_by_author(alice)
                .await
                .unwrap()
                .is_empty()
        );
        assert!(
            repository
                .list_books_by_author(AuthorId::generate())
                .await
                .unwrap()
                .is_empty()
        );

        let first = repository
            .create_book(BookRecordInsert {
                name: "Book 1",
                author_ids: &[alice],
            })
            .await
            .unwrap();
        let second = repository
            .create_book(BookRecordInsert {
                name: "Book 2",
                author_ids: &[alice, bob],
            })
            .await
            .unwrap();
        repository
            .create_book(BookRecordInsert {
                name: "Book 3",
                author_ids: &[bob],
            })
            .await
            .unwrap();

        let books = repository.list_books_by_author(alice).await.unwrap();
        let ids: HashSet<_> = books.iter().map(|book| book.id).collect();
        assert_eq!(ids, HashSet::from([first.id, second.id]));

        let second = books.iter().find(|book| book.id == second.id).unwrap();
        assert_eq!(author_set(&second.author_ids), author_set(&[alice, bob]));
    }

    #[tokio::test]
    async fn dropped_transaction_discards_writes() {
        let repository = MemoryRepository::new();

        let mut transaction = repository.begin().await.unwrap();
        transaction
            .staged
            .authors
            .insert(AuthorId::generate(), "Staged".into());
        drop(transaction);

        assert!(repository.state.lock().await.authors.is_empty());
    }
}
