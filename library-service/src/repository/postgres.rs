use async_trait::async_trait;
use deadpool_postgres::{
    Manager, ManagerConfig, Object, Pool, RecyclingMethod, Runtime,
    Transaction as PoolTransaction,
};
use futures::future::join_all;
use library_api::model::{
    author::{AuthorId, AuthorModel},
    book::{BookId, BookModel},
    error::{Entity, LibraryError},
};
use tokio_postgres::{Error as PgError, NoTls, Row, error::SqlState};

use crate::{
    config::PostgresConfig,
    error::{AppError, AppResult},
    repository::{
        AuthorRepository, BookRecordInsert, BookRecordUpdate, BookRepository,
        transaction::{Transaction, with_transaction},
    },
};

const INSERT_AUTHOR: &str = "INSERT INTO author (name) VALUES ($1) RETURNING id";

const SELECT_AUTHOR: &str = "SELECT id, name FROM author WHERE id = $1";

const UPDATE_AUTHOR: &str = "UPDATE author SET name = $1 WHERE id = $2 RETURNING id, name";

const INSERT_BOOK: &str = "
    INSERT INTO book (name) VALUES ($1)
    RETURNING id, name, created_at, updated_at
";

// `updated_at` moves forward on every update, even within one clock tick.
const UPDATE_BOOK: &str = "
    UPDATE book
    SET name = $1, updated_at = GREATEST(now(), updated_at + interval '1 microsecond')
    WHERE id = $2
    RETURNING id, name, created_at, updated_at
";

const SELECT_BOOK: &str = "
    SELECT id, name, created_at, updated_at,
        ARRAY(SELECT author_id FROM author_book WHERE book_id = book.id) AS author_ids
    FROM book
    WHERE id = $1
";

const SELECT_BOOKS_BY_AUTHOR: &str = "
    SELECT book.id, book.name, book.created_at, book.updated_at,
        ARRAY(
            SELECT author_book.author_id FROM author_book
            WHERE author_book.book_id = book.id
        ) AS author_ids
    FROM book
    INNER JOIN author_book ON book.id = author_book.book_id
    WHERE author_book.author_id = $1
";

const INSERT_ASSOCIATION: &str = "INSERT INTO author_book (author_id, book_id) VALUES ($1, $2)";

const DELETE_ASSOCIATIONS: &str = "DELETE FROM author_book WHERE book_id = $1";

/// `PostgreSQL` implementation of the author and book repositories.
///
/// Each operation checks a connection out of the pool for its own duration.
/// Multi-statement writes run in one transaction through
/// [`with_transaction`].
#[derive(Debug, Clone)]
pub struct PostgresRepository {
    pool: Pool,
}

struct PostgresTransaction<'a>(PoolTransaction<'a>);

impl PostgresRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Creates a repository with a connection pool built from configuration.
    ///
    /// Connections are opened lazily.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection string is invalid.
    pub fn connect(config: &PostgresConfig) -> AppResult<Self> {
        let pg_config: tokio_postgres::Config = config
            .connection
            .parse()
            .map_err(AppError::storage_with("parse connection string"))?;

        let manager = Manager::from_config(
            pg_config,
            NoTls,
            ManagerConfig {
                recycling_method: RecyclingMethod::Fast,
            },
        );
        let pool = Pool::builder(manager)
            .max_size(config.max_connections)
            .wait_timeout(Some(config.acquire_timeout()))
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(AppError::storage_with("build connection pool"))?;

        Ok(Self::new(pool))
    }

    async fn client(&self) -> AppResult<Object> {
        self.pool
            .get()
            .await
            .map_err(AppError::storage_with("acquire connection"))
    }
}

async fn begin(client: &mut Object) -> AppResult<PostgresTransaction<'_>> {
    client
        .transaction()
        .await
        .map(PostgresTransaction)
        .map_err(AppError::storage_with("begin transaction"))
}

#[async_trait]
impl<'a> Transaction for PostgresTransaction<'a> {
    async fn commit(self) -> AppResult<()> {
        self.0
            .commit()
            .await
            .map_err(AppError::storage_with("commit transaction"))
    }

    async fn rollback(self) -> AppResult<()> {
        self.0
            .rollback()
            .await
            .map_err(AppError::storage_with("roll back transaction"))
    }
}

fn is_foreign_key_violation(err: &PgError) -> bool {
    err.code() == Some(&SqlState::FOREIGN_KEY_VIOLATION)
}

fn is_unique_violation(err: &PgError) -> bool {
    err.code() == Some(&SqlState::UNIQUE_VIOLATION)
}

/// Maps a failed insert of `entity` to a domain or storage error.
fn insert_error(entity: Entity, context: &'static str) -> impl FnOnce(PgError) -> AppError {
    move |err| {
        if is_unique_violation(&err) {
            LibraryError::AlreadyExists(entity).into()
        } else {
            AppError::storage(context, err)
        }
    }
}

/// Inserts one association per author as a single pipelined batch.
///
/// Outcomes are inspected in submission order and the first failure wins.
/// Every statement is awaited before returning.
async fn insert_associations(
    transaction: &PoolTransaction<'_>,
    book_id: BookId,
    author_ids: &[AuthorId],
) -> AppResult<()> {
    if author_ids.is_empty() {
        return Ok(());
    }

    let statement = transaction
        .prepare_cached(INSERT_ASSOCIATION)
        .await
        .map_err(AppError::storage_with("prepare association insert"))?;

    let results = join_all(author_ids.iter().map(|author_id| {
        let statement = &statement;
        async move { transaction.execute(statement, &[author_id, &book_id]).await }
    }))
    .await;

    for result in results {
        if let Err(err) = result {
            if is_foreign_key_violation(&err) {
                return Err(LibraryError::ReferentialViolation(Entity::Author).into());
            }
            return Err(AppError::storage("insert association", err));
        }
    }

    Ok(())
}

fn decode_author(row: &Row) -> Result<AuthorModel, PgError> {
    Ok(AuthorModel {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
    })
}

fn decode_book(row: &Row, author_ids: Vec<AuthorId>) -> Result<BookModel, PgError> {
    Ok(BookModel {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        author_ids,
        create_time: row.try_get("created_at")?,
        update_time: row.try_get("updated_at")?,
    })
}

fn decode_book_with_authors(row: &Row) -> Result<BookModel, PgError> {
    decode_book(row, row.try_get("author_ids")?)
}

#[async_trait]
impl AuthorRepository for PostgresRepository {
    async fn create_author(&self, name: &str) -> AppResult<AuthorModel> {
        let client = self.client().await?;
        let row = client
            .query_one(INSERT_AUTHOR, &[&name])
            .await
            .map_err(insert_error(Entity::Author, "insert author"))?;
        Ok(AuthorModel {
            id: row
                .try_get("id")
                .map_err(AppError::storage_with("decode author"))?,
            name: name.to_string(),
        })
    }

    async fn get_author(&self, id: AuthorId) -> AppResult<AuthorModel> {
        let client = self.client().await?;
        let row = client
            .query_opt(SELECT_AUTHOR, &[&id])
            .await
            .map_err(AppError::storage_with("select author"))?
            .ok_or(LibraryError::NotFound(Entity::Author))?;
        decode_author(&row).map_err(AppError::storage_with("decode author"))
    }

    async fn rename_author(&self, id: AuthorId, name: &str) -> AppResult<AuthorModel> {
        let mut client = self.client().await?;
        let name = name.to_string();
        with_transaction(begin(&mut client), move |tx| {
            Box::pin(async move {
                let row = tx
                    .0
                    .query_opt(UPDATE_AUTHOR, &[&name, &id])
                    .await
                    .map_err(AppError::storage_with("update author"))?
                    .ok_or(LibraryError::NotFound(Entity::Author))?;
                decode_author(&row).map_err(AppError::storage_with("decode author"))
            })
        })
        .await
    }
}

#[async_trait]
impl BookRepository for PostgresRepository {
    async fn create_book(&self, record: BookRecordInsert<'_>) -> AppResult<BookModel> {
        let mut client = self.client().await?;
        let name = record.name.to_string();
        let author_ids = record.author_ids.to_vec();
        with_transaction(begin(&mut client), move |tx| {
            Box::pin(async move {
                let row = tx
                    .0
                    .query_one(INSERT_BOOK, &[&name])
                    .await
                    .map_err(insert_error(Entity::Book, "insert book"))?;
                let book = decode_book(&row, author_ids)
                    .map_err(AppError::storage_with("decode book"))?;

                insert_associations(&tx.0, book.id, &book.author_ids).await?;

                Ok(book)
            })
        })
        .await
    }

    async fn get_book(&self, id: BookId) -> AppResult<BookModel> {
        let client = self.client().await?;
        let row = client
            .query_opt(SELECT_BOOK, &[&id])
            .await
            .map_err(AppError::storage_with("select book"))?
            .ok_or(LibraryError::NotFound(Entity::Book))?;
        decode_book_with_authors(&row).map_err(AppError::storage_with("decode book"))
    }

    async fn update_book(&self, update: BookRecordUpdate<'_>) -> AppResult<BookModel> {
        let mut client = self.client().await?;
        let id = update.id;
        let name = update.name.to_string();
        let author_ids = update.author_ids.to_vec();
        with_transaction(begin(&mut client), move |tx| {
            Box::pin(async move {
                let row = tx
                    .0
                    .query_opt(UPDATE_BOOK, &[&name, &id])
                    .await
                    .map_err(AppError::storage_with("update book"))?
                    .ok_or(LibraryError::NotFound(Entity::Book))?;
                let book = decode_book(&row, author_ids)
                    .map_err(AppError::storage_with("decode book"))?;

                tx.0.execute(DELETE_ASSOCIATIONS, &[&id])
                    .await
                    .map_err(AppError::storage_with("delete associations"))?;
                insert_associations(&tx.0, id, &book.author_ids).await?;

                Ok(book)
            })
        })
        .await
    }

    async fn list_books_by_author(&self, author_id: AuthorId) -> AppResult<Vec<BookModel>> {
        let client = self.client().await?;
        let rows = client
            .query(SELECT_BOOKS_BY_AUTHOR, &[&author_id])
            .await
            .map_err(AppError::storage_with("select books by author"))?;
        rows.iter()
            .map(decode_book_with_authors)
            .collect::<Result<_, _>>()
            .map_err(AppError::storage_with("decode book"))
    }
}
