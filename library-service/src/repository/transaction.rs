use std::future::Future;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tracing::warn;

use crate::error::AppResult;

/// An open transaction that is either committed or rolled back.
///
/// Dropping a transaction without committing it must discard its writes.
#[async_trait]
pub trait Transaction: Send + Sized {
    /// Makes the transaction's writes visible.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend rejects the commit.
    async fn commit(self) -> AppResult<()>;

    /// Discards the transaction's writes.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend rejects the rollback.
    async fn rollback(self) -> AppResult<()>;
}

/// Runs an operation inside a transaction.
///
/// The transaction is started by `begin`. If `operation` fails, the
/// transaction is rolled back and the operation's error is returned; a
/// rollback failure is only logged. Otherwise the transaction is committed
/// and a commit failure is returned as is.
///
/// If the returned future is dropped before completion, the transaction is
/// dropped with it.
///
/// # Errors
///
/// Returns the error of `begin`, of `operation`, or of the commit.
pub async fn with_transaction<Tx, T, B, F>(begin: B, operation: F) -> AppResult<T>
where
    Tx: Transaction,
    B: Future<Output = AppResult<Tx>> + Send,
    F: for<'t> FnOnce(&'t mut Tx) -> BoxFuture<'t, AppResult<T>> + Send,
    T: Send,
{
    let mut transaction = begin.await?;

    let result = operation(&mut transaction).await;
    match result {
        Ok(value) => {
            transaction.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = transaction.rollback().await {
                warn!(error = %rollback_err, "failed to roll back transaction");
            }
            Err(err)
        }
    }
}
