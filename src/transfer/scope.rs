//! Transaction scope
//!
//! `run_in_transaction` opens exactly one transaction, hands it to the unit
//! of work, and takes exactly one terminal action:
//!
//! ```text
//! begin ──▶ work(tx) ──Ok──▶ commit ──▶ Ok(value) | Err(commit error)
//!                    └─Err─▶ rollback ─▶ Err(work error) | Err(Rollback{work, rollback})
//! ```
//!
//! If the caller drops the returned future mid-flight, the handle is dropped
//! without commit and the backend discards it.

use async_trait::async_trait;
use futures::future::BoxFuture;
use tracing::{error, warn};

use super::error::LedgerError;
use super::queries::LedgerQueries;

/// A store that can hand out transactional handles
#[async_trait]
pub trait TxBackend: Send + Sync + 'static {
    type Tx: LedgerQueries + Send + 'static;

    /// Open a new transaction
    async fn begin(&self) -> Result<Self::Tx, LedgerError>;

    async fn commit(&self, tx: Self::Tx) -> Result<(), LedgerError>;

    async fn rollback(&self, tx: Self::Tx) -> Result<(), LedgerError>;

    /// Cheap reachability probe
    async fn ping(&self) -> Result<(), LedgerError>;
}

/// Run `work` inside one transaction, committing on success and rolling back
/// on error.
///
/// A failed rollback is reported together with the original failure as
/// [`LedgerError::Rollback`].
pub async fn run_in_transaction<B, T, F>(backend: &B, work: F) -> Result<T, LedgerError>
where
    B: TxBackend,
    T: Send,
    F: for<'t> FnOnce(&'t mut B::Tx) -> BoxFuture<'t, Result<T, LedgerError>> + Send,
{
    let mut tx = backend.begin().await?;

    match work(&mut tx).await {
        Ok(value) => {
            backend.commit(tx).await?;
            Ok(value)
        }
        Err(err) => match backend.rollback(tx).await {
            Ok(()) => {
                warn!(error = %err, "Transaction rolled back");
                Err(err)
            }
            Err(rb_err) => {
                error!(error = %err, rollback_error = %rb_err, "Rollback failed");
                Err(LedgerError::Rollback {
                    source: Box::new(err),
                    rollback: Box::new(rb_err),
                })
            }
        },
    }
}
