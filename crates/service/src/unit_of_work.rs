//! Request-scoped transaction.
//!
//! Handlers that write open one `UnitOfWork`, pass `conn()` to the services
//! and call `commit()` once everything succeeded. Returning early (via `?`)
//! drops the transaction, which rolls it back.

use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tracing::debug;

use crate::errors::ServiceError;

pub struct UnitOfWork {
    txn: DatabaseTransaction,
}

impl UnitOfWork {
    pub async fn begin(db: &DatabaseConnection) -> Result<Self, ServiceError> {
        let txn = db.begin().await?;
        debug!(event = "uow_begin", "transaction started");
        Ok(Self { txn })
    }

    pub fn conn(&self) -> &DatabaseTransaction {
        &self.txn
    }

    pub async fn commit(self) -> Result<(), ServiceError> {
        self.txn.commit().await?;
        debug!(event = "uow_commit", "transaction committed");
        Ok(())
    }

    pub async fn rollback(self) -> Result<(), ServiceError> {
        self.txn.rollback().await?;
        debug!(event = "uow_rollback", "transaction rolled back");
        Ok(())
    }
}
