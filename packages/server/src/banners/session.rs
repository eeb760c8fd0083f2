use sea_orm::{DatabaseConnection, DatabaseTransaction, DbErr, TransactionTrait};

/// A scoped unit of work over the shared database.
///
/// Writes go through a transaction that is opened lazily by [`Session::tx`] and
/// stays pending until [`Session::flush`]. Dropping a session with a pending
/// transaction rolls it back.
pub struct Session {
    db: DatabaseConnection,
    pending: Option<DatabaseTransaction>,
}

impl Session {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db, pending: None }
    }

    /// The pending transaction, opening one if none is active.
    pub async fn tx(&mut self) -> Result<&DatabaseTransaction, DbErr> {
        let txn = match self.pending.take() {
            Some(txn) => txn,
            None => self.db.begin().await?,
        };
        Ok(&*self.pending.insert(txn))
    }

    pub fn pending(&self) -> Option<&DatabaseTransaction> {
        self.pending.as_ref()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The underlying pool, which only sees committed data.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Commit pending writes. Returns `true` if there was anything to commit.
    pub async fn flush(&mut self) -> Result<bool, DbErr> {
        match self.pending.take() {
            Some(txn) => {
                txn.commit().await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Discard pending writes.
    pub async fn rollback(&mut self) -> Result<(), DbErr> {
        if let Some(txn) = self.pending.take() {
            txn.rollback().await?;
        }
        Ok(())
    }
}
