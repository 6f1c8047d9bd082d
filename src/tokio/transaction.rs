//! Transaction support for asynchronous PostgreSQL connections.
//!
//! This is deliberately thin: it issues `BEGIN`/`COMMIT`/`ROLLBACK` as plain
//! queries and otherwise relies entirely on [`Conn::transaction_status`] (the
//! server-reported `ReadyForQuery` byte) rather than tracking any additional
//! client-side transaction state.

use super::Conn;
use super::named_portal::NamedPortal;
use crate::conversion::ToParams;
use crate::error::{Error, Result};
use crate::statement::IntoStatement;

/// A PostgreSQL transaction for the asynchronous connection.
///
/// This struct only guards which connection it belongs to. The connection
/// is passed to `commit`/`rollback`/`exec_portal` explicitly because async
/// closures cannot otherwise hold both a transaction handle and `&mut Conn`.
pub struct Transaction {
    connection_id: u32,
}

impl Transaction {
    /// Create a new transaction (internal use only).
    pub(crate) fn new(connection_id: u32) -> Self {
        Self { connection_id }
    }

    fn check_connection(&self, conn: &Conn) -> Result<()> {
        let actual = conn.connection_id();
        if self.connection_id != actual {
            return Err(Error::InvalidUsage(format!(
                "connection mismatch: expected {}, got {}",
                self.connection_id, actual
            )));
        }
        Ok(())
    }

    /// Commit the transaction.
    pub async fn commit(self, conn: &mut Conn) -> Result<()> {
        self.check_connection(conn)?;
        conn.query_drop("COMMIT").await?;
        Ok(())
    }

    /// Rollback the transaction.
    pub async fn rollback(self, conn: &mut Conn) -> Result<()> {
        self.check_connection(conn)?;
        conn.query_drop("ROLLBACK").await?;
        Ok(())
    }

    /// Create a named portal for iterative row fetching within this transaction.
    ///
    /// Named portals are safe to use within an explicit transaction because
    /// `Sync` messages do not destroy them (only `COMMIT`/`ROLLBACK` does).
    ///
    /// The statement can be either a `&PreparedStatement` returned from
    /// `conn.prepare()`, or a raw SQL `&str` for one-shot execution.
    pub async fn exec_portal<S: IntoStatement, P: ToParams>(
        &self,
        conn: &mut Conn,
        statement: S,
        params: P,
    ) -> Result<NamedPortal> {
        self.check_connection(conn)?;

        let portal_name = conn.next_portal_name();
        let result = conn
            .create_named_portal(&portal_name, &statement, &params)
            .await;

        if let Err(e) = result {
            if e.is_connection_broken() {
                conn.is_broken = true;
            }
            return Err(e);
        }

        Ok(NamedPortal::new(portal_name))
    }
}
