//! The connection manager
//!
//! Statements are queued with [`ConnectionManager::enqueue`] and executed
//! in FIFO order by a flush. Each flush opens a fresh connection, runs the
//! whole batch on it and closes it. The queue is taken before anything
//! runs, so it is empty when a flush returns, whether the flush succeeded
//! or not.
//!
//! At most one manager exists at a time; collaborators receive it by
//! reference.

use crate::config::ConnectionConfig;
use crate::connection::params::{from_sql_ref, render_sql, to_sql_values};
use crate::db;
use crate::errors::{from_rusqlite, Result};
use gradebook_core::errors::GradebookError;
use gradebook_core::statement::Statement;
use gradebook_core::value::Row;
use gradebook_core::{log_op_end, log_op_error, log_op_start};
use gradebook_core_types::BatchId;
use rusqlite::Connection;
use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

static INSTANCE_ALIVE: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushMode {
    /// Each statement commits on its own; no rollback
    Autocommit,
    /// One transaction for the batch, rolled back on the first failure
    Transactional,
}

impl FlushMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlushMode::Autocommit => "autocommit",
            FlushMode::Transactional => "transactional",
        }
    }
}

/// What one batch produced
#[derive(Debug, Default)]
struct BatchOutcome {
    rows: Option<Vec<Row>>,
    last_insert_id: Option<i64>,
}

#[derive(Debug)]
pub struct ConnectionManager {
    config: ConnectionConfig,
    pending: RefCell<Vec<Statement>>,
    result: RefCell<Option<Vec<Row>>>,
    last_insert_id: RefCell<Option<i64>>,
}

impl ConnectionManager {
    /// Create the process-wide manager
    ///
    /// Fails with `AlreadyInitialised` while another manager is alive.
    pub fn new(config: ConnectionConfig) -> Result<Self> {
        if INSTANCE_ALIVE
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(GradebookError::AlreadyInitialised.into());
        }
        tracing::debug!(
            database = %config.database.display(),
            user = %config.user,
            host = %config.host,
            port = config.port,
            "connection manager created"
        );
        Ok(Self {
            config,
            pending: RefCell::new(Vec::new()),
            result: RefCell::new(None),
            last_insert_id: RefCell::new(None),
        })
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Append a statement to the pending queue; no I/O
    pub fn enqueue(&self, statement: Statement) {
        self.pending.borrow_mut().push(statement);
    }

    pub fn pending_len(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Execute the queue without a transaction
    ///
    /// A failure stops the batch; statements before it stay committed.
    pub fn flush_autocommit(&self) -> Result<()> {
        self.flush(FlushMode::Autocommit)
    }

    /// Execute the queue inside one transaction
    ///
    /// Any failure rolls the whole batch back and the original error is
    /// returned.
    pub fn flush_transactional(&self) -> Result<()> {
        self.flush(FlushMode::Transactional)
    }

    /// Take the buffered rows, leaving the buffer empty
    pub fn read_result(&self) -> Option<Vec<Row>> {
        self.result.borrow_mut().take()
    }

    /// Rowid of the last row inserted by the most recent successful flush
    pub fn last_insert_id(&self) -> Option<i64> {
        *self.last_insert_id.borrow()
    }

    fn flush(&self, mode: FlushMode) -> Result<()> {
        let batch = std::mem::take(&mut *self.pending.borrow_mut());
        if batch.is_empty() {
            return Err(GradebookError::NoUnexecutedRequests.into());
        }

        let start = Instant::now();
        let batch_id = BatchId::new();
        log_op_start!(
            "connection.flush",
            flush_mode = mode.as_str(),
            statements = batch.len(),
            batch_id = %batch_id
        );

        match self.execute(mode, &batch) {
            Ok(outcome) => {
                let row_count = outcome.rows.as_ref().map_or(0, Vec::len);
                if let Some(rows) = outcome.rows {
                    *self.result.borrow_mut() = Some(rows);
                }
                *self.last_insert_id.borrow_mut() = outcome.last_insert_id;
                log_op_end!(
                    "connection.flush",
                    duration_ms = start.elapsed().as_millis() as u64,
                    rows = row_count,
                    batch_id = %batch_id
                );
                Ok(())
            }
            Err(err) => {
                log_op_error!(
                    "connection.flush",
                    err.clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    flush_mode = mode.as_str(),
                    batch_id = %batch_id
                );
                Err(err)
            }
        }
    }

    fn execute(&self, mode: FlushMode, batch: &[Statement]) -> Result<BatchOutcome> {
        let mut conn = db::open_configured(&self.config.database)?;
        match mode {
            FlushMode::Autocommit => run_batch(&conn, batch),
            FlushMode::Transactional => {
                let tx = conn.transaction().map_err(from_rusqlite)?;
                match run_batch(&tx, batch) {
                    Ok(outcome) => {
                        tx.commit().map_err(from_rusqlite)?;
                        Ok(outcome)
                    }
                    Err(err) => {
                        if let Err(rollback) = tx.rollback() {
                            tracing::warn!(error = %rollback, "rollback failed");
                        }
                        Err(err)
                    }
                }
            }
        }
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        let dropped = self.pending.get_mut().len();
        if dropped > 0 {
            tracing::warn!(statements = dropped, "connection manager dropped with queued statements");
        }
        INSTANCE_ALIVE.store(false, Ordering::SeqCst);
    }
}

/// Run statements in order on one connection, stopping at the first error
fn run_batch(conn: &Connection, batch: &[Statement]) -> Result<BatchOutcome> {
    let mut outcome = BatchOutcome::default();
    for statement in batch {
        let sql = render_sql(statement.sql());
        tracing::debug!(sql = %sql, output = %statement.output(), "executing statement");

        let mut prepared = conn.prepare(&sql).map_err(from_rusqlite)?;
        let parameters = to_sql_values(statement.parameters());
        let parameters = rusqlite::params_from_iter(parameters.iter());

        if statement.expects_rows() {
            let width = prepared.column_count();
            let mut rows = prepared.query(parameters).map_err(from_rusqlite)?;
            let mut collected = Vec::new();
            while let Some(row) = rows.next().map_err(from_rusqlite)? {
                let mut values = Vec::with_capacity(width);
                for index in 0..width {
                    values.push(from_sql_ref(row.get_ref(index).map_err(from_rusqlite)?)?);
                }
                collected.push(values);
            }
            outcome.rows = Some(collected);
        } else {
            let before = conn.last_insert_rowid();
            prepared.execute(parameters).map_err(from_rusqlite)?;
            let after = conn.last_insert_rowid();
            if after != before {
                outcome.last_insert_id = Some(after);
            }
        }
    }
    Ok(outcome)
}
