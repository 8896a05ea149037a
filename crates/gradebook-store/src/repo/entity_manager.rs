//! Entity manager: the single dispatch point for the six operations
//!
//! Each invocation builds one statement and enqueues it on the shared
//! [`ConnectionManager`]. Reads flush immediately (autocommit) because
//! their rows are needed now; that flush also executes any writes queued
//! before it. Writes flush only when `execution` is set and otherwise stay
//! queued until [`EntityManager::commit`].

use crate::connection::ConnectionManager;
use crate::errors::Result;
use gradebook_core::entity::Entity;
use gradebook_core::errors::{ExError, ExErrorKind, GradebookError};
use gradebook_core::hydration::{hydrate, hydrate_rows};
use gradebook_core::operations::Operation;
use gradebook_core::queries::Kwargs;
use gradebook_core::{log_op_end, log_op_error, log_op_start};
use gradebook_core_types::RequestId;
use std::marker::PhantomData;
use std::time::Instant;

/// Result of one invocation
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<E> {
    /// Write enqueued, not yet executed
    Queued,
    /// Write executed in autocommit mode
    Executed,
    /// Hydrated rows of `all`/`filter`, possibly empty
    Rows(Vec<E>),
    /// The single instance matched by `get`
    One(E),
}

impl<E> Outcome<E> {
    pub fn into_rows(self) -> Option<Vec<E>> {
        match self {
            Outcome::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn into_one(self) -> Option<E> {
        match self {
            Outcome::One(entity) => Some(entity),
            _ => None,
        }
    }
}

fn unexpected_outcome(operation: Operation) -> ExError {
    ExError::new(ExErrorKind::Internal)
        .with_op(operation.name())
        .with_message("operation returned an unexpected outcome")
}

/// Operations for one entity type over a shared connection manager
pub struct EntityManager<'c, E> {
    connection: &'c ConnectionManager,
    entity: PhantomData<fn() -> E>,
}

impl<'c, E: Entity> EntityManager<'c, E> {
    pub fn new(connection: &'c ConnectionManager) -> Self {
        Self {
            connection,
            entity: PhantomData,
        }
    }

    pub fn connection(&self) -> &'c ConnectionManager {
        self.connection
    }

    /// Dispatch by operation name
    ///
    /// `instance` is the subject of `save`/`create`/`delete`; type-level
    /// operations ignore it. Names other than the six operations fail with
    /// `UnknownOperation`.
    pub fn invoke(&self, operation: &str, instance: Option<&E>, kwargs: Kwargs) -> Result<Outcome<E>> {
        let operation: Operation = operation.parse()?;
        self.run(operation, instance, kwargs)
    }

    pub fn run(&self, operation: Operation, instance: Option<&E>, mut kwargs: Kwargs) -> Result<Outcome<E>> {
        let start = Instant::now();
        let request_id = RequestId::new();
        let entity = E::schema().entity;
        log_op_start!(
            "entity_manager.invoke",
            operation = operation.name(),
            entity = entity,
            request_id = %request_id
        );

        let result = self.dispatch(operation, instance, &mut kwargs);
        match &result {
            Ok(outcome) => {
                log_op_end!(
                    "entity_manager.invoke",
                    duration_ms = start.elapsed().as_millis() as u64,
                    operation = operation.name(),
                    entity = entity,
                    outcome = outcome_label(outcome),
                    request_id = %request_id
                );
            }
            Err(err) => {
                log_op_error!(
                    "entity_manager.invoke",
                    err.clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    operation = operation.name(),
                    entity = entity,
                    request_id = %request_id
                );
            }
        }
        result
    }

    fn dispatch(&self, operation: Operation, instance: Option<&E>, kwargs: &mut Kwargs) -> Result<Outcome<E>> {
        let execution = kwargs.take_execution()?;
        let statement = operation.build(instance, kwargs)?;
        self.connection.enqueue(statement);

        if !operation.is_read() {
            if !execution {
                return Ok(Outcome::Queued);
            }
            self.connection.flush_autocommit()?;
            return Ok(Outcome::Executed);
        }

        self.connection.flush_autocommit()?;
        let rows = self.connection.read_result().unwrap_or_default();
        if operation != Operation::Get {
            return Ok(Outcome::Rows(hydrate_rows::<E>(&rows)?));
        }
        match rows.as_slice() {
            [row] => Ok(Outcome::One(hydrate::<E>(row)?)),
            other => Err(GradebookError::Cardinality {
                entity: E::schema().entity.to_string(),
                found: other.len(),
            }
            .into()),
        }
    }

    /// Every row, ordered by identity
    pub fn all(&self) -> Result<Vec<E>> {
        self.run(Operation::All, None, Kwargs::new())?
            .into_rows()
            .ok_or_else(|| unexpected_outcome(Operation::All))
    }

    /// Rows matching every condition
    pub fn filter(&self, conditions: Kwargs) -> Result<Vec<E>> {
        self.run(Operation::Filter, None, conditions)?
            .into_rows()
            .ok_or_else(|| unexpected_outcome(Operation::Filter))
    }

    /// Exactly one row matching every condition, or `Cardinality`
    pub fn get(&self, conditions: Kwargs) -> Result<E> {
        self.run(Operation::Get, None, conditions)?
            .into_one()
            .ok_or_else(|| unexpected_outcome(Operation::Get))
    }

    /// Insert an instance
    ///
    /// With `execution` the insert runs now and the new identity is
    /// assigned to `entity`; otherwise it waits in the queue.
    pub fn create(&self, entity: &mut E, execution: bool) -> Result<()> {
        let outcome = self.run(
            Operation::Create,
            Some(&*entity),
            Kwargs::new().execution(execution),
        )?;
        if matches!(outcome, Outcome::Executed) {
            if let Some(pk) = self.connection.last_insert_id() {
                entity.set_pk(pk);
            }
        }
        Ok(())
    }

    pub fn save(&self, entity: &E, execution: bool) -> Result<()> {
        self.run(Operation::Save, Some(entity), Kwargs::new().execution(execution))
            .map(|_| ())
    }

    pub fn delete(&self, entity: &E, execution: bool) -> Result<()> {
        self.run(Operation::Delete, Some(entity), Kwargs::new().execution(execution))
            .map(|_| ())
    }

    /// Execute every queued statement in one transaction
    pub fn commit(&self) -> Result<()> {
        self.connection.flush_transactional()
    }
}

fn outcome_label<E>(outcome: &Outcome<E>) -> &'static str {
    match outcome {
        Outcome::Queued => "queued",
        Outcome::Executed => "executed",
        Outcome::Rows(_) => "rows",
        Outcome::One(_) => "one",
    }
}
