use thiserror::Error;

/// Result type alias using GradebookError
pub type Result<T> = std::result::Result<T, GradebookError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every failure raised by the mapping layer, the validators or the storage
/// engine is classified by one of these kinds. Each kind maps to a stable
/// code used by callers that need to branch on the failure (for example the
/// registration flow reacting to `ConstraintViolation` on a duplicate email).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Usage errors
    UnknownOperation,
    UnexpectedArguments,
    InvalidExecutionFlag,
    MissingIdentity,
    UnknownAttribute,
    InvalidSubject,

    // Sequencing / cardinality
    NoPendingStatements,
    Cardinality,
    AlreadyInitialised,

    // Data
    Validation,
    Hydration,

    // Storage
    ConstraintViolation,
    Persistence,
    Configuration,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::UnknownOperation => "ERR_UNKNOWN_OPERATION",
            ExErrorKind::UnexpectedArguments => "ERR_UNEXPECTED_ARGUMENTS",
            ExErrorKind::InvalidExecutionFlag => "ERR_INVALID_EXECUTION_FLAG",
            ExErrorKind::MissingIdentity => "ERR_MISSING_IDENTITY",
            ExErrorKind::UnknownAttribute => "ERR_UNKNOWN_ATTRIBUTE",
            ExErrorKind::InvalidSubject => "ERR_INVALID_SUBJECT",
            ExErrorKind::NoPendingStatements => "ERR_NO_PENDING_STATEMENTS",
            ExErrorKind::Cardinality => "ERR_CARDINALITY",
            ExErrorKind::AlreadyInitialised => "ERR_ALREADY_INITIALISED",
            ExErrorKind::Validation => "ERR_VALIDATION",
            ExErrorKind::Hydration => "ERR_HYDRATION",
            ExErrorKind::ConstraintViolation => "ERR_CONSTRAINT_VIOLATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Configuration => "ERR_CONFIGURATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Usage errors are caller mistakes; they are never worth retrying
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            ExErrorKind::UnknownOperation
                | ExErrorKind::UnexpectedArguments
                | ExErrorKind::InvalidExecutionFlag
                | ExErrorKind::MissingIdentity
                | ExErrorKind::UnknownAttribute
                | ExErrorKind::InvalidSubject
        )
    }
}

/// Canonical structured error type
///
/// Carries the kind, the operation that failed (`op`), the entity type it
/// was working on and a free-form message. The store crate returns this
/// type from every fallible function.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity: Option<String>,
    field: Option<String>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity: None,
            field: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity type context
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Add field context (validation failures)
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity(&self) -> Option<&str> {
        self.entity.as_deref()
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity) = &self.entity {
            write!(f, " (entity: {})", entity)?;
        }
        if let Some(field) = &self.field {
            write!(f, " (field: {})", field)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Error taxonomy for the mapping layer and the domain model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradebookError {
    // ===== Usage errors =====
    /// Operation name is not one of all/filter/get/save/create/delete
    #[error("Operation '{name}' is not allowed")]
    UnknownOperation { name: String },

    /// Arguments were passed to an operation that takes no conditions
    #[error("Operation '{operation}' takes no arguments, got: {names:?}")]
    UnexpectedArguments {
        operation: String,
        names: Vec<String>,
    },

    /// The reserved `execution` argument was not a boolean
    #[error("Argument 'execution' must be a boolean, got {found}")]
    InvalidExecutionFlag { found: String },

    /// An instance without a primary key was used where one is required
    #[error("{entity} has no primary key (required by {context})")]
    MissingIdentity { entity: String, context: String },

    /// A condition or field name is not declared by the entity schema
    #[error("{entity} has no attribute '{attribute}'")]
    UnknownAttribute { entity: String, attribute: String },

    /// An instance operation was invoked on the entity type, or the reverse
    #[error("Operation '{operation}' {reason}")]
    InvalidSubject { operation: String, reason: String },

    // ===== Sequencing / cardinality =====
    /// Flush requested while the pending queue is empty
    #[error("There are no unexecuted requests to process")]
    NoUnexecutedRequests,

    /// `get` matched zero or several rows
    #[error("Expected exactly one {entity}, found {found}")]
    Cardinality { entity: String, found: usize },

    /// A second connection manager was requested while one is alive
    #[error("Only one connection manager may exist at a time")]
    AlreadyInitialised,

    // ===== Data =====
    /// A field validator rejected a value
    #[error("Invalid value for field '{field}': {reason}")]
    Validation { field: String, reason: String },

    /// A result row does not match the shape declared by the schema
    #[error("Cannot hydrate {entity}: {reason}")]
    Hydration { entity: String, reason: String },

    /// Configuration could not be loaded
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl GradebookError {
    /// Shorthand used by the field validators
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        GradebookError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand used by the hydration layer
    pub fn hydration(entity: impl Into<String>, reason: impl Into<String>) -> Self {
        GradebookError::Hydration {
            entity: entity.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ExErrorKind {
        match self {
            GradebookError::UnknownOperation { .. } => ExErrorKind::UnknownOperation,
            GradebookError::UnexpectedArguments { .. } => ExErrorKind::UnexpectedArguments,
            GradebookError::InvalidExecutionFlag { .. } => ExErrorKind::InvalidExecutionFlag,
            GradebookError::MissingIdentity { .. } => ExErrorKind::MissingIdentity,
            GradebookError::UnknownAttribute { .. } => ExErrorKind::UnknownAttribute,
            GradebookError::InvalidSubject { .. } => ExErrorKind::InvalidSubject,
            GradebookError::NoUnexecutedRequests => ExErrorKind::NoPendingStatements,
            GradebookError::Cardinality { .. } => ExErrorKind::Cardinality,
            GradebookError::AlreadyInitialised => ExErrorKind::AlreadyInitialised,
            GradebookError::Validation { .. } => ExErrorKind::Validation,
            GradebookError::Hydration { .. } => ExErrorKind::Hydration,
            GradebookError::Configuration { .. } => ExErrorKind::Configuration,
        }
    }
}

/// Conversion from GradebookError to ExError
impl From<GradebookError> for ExError {
    fn from(err: GradebookError) -> Self {
        let base = ExError::new(err.kind()).with_message(err.to_string());
        match err {
            GradebookError::UnknownOperation { name } => base.with_op(name),
            GradebookError::UnexpectedArguments { operation, .. }
            | GradebookError::InvalidSubject { operation, .. } => base.with_op(operation),
            GradebookError::MissingIdentity { entity, context } => {
                base.with_entity(entity).with_op(context)
            }
            GradebookError::UnknownAttribute { entity, .. }
            | GradebookError::Cardinality { entity, .. }
            | GradebookError::Hydration { entity, .. } => base.with_entity(entity),
            GradebookError::Validation { field, .. } => base.with_field(field),
            GradebookError::InvalidExecutionFlag { .. }
            | GradebookError::NoUnexecutedRequests
            | GradebookError::AlreadyInitialised
            | GradebookError::Configuration { .. } => base,
        }
    }
}
