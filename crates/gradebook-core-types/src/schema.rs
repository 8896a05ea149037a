//! Canonical field keys and event names for structured logging

pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_BATCH_ID: &str = "batch_id";

// Mapping layer
pub const FIELD_ENTITY: &str = "entity";
pub const FIELD_OPERATION: &str = "operation";
pub const FIELD_STATEMENTS: &str = "statements";
pub const FIELD_ROWS: &str = "rows";
pub const FIELD_FLUSH_MODE: &str = "flush_mode";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
