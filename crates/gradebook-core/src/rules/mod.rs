//! Field validation rules applied at construction time

pub mod validation;

pub use validation::{apply_rules, password_hash, FieldCheck, FieldRule};
