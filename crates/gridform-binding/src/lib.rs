//! # Gridform Binding
//!
//! Moves values in and out of a record under edit.
//!
//! ## Key Concepts
//!
//! ### Capabilities instead of reflection
//! - A record exposes its fields through the [`FieldAccess`] trait
//! - Nested records are reached by asking for a child accessor by name
//! - There is no runtime property lookup: every type decides which names it answers to
//!
//! ### Paths and conversion
//! - [`FieldPath`] is a dotted list of field names (`address.city`)
//! - [`set_value`] walks all segments but the last and writes the final one
//! - [`convert`] turns raw text from an input control into a typed [`Value`]
//!
//! ```
//! use gridform_binding::{FieldPath, Record, Value, ValueType, set_value};
//!
//! let mut address = Record::new();
//! address.declare("city", ValueType::Text, Value::Null);
//! let mut person = Record::new();
//! person.declare("address", ValueType::Record, Value::Record(address));
//!
//! let path = FieldPath::parse("address.city").unwrap();
//! set_value(&mut person, &path, Value::from("Lisbon")).unwrap();
//! ```

mod calendar;
mod convert;
mod path;
mod record;
mod value;

pub use calendar::{parse_iso_week, parse_month};
pub use convert::{Conversion, InputHint, bind_input, convert};
pub use path::{FieldPath, field_type, get_value, set_value};
pub use record::{Field, FieldAccess, Record, WriteRejection};
pub use value::{Value, ValueType};

/// Result type for binding operations
pub type BindingResult<T> = Result<T, BindingError>;

/// A field path could not be resolved against a record.
///
/// These are configuration errors: a column points at a field the record
/// does not have, or at a field of the wrong shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathResolutionError {
    #[error("Field path is empty")]
    EmptyPath,

    #[error("Field path `{path}` has an empty segment")]
    EmptySegment { path: String },

    #[error("No field `{segment}` while resolving `{path}`")]
    MissingField { path: String, segment: String },

    #[error("Field `{segment}` in `{path}` does not hold a record")]
    NotARecord { path: String, segment: String },

    #[error("Field `{path}` expects {expected}, got {found}")]
    TypeMismatch {
        path: String,
        expected: ValueType,
        found: ValueType,
    },
}

/// Malformed input for one of the calendar input kinds.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    #[error("Invalid ISO 8601 week `{0}`, expected YYYY-Www or YYYY-Www-D")]
    InvalidWeek(String),

    #[error("Invalid month `{0}`, expected YYYY-MM")]
    InvalidMonth(String),
}

/// Errors raised while binding raw input to a record field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    #[error(transparent)]
    Path(#[from] PathResolutionError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

/// Errors raised while reading a record file.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Expected a JSON object at `{0}`")]
    NotAnObject(String),

    #[error("Field `{field}` is missing its type")]
    MissingType { field: String },

    #[error("Field `{field}` has unknown type `{ty}`")]
    UnknownType { field: String, ty: String },

    #[error("Field `{field}` holds a value that is not a {expected}")]
    InvalidValue { field: String, expected: ValueType },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
