//! Typed values stored in record fields.
//!
//! ## Learning: Enums as Closed Type Universes
//!
//! A record field can only hold one of the variants below. Matching on
//! [`Value`] is exhaustive, so adding a variant makes the compiler point at
//! every place that needs to learn about it.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::record::Record;

/// The declared type of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Bool,
    Int,
    Float,
    Text,
    Date,
    DateTime,
    Time,
    /// A nested record reachable through a field path
    Record,
    /// A field the editor can carry but has no text form for
    Opaque,
}

impl ValueType {
    /// Returns the lowercase name used in record files.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Text => "text",
            ValueType::Date => "date",
            ValueType::DateTime => "datetime",
            ValueType::Time => "time",
            ValueType::Record => "record",
            ValueType::Opaque => "opaque",
        }
    }

    /// Parses a type name as written in record files.
    pub fn from_name(name: &str) -> Option<Self> {
        let ty = match name.trim().to_ascii_lowercase().as_str() {
            "bool" | "boolean" => ValueType::Bool,
            "int" | "integer" => ValueType::Int,
            "float" | "number" => ValueType::Float,
            "text" | "string" => ValueType::Text,
            "date" => ValueType::Date,
            "datetime" => ValueType::DateTime,
            "time" => ValueType::Time,
            "record" | "object" => ValueType::Record,
            "opaque" => ValueType::Opaque,
            _ => return None,
        };
        Some(ty)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value held by a record field.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// The empty representation shared by every type
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
    Record(Record),
}

impl Value {
    /// Returns the runtime type, or `None` for `Null`.
    pub fn value_type(&self) -> Option<ValueType> {
        let ty = match self {
            Value::Null => return None,
            Value::Bool(_) => ValueType::Bool,
            Value::Int(_) => ValueType::Int,
            Value::Float(_) => ValueType::Float,
            Value::Text(_) => ValueType::Text,
            Value::Date(_) => ValueType::Date,
            Value::DateTime(_) => ValueType::DateTime,
            Value::Time(_) => ValueType::Time,
            Value::Record(_) => ValueType::Record,
        };
        Some(ty)
    }

    /// Returns true for the empty representation.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true if this value may be stored in a field declared as `ty`.
    ///
    /// `Null` fits every field; `Opaque` fields accept anything.
    pub fn fits(&self, ty: ValueType) -> bool {
        match self.value_type() {
            None => true,
            Some(_) if ty == ValueType::Opaque => true,
            Some(actual) => actual == ty,
        }
    }

    /// Returns the nested record, if this value holds one.
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Returns the nested record mutably, if this value holds one.
    pub fn as_record_mut(&mut self) -> Option<&mut Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
            Value::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            Value::DateTime(v) => write!(f, "{}", v.format("%Y-%m-%dT%H:%M:%S")),
            Value::Time(v) => write!(f, "{}", v.format("%H:%M:%S")),
            Value::Record(record) => write!(f, "{{{} fields}}", record.len()),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Value::Record(value)
    }
}
