//! Dotted field paths.
//!
//! ## Learning: Reborrowing Through a Walk
//!
//! `set_value` keeps a single `&mut dyn FieldAccess` cursor and replaces it
//! with the child it points at, one segment at a time. Each step reborrows
//! from the previous cursor, so the borrow checker can see that only one
//! mutable path into the record exists at any moment. Nothing is written
//! until the cursor reaches the last segment, which is why a failed walk
//! never leaves a half-applied change behind.

use std::fmt;
use std::str::FromStr;

use crate::record::{FieldAccess, WriteRejection};
use crate::value::{Value, ValueType};
use crate::PathResolutionError;

/// A parsed, non-empty dotted path such as `customer.address.city`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    raw: String,
    segments: Vec<String>,
}

impl FieldPath {
    /// Parses a dotted path. Every segment must be non-empty.
    pub fn parse(input: &str) -> Result<Self, PathResolutionError> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(PathResolutionError::EmptyPath);
        }

        let segments: Vec<String> = raw.split('.').map(|s| s.trim().to_string()).collect();
        if segments.iter().any(String::is_empty) {
            return Err(PathResolutionError::EmptySegment {
                path: raw.to_string(),
            });
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// Returns the path segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns the path as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the segments to walk and the segment to write.
    fn split_last(&self) -> (&[String], &str) {
        // parse() guarantees at least one segment
        match self.segments.split_last() {
            Some((last, parents)) => (parents, last.as_str()),
            None => (&self.segments[..0], ""),
        }
    }

    fn missing(&self, segment: &str) -> PathResolutionError {
        PathResolutionError::MissingField {
            path: self.raw.clone(),
            segment: segment.to_string(),
        }
    }

    fn not_a_record(&self, segment: &str) -> PathResolutionError {
        PathResolutionError::NotARecord {
            path: self.raw.clone(),
            segment: segment.to_string(),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for FieldPath {
    type Err = PathResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Writes `value` into the field named by `path`.
///
/// No coercion happens here: the value must already have the field's
/// declared type (or be `Null`).
pub fn set_value(
    record: &mut dyn FieldAccess,
    path: &FieldPath,
    value: Value,
) -> Result<(), PathResolutionError> {
    let (parents, last) = path.split_last();

    let mut cursor: &mut dyn FieldAccess = record;
    for segment in parents {
        cursor = descend_mut(cursor, path, segment)?;
    }

    let found = value.value_type();
    cursor
        .set_field(last, value)
        .map_err(|rejection| match rejection {
            WriteRejection::UnknownField => path.missing(last),
            WriteRejection::TypeMismatch { expected } => PathResolutionError::TypeMismatch {
                path: path.raw.clone(),
                expected,
                found: found.unwrap_or(ValueType::Opaque),
            },
        })
}

/// Reads the current value of the field named by `path`.
pub fn get_value(record: &dyn FieldAccess, path: &FieldPath) -> Result<Value, PathResolutionError> {
    let (cursor, last) = walk(record, path)?;
    cursor.field(last).ok_or_else(|| path.missing(last))
}

/// Returns the declared type of the field named by `path`.
pub fn field_type(
    record: &dyn FieldAccess,
    path: &FieldPath,
) -> Result<ValueType, PathResolutionError> {
    let (cursor, last) = walk(record, path)?;
    cursor.field_type(last).ok_or_else(|| path.missing(last))
}

fn walk<'a>(
    record: &'a dyn FieldAccess,
    path: &'a FieldPath,
) -> Result<(&'a dyn FieldAccess, &'a str), PathResolutionError> {
    let (parents, last) = path.split_last();

    let mut cursor = record;
    for segment in parents {
        if cursor.field_type(segment).is_none() {
            return Err(path.missing(segment));
        }
        cursor = cursor
            .child(segment)
            .ok_or_else(|| path.not_a_record(segment))?;
    }
    Ok((cursor, last))
}

fn descend_mut<'a>(
    cursor: &'a mut dyn FieldAccess,
    path: &FieldPath,
    segment: &str,
) -> Result<&'a mut dyn FieldAccess, PathResolutionError> {
    if cursor.field_type(segment).is_none() {
        return Err(path.missing(segment));
    }
    cursor
        .child_mut(segment)
        .ok_or_else(|| path.not_a_record(segment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use proptest::prelude::*;

    fn graph() -> Record {
        let c = Record::new()
            .with("c", ValueType::Int, Value::Int(1))
            .with("d", ValueType::Int, Value::Int(2));
        let b = Record::new()
            .with("b", ValueType::Record, Value::Record(c))
            .with("sibling", ValueType::Text, Value::from("keep"));
        Record::new()
            .with("a", ValueType::Record, Value::Record(b))
            .with("top", ValueType::Bool, Value::Bool(true))
            .with("nothing", ValueType::Record, Value::Null)
    }

    fn path(s: &str) -> FieldPath {
        FieldPath::parse(s).unwrap()
    }

    /// A hand-written record, the way a concrete type would implement access.
    #[derive(Default)]
    struct Invoice {
        number: i64,
        customer: Record,
    }

    impl FieldAccess for Invoice {
        fn field_type(&self, name: &str) -> Option<ValueType> {
            match name {
                "number" => Some(ValueType::Int),
                "customer" => Some(ValueType::Record),
                _ => None,
            }
        }

        fn field(&self, name: &str) -> Option<Value> {
            match name {
                "number" => Some(Value::Int(self.number)),
                "customer" => Some(Value::Record(self.customer.clone())),
                _ => None,
            }
        }

        fn child(&self, name: &str) -> Option<&dyn FieldAccess> {
            (name == "customer").then_some(&self.customer as &dyn FieldAccess)
        }

        fn child_mut(&mut self, name: &str) -> Option<&mut dyn FieldAccess> {
            (name == "customer").then_some(&mut self.customer as &mut dyn FieldAccess)
        }

        fn set_field(&mut self, name: &str, value: Value) -> Result<(), WriteRejection> {
            match (name, value) {
                ("number", Value::Int(n)) => {
                    self.number = n;
                    Ok(())
                }
                ("number", Value::Null) => {
                    self.number = 0;
                    Ok(())
                }
                ("number", _) => Err(WriteRejection::TypeMismatch {
                    expected: ValueType::Int,
                }),
                _ => Err(WriteRejection::UnknownField),
            }
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!(path("a.b.c").segments(), ["a", "b", "c"]);
        assert_eq!(path(" name ").as_str(), "name");
        assert_eq!(FieldPath::parse(""), Err(PathResolutionError::EmptyPath));
        assert!(matches!(
            FieldPath::parse("a..b"),
            Err(PathResolutionError::EmptySegment { .. })
        ));
        assert!(matches!(
            "a.".parse::<FieldPath>(),
            Err(PathResolutionError::EmptySegment { .. })
        ));
    }

    #[test]
    fn test_set_nested_leaves_siblings() {
        let mut record = graph();
        set_value(&mut record, &path("a.b.c"), Value::Int(99)).unwrap();

        assert_eq!(get_value(&record, &path("a.b.c")).unwrap(), Value::Int(99));
        assert_eq!(get_value(&record, &path("a.b.d")).unwrap(), Value::Int(2));
        assert_eq!(
            get_value(&record, &path("a.sibling")).unwrap(),
            Value::from("keep")
        );
        assert_eq!(get_value(&record, &path("top")).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_missing_intermediate_does_not_mutate() {
        let mut record = graph();
        let before = record.clone();

        let err = set_value(&mut record, &path("a.x.c"), Value::Int(5)).unwrap_err();
        assert_eq!(
            err,
            PathResolutionError::MissingField {
                path: "a.x.c".to_string(),
                segment: "x".to_string()
            }
        );
        assert_eq!(record, before);
    }

    #[test]
    fn test_walk_through_scalar_or_null() {
        let mut record = graph();
        assert!(matches!(
            set_value(&mut record, &path("top.x"), Value::Int(1)),
            Err(PathResolutionError::NotARecord { .. })
        ));
        assert!(matches!(
            set_value(&mut record, &path("nothing.x"), Value::Int(1)),
            Err(PathResolutionError::NotARecord { .. })
        ));
    }

    #[test]
    fn test_type_mismatch_is_rejected() {
        let mut record = graph();
        let err = set_value(&mut record, &path("a.b.c"), Value::from("x")).unwrap_err();
        assert_eq!(
            err,
            PathResolutionError::TypeMismatch {
                path: "a.b.c".to_string(),
                expected: ValueType::Int,
                found: ValueType::Text,
            }
        );
    }

    #[test]
    fn test_field_type() {
        let record = graph();
        assert_eq!(field_type(&record, &path("a.b.c")).unwrap(), ValueType::Int);
        assert_eq!(field_type(&record, &path("a")).unwrap(), ValueType::Record);
        assert!(field_type(&record, &path("a.b.zzz")).is_err());
    }

    #[test]
    fn test_typed_record_through_trait() {
        let mut invoice = Invoice {
            number: 1,
            customer: Record::new().with("name", ValueType::Text, Value::Null),
        };
        set_value(&mut invoice, &path("number"), Value::Int(42)).unwrap();
        set_value(&mut invoice, &path("customer.name"), Value::from("ACME")).unwrap();

        assert_eq!(invoice.number, 42);
        assert_eq!(invoice.customer.field("name"), Some(Value::from("ACME")));
        assert!(set_value(&mut invoice, &path("total"), Value::Int(1)).is_err());
    }

    proptest! {
        #[test]
        fn prop_set_then_get(
            segments in prop::collection::vec("[a-z]{1,8}", 1..5),
            n in any::<i64>(),
        ) {
            // Build a chain of records along the generated segments
            let (last, parents) = segments.split_last().unwrap();
            let mut record = Record::new().with(last.clone(), ValueType::Int, Value::Null);
            for segment in parents.iter().rev() {
                record = Record::new().with(segment.clone(), ValueType::Record, Value::Record(record));
            }

            let path = FieldPath::parse(&segments.join(".")).unwrap();
            set_value(&mut record, &path, Value::Int(n)).unwrap();
            prop_assert_eq!(get_value(&record, &path).unwrap(), Value::Int(n));
        }
    }
}
