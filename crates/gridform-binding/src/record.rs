//! Record access.
//!
//! ## Learning: Traits as Capability Tables
//!
//! Instead of looking properties up by name at runtime, every record type
//! implements [`FieldAccess`] and answers for the names it owns. A
//! hand-written struct matches on the name; [`Record`] looks it up in an
//! ordered map. Path walking only ever talks to the trait.

use indexmap::IndexMap;
use serde_json::{Map, Value as Json};

use crate::convert::parse_as;
use crate::value::{Value, ValueType};
use crate::SchemaError;

/// Why a record refused a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteRejection {
    /// The record has no field with that name
    UnknownField,
    /// The value does not match the field's declared type
    TypeMismatch { expected: ValueType },
}

/// Named field access for one level of an object graph.
pub trait FieldAccess {
    /// Returns the declared type of a field, or `None` if the field does not exist.
    fn field_type(&self, name: &str) -> Option<ValueType>;

    /// Returns a copy of a field's current value.
    fn field(&self, name: &str) -> Option<Value>;

    /// Returns the nested record held by a field.
    fn child(&self, name: &str) -> Option<&dyn FieldAccess>;

    /// Returns the nested record held by a field, mutably.
    fn child_mut(&mut self, name: &str) -> Option<&mut dyn FieldAccess>;

    /// Writes a field. Implementations must not coerce the value.
    fn set_field(&mut self, name: &str, value: Value) -> Result<(), WriteRejection>;
}

/// A field of a dynamic [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Declared type
    pub ty: ValueType,
    /// Current value
    pub value: Value,
}

/// A record whose shape is only known at runtime.
///
/// Field order is the declaration order, which is also the order used when
/// the record is written back out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: IndexMap<String, Field>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a field, replacing any previous declaration with the same name.
    pub fn declare(&mut self, name: impl Into<String>, ty: ValueType, value: Value) -> &mut Self {
        self.fields.insert(name.into(), Field { ty, value });
        self
    }

    /// Builder form of [`Record::declare`].
    pub fn with(mut self, name: impl Into<String>, ty: ValueType, value: Value) -> Self {
        self.declare(name, ty, value);
        self
    }

    /// Returns a field by name.
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    /// Reads a record from its JSON file form.
    ///
    /// Every field is an object with a `type` and an optional `value`:
    ///
    /// ```json
    /// { "born": { "type": "date", "value": "1990-04-02" } }
    /// ```
    pub fn from_json(json: &Json) -> Result<Self, SchemaError> {
        Self::from_json_at(json, "")
    }

    fn from_json_at(json: &Json, at: &str) -> Result<Self, SchemaError> {
        let object = json
            .as_object()
            .ok_or_else(|| SchemaError::NotAnObject(display_path(at)))?;

        let mut record = Record::new();
        for (name, entry) in object {
            let path = if at.is_empty() {
                name.clone()
            } else {
                format!("{at}.{name}")
            };
            let entry = entry
                .as_object()
                .ok_or_else(|| SchemaError::NotAnObject(path.clone()))?;
            let ty_name = entry
                .get("type")
                .and_then(Json::as_str)
                .ok_or_else(|| SchemaError::MissingType { field: path.clone() })?;
            let ty = ValueType::from_name(ty_name).ok_or_else(|| SchemaError::UnknownType {
                field: path.clone(),
                ty: ty_name.to_string(),
            })?;
            let value = match entry.get("value") {
                None | Some(Json::Null) => Value::Null,
                Some(raw) => json_to_value(raw, ty, &path)?,
            };
            record.declare(name.clone(), ty, value);
        }
        Ok(record)
    }

    /// Writes the record in the same form [`Record::from_json`] reads.
    pub fn to_json(&self) -> Json {
        let mut object = Map::new();
        for (name, field) in &self.fields {
            let mut entry = Map::new();
            entry.insert("type".to_string(), Json::from(field.ty.as_str()));
            entry.insert("value".to_string(), value_to_json(&field.value));
            object.insert(name.clone(), Json::Object(entry));
        }
        Json::Object(object)
    }
}

impl FieldAccess for Record {
    fn field_type(&self, name: &str) -> Option<ValueType> {
        self.fields.get(name).map(|f| f.ty)
    }

    fn field(&self, name: &str) -> Option<Value> {
        self.fields.get(name).map(|f| f.value.clone())
    }

    fn child(&self, name: &str) -> Option<&dyn FieldAccess> {
        self.fields
            .get(name)
            .and_then(|f| f.value.as_record())
            .map(|r| r as &dyn FieldAccess)
    }

    fn child_mut(&mut self, name: &str) -> Option<&mut dyn FieldAccess> {
        self.fields
            .get_mut(name)
            .and_then(|f| f.value.as_record_mut())
            .map(|r| r as &mut dyn FieldAccess)
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<(), WriteRejection> {
        let field = self
            .fields
            .get_mut(name)
            .ok_or(WriteRejection::UnknownField)?;
        if !value.fits(field.ty) {
            return Err(WriteRejection::TypeMismatch { expected: field.ty });
        }
        field.value = value;
        Ok(())
    }
}

fn display_path(at: &str) -> String {
    if at.is_empty() {
        "<root>".to_string()
    } else {
        at.to_string()
    }
}

fn json_to_value(raw: &Json, ty: ValueType, path: &str) -> Result<Value, SchemaError> {
    let invalid = || SchemaError::InvalidValue {
        field: path.to_string(),
        expected: ty,
    };
    let value = match ty {
        ValueType::Bool => Value::Bool(raw.as_bool().ok_or_else(invalid)?),
        ValueType::Int => Value::Int(raw.as_i64().ok_or_else(invalid)?),
        ValueType::Float => Value::Float(raw.as_f64().ok_or_else(invalid)?),
        ValueType::Text => Value::Text(raw.as_str().ok_or_else(invalid)?.to_string()),
        ValueType::Date | ValueType::DateTime | ValueType::Time => {
            let text = raw.as_str().ok_or_else(invalid)?;
            match parse_as(text, ty) {
                Some(Ok(value)) => value,
                _ => return Err(invalid()),
            }
        }
        ValueType::Record => Value::Record(Record::from_json_at(raw, path)?),
        ValueType::Opaque => Value::Text(raw.to_string()),
    };
    Ok(value)
}

fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(v) => Json::from(*v),
        Value::Int(v) => Json::from(*v),
        Value::Float(v) => Json::from(*v),
        Value::Text(v) => Json::from(v.as_str()),
        Value::Record(record) => record.to_json(),
        Value::Date(_) | Value::DateTime(_) | Value::Time(_) => Json::from(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_field_checks_declared_type() {
        let mut record = Record::new().with("age", ValueType::Int, Value::Null);
        assert_eq!(record.set_field("age", Value::Int(41)), Ok(()));
        assert_eq!(
            record.set_field("age", Value::from("41")),
            Err(WriteRejection::TypeMismatch {
                expected: ValueType::Int
            })
        );
        assert_eq!(record.set_field("age", Value::Null), Ok(()));
        assert_eq!(
            record.set_field("height", Value::Int(1)),
            Err(WriteRejection::UnknownField)
        );
    }

    #[test]
    fn test_child_only_for_records() {
        let record = Record::new()
            .with("inner", ValueType::Record, Value::Record(Record::new()))
            .with("empty", ValueType::Record, Value::Null)
            .with("n", ValueType::Int, Value::Int(1));
        assert!(record.child("inner").is_some());
        assert!(record.child("empty").is_none());
        assert!(record.child("n").is_none());
    }

    #[test]
    fn test_from_json() {
        let json = json!({
            "id": { "type": "int", "value": 7 },
            "born": { "type": "date", "value": "1990-04-02" },
            "note": { "type": "text" },
            "address": {
                "type": "record",
                "value": { "city": { "type": "text", "value": "Faro" } }
            }
        });
        let record = Record::from_json(&json).unwrap();
        assert_eq!(record.len(), 4);
        assert_eq!(record.field("id"), Some(Value::Int(7)));
        assert_eq!(record.field("note"), Some(Value::Null));
        let names: Vec<_> = record.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["id", "born", "note", "address"]);
        assert_eq!(
            record.child("address").and_then(|a| a.field("city")),
            Some(Value::from("Faro"))
        );
        assert_eq!(Record::from_json(&record.to_json()).unwrap(), record);
    }

    #[test]
    fn test_from_json_rejects_bad_values() {
        let json = json!({ "born": { "type": "date", "value": "yesterday" } });
        assert!(matches!(
            Record::from_json(&json),
            Err(SchemaError::InvalidValue { .. })
        ));

        let json = json!({ "x": { "type": "decimal", "value": 1 } });
        assert!(matches!(
            Record::from_json(&json),
            Err(SchemaError::UnknownType { .. })
        ));

        let json = json!({ "x": { "value": 1 } });
        assert!(matches!(
            Record::from_json(&json),
            Err(SchemaError::MissingType { .. })
        ));
    }
}
