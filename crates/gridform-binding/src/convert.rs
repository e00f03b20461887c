//! Raw input to typed value conversion.
//!
//! ## Policy
//!
//! 1. Blank input clears the field.
//! 2. `week` and `month` inputs use their own parsers, and malformed input
//!    is an error the caller has to deal with.
//! 3. Everything else goes through the parser for the field's declared
//!    type. A type without a parser discards the input; a parser that fails
//!    clears the field instead of reporting an error.
//!
//! Rules 2 and 3 must stay separate: calendar errors surface, generic
//! errors clear.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::calendar::{parse_iso_week, parse_month};
use crate::path::{FieldPath, field_type, set_value};
use crate::record::FieldAccess;
use crate::value::{Value, ValueType};
use crate::{BindingResult, ConversionError};

/// The semantic type of the input control that produced the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputHint {
    Week,
    Month,
    /// Any other input type (`text`, `number`, `date`, ...)
    Other(String),
}

impl InputHint {
    /// Parses an input type attribute. Unknown or absent hints fall through
    /// to the generic converter.
    pub fn parse(hint: Option<&str>) -> Option<Self> {
        let hint = hint?.trim();
        let parsed = match hint.to_ascii_lowercase().as_str() {
            "" => return None,
            "week" => InputHint::Week,
            "month" => InputHint::Month,
            _ => InputHint::Other(hint.to_string()),
        };
        Some(parsed)
    }
}

/// What to do with the field after converting its input.
#[derive(Debug, Clone, PartialEq)]
pub enum Conversion {
    /// Write this value
    Write(Value),
    /// Leave the field untouched
    Discard,
}

/// Marker for input a generic parser rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Unparsable;

/// Converts raw input text for a field declared as `target`.
pub fn convert(
    raw: &str,
    target: ValueType,
    hint: Option<&InputHint>,
) -> Result<Conversion, ConversionError> {
    if raw.trim().is_empty() {
        return Ok(Conversion::Write(Value::Null));
    }

    match hint {
        Some(InputHint::Week) => {
            let date = parse_iso_week(raw)?;
            Ok(Conversion::Write(calendar_value(date, target)))
        }
        Some(InputHint::Month) => {
            let date = parse_month(raw)?;
            Ok(Conversion::Write(calendar_value(date, target)))
        }
        _ => match parse_as(raw, target) {
            None => {
                tracing::debug!(ty = %target, "No converter for field type, input discarded");
                Ok(Conversion::Discard)
            }
            Some(Ok(value)) => Ok(Conversion::Write(value)),
            Some(Err(Unparsable)) => {
                tracing::debug!(ty = %target, input = raw, "Input did not parse, clearing field");
                Ok(Conversion::Write(Value::Null))
            }
        },
    }
}

/// Converts `raw` for the field at `path` and writes the result.
///
/// The target type is the field's declared type. Path errors and calendar
/// conversion errors propagate; everything else is absorbed by [`convert`].
pub fn bind_input(
    record: &mut dyn FieldAccess,
    path: &FieldPath,
    raw: &str,
    hint: Option<&str>,
) -> BindingResult<()> {
    let target = field_type(record, path)?;
    let hint = InputHint::parse(hint);

    match convert(raw, target, hint.as_ref())? {
        Conversion::Write(value) => set_value(record, path, value)?,
        Conversion::Discard => {}
    }
    Ok(())
}

/// Week and month inputs always name a day; widen it when the field wants a timestamp.
fn calendar_value(date: NaiveDate, target: ValueType) -> Value {
    match target {
        ValueType::DateTime => Value::DateTime(date.and_time(NaiveTime::MIN)),
        _ => Value::Date(date),
    }
}

/// Looks up and runs the generic parser for `ty`.
///
/// Returns `None` when the type has no text form.
pub(crate) fn parse_as(raw: &str, ty: ValueType) -> Option<Result<Value, Unparsable>> {
    let text = raw.trim();
    let parsed = match ty {
        ValueType::Bool => parse_bool(text).map(Value::Bool),
        ValueType::Int => text.parse().map(Value::Int).map_err(|_| Unparsable),
        ValueType::Float => text.parse().map(Value::Float).map_err(|_| Unparsable),
        ValueType::Text => Ok(Value::Text(raw.to_string())),
        ValueType::Date => parse_date(text).map(Value::Date),
        ValueType::DateTime => parse_datetime(text).map(Value::DateTime),
        ValueType::Time => parse_time(text).map(Value::Time),
        ValueType::Record | ValueType::Opaque => return None,
    };
    Some(parsed)
}

fn parse_bool(text: &str) -> Result<bool, Unparsable> {
    if text.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if text.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(Unparsable)
    }
}

fn parse_date(text: &str) -> Result<NaiveDate, Unparsable> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .or_else(|_| parse_datetime(text).map(|dt| dt.date()))
        .map_err(|_| Unparsable)
}

fn parse_datetime(text: &str) -> Result<NaiveDateTime, Unparsable> {
    const FORMATS: [&str; 5] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];

    for format in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN))
        .map_err(|_| Unparsable)
}

fn parse_time(text: &str) -> Result<NaiveTime, Unparsable> {
    NaiveTime::parse_from_str(text, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M:%S%.f"))
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .map_err(|_| Unparsable)
}
