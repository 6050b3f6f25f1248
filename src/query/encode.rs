//! Order-preserving string encodings of typed literals.
//!
//! Range queries compare index terms lexicographically, so numbers and
//! dates are encoded such that string order equals value order. Errors
//! are returned as plain reasons; the caller attaches the predicate node.

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};

use crate::dictionary::DataType;
use crate::query::predicate::Value;

/// Encode a 64-bit integer as a sign-shifted, zero-padded decimal.
pub fn encode_long(value: i64) -> String {
    let shifted = (value as i128) - (i64::MIN as i128);
    format!("{shifted:020}")
}

/// Encode a double as the hex of its order-preserving bit pattern.
pub fn encode_double(value: f64) -> String {
    let bits = value.to_bits();
    let sortable = if bits >> 63 == 1 { !bits } else { bits | (1 << 63) };
    format!("{sortable:016x}")
}

/// Encode an instant as UTC RFC 3339 with millisecond precision.
pub fn encode_datetime(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(value) = DateTime::parse_from_rfc3339(text) {
        return Some(value.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Int(v) => Some(*v),
        Value::Text(text) | Value::Id(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Float(v) => Some(*v),
        Value::Int(v) => Some(*v as f64),
        Value::Text(text) | Value::Id(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// The plain text of a literal, used for analyzed and identifier fields.
pub fn literal_text(value: &Value) -> String {
    match value {
        Value::Text(text) | Value::Id(text) => text.clone(),
        Value::Int(v) => v.to_string(),
        Value::Float(v) => v.to_string(),
        Value::Bool(v) => v.to_string(),
        Value::DateTime(v) => encode_datetime(v),
    }
}

/// Encode `value` as an index term for a property of `data_type`.
pub fn encode_literal(data_type: DataType, value: &Value) -> std::result::Result<String, String> {
    let mismatch = || format!("literal {value} does not fit a {data_type} property");
    match data_type {
        DataType::Int => {
            let v = as_i64(value).ok_or_else(mismatch)?;
            if i32::try_from(v).is_err() {
                return Err(format!("literal {value} is out of range for an int property"));
            }
            Ok(encode_long(v))
        }
        DataType::Long => as_i64(value).map(encode_long).ok_or_else(mismatch),
        DataType::Float | DataType::Double => {
            let v = as_f64(value).ok_or_else(mismatch)?;
            if v.is_nan() {
                return Err(format!("literal {value} is not a number"));
            }
            Ok(encode_double(v))
        }
        DataType::Boolean => match value {
            Value::Bool(v) => Ok(v.to_string()),
            Value::Text(text) if text.eq_ignore_ascii_case("true") => Ok("true".to_string()),
            Value::Text(text) if text.eq_ignore_ascii_case("false") => Ok("false".to_string()),
            _ => Err(mismatch()),
        },
        DataType::Date => {
            let v = match value {
                Value::DateTime(v) => *v,
                Value::Text(text) => parse_datetime(text).ok_or_else(mismatch)?,
                _ => return Err(mismatch()),
            };
            Ok(encode_datetime(&v.date_naive().and_time(NaiveTime::MIN).and_utc()))
        }
        DataType::DateTime => match value {
            Value::DateTime(v) => Ok(encode_datetime(v)),
            Value::Text(text) => parse_datetime(text)
                .map(|v| encode_datetime(&v))
                .ok_or_else(mismatch),
            _ => Err(mismatch()),
        },
        DataType::Id | DataType::Text | DataType::MlText | DataType::Content => match value {
            Value::Bool(_) | Value::DateTime(_) if data_type == DataType::Id => Err(mismatch()),
            _ => Ok(literal_text(value)),
        },
    }
}
