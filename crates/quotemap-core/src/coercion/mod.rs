pub mod date;
pub mod number;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::model::CellValue;
use date::{excel_serial_to_datetime, format_iso, parse_canonical_iso, parse_date_text};
use number::{decimal_from_f64, parse_number_text};

/// Declared semantic type of a mapped field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    Number,
    Date,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::String => "string",
            DataType::Number => "number",
            DataType::Date => "date",
        };
        f.pad(name)
    }
}

/// A coerced field value as stored in a mapped record.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(Decimal),
    Date(DateTime<Utc>),
    /// Only produced when reading back persisted records; coercion never yields it.
    Bool(bool),
}

impl FieldValue {
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            FieldValue::Number(d) => Some(*d),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{s}"),
            FieldValue::Number(d) => write!(f, "{d}"),
            FieldValue::Date(dt) => write!(f, "{}", format_iso(dt)),
            FieldValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Text(s) => serializer.serialize_str(s),
            FieldValue::Number(d) => rust_decimal::serde::float::serialize(d, serializer),
            FieldValue::Date(dt) => serializer.serialize_str(&format_iso(dt)),
            FieldValue::Bool(b) => serializer.serialize_bool(*b),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match StoredValue::deserialize(deserializer)? {
            StoredValue::Bool(b) => Ok(FieldValue::Bool(b)),
            StoredValue::Number(f) => decimal_from_f64(f)
                .map(FieldValue::Number)
                .ok_or_else(|| D::Error::custom(format!("number {f} is out of range"))),
            StoredValue::Text(s) => Ok(match parse_canonical_iso(&s) {
                Some(dt) => FieldValue::Date(dt),
                None => FieldValue::Text(s),
            }),
        }
    }
}

/// Failure to convert a raw value to its declared type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoercionError {
    #[error("cannot coerce '{raw}' to number")]
    InvalidNumber { raw: String },

    #[error("cannot coerce '{raw}' to date")]
    InvalidDate { raw: String },
}

/// Coerce a raw value to the declared type.
///
/// Blank input (empty cell, whitespace-only text) yields `Ok(None)`; whether a
/// missing value is acceptable is the caller's decision. Pure and deterministic.
pub fn coerce(raw: &CellValue, data_type: DataType) -> Result<Option<FieldValue>, CoercionError> {
    if raw.is_blank() {
        return Ok(None);
    }

    let value = match data_type {
        DataType::String => FieldValue::Text(coerce_text(raw)),
        DataType::Number => FieldValue::Number(coerce_number(raw)?),
        DataType::Date => FieldValue::Date(coerce_date(raw)?),
    };
    Ok(Some(value))
}

fn coerce_text(raw: &CellValue) -> String {
    match raw {
        CellValue::DateTime(dt) => format_iso(&dt.and_utc()),
        other => other.to_string(),
    }
}

fn coerce_number(raw: &CellValue) -> Result<Decimal, CoercionError> {
    let parsed = match raw {
        CellValue::Text(s) => parse_number_text(s),
        CellValue::Number(f) => decimal_from_f64(*f),
        _ => None,
    };
    parsed.ok_or_else(|| CoercionError::InvalidNumber {
        raw: raw.to_string(),
    })
}

fn coerce_date(raw: &CellValue) -> Result<DateTime<Utc>, CoercionError> {
    let parsed = match raw {
        CellValue::Text(s) => parse_date_text(s),
        CellValue::DateTime(dt) => Some(dt.and_utc()),
        CellValue::Number(serial) => excel_serial_to_datetime(*serial),
        _ => None,
    };
    parsed.ok_or_else(|| CoercionError::InvalidDate {
        raw: raw.to_string(),
    })
}
