//! Request-boundary schemas.
//!
//! Each insert and patch payload declares its fields as a static [`Field`]
//! table mirroring the table constraints. [`parse`] checks the raw JSON
//! against that table, collecting every failing field, and only then hands
//! the object to serde for the typed conversion.

use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::str::FromStr;

/// Fields the server owns; API input may never set them
pub const SYSTEM_FIELDS: &[&str] = &["id", "createdAt", "updatedAt"];

/// Largest amount a NUMERIC(10, 2) column holds
const MAX_MONEY: i64 = 100_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Text,
    Email,
    Integer { min: i64, max: i64 },
    /// Calendar date, `YYYY-MM-DD`
    Date,
    /// Zero-padded 24-hour `HH:MM`
    Time,
    /// RFC 3339 timestamp
    Timestamp,
    /// Positive fixed-point amount with at most two fractional digits
    Money,
    Boolean,
    OneOf(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Must be supplied on insert, never null
    Required,
    /// May be omitted on insert (the column has a default), never null
    Defaulted,
    /// May be omitted or null
    Nullable,
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub kind: Kind,
    pub presence: Presence,
}

impl Field {
    pub const fn required(name: &'static str, kind: Kind) -> Self {
        Self { name, kind, presence: Presence::Required }
    }

    pub const fn defaulted(name: &'static str, kind: Kind) -> Self {
        Self { name, kind, presence: Presence::Defaulted }
    }

    pub const fn nullable(name: &'static str, kind: Kind) -> Self {
        Self { name, kind, presence: Presence::Nullable }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Insert,
    Patch,
}

/// Field-level validation failures, keyed by the JSON field name
#[derive(Debug, Clone, Default, PartialEq, thiserror::Error)]
#[error("validation failed for {} field(s)", .0.len())]
pub struct ValidationErrors(pub HashMap<String, String>);

impl ValidationErrors {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// A payload type with a declared field table
pub trait Schema: DeserializeOwned {
    const FIELDS: &'static [Field];
    const MODE: Mode;

    /// Cross-field rules, run after the typed conversion succeeded
    fn check_rules(&self, _errors: &mut ValidationErrors) {}
}

/// Validate `payload` against `T`'s field table and convert it
pub fn parse<T: Schema>(payload: Value) -> Result<T, ValidationErrors> {
    check(&payload, T::FIELDS, T::MODE)?;

    let parsed: T = serde_json::from_value(payload)
        .map_err(|e| ValidationErrors::single("body", e.to_string()))?;

    let mut errors = ValidationErrors::default();
    parsed.check_rules(&mut errors);
    errors.into_result()?;

    Ok(parsed)
}

/// Check a raw JSON body against a field table without converting it
pub fn check(payload: &Value, fields: &[Field], mode: Mode) -> Result<(), ValidationErrors> {
    let object = match payload {
        Value::Object(map) => map,
        _ => return Err(ValidationErrors::single("body", "expected a JSON object")),
    };

    let mut errors = ValidationErrors::default();

    for key in object.keys() {
        if SYSTEM_FIELDS.contains(&key.as_str()) {
            errors.add(key, "is managed by the server and cannot be set");
        } else if !fields.iter().any(|f| f.name == key) {
            errors.add(key, "is not a recognised field");
        }
    }

    for field in fields {
        check_field(object, field, mode, &mut errors);
    }

    if mode == Mode::Patch && errors.is_empty() && !fields.iter().any(|f| object.contains_key(f.name)) {
        errors.add("body", "no fields to update");
    }

    errors.into_result()
}

fn check_field(object: &Map<String, Value>, field: &Field, mode: Mode, errors: &mut ValidationErrors) {
    match object.get(field.name) {
        None => {
            if mode == Mode::Insert && field.presence == Presence::Required {
                errors.add(field.name, "is required");
            }
        }
        Some(Value::Null) => match (mode, field.presence) {
            (_, Presence::Nullable) => {}
            (Mode::Insert, Presence::Required) => errors.add(field.name, "is required"),
            _ => errors.add(field.name, "cannot be null"),
        },
        Some(value) => {
            if let Err(message) = check_kind(value, field) {
                errors.add(field.name, message);
            }
        }
    }
}

fn check_kind(value: &Value, field: &Field) -> Result<(), String> {
    match field.kind {
        Kind::Text => {
            let s = expect_str(value)?;
            if field.presence != Presence::Nullable && s.trim().is_empty() {
                return Err("must not be empty".to_string());
            }
            Ok(())
        }
        Kind::Email => {
            let s = expect_str(value)?;
            match s.split_once('@') {
                Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
                _ => Err("must be a valid email address".to_string()),
            }
        }
        Kind::Integer { min, max } => {
            let n = value
                .as_i64()
                .ok_or_else(|| "must be an integer".to_string())?;
            if n < min || n > max {
                if max >= i64::from(i32::MAX) {
                    return Err(format!("must be at least {}", min));
                }
                return Err(format!("must be between {} and {}", min, max));
            }
            Ok(())
        }
        Kind::Date => {
            let s = expect_str(value)?;
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map(|_| ())
                .map_err(|_| "must be a calendar date (YYYY-MM-DD)".to_string())
        }
        Kind::Time => {
            let s = expect_str(value)?;
            parse_hhmm(s)
                .map(|_| ())
                .ok_or_else(|| "must be a 24-hour time (HH:MM)".to_string())
        }
        Kind::Timestamp => {
            let s = expect_str(value)?;
            DateTime::parse_from_rfc3339(s)
                .map(|_| ())
                .map_err(|_| "must be an RFC 3339 timestamp".to_string())
        }
        Kind::Money => {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                _ => return Err("must be a decimal amount".to_string()),
            };
            let amount = Decimal::from_str(text.trim())
                .map_err(|_| "must be a decimal amount".to_string())?;
            if amount <= Decimal::ZERO {
                return Err("must be greater than zero".to_string());
            }
            if amount.normalize().scale() > 2 {
                return Err("must have at most two decimal places".to_string());
            }
            if amount >= Decimal::from(MAX_MONEY) {
                return Err("is too large".to_string());
            }
            Ok(())
        }
        Kind::Boolean => value
            .as_bool()
            .map(|_| ())
            .ok_or_else(|| "must be a boolean".to_string()),
        Kind::OneOf(allowed) => {
            let s = expect_str(value)?;
            if allowed.contains(&s) {
                Ok(())
            } else {
                Err(format!("must be one of: {}", allowed.join(", ")))
            }
        }
    }
}

fn expect_str(value: &Value) -> Result<&str, String> {
    value.as_str().ok_or_else(|| "must be a string".to_string())
}

/// Parse a zero-padded `HH:MM` string into minutes after midnight
pub fn parse_hhmm(s: &str) -> Option<u32> {
    let bytes = s.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return None;
    }
    let digits = [bytes[0], bytes[1], bytes[3], bytes[4]];
    if !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let hours = u32::from(bytes[0] - b'0') * 10 + u32::from(bytes[1] - b'0');
    let minutes = u32::from(bytes[3] - b'0') * 10 + u32::from(bytes[4] - b'0');
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Deserialize a nullable patch field: absent stays `None`, `null` becomes `Some(None)`
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
