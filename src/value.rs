//! Untyped wire values and their coercions into typed scalars.
//!
//! rTorrent encodes scalars inconsistently: the same field may arrive as an
//! integer, a double, or a string depending on the server version and
//! configuration. Every coercion here therefore accepts the whole [`Value`]
//! union and fails on representations the target type cannot absorb, rather
//! than asserting a single expected shape.

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};

/// A decoded XML-RPC value as handed over by the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i32),
    Long(i64),
    Double(f64),
    Text(String),
    List(Vec<Value>),
}

impl Value {
    /// Coerce into a bool.
    ///
    /// Integers and doubles are `true` iff they equal exactly 1 (not merely
    /// nonzero); text goes through Rust's canonical bool parser, so only
    /// `"true"` and `"false"` are accepted.
    pub fn to_bool(&self) -> Result<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            Value::Int(v) => Ok(*v == 1),
            Value::Long(v) => Ok(*v == 1),
            Value::Double(v) => Ok(*v == 1.0),
            Value::Text(s) => s.parse::<bool>().map_err(|_| Error::BadData),
            Value::List(_) => Err(Error::BadData),
        }
    }

    /// Coerce into an integer.
    ///
    /// Doubles truncate toward zero. Text is parsed as a base-10 literal and
    /// a malformed literal surfaces the underlying parse error, unlike the
    /// other coercions which normalize their failures to [`Error::BadData`].
    pub fn to_int(&self) -> Result<i64> {
        match self {
            Value::Int(v) => Ok(i64::from(*v)),
            Value::Long(v) => Ok(*v),
            Value::Double(v) => Ok(*v as i64),
            Value::Text(s) => Ok(s.parse::<i64>()?),
            _ => Err(Error::BadData),
        }
    }

    /// Coerce into a UTC timestamp, interpreting the value as seconds since
    /// the epoch. Fractional seconds truncate.
    pub fn to_timestamp(&self) -> Result<DateTime<Utc>> {
        let secs = match self {
            Value::Int(v) => i64::from(*v),
            Value::Long(v) => *v,
            Value::Double(v) => *v as i64,
            Value::Text(s) => s.parse::<i64>().map_err(|_| Error::BadData)?,
            _ => return Err(Error::BadData),
        };
        DateTime::from_timestamp(secs, 0).ok_or(Error::BadData)
    }

    /// Coerce into text. Strict narrowing: numbers and booleans are not
    /// stringified.
    pub fn to_text(&self) -> Result<String> {
        match self {
            Value::Text(s) => Ok(s.clone()),
            _ => Err(Error::BadData),
        }
    }
}
