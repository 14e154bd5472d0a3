use crate::{ParquetError, Result};
use bytes::Bytes;
use indexmap::IndexMap;
use jiff::{civil::Date, tz::TimeZone, Timestamp};
use ordered_float::OrderedFloat;
use std::fmt;
use std::sync::Arc;

const SECONDS_PER_DAY: i64 = 86_400;

/// A single decoded cell value, prior to any column type being declared
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParquetValue {
    // Scalars
    Boolean(bool),
    Int64(i64),
    UInt64(u64), // only used for integers above i64::MAX
    Float64(OrderedFloat<f64>),
    String(Arc<str>),
    Bytes(Bytes),

    // Date/Time types
    Date32(i32), // Days since epoch

    // Timestamps since epoch with optional timezone
    TimestampMicros(i64, Option<Arc<str>>),
    TimestampNanos(i64, Option<Arc<str>>),

    // Complex types
    List(Vec<ParquetValue>),
    Map(Vec<(ParquetValue, ParquetValue)>), // Using Vec of tuples for deterministic ordering
    Record(IndexMap<Arc<str>, ParquetValue>), // String keyed, preserves field order

    // Null value
    Null,
}

impl std::hash::Hash for ParquetValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            ParquetValue::Boolean(b) => b.hash(state),
            ParquetValue::Int64(i) => i.hash(state),
            ParquetValue::UInt64(i) => i.hash(state),
            ParquetValue::Float64(f) => f.hash(state),
            ParquetValue::String(s) => s.hash(state),
            ParquetValue::Bytes(b) => b.hash(state),
            ParquetValue::Date32(d) => d.hash(state),
            ParquetValue::TimestampMicros(ts, tz) | ParquetValue::TimestampNanos(ts, tz) => {
                ts.hash(state);
                tz.hash(state);
            }
            ParquetValue::List(l) => l.hash(state),
            ParquetValue::Map(m) => m.hash(state),
            ParquetValue::Record(r) => {
                // IndexMap preserves insertion order, so hash is deterministic
                for (k, v) in r {
                    k.hash(state);
                    v.hash(state);
                }
            }
            ParquetValue::Null => 0_i32.hash(state),
        }
    }
}

impl ParquetValue {
    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, ParquetValue::Null)
    }

    /// Get the type name of the value
    pub fn type_name(&self) -> &'static str {
        match self {
            ParquetValue::Boolean(_) => "Boolean",
            ParquetValue::Int64(_) => "Int64",
            ParquetValue::UInt64(_) => "UInt64",
            ParquetValue::Float64(_) => "Float64",
            ParquetValue::String(_) => "String",
            ParquetValue::Bytes(_) => "Bytes",
            ParquetValue::Date32(_) => "Date32",
            ParquetValue::TimestampMicros(_, _) => "TimestampMicros",
            ParquetValue::TimestampNanos(_, _) => "TimestampNanos",
            ParquetValue::List(_) => "List",
            ParquetValue::Map(_) => "Map",
            ParquetValue::Record(_) => "Record",
            ParquetValue::Null => "Null",
        }
    }

    /// Build a `Date32` from calendar fields, rejecting impossible dates
    pub fn date(year: i16, month: i8, day: i8) -> Result<Self> {
        let date = Date::new(year, month, day)
            .map_err(|e| ParquetError::conversion(format!("Invalid date: {}", e)))?;
        let seconds = date
            .to_zoned(TimeZone::UTC)
            .map_err(|e| ParquetError::conversion(format!("Invalid date: {}", e)))?
            .timestamp()
            .as_second();
        let days = i32::try_from(seconds.div_euclid(SECONDS_PER_DAY))
            .map_err(|_| ParquetError::conversion("Date out of range"))?;
        Ok(ParquetValue::Date32(days))
    }

    /// Calendar date for a `Date32` day count
    pub fn civil_date(days: i32) -> Result<Date> {
        let ts = Timestamp::from_second(days as i64 * SECONDS_PER_DAY)
            .map_err(|e| ParquetError::conversion(format!("Date out of range: {}", e)))?;
        Ok(ts.to_zoned(TimeZone::UTC).date())
    }

    /// Render this value as JSON, coercing anything JSON cannot carry to its
    /// string form.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            ParquetValue::Null => Json::Null,
            ParquetValue::Boolean(b) => Json::Bool(*b),
            ParquetValue::Int64(i) => Json::from(*i),
            ParquetValue::UInt64(u) => Json::from(*u),
            ParquetValue::Float64(OrderedFloat(f)) => serde_json::Number::from_f64(*f)
                .map(Json::Number)
                .unwrap_or_else(|| Json::String(f.to_string())),
            ParquetValue::String(s) => Json::String(s.to_string()),
            ParquetValue::List(items) => Json::Array(items.iter().map(|v| v.to_json()).collect()),
            ParquetValue::Record(fields) => Json::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_json()))
                    .collect(),
            ),
            ParquetValue::Map(entries) => Json::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_json()))
                    .collect(),
            ),
            other => Json::String(other.to_string()),
        }
    }
}

impl fmt::Display for ParquetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParquetValue::Null => f.write_str("null"),
            ParquetValue::Boolean(b) => write!(f, "{}", b),
            ParquetValue::Int64(i) => write!(f, "{}", i),
            ParquetValue::UInt64(u) => write!(f, "{}", u),
            ParquetValue::Float64(OrderedFloat(v)) => write!(f, "{}", v),
            ParquetValue::String(s) => f.write_str(s),
            ParquetValue::Bytes(b) => write!(f, "b'{}'", b.escape_ascii()),
            ParquetValue::Date32(days) => match ParquetValue::civil_date(*days) {
                Ok(date) => write!(f, "{}", date),
                Err(_) => write!(f, "Date32({})", days),
            },
            ParquetValue::TimestampMicros(ts, _) => match Timestamp::from_microsecond(*ts) {
                Ok(ts) => write!(f, "{}", ts),
                Err(_) => write!(f, "TimestampMicros({})", ts),
            },
            ParquetValue::TimestampNanos(ts, _) => {
                match Timestamp::from_nanosecond(*ts as i128) {
                    Ok(ts) => write!(f, "{}", ts),
                    Err(_) => write!(f, "TimestampNanos({})", ts),
                }
            }
            // Nested values render as their JSON form
            ParquetValue::List(_) | ParquetValue::Map(_) | ParquetValue::Record(_) => {
                write!(f, "{}", self.to_json())
            }
        }
    }
}
