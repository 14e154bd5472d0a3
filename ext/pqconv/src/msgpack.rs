//! Message-pack decoding into [`ParquetValue`]s
//!
//! Decoding maps the message-pack data model onto values the table layer
//! understands. Extension types are dispatched through an
//! [`ExtensionHandlers`] registry; the default registry knows two:
//!
//! - tag `10`: an ASCII calendar date `YYYY-MM-DD`
//! - tag `-1`: the standard message-pack timestamp
//!
//! An extension without a handler fails the whole decode.

use crate::error::DecodeError;
use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use pqconv_core::ParquetValue;
use rmpv::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Extension type carrying an ASCII `YYYY-MM-DD` date
pub const DATE_EXT_TYPE: i8 = 10;

/// Extension type reserved for message-pack timestamps
pub const TIMESTAMP_EXT_TYPE: i8 = -1;

const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Decodes the raw payload of one extension type
pub type ExtensionHandler = fn(&[u8]) -> Result<ParquetValue, DecodeError>;

/// Registry of extension decoders keyed by extension type
#[derive(Clone)]
pub struct ExtensionHandlers {
    handlers: HashMap<i8, ExtensionHandler>,
}

impl fmt::Debug for ExtensionHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<i8> = self.handlers.keys().copied().collect();
        types.sort_unstable();
        f.debug_struct("ExtensionHandlers")
            .field("types", &types)
            .finish()
    }
}

impl Default for ExtensionHandlers {
    fn default() -> Self {
        Self::empty()
            .with_handler(DATE_EXT_TYPE, decode_date)
            .with_handler(TIMESTAMP_EXT_TYPE, decode_timestamp)
    }
}

impl ExtensionHandlers {
    /// A registry that rejects every extension type
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register (or replace) the handler for `ext_type`
    pub fn with_handler(mut self, ext_type: i8, handler: ExtensionHandler) -> Self {
        self.handlers.insert(ext_type, handler);
        self
    }

    pub fn get(&self, ext_type: i8) -> Option<ExtensionHandler> {
        self.handlers.get(&ext_type).copied()
    }

    fn decode(&self, ext_type: i8, payload: &[u8]) -> Result<ParquetValue, DecodeError> {
        let handler = self
            .get(ext_type)
            .ok_or(DecodeError::UnknownExtension(ext_type))?;
        handler(payload)
    }
}

/// Decode exactly one message-pack value with the default extension handlers
pub fn decode_msgpack(data: &[u8]) -> Result<ParquetValue, DecodeError> {
    decode_msgpack_with(data, &ExtensionHandlers::default())
}

/// Decode exactly one message-pack value with a caller-supplied registry
pub fn decode_msgpack_with(
    data: &[u8],
    handlers: &ExtensionHandlers,
) -> Result<ParquetValue, DecodeError> {
    let mut remaining = data;
    let value = rmpv::decode::read_value(&mut remaining)?;
    if !remaining.is_empty() {
        return Err(DecodeError::TrailingBytes(remaining.len()));
    }

    let decoded = convert_value(value, handlers)?;
    debug!(
        "Decoded {} bytes of message-pack into a {}",
        data.len(),
        decoded.type_name()
    );
    Ok(decoded)
}

fn convert_value(value: Value, handlers: &ExtensionHandlers) -> Result<ParquetValue, DecodeError> {
    match value {
        Value::Nil => Ok(ParquetValue::Null),
        Value::Boolean(b) => Ok(ParquetValue::Boolean(b)),
        // Every message-pack integer fits one of i64 or u64
        Value::Integer(i) => Ok(match i.as_i64() {
            Some(v) => ParquetValue::Int64(v),
            None => ParquetValue::UInt64(i.as_u64().unwrap_or(u64::MAX)),
        }),
        Value::F32(f) => Ok(ParquetValue::Float64(OrderedFloat(f as f64))),
        Value::F64(f) => Ok(ParquetValue::Float64(OrderedFloat(f))),
        Value::String(s) => s
            .into_str()
            .map(|s| ParquetValue::String(Arc::from(s)))
            .ok_or(DecodeError::InvalidUtf8),
        Value::Binary(b) => Ok(ParquetValue::Bytes(b.into())),
        Value::Array(items) => items
            .into_iter()
            .map(|item| convert_value(item, handlers))
            .collect::<Result<Vec<_>, _>>()
            .map(ParquetValue::List),
        Value::Map(entries) => convert_map(entries, handlers),
        Value::Ext(ext_type, payload) => handlers.decode(ext_type, &payload),
    }
}

/// Maps keyed only by strings become records; anything else stays a map
fn convert_map(
    entries: Vec<(Value, Value)>,
    handlers: &ExtensionHandlers,
) -> Result<ParquetValue, DecodeError> {
    if entries.iter().all(|(key, _)| key.is_str()) {
        let mut fields = IndexMap::with_capacity(entries.len());
        for (key, value) in entries {
            let Value::String(name) = key else { continue };
            let name = name.into_str().ok_or(DecodeError::InvalidUtf8)?;
            fields.insert(Arc::from(name), convert_value(value, handlers)?);
        }
        return Ok(ParquetValue::Record(fields));
    }

    entries
        .into_iter()
        .map(|(key, value)| Ok((convert_value(key, handlers)?, convert_value(value, handlers)?)))
        .collect::<Result<Vec<_>, DecodeError>>()
        .map(ParquetValue::Map)
}

/// Decode an ASCII `YYYY-MM-DD` payload into a `Date32`
pub fn decode_date(payload: &[u8]) -> Result<ParquetValue, DecodeError> {
    let text = String::from_utf8_lossy(payload);
    let invalid = |reason: String| DecodeError::InvalidDate {
        payload: text.to_string(),
        reason,
    };

    let fields = text
        .split('-')
        .map(|field| {
            field
                .trim()
                .parse::<i64>()
                .map_err(|e| invalid(format!("'{}' is not an integer: {}", field, e)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let &[year, month, day] = fields.as_slice() else {
        return Err(invalid(format!(
            "expected year, month and day, found {} fields",
            fields.len()
        )));
    };

    let year = i16::try_from(year).map_err(|_| invalid(format!("year {} out of range", year)))?;
    let month = i8::try_from(month).map_err(|_| invalid(format!("month {} out of range", month)))?;
    let day = i8::try_from(day).map_err(|_| invalid(format!("day {} out of range", day)))?;

    ParquetValue::date(year, month, day).map_err(|e| invalid(e.to_string()))
}

/// Decode a message-pack timestamp into UTC nanoseconds since the epoch
///
/// Accepts the 32-bit (seconds), 64-bit (30-bit nanoseconds, 34-bit seconds)
/// and 96-bit (32-bit nanoseconds, signed 64-bit seconds) layouts.
pub fn decode_timestamp(payload: &[u8]) -> Result<ParquetValue, DecodeError> {
    let (seconds, nanos) = match payload.len() {
        4 => {
            let seconds = u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]);
            (seconds as i64, 0u32)
        }
        8 => {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(payload);
            let packed = u64::from_be_bytes(raw);
            ((packed & 0x3_ffff_ffff) as i64, (packed >> 34) as u32)
        }
        12 => {
            let nanos = u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]);
            let mut raw = [0u8; 8];
            raw.copy_from_slice(&payload[4..]);
            (i64::from_be_bytes(raw), nanos)
        }
        len => {
            return Err(DecodeError::InvalidTimestamp(format!(
                "unsupported payload length {}",
                len
            )))
        }
    };

    if nanos as i64 >= NANOS_PER_SECOND {
        return Err(DecodeError::InvalidTimestamp(format!(
            "nanosecond field {} exceeds one second",
            nanos
        )));
    }

    let total = seconds
        .checked_mul(NANOS_PER_SECOND)
        .and_then(|n| n.checked_add(nanos as i64))
        .ok_or_else(|| {
            DecodeError::InvalidTimestamp(format!("{} seconds is out of range", seconds))
        })?;

    Ok(ParquetValue::TimestampNanos(total, Some(Arc::from("UTC"))))
}
