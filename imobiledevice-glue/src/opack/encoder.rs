/*!
 Serializes [`plist::Value`] trees into `OPACK` bytes.
*/

use plist::Value;

use crate::{
    error::opack::OpackError,
    opack::{
        f32_to_wire, f64_to_wire, DATA_LEN, DATE, FALSE, FLOAT32, FLOAT64, INT_U32, INT_U64,
        INT_U8, MAX_DEPTH, OPEN_ARRAY, OPEN_DICT, SHORT_ARRAY, SHORT_CONTAINER_MAX, SHORT_DATA,
        SHORT_DICT, SHORT_INLINE_MAX, SHORT_STRING, SMALL_INT, SMALL_INT_MAX, STRING_LEN,
        TERMINATOR, TRUE,
    },
    util::{
        dates::{lossy_apple_seconds, to_apple_seconds},
        plist::{integer_bits, kind_name},
    },
};

/// Encode a property list tree as `OPACK` data
///
/// Fails if the tree contains a node kind that `OPACK` cannot express, such as a [`plist::Uid`].
pub fn encode(value: &Value) -> Result<Vec<u8>, OpackError> {
    let mut out = Vec::new();
    write_value(value, &mut out, 0)?;
    Ok(out)
}

fn write_value(value: &Value, out: &mut Vec<u8>, depth: usize) -> Result<(), OpackError> {
    if depth > MAX_DEPTH {
        return Err(OpackError::RecursionLimit(MAX_DEPTH));
    }
    match value {
        Value::Boolean(true) => out.push(TRUE),
        Value::Boolean(false) => out.push(FALSE),
        Value::Integer(_) => {
            let bits = integer_bits(value).ok_or(OpackError::UnsupportedType("integer"))?;
            write_uint(bits, out);
        }
        Value::Real(real) => write_real(*real, out),
        Value::Date(date) => {
            let seconds = to_apple_seconds(date)
                .ok_or_else(|| OpackError::InvalidDate(lossy_apple_seconds(date)))?;
            out.push(DATE);
            out.extend_from_slice(&f64_to_wire(seconds));
        }
        Value::String(string) => {
            write_length_header(string.len() as u64, SHORT_STRING, STRING_LEN, out);
            out.extend_from_slice(string.as_bytes());
        }
        Value::Data(data) => {
            write_length_header(data.len() as u64, SHORT_DATA, DATA_LEN, out);
            out.extend_from_slice(data);
        }
        Value::Array(items) => {
            let open = write_container_header(items.len(), SHORT_ARRAY, OPEN_ARRAY, out);
            for item in items {
                write_value(item, out, depth + 1)?;
            }
            if open {
                out.push(TERMINATOR);
            }
        }
        Value::Dictionary(dict) => {
            let open = write_container_header(dict.len(), SHORT_DICT, OPEN_DICT, out);
            for (key, item) in dict {
                write_length_header(key.len() as u64, SHORT_STRING, STRING_LEN, out);
                out.extend_from_slice(key.as_bytes());
                write_value(item, out, depth + 1)?;
            }
            if open {
                out.push(TERMINATOR);
            }
        }
        other => return Err(OpackError::UnsupportedType(kind_name(other))),
    }
    Ok(())
}

/// Write an integer using the narrowest of the inline, 1, 4, or 8 byte forms
fn write_uint(value: u64, out: &mut Vec<u8>) {
    if value <= SMALL_INT_MAX {
        out.push(SMALL_INT + value as u8);
    } else if value <= u8::MAX as u64 {
        out.push(INT_U8);
        out.push(value as u8);
    } else if value <= u32::MAX as u64 {
        out.push(INT_U32);
        out.extend_from_slice(&(value as u32).to_le_bytes());
    } else {
        out.push(INT_U64);
        out.extend_from_slice(&value.to_le_bytes());
    }
}

/// Reals that survive a trip through [`f32`] are stored in 4 bytes
fn write_real(value: f64, out: &mut Vec<u8>) {
    let single = value as f32;
    if single as f64 == value {
        out.push(FLOAT32);
        out.extend_from_slice(&f32_to_wire(single));
    } else {
        out.push(FLOAT64);
        out.extend_from_slice(&f64_to_wire(value));
    }
}

/// Write the tag and length prefix for a string or data payload of `len` bytes
pub(crate) fn write_length_header(len: u64, short_tag: u8, sized_tag: u8, out: &mut Vec<u8>) {
    if len <= SHORT_INLINE_MAX as u64 {
        out.push(short_tag + len as u8);
    } else if len <= u8::MAX as u64 {
        out.push(sized_tag);
        out.push(len as u8);
    } else if len <= u16::MAX as u64 {
        out.push(sized_tag + 1);
        out.extend_from_slice(&(len as u16).to_le_bytes());
    } else if len <= u32::MAX as u64 {
        out.push(sized_tag + 2);
        out.extend_from_slice(&(len as u32).to_le_bytes());
    } else {
        out.push(sized_tag + 3);
        out.extend_from_slice(&len.to_le_bytes());
    }
}

/// Write the tag for a container, returning `true` if the children must be followed by a terminator
fn write_container_header(count: usize, short_tag: u8, open_tag: u8, out: &mut Vec<u8>) -> bool {
    if count <= SHORT_CONTAINER_MAX {
        out.push(short_tag + count as u8);
        false
    } else {
        out.push(open_tag);
        true
    }
}
