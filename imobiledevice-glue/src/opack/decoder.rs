/*!
 Deserializes `OPACK` bytes into [`plist::Value`] trees.
*/

use plist::{Dictionary, Value};

use crate::{
    error::opack::OpackError,
    opack::{
        f32_from_wire, f64_from_wire, DATA_LEN, DATE, FALSE, FLOAT32, FLOAT64, INT_U32, INT_U64,
        INT_U8, MAX_DEPTH, OPEN_ARRAY, OPEN_DICT, SHORT_ARRAY, SHORT_DATA, SHORT_DICT,
        SHORT_STRING, SMALL_INT, STRING_LEN, TERMINATOR, TRUE,
    },
    util::dates::from_apple_seconds,
};

/// Decode every top-level value in `bytes` into a single tree
///
/// A stream that holds several top-level values is merged the same way as [`decode_into`]
/// merges them into an empty out-node.
pub fn decode(bytes: &[u8]) -> Result<Value, OpackError> {
    let mut out = None;
    decode_into(bytes, &mut out)?;
    out.ok_or(OpackError::Empty)
}

/// Decode every top-level value in `bytes` into `out`
///
/// - If `out` is empty, it takes the first decoded value
/// - If `out` is an array, decoded arrays are appended item by item and other values are pushed
/// - If `out` is a dictionary, entries of decoded dictionaries are inserted into it
/// - Otherwise `out` is replaced
///
/// Nothing is written to `out` unless the entire stream decodes.
pub fn decode_into(bytes: &[u8], out: &mut Option<Value>) -> Result<(), OpackError> {
    let values = OpackReader::from(bytes).parse()?;
    values
        .into_iter()
        .for_each(|value| merge_top_level(out, value));
    Ok(())
}

fn merge_top_level(out: &mut Option<Value>, value: Value) {
    let value = match (out.as_mut(), value) {
        (Some(Value::Array(items)), Value::Array(more)) => {
            items.extend(more);
            return;
        }
        (Some(Value::Array(items)), other) => {
            items.push(other);
            return;
        }
        (Some(Value::Dictionary(dict)), Value::Dictionary(more)) => {
            for (key, item) in more {
                dict.insert(key, item);
            }
            return;
        }
        (_, other) => other,
    };
    *out = Some(value);
}

/// Contains logic and data used to parse data from an `OPACK` stream
#[derive(Debug)]
pub struct OpackReader<'a> {
    /// The `OPACK` data we want to parse
    stream: &'a [u8],
    /// The current index we are at in the stream
    idx: usize,
}

impl<'a> From<&'a [u8]> for OpackReader<'a> {
    fn from(stream: &'a [u8]) -> Self {
        Self { stream, idx: 0 }
    }
}

impl<'a> From<&'a Vec<u8>> for OpackReader<'a> {
    fn from(stream: &'a Vec<u8>) -> Self {
        Self::from(stream.as_slice())
    }
}

impl<'a> OpackReader<'a> {
    /// Read every top-level value in the stream, in order
    ///
    /// On failure the cursor is moved to the end of the stream.
    pub fn parse(&mut self) -> Result<Vec<Value>, OpackError> {
        let mut out_v = vec![];
        while self.idx < self.stream.len() {
            match self.read_value(0) {
                Ok(Some(value)) => out_v.push(value),
                // A stray terminator between top-level values carries no data
                Ok(None) => {}
                Err(why) => {
                    self.idx = self.stream.len();
                    return Err(why);
                }
            }
        }
        Ok(out_v)
    }

    /// The offset of the next byte to be read
    pub fn position(&self) -> usize {
        self.idx
    }

    /// Read exactly `n` bytes from the stream
    fn read_exact_bytes(&mut self, n: usize) -> Result<&'a [u8], OpackError> {
        let end = self
            .idx
            .checked_add(n)
            .ok_or(OpackError::OutOfBounds(usize::MAX, self.stream.len()))?;
        let range = self
            .stream
            .get(self.idx..end)
            .ok_or(OpackError::OutOfBounds(end, self.stream.len()))?;
        self.idx = end;
        Ok(range)
    }

    /// Read exactly `N` bytes from the stream into an array
    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], OpackError> {
        let mut bytes = [0; N];
        bytes.copy_from_slice(self.read_exact_bytes(N)?);
        Ok(bytes)
    }

    fn read_byte(&mut self) -> Result<u8, OpackError> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Read a little-endian length prefix of `width` bytes
    fn read_length(&mut self, width: u8) -> Result<usize, OpackError> {
        let length = match width {
            0 => self.read_byte()? as u64,
            1 => u16::from_le_bytes(self.read_array()?) as u64,
            2 => u32::from_le_bytes(self.read_array()?) as u64,
            _ => u64::from_le_bytes(self.read_array()?),
        };
        usize::try_from(length).map_err(|_| OpackError::OutOfBounds(usize::MAX, self.stream.len()))
    }

    fn read_string(&mut self, length: usize) -> Result<Value, OpackError> {
        let string =
            std::str::from_utf8(self.read_exact_bytes(length)?).map_err(OpackError::StringParseError)?;
        Ok(Value::String(string.to_string()))
    }

    fn read_data(&mut self, length: usize) -> Result<Value, OpackError> {
        Ok(Value::Data(self.read_exact_bytes(length)?.to_vec()))
    }

    /// Read the children of an array; `count` is `None` for terminated arrays
    fn read_array_children(
        &mut self,
        count: Option<usize>,
        depth: usize,
    ) -> Result<Value, OpackError> {
        let mut items = Vec::with_capacity(count.unwrap_or_default());
        while count.map_or(true, |count| items.len() < count) {
            let offset = self.idx;
            match self.read_value(depth + 1)? {
                Some(item) => items.push(item),
                None if count.is_none() => break,
                None => return Err(OpackError::UnexpectedTerminator(offset)),
            }
        }
        Ok(Value::Array(items))
    }

    /// Read the children of a dictionary; `count` is `None` for terminated dictionaries
    fn read_dictionary_children(
        &mut self,
        count: Option<usize>,
        depth: usize,
    ) -> Result<Value, OpackError> {
        let mut dict = Dictionary::new();
        let mut read = 0;
        while count.map_or(true, |count| read < count) {
            let offset = self.idx;
            let key = match self.read_value(depth + 1)? {
                Some(Value::String(key)) => key,
                Some(_) => return Err(OpackError::InvalidKey(offset)),
                None if count.is_none() => break,
                None => return Err(OpackError::UnexpectedTerminator(offset)),
            };
            let offset = self.idx;
            let item = self
                .read_value(depth + 1)?
                .ok_or(OpackError::UnexpectedTerminator(offset))?;
            dict.insert(key, item);
            read += 1;
        }
        Ok(Value::Dictionary(dict))
    }

    /// Read a single value, returning `None` if the next byte is a terminator
    fn read_value(&mut self, depth: usize) -> Result<Option<Value>, OpackError> {
        if depth > MAX_DEPTH {
            return Err(OpackError::RecursionLimit(MAX_DEPTH));
        }
        let offset = self.idx;
        let tag = self.read_byte()?;
        let value = match tag {
            TRUE => Value::Boolean(true),
            FALSE => Value::Boolean(false),
            TERMINATOR => return Ok(None),
            DATE => {
                let seconds = f64_from_wire(self.read_array()?);
                Value::Date(from_apple_seconds(seconds).ok_or(OpackError::InvalidDate(seconds))?)
            }
            SMALL_INT..=0x2F => Value::Integer(((tag - SMALL_INT) as u64).into()),
            // The single byte form is sign-extended, so 0xFF reads as u64::MAX
            INT_U8 => Value::Integer((self.read_byte()? as i8 as i64 as u64).into()),
            INT_U32 => Value::Integer((u32::from_le_bytes(self.read_array()?) as u64).into()),
            INT_U64 => Value::Integer(u64::from_le_bytes(self.read_array()?).into()),
            FLOAT32 => Value::Real(f32_from_wire(self.read_array()?) as f64),
            FLOAT64 => Value::Real(f64_from_wire(self.read_array()?)),
            SHORT_STRING..=0x60 => self.read_string((tag - SHORT_STRING) as usize)?,
            STRING_LEN..=0x64 => {
                let length = self.read_length(tag - STRING_LEN)?;
                self.read_string(length)?
            }
            SHORT_DATA..=0x90 => self.read_data((tag - SHORT_DATA) as usize)?,
            DATA_LEN..=0x94 => {
                let length = self.read_length(tag - DATA_LEN)?;
                self.read_data(length)?
            }
            OPEN_ARRAY => self.read_array_children(None, depth)?,
            SHORT_ARRAY..=0xDE => {
                self.read_array_children(Some((tag - SHORT_ARRAY) as usize), depth)?
            }
            OPEN_DICT => self.read_dictionary_children(None, depth)?,
            SHORT_DICT..=0xEE => {
                self.read_dictionary_children(Some((tag - SHORT_DICT) as usize), depth)?
            }
            other => return Err(OpackError::UnexpectedByte(other, offset)),
        };
        Ok(Some(value))
    }
}
