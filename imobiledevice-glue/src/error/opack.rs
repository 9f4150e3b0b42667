/*!
 Errors that can happen when encoding or decoding `OPACK` data.
*/

use std::{
    error::Error,
    fmt::{Display, Formatter, Result},
    str::Utf8Error,
};

/// Errors that can happen when encoding or decoding `OPACK` data
#[derive(Debug)]
pub enum OpackError {
    /// A read of `n` bytes would end at the first index, past the stream length in the second
    OutOfBounds(usize, usize),
    StringParseError(Utf8Error),
    /// A dictionary key at the given offset did not decode as a string
    InvalidKey(usize),
    UnexpectedByte(u8, usize),
    /// A terminator was found inside a container with an explicit child count
    UnexpectedTerminator(usize),
    RecursionLimit(usize),
    /// The tree contains a node kind that has no `OPACK` representation
    UnsupportedType(&'static str),
    InvalidDate(f64),
    Empty,
}

impl Display for OpackError {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result {
        match self {
            OpackError::OutOfBounds(idx, len) => {
                write!(fmt, "Index {idx:x} is outside of range {len:x}!")
            }
            OpackError::StringParseError(why) => write!(fmt, "Failed to parse string: {why}"),
            OpackError::InvalidKey(offset) => {
                write!(fmt, "Dictionary key at offset {offset:x} is not a string!")
            }
            OpackError::UnexpectedByte(byte, offset) => {
                write!(fmt, "Unexpected byte {byte:02x} at offset {offset:x}")
            }
            OpackError::UnexpectedTerminator(offset) => {
                write!(fmt, "Expected child node, found terminator at offset {offset:x}")
            }
            OpackError::RecursionLimit(depth) => {
                write!(fmt, "Nesting exceeds the maximum depth of {depth}")
            }
            OpackError::UnsupportedType(kind) => {
                write!(fmt, "Unsupported data type in plist: {kind}")
            }
            OpackError::InvalidDate(seconds) => write!(fmt, "Invalid date value: {seconds}"),
            OpackError::Empty => write!(fmt, "No OPACK data to decode"),
        }
    }
}

impl Error for OpackError {}
