/*!
 Errors that can happen when building, reading, or projecting `NSKeyedArchiver` data.
*/

use std::{
    error::Error,
    fmt::{Display, Formatter, Result},
};

/// Errors that can happen when working with `NSKeyedArchiver` data
#[derive(Debug)]
pub enum KeyedArchiveError {
    /// `$archiver` is missing or is not `NSKeyedArchiver`
    InvalidArchiver(Option<String>),
    InvalidVersion(Option<u64>),
    MissingKey(String),
    /// The key in the first slot did not contain the type named in the second slot
    InvalidType(String, String),
    /// The item at the index in the first slot did not contain the type named in the second slot
    InvalidTypeIndex(usize, String),
    UidOutOfRange(u64, usize),
    UnsupportedClass(String),
    /// The object at this UID does not resolve to a `$classname`
    MissingClassName(u64),
    InvalidArgument(String),
    /// A dictionary object carried this many keys and this many values
    MismatchedKeys(usize, usize),
    RecursionLimit(usize),
    InvalidDate(f64),
    PlistError(plist::Error),
}

impl Display for KeyedArchiveError {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result {
        match self {
            KeyedArchiveError::InvalidArchiver(found) => match found {
                Some(name) => write!(fmt, "Unexpected $archiver value: {name}"),
                None => write!(fmt, "$archiver key not found or invalid"),
            },
            KeyedArchiveError::InvalidVersion(found) => match found {
                Some(version) => write!(fmt, "Unexpected NSKeyedArchiver version: {version}"),
                None => write!(fmt, "$version key not found or invalid"),
            },
            KeyedArchiveError::MissingKey(key) => write!(fmt, "Missing key: {key}"),
            KeyedArchiveError::InvalidType(key, value) => {
                write!(fmt, "Invalid data found at {key}, expected {value}")
            }
            KeyedArchiveError::InvalidTypeIndex(idx, value) => {
                write!(fmt, "Invalid data found at object index {idx}, expected {value}")
            }
            KeyedArchiveError::UidOutOfRange(uid, len) => {
                write!(fmt, "UID {uid} is outside of the objects table of length {len}")
            }
            KeyedArchiveError::UnsupportedClass(name) => {
                write!(fmt, "Unhandled class type: {name}")
            }
            KeyedArchiveError::MissingClassName(uid) => {
                write!(fmt, "Object {uid} does not reference a valid class")
            }
            KeyedArchiveError::InvalidArgument(why) => write!(fmt, "Invalid argument: {why}"),
            KeyedArchiveError::MismatchedKeys(keys, values) => write!(
                fmt,
                "Inconsistent number of keys ({keys}) vs. values ({values}) in dictionary object"
            ),
            KeyedArchiveError::RecursionLimit(depth) => {
                write!(fmt, "Object graph exceeds the maximum depth of {depth}")
            }
            KeyedArchiveError::InvalidDate(seconds) => write!(fmt, "Invalid date value: {seconds}"),
            KeyedArchiveError::PlistError(why) => write!(fmt, "Unable to parse plist: {why}"),
        }
    }
}

impl Error for KeyedArchiveError {}
