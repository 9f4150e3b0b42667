/*!
Errors that can happen during the application's runtime
*/

use std::{
    fmt::{Display, Formatter, Result},
    io::Error as IoError,
    path::PathBuf,
};

use imobiledevice_glue::error::{keyed_archive::KeyedArchiveError, opack::OpackError};

/// Errors that can happen during the application's runtime
#[derive(Debug)]
pub enum RuntimeError {
    InvalidOptions(String),
    CreateError(IoError, PathBuf),
    /// The input file could not be opened or read
    ReadError(IoError, PathBuf),
    DiskError(IoError),
    OpackError(OpackError),
    ArchiveError(KeyedArchiveError),
    PlistError(plist::Error),
    /// The input file is not a property list, so it cannot hold a keyed archive
    NotAnArchive(PathBuf),
}

impl Display for RuntimeError {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result {
        match self {
            RuntimeError::InvalidOptions(why) => write!(fmt, "Invalid options!\n{why}"),
            RuntimeError::CreateError(why, path) => write!(fmt, "{why}: {path:?}"),
            RuntimeError::ReadError(why, path) => write!(fmt, "Unable to read {path:?}: {why}"),
            RuntimeError::DiskError(why) => write!(fmt, "{why}"),
            RuntimeError::OpackError(why) => write!(fmt, "{why}"),
            RuntimeError::ArchiveError(why) => write!(fmt, "{why}"),
            RuntimeError::PlistError(why) => write!(fmt, "{why}"),
            RuntimeError::NotAnArchive(path) => {
                write!(fmt, "{path:?} does not contain a property list")
            }
        }
    }
}
