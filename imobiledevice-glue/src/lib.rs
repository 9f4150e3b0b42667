#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

pub mod error;
pub mod keyed_archive;
pub mod opack;
pub mod tlv;
pub mod util;
