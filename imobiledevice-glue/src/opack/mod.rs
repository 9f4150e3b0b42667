/*!
 Contains logic to serialize and deserialize property list trees using the `OPACK` binary format.

 ## Overview

 `OPACK` is a compact, self-describing object serialization used by Apple's companion-link
 and pairing protocols. Every value starts with a single tag byte that carries both the
 kind of the value and, for small values, its length or count inline:

 | Tag | Meaning |
 |---|---|
 | `0x01` / `0x02` | `true` / `false` |
 | `0x03` | Terminator for open containers |
 | `0x06` | Date, 8 byte float of seconds since `2001-01-01` |
 | `0x08..=0x2F` | Integers `0` through `0x27` |
 | `0x30`, `0x32`, `0x33` | Integers stored in 1, 4, or 8 little-endian bytes |
 | `0x35`, `0x36` | 4 and 8 byte floats |
 | `0x40..=0x60`, `0x61..=0x64` | Strings, inline length or 1/2/4/8 byte length prefix |
 | `0x70..=0x90`, `0x91..=0x94` | Data, inline length or 1/2/4/8 byte length prefix |
 | `0xD0..=0xDE`, `0xDF` | Arrays, inline count or terminated |
 | `0xE0..=0xEE`, `0xEF` | Dictionaries, inline count or terminated |

 Floating point payloads are stored as the host bit pattern with its bytes reversed.

 ## Example

 ```
 use imobiledevice_glue::opack::{decode, encode};
 use plist::Value;

 let bytes = encode(&Value::Integer(0x22.into())).unwrap();
 assert_eq!(bytes, vec![0x2A]);
 assert_eq!(decode(&bytes).unwrap(), Value::Integer(0x22.into()));
 ```
*/

pub mod decoder;
pub mod encoder;

pub use decoder::{decode, decode_into, OpackReader};
pub use encoder::encode;

pub(crate) const TRUE: u8 = 0x01;
pub(crate) const FALSE: u8 = 0x02;
/// Marks the end of the children of an open array or dictionary
pub(crate) const TERMINATOR: u8 = 0x03;
pub(crate) const DATE: u8 = 0x06;
/// Integers up to [`SMALL_INT_MAX`] are stored as this tag plus their value
pub(crate) const SMALL_INT: u8 = 0x08;
pub(crate) const SMALL_INT_MAX: u64 = 0x27;
pub(crate) const INT_U8: u8 = 0x30;
pub(crate) const INT_U32: u8 = 0x32;
pub(crate) const INT_U64: u8 = 0x33;
pub(crate) const FLOAT32: u8 = 0x35;
pub(crate) const FLOAT64: u8 = 0x36;
pub(crate) const SHORT_STRING: u8 = 0x40;
/// String length prefixes start here, with the 1, 2, 4, and 8 byte forms following in order
pub(crate) const STRING_LEN: u8 = 0x61;
pub(crate) const SHORT_DATA: u8 = 0x70;
pub(crate) const DATA_LEN: u8 = 0x91;
/// Longest string or data payload that fits in the tag byte
pub(crate) const SHORT_INLINE_MAX: usize = 0x20;
pub(crate) const SHORT_ARRAY: u8 = 0xD0;
pub(crate) const OPEN_ARRAY: u8 = 0xDF;
pub(crate) const SHORT_DICT: u8 = 0xE0;
pub(crate) const OPEN_DICT: u8 = 0xEF;
/// Largest child count that fits in a container's tag byte
pub(crate) const SHORT_CONTAINER_MAX: usize = 14;
/// Deepest nesting of containers either direction will process
///
/// Low enough that the recursive walks fit on a default 2 MiB thread stack in debug builds.
pub const MAX_DEPTH: usize = 100;

/// Reverse the bytes of the host representation of an [`f32`]
pub(crate) fn f32_to_wire(value: f32) -> [u8; 4] {
    value.to_bits().swap_bytes().to_ne_bytes()
}

/// Reverse the bytes of the host representation of an [`f64`]
pub(crate) fn f64_to_wire(value: f64) -> [u8; 8] {
    value.to_bits().swap_bytes().to_ne_bytes()
}

pub(crate) fn f32_from_wire(bytes: [u8; 4]) -> f32 {
    f32::from_bits(u32::from_ne_bytes(bytes).swap_bytes())
}

pub(crate) fn f64_from_wire(bytes: [u8; 8]) -> f64 {
    f64::from_bits(u64::from_ne_bytes(bytes).swap_bytes())
}
