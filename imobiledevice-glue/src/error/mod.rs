/*!
 Errors that can happen when encoding, decoding, or transcoding data with this library.
*/

pub mod keyed_archive;
pub mod opack;
