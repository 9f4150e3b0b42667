/*!
 This module defines common utilities used across the codecs.
*/

pub mod dates;
pub mod plist;
