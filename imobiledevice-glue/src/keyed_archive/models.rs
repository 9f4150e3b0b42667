/*!
 Data structures used to describe values added to a [`KeyedArchive`].
*/

use plist::Value;

use crate::keyed_archive::KeyedArchive;

/// A value to store in a keyed archive
///
/// Some kinds are written inline where they are used, the rest are appended to `$objects`
/// and referenced by UID:
///
/// | Variant | Stored as |
/// |---|---|
/// | [`Integer`](ArchiveValue::Integer), [`Chars`](ArchiveValue::Chars), [`Array`](ArchiveValue::Array), [`Data`](ArchiveValue::Data) | Inline |
/// | [`IntRef`](ArchiveValue::IntRef), [`Boolean`](ArchiveValue::Boolean), [`String`](ArchiveValue::String), [`Real`](ArchiveValue::Real) | New primitive object |
/// | `NS*` variants | New class instance plus its class-info object |
/// | [`NSKeyedArchive`](ArchiveValue::NSKeyedArchive) | Copy of another archive's object graph |
/// | [`FromPlist`](ArchiveValue::FromPlist) | Foundation classes matching the tree's shape |
#[derive(Debug, Clone, PartialEq)]
pub enum ArchiveValue<'a> {
    Integer(u64),
    /// An integer stored as its own object
    IntRef(u64),
    Boolean(bool),
    /// A string stored inline
    Chars(&'a str),
    /// A string stored as its own object; `$null` refers to slot `0` instead
    String(&'a str),
    Real(f64),
    /// A plist tree copied inline
    Array(&'a Value),
    Data(&'a [u8]),
    NSString(&'a str),
    NSMutableString(&'a str),
    NSArray(Vec<ArchiveValue<'a>>),
    NSMutableArray(Vec<ArchiveValue<'a>>),
    NSDictionary(Vec<(&'a str, ArchiveValue<'a>)>),
    NSMutableDictionary(Vec<(&'a str, ArchiveValue<'a>)>),
    /// Seconds since `2001-01-01T00:00:00Z`
    NSDate(f64),
    NSData(&'a [u8]),
    NSMutableData(&'a [u8]),
    /// `relative` is only stored when `base` is present
    NSUrl {
        base: Option<Box<ArchiveValue<'a>>>,
        relative: Option<Box<ArchiveValue<'a>>>,
    },
    NSKeyedArchive(&'a KeyedArchive),
    FromPlist(&'a Value),
}

impl ArchiveValue<'_> {
    /// Name used for this kind of value in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            ArchiveValue::Integer(_) => "integer",
            ArchiveValue::IntRef(_) => "integer reference",
            ArchiveValue::Boolean(_) => "boolean",
            ArchiveValue::Chars(_) => "inline string",
            ArchiveValue::String(_) => "string",
            ArchiveValue::Real(_) => "real",
            ArchiveValue::Array(_) => "array",
            ArchiveValue::Data(_) => "data",
            ArchiveValue::NSString(_) => "NSString",
            ArchiveValue::NSMutableString(_) => "NSMutableString",
            ArchiveValue::NSArray(_) => "NSArray",
            ArchiveValue::NSMutableArray(_) => "NSMutableArray",
            ArchiveValue::NSDictionary(_) => "NSDictionary",
            ArchiveValue::NSMutableDictionary(_) => "NSMutableDictionary",
            ArchiveValue::NSDate(_) => "NSDate",
            ArchiveValue::NSData(_) => "NSData",
            ArchiveValue::NSMutableData(_) => "NSMutableData",
            ArchiveValue::NSUrl { .. } => "NSURL",
            ArchiveValue::NSKeyedArchive(_) => "NSKeyedArchive",
            ArchiveValue::FromPlist(_) => "plist",
        }
    }

    /// Whether this value is written in place instead of being appended to `$objects`
    pub fn is_inline(&self) -> bool {
        matches!(
            self,
            ArchiveValue::Integer(_)
                | ArchiveValue::Chars(_)
                | ArchiveValue::Array(_)
                | ArchiveValue::Data(_)
        )
    }

    /// The class name followed by its ancestors, for values that archive as a class instance
    pub(crate) fn class_chain(&self) -> Option<&'static [&'static str]> {
        let chain: &'static [&'static str] = match self {
            ArchiveValue::NSString(_) => &["NSString", "NSObject"],
            ArchiveValue::NSMutableString(_) => &["NSMutableString", "NSString", "NSObject"],
            ArchiveValue::NSArray(_) => &["NSArray", "NSObject"],
            ArchiveValue::NSMutableArray(_) => &["NSMutableArray", "NSArray", "NSObject"],
            ArchiveValue::NSDictionary(_) => &["NSDictionary", "NSObject"],
            ArchiveValue::NSMutableDictionary(_) => {
                &["NSMutableDictionary", "NSDictionary", "NSObject"]
            }
            ArchiveValue::NSDate(_) => &["NSDate", "NSObject"],
            ArchiveValue::NSData(_) => &["NSData", "NSObject"],
            ArchiveValue::NSMutableData(_) => &["NSMutableData", "NSData", "NSObject"],
            ArchiveValue::NSUrl { .. } => &["NSURL", "NSObject"],
            _ => return None,
        };
        Some(chain)
    }
}
