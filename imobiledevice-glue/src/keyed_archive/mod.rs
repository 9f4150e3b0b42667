/*!
 Contains logic to build, read, and flatten `NSKeyedArchiver` property lists.

 ## Overview

 A keyed archive stores an object graph as a flat property list:

 - `$objects` is an array of every archived object. Slot `0` always holds the string `$null`.
 - Objects refer to each other with UIDs, which are indexes into `$objects`.
 - Each class instance is a dictionary whose `$class` UID points at a class-info
   dictionary with `$classname` and `$classes` (the class followed by its ancestors).
 - `$top` maps root names (usually `$0` or `root`) to the UID of each root object.

 [`KeyedArchive`] appends objects to the table as values are added, so the builder never
 rewrites an existing slot. The `to_plist` projection walks the graph back into an ordinary
 plist tree for the supported Foundation classes.

 ## Example

 ```
 use imobiledevice_glue::keyed_archive::{ArchiveValue, KeyedArchive};
 use plist::Value;

 let mut archive = KeyedArchive::new();
 let uid = archive.add_top_class("NSDictionary", &["NSObject"]).unwrap();
 archive
     .nsdictionary_add_item(uid, "name", ArchiveValue::String("iPhone"))
     .unwrap();

 let flat = archive.to_plist().unwrap();
 let dict = flat.as_dictionary().unwrap();
 assert_eq!(dict.get("name"), Some(&Value::String("iPhone".to_string())));
 ```
*/

pub mod archive;
pub mod builder;
pub mod models;
pub mod projection;
mod tests;

pub use archive::KeyedArchive;
pub use models::ArchiveValue;

/// Value of `$archiver` in every archive this crate reads or writes
pub const NS_KEYED_ARCHIVER_NAME: &str = "NSKeyedArchiver";
/// Value of `$version` in every archive this crate reads or writes
pub const NS_KEYED_ARCHIVER_VERSION: u64 = 100000;
/// Deepest object graph the builder, merger, or projection will follow
///
/// Low enough that the recursive walks fit on a default 2 MiB thread stack in debug builds.
pub const MAX_DEPTH: usize = 100;

pub(crate) const ARCHIVER_KEY: &str = "$archiver";
pub(crate) const VERSION_KEY: &str = "$version";
pub(crate) const OBJECTS_KEY: &str = "$objects";
pub(crate) const TOP_KEY: &str = "$top";
pub(crate) const NULL: &str = "$null";
pub(crate) const CLASS_KEY: &str = "$class";
pub(crate) const CLASSES_KEY: &str = "$classes";
pub(crate) const CLASSNAME_KEY: &str = "$classname";
/// First key of `$top`; `root` is also accepted when reading
pub(crate) const DEFAULT_TOP_KEY: &str = "$0";
pub(crate) const ROOT_TOP_KEY: &str = "root";

pub(crate) const NS_OBJECTS: &str = "NS.objects";
pub(crate) const NS_KEYS: &str = "NS.keys";
pub(crate) const NS_STRING: &str = "NS.string";
pub(crate) const NS_TIME: &str = "NS.time";
pub(crate) const NS_DATA: &str = "NS.data";
pub(crate) const NS_BASE: &str = "NS.base";
pub(crate) const NS_RELATIVE: &str = "NS.relative";
