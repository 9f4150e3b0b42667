/*!
 The [`KeyedArchive`] container, plus the operations that read and validate it.
*/

use std::io::Cursor;

use plist::{Dictionary, Uid, Value};

use crate::{
    error::keyed_archive::KeyedArchiveError,
    keyed_archive::{
        ARCHIVER_KEY, CLASSES_KEY, CLASSNAME_KEY, CLASS_KEY, DEFAULT_TOP_KEY, NS_KEYED_ARCHIVER_NAME,
        NS_KEYED_ARCHIVER_VERSION, NULL, OBJECTS_KEY, ROOT_TOP_KEY, TOP_KEY, VERSION_KEY,
    },
    util::plist::{extract_array_key, extract_array_key_mut, extract_dictionary, uids_from_xml, uids_to_xml},
};

/// Magic bytes that start every binary property list
pub const BINARY_PLIST_MAGIC: &[u8] = b"bplist00";

/// An `NSKeyedArchiver` property list
///
/// `uid` always holds the index of the last slot in `$objects`, so the next appended object
/// lands at `uid + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedArchive {
    pub(super) root: Dictionary,
    pub(super) uid: u64,
}

impl Default for KeyedArchive {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyedArchive {
    /// Create an empty archive whose object table only holds `$null`
    pub fn new() -> Self {
        let mut root = Dictionary::new();
        root.insert(
            VERSION_KEY.to_string(),
            Value::Integer(NS_KEYED_ARCHIVER_VERSION.into()),
        );
        root.insert(
            OBJECTS_KEY.to_string(),
            Value::Array(vec![Value::String(NULL.to_string())]),
        );
        root.insert(
            ARCHIVER_KEY.to_string(),
            Value::String(NS_KEYED_ARCHIVER_NAME.to_string()),
        );
        Self { root, uid: 0 }
    }

    /// Validate an existing plist tree and wrap a copy of it
    ///
    /// The root must be a dictionary with the expected `$archiver` and `$version`, a `$top`
    /// entry named `$0` or `root` holding a UID, and a non-empty `$objects` array that UID
    /// points into.
    pub fn from_plist(plist: &Value) -> Result<Self, KeyedArchiveError> {
        let root = plist.as_dictionary().ok_or_else(|| {
            KeyedArchiveError::InvalidType("root".to_string(), "dictionary".to_string())
        })?;

        match root.get(ARCHIVER_KEY).and_then(Value::as_string) {
            Some(NS_KEYED_ARCHIVER_NAME) => {}
            Some(other) => return Err(KeyedArchiveError::InvalidArchiver(Some(other.to_string()))),
            None => return Err(KeyedArchiveError::InvalidArchiver(None)),
        }

        let version = root.get(VERSION_KEY).and_then(Value::as_unsigned_integer);
        if version != Some(NS_KEYED_ARCHIVER_VERSION) {
            return Err(KeyedArchiveError::InvalidVersion(version));
        }

        let top = extract_dictionary(root, TOP_KEY)?;
        let top_uid = top
            .get(DEFAULT_TOP_KEY)
            .or_else(|| top.get(ROOT_TOP_KEY))
            .ok_or_else(|| KeyedArchiveError::MissingKey(format!("{TOP_KEY}.{DEFAULT_TOP_KEY}")))?
            .as_uid()
            .ok_or_else(|| {
                KeyedArchiveError::InvalidType(format!("{TOP_KEY}.{DEFAULT_TOP_KEY}"), "uid".to_string())
            })?
            .get();

        let objects = extract_array_key(root, OBJECTS_KEY)?;
        if objects.is_empty() {
            return Err(KeyedArchiveError::InvalidType(
                OBJECTS_KEY.to_string(),
                "non-empty array".to_string(),
            ));
        }
        if index(top_uid).map_or(true, |idx| idx >= objects.len()) {
            return Err(KeyedArchiveError::UidOutOfRange(top_uid, objects.len()));
        }

        Ok(Self {
            root: root.clone(),
            uid: objects.len() as u64 - 1,
        })
    }

    /// Parse a binary or XML property list and validate it as an archive
    ///
    /// Returns `Ok(None)` when `bytes` does not look like a property list at all.
    pub fn from_bytes(bytes: &[u8]) -> Result<Option<Self>, KeyedArchiveError> {
        let plist = if bytes.starts_with(BINARY_PLIST_MAGIC) {
            Value::from_reader(Cursor::new(bytes)).map_err(KeyedArchiveError::PlistError)?
        } else if bytes.starts_with(b"<?xml") || bytes.starts_with(b"<plist") {
            let mut plist = Value::from_reader_xml(bytes).map_err(KeyedArchiveError::PlistError)?;
            uids_from_xml(&mut plist);
            plist
        } else {
            return Ok(None);
        };
        Self::from_plist(&plist).map(Some)
    }

    /// The archive's root dictionary
    pub fn as_plist(&self) -> &Dictionary {
        &self.root
    }

    pub fn into_plist(self) -> Value {
        Value::Dictionary(self.root)
    }

    /// Serialize the archive as a binary property list
    pub fn to_binary(&self) -> Result<Vec<u8>, KeyedArchiveError> {
        let mut bytes = vec![];
        Value::Dictionary(self.root.clone())
            .to_writer_binary(&mut bytes)
            .map_err(KeyedArchiveError::PlistError)?;
        Ok(bytes)
    }

    /// Serialize the archive as an XML property list, with UIDs in their `CF$UID` form
    pub fn to_xml(&self) -> Result<Vec<u8>, KeyedArchiveError> {
        let mut bytes = vec![];
        uids_to_xml(&Value::Dictionary(self.root.clone()))
            .to_writer_xml(&mut bytes)
            .map_err(KeyedArchiveError::PlistError)?;
        Ok(bytes)
    }

    /// Index of the last slot in `$objects`
    pub fn last_uid(&self) -> u64 {
        self.uid
    }

    pub fn objects(&self) -> Result<&Vec<Value>, KeyedArchiveError> {
        extract_array_key(&self.root, OBJECTS_KEY)
    }

    pub(super) fn objects_mut(&mut self) -> Result<&mut Vec<Value>, KeyedArchiveError> {
        extract_array_key_mut(&mut self.root, OBJECTS_KEY)
    }

    /// Get the object stored at `uid`
    pub fn object(&self, uid: u64) -> Result<&Value, KeyedArchiveError> {
        let objects = self.objects()?;
        index(uid)
            .and_then(|idx| objects.get(idx))
            .ok_or(KeyedArchiveError::UidOutOfRange(uid, objects.len()))
    }

    pub(super) fn object_mut(&mut self, uid: u64) -> Result<&mut Value, KeyedArchiveError> {
        let objects = self.objects_mut()?;
        let len = objects.len();
        index(uid)
            .and_then(|idx| objects.get_mut(idx))
            .ok_or(KeyedArchiveError::UidOutOfRange(uid, len))
    }

    /// Get the class instance dictionary stored at `uid`
    pub fn class(&self, uid: u64) -> Result<&Dictionary, KeyedArchiveError> {
        self.object(uid)?
            .as_dictionary()
            .ok_or_else(|| invalid_index(uid, "dictionary"))
    }

    pub(super) fn class_mut(&mut self, uid: u64) -> Result<&mut Dictionary, KeyedArchiveError> {
        self.object_mut(uid)?
            .as_dictionary_mut()
            .ok_or_else(|| invalid_index(uid, "dictionary"))
    }

    /// Append `object` to `$objects` and return its UID
    pub fn append_object(&mut self, object: Value) -> Result<u64, KeyedArchiveError> {
        self.objects_mut()?.push(object);
        self.uid += 1;
        Ok(self.uid)
    }

    /// Append a class instance and its class-info object, returning the UID of the instance
    ///
    /// The class-info object lands in the slot right after the instance and lists `name`
    /// followed by `ancestors` in its `$classes`.
    pub fn append_class(&mut self, name: &str, ancestors: &[&str]) -> Result<u64, KeyedArchiveError> {
        if name.is_empty() {
            return Err(KeyedArchiveError::InvalidArgument(
                "class name must not be empty".to_string(),
            ));
        }

        let mut instance = Dictionary::new();
        instance.insert(CLASS_KEY.to_string(), Value::Uid(Uid::new(self.uid + 2)));
        let instance_uid = self.append_object(Value::Dictionary(instance))?;

        let mut info = Dictionary::new();
        info.insert(
            CLASSES_KEY.to_string(),
            Value::Array(
                std::iter::once(name)
                    .chain(ancestors.iter().copied())
                    .map(|class| Value::String(class.to_string()))
                    .collect(),
            ),
        );
        info.insert(CLASSNAME_KEY.to_string(), Value::String(name.to_string()));
        self.append_object(Value::Dictionary(info))?;

        Ok(instance_uid)
    }

    /// Append a class and register its instance as a new root object
    pub fn add_top_class(&mut self, name: &str, ancestors: &[&str]) -> Result<u64, KeyedArchiveError> {
        let uid = self.append_class(name, ancestors)?;
        self.add_top_class_uid(uid)?;
        Ok(uid)
    }

    /// Register the object at `uid` as a root object
    ///
    /// The first root is stored as `$0`; later ones are named after the number of existing roots.
    pub fn add_top_class_uid(&mut self, uid: u64) -> Result<(), KeyedArchiveError> {
        self.object(uid)?;
        match self.root.get_mut(TOP_KEY).and_then(Value::as_dictionary_mut) {
            Some(top) => {
                let key = format!("${}", top.len());
                top.insert(key, Value::Uid(Uid::new(uid)));
            }
            None => {
                let mut top = Dictionary::new();
                top.insert(DEFAULT_TOP_KEY.to_string(), Value::Uid(Uid::new(uid)));
                self.root.insert(TOP_KEY.to_string(), Value::Dictionary(top));
            }
        }
        Ok(())
    }

    /// Rename the first entry of `$top`, keeping its position and value
    ///
    /// Does nothing if the archive has no `$top` yet. Fails without changing anything if
    /// another entry already uses `name`.
    pub fn set_top_ref_key_name(&mut self, name: &str) -> Result<(), KeyedArchiveError> {
        if let Some(Value::Dictionary(top)) = self.root.get_mut(TOP_KEY) {
            if top.keys().skip(1).any(|key| key == name) {
                return Err(KeyedArchiveError::InvalidArgument(format!(
                    "{TOP_KEY} already has an entry named {name}"
                )));
            }
            *top = std::mem::replace(top, Dictionary::new())
                .into_iter()
                .enumerate()
                .map(|(idx, (key, value))| match idx {
                    0 => (name.to_string(), value),
                    _ => (key, value),
                })
                .collect();
        }
        Ok(())
    }

    /// Get the UID stored under `name` in `$top`
    ///
    /// With no name, `$0` is tried first, then `root`.
    pub fn top_uid(&self, name: Option<&str>) -> Option<u64> {
        let top = self.root.get(TOP_KEY)?.as_dictionary()?;
        let node = match name {
            Some(name) => top.get(name),
            None => top.get(DEFAULT_TOP_KEY).or_else(|| top.get(ROOT_TOP_KEY)),
        }?;
        node.as_uid().map(|uid| uid.get())
    }

    /// Get the `$classname` of the object at `uid`
    ///
    /// Returns `None` for primitives and for instances whose `$class` is missing or `$null`.
    pub fn classname(&self, uid: u64) -> Option<&str> {
        let class_uid = self.class(uid).ok()?.get(CLASS_KEY)?.as_uid()?.get();
        if class_uid == 0 {
            return None;
        }
        self.class(class_uid).ok()?.get(CLASSNAME_KEY)?.as_string()
    }

    /// Get a raw property of the class instance at `uid`
    pub fn class_property(&self, uid: u64, name: &str) -> Option<&Value> {
        self.class(uid).ok()?.get(name)
    }

    /// Read an integer property, following one UID reference if the value is not inline
    pub fn class_uint64_property(&self, uid: u64, name: &str) -> Result<u64, KeyedArchiveError> {
        let mut property = self
            .class_property(uid, name)
            .ok_or_else(|| KeyedArchiveError::MissingKey(name.to_string()))?;
        if let Some(target) = property.as_uid() {
            property = self.object(target.get())?;
        }
        property
            .as_unsigned_integer()
            .ok_or_else(|| KeyedArchiveError::InvalidType(name.to_string(), "integer".to_string()))
    }

    /// Read an integer property that must fit in an `i32`
    pub fn class_int_property(&self, uid: u64, name: &str) -> Result<i32, KeyedArchiveError> {
        i32::try_from(self.class_uint64_property(uid, name)?).map_err(|_| {
            KeyedArchiveError::InvalidType(name.to_string(), "32-bit integer".to_string())
        })
    }

    /// Read a string property, which is always stored by UID
    pub fn class_string_property(&self, uid: u64, name: &str) -> Result<&str, KeyedArchiveError> {
        let target = self
            .class_property(uid, name)
            .ok_or_else(|| KeyedArchiveError::MissingKey(name.to_string()))?
            .as_uid()
            .ok_or_else(|| KeyedArchiveError::InvalidType(name.to_string(), "uid".to_string()))?
            .get();
        self.object(target)?
            .as_string()
            .ok_or_else(|| invalid_index(target, "string"))
    }
}

/// Convert a UID to an index into `$objects`
pub(super) fn index(uid: u64) -> Option<usize> {
    usize::try_from(uid).ok()
}

pub(super) fn invalid_index(uid: u64, expected: &str) -> KeyedArchiveError {
    KeyedArchiveError::InvalidTypeIndex(
        index(uid).unwrap_or(usize::MAX),
        expected.to_string(),
    )
}
