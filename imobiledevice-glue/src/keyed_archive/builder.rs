/*!
 Logic that turns [`ArchiveValue`]s into objects in a [`KeyedArchive`].
*/

use plist::{Uid, Value};

use crate::{
    error::keyed_archive::KeyedArchiveError,
    keyed_archive::{
        ArchiveValue, KeyedArchive, MAX_DEPTH, NS_BASE, NS_DATA, NS_KEYS,
        NS_OBJECTS, NS_RELATIVE, NS_STRING, NS_TIME, NULL,
    },
    util::plist::{integer_bits, kind_name},
};

fn uid_value(uid: u64) -> Value {
    Value::Uid(Uid::new(uid))
}

/// Stands in for an object while its children are appended, so UIDs stay in insertion order
fn placeholder() -> Value {
    Value::String(NULL.to_string())
}

impl KeyedArchive {
    /// Store `value` under `name` in the class instance at `uid`
    ///
    /// Object kinds are appended to `$objects` first and the property holds their UID.
    pub fn set_class_property(
        &mut self,
        uid: u64,
        name: &str,
        value: ArchiveValue<'_>,
    ) -> Result<(), KeyedArchiveError> {
        self.set_property(uid, name, &value, 0)
    }

    /// Archive `value` as the first root object
    ///
    /// `$top` gets a `$0` entry pointing at the new object unless it already exists.
    /// The string `$null` archives as a reference to slot `0`. Inline-only kinds have no
    /// object of their own and are rejected.
    pub fn append_class_type(&mut self, value: ArchiveValue<'_>) -> Result<(), KeyedArchiveError> {
        if value.is_inline() {
            return Err(KeyedArchiveError::InvalidArgument(format!(
                "{} values cannot be stored as a root object",
                value.type_name()
            )));
        }

        let top = match self.encode_value(&value, 0)? {
            Value::Uid(uid) => uid.get(),
            other => {
                return Err(KeyedArchiveError::InvalidType(
                    value.type_name().to_string(),
                    format!("uid, found {}", kind_name(&other)),
                ))
            }
        };

        if self.top_uid(None).is_none() {
            self.add_top_class_uid(top)?;
        }
        Ok(())
    }

    /// Append `value` to the `NS.objects` of the array instance at `uid`
    ///
    /// `NS.objects` is created if the instance does not have one yet.
    pub fn nsarray_append_item(
        &mut self,
        uid: u64,
        value: ArchiveValue<'_>,
    ) -> Result<(), KeyedArchiveError> {
        self.ensure_array_property(uid, NS_OBJECTS)?;

        let item = self.encode_value(&value, 0)?;
        self.array_property_mut(uid, NS_OBJECTS)?.push(item);
        Ok(())
    }

    /// Append `key` and `value` to the `NS.keys` and `NS.objects` of the dictionary instance at `uid`
    ///
    /// The key is archived as a string object. Both arrays are created if missing.
    pub fn nsdictionary_add_item(
        &mut self,
        uid: u64,
        key: &str,
        value: ArchiveValue<'_>,
    ) -> Result<(), KeyedArchiveError> {
        self.ensure_array_property(uid, NS_KEYS)?;
        self.ensure_array_property(uid, NS_OBJECTS)?;

        let key = self.encode_value(&ArchiveValue::String(key), 0)?;
        let item = self.encode_value(&value, 0)?;
        self.array_property_mut(uid, NS_KEYS)?.push(key);
        self.array_property_mut(uid, NS_OBJECTS)?.push(item);
        Ok(())
    }

    /// Copy everything `node` references in `source` into this archive
    ///
    /// Each UID in `node` (other than `$null`) is replaced with the UID of a fresh copy of its
    /// target, and the copy is walked the same way. Copies are appended in the order they are
    /// first reached.
    pub fn merge_object(
        &mut self,
        source: &KeyedArchive,
        node: &mut Value,
    ) -> Result<(), KeyedArchiveError> {
        self.merge_node(source, node, 0)
    }

    fn merge_node(
        &mut self,
        source: &KeyedArchive,
        node: &mut Value,
        depth: usize,
    ) -> Result<(), KeyedArchiveError> {
        if depth > MAX_DEPTH {
            return Err(KeyedArchiveError::RecursionLimit(MAX_DEPTH));
        }

        match node {
            Value::Uid(uid) if uid.get() != 0 => {
                let mut copy = source.object(uid.get())?.clone();
                let slot = self.append_object(placeholder())?;
                *uid = Uid::new(slot);
                self.merge_node(source, &mut copy, depth + 1)?;
                *self.object_mut(slot)? = copy;
            }
            Value::Array(items) => {
                for item in items.iter_mut() {
                    self.merge_node(source, item, depth + 1)?;
                }
            }
            Value::Dictionary(dict) => {
                for item in dict.values_mut() {
                    self.merge_node(source, item, depth + 1)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Copy the root object graph of `source`, returning a reference to the copied root
    fn merge_archive(&mut self, source: &KeyedArchive) -> Result<Value, KeyedArchiveError> {
        let top = match source.top_uid(None) {
            Some(top) if top != 0 => top,
            _ => return Ok(uid_value(0)),
        };
        let mut root = uid_value(top);
        self.merge_object(source, &mut root)?;
        Ok(root)
    }

    fn set_property(
        &mut self,
        uid: u64,
        name: &str,
        value: &ArchiveValue<'_>,
        depth: usize,
    ) -> Result<(), KeyedArchiveError> {
        // Fail before anything is appended
        self.class(uid)?;

        let encoded = self.encode_value(value, depth + 1)?;
        self.class_mut(uid)?.insert(name.to_string(), encoded);
        Ok(())
    }

    fn ensure_array_property(&mut self, uid: u64, name: &str) -> Result<(), KeyedArchiveError> {
        let class = self.class_mut(uid)?;
        match class.get(name) {
            Some(Value::Array(_)) => Ok(()),
            Some(_) => Err(KeyedArchiveError::InvalidType(
                name.to_string(),
                "array".to_string(),
            )),
            None => {
                class.insert(name.to_string(), Value::Array(vec![]));
                Ok(())
            }
        }
    }

    fn array_property_mut(
        &mut self,
        uid: u64,
        name: &str,
    ) -> Result<&mut Vec<Value>, KeyedArchiveError> {
        self.class_mut(uid)?
            .get_mut(name)
            .and_then(Value::as_array_mut)
            .ok_or_else(|| KeyedArchiveError::InvalidType(name.to_string(), "array".to_string()))
    }

    /// Append the class pair for a class-backed value
    fn append_value_class(&mut self, value: &ArchiveValue<'_>) -> Result<u64, KeyedArchiveError> {
        let (name, ancestors) = value
            .class_chain()
            .and_then(|chain| chain.split_first())
            .ok_or_else(|| KeyedArchiveError::UnsupportedClass(value.type_name().to_string()))?;
        self.append_class(name, ancestors)
    }

    /// Materialize `value`, returning the node to store where it is referenced
    ///
    /// Inline kinds come back as themselves, everything else as the UID of a new object.
    pub(super) fn encode_value(
        &mut self,
        value: &ArchiveValue<'_>,
        depth: usize,
    ) -> Result<Value, KeyedArchiveError> {
        if depth > MAX_DEPTH {
            return Err(KeyedArchiveError::RecursionLimit(MAX_DEPTH));
        }

        Ok(match value {
            ArchiveValue::Integer(int) => Value::Integer((*int).into()),
            ArchiveValue::Chars(text) => Value::String(text.to_string()),
            ArchiveValue::Array(tree) => (*tree).clone(),
            ArchiveValue::Data(bytes) => Value::Data(bytes.to_vec()),
            ArchiveValue::IntRef(int) => uid_value(self.append_object(Value::Integer((*int).into()))?),
            ArchiveValue::Boolean(flag) => uid_value(self.append_object(Value::Boolean(*flag))?),
            ArchiveValue::Real(real) => uid_value(self.append_object(Value::Real(*real))?),
            ArchiveValue::String(text) if *text == NULL => uid_value(0),
            ArchiveValue::String(text) => {
                uid_value(self.append_object(Value::String(text.to_string()))?)
            }
            ArchiveValue::NSString(text) | ArchiveValue::NSMutableString(text) => {
                let uid = self.append_value_class(value)?;
                self.set_property(uid, NS_STRING, &ArchiveValue::String(text), depth)?;
                uid_value(uid)
            }
            ArchiveValue::NSArray(items) | ArchiveValue::NSMutableArray(items) => {
                let uid = self.append_value_class(value)?;
                let mut objects = Vec::with_capacity(items.len());
                for item in items {
                    objects.push(self.encode_value(item, depth + 1)?);
                }
                self.class_mut(uid)?
                    .insert(NS_OBJECTS.to_string(), Value::Array(objects));
                uid_value(uid)
            }
            ArchiveValue::NSDictionary(entries) | ArchiveValue::NSMutableDictionary(entries) => {
                let uid = self.append_value_class(value)?;
                let mut keys = Vec::with_capacity(entries.len());
                let mut objects = Vec::with_capacity(entries.len());
                for (key, item) in entries {
                    keys.push(self.encode_value(&ArchiveValue::String(key), depth + 1)?);
                    objects.push(self.encode_value(item, depth + 1)?);
                }
                let class = self.class_mut(uid)?;
                class.insert(NS_KEYS.to_string(), Value::Array(keys));
                class.insert(NS_OBJECTS.to_string(), Value::Array(objects));
                uid_value(uid)
            }
            ArchiveValue::NSDate(seconds) => {
                let uid = self.append_value_class(value)?;
                self.set_property(uid, NS_TIME, &ArchiveValue::Real(*seconds), depth)?;
                uid_value(uid)
            }
            ArchiveValue::NSData(bytes) | ArchiveValue::NSMutableData(bytes) => {
                let uid = self.append_value_class(value)?;
                self.set_property(uid, NS_DATA, &ArchiveValue::Data(bytes), depth)?;
                uid_value(uid)
            }
            ArchiveValue::NSUrl { base, relative } => {
                let uid = self.append_value_class(value)?;
                if let Some(base) = base {
                    self.set_property(uid, NS_BASE, base, depth)?;
                    if let Some(relative) = relative {
                        self.set_property(uid, NS_RELATIVE, relative, depth)?;
                    }
                }
                uid_value(uid)
            }
            ArchiveValue::NSKeyedArchive(source) => self.merge_archive(source)?,
            ArchiveValue::FromPlist(tree) => self.encode_value(&from_plist_value(tree)?, depth + 1)?,
        })
    }
}

/// Pick the Foundation class that archives a plain plist node
///
/// Strings become `NSMutableString` and arrays `NSMutableArray` of their converted children.
/// Dictionaries become `NSDictionary` keeping only boolean, integer, and string entries.
fn from_plist_value(tree: &Value) -> Result<ArchiveValue<'_>, KeyedArchiveError> {
    match tree {
        Value::String(text) => Ok(ArchiveValue::NSMutableString(text)),
        Value::Array(items) => Ok(ArchiveValue::NSMutableArray(
            items.iter().map(ArchiveValue::FromPlist).collect(),
        )),
        Value::Dictionary(dict) => Ok(ArchiveValue::NSDictionary(
            dict.iter()
                .filter_map(|(key, item)| {
                    let value = match item {
                        Value::Boolean(flag) => ArchiveValue::Boolean(*flag),
                        Value::Integer(_) => ArchiveValue::Integer(integer_bits(item)?),
                        Value::String(text) => ArchiveValue::String(text),
                        _ => return None,
                    };
                    Some((key.as_str(), value))
                })
                .collect(),
        )),
        other => Err(KeyedArchiveError::InvalidType(
            "plist".to_string(),
            format!("string, array, or dictionary, found {}", kind_name(other)),
        )),
    }
}
