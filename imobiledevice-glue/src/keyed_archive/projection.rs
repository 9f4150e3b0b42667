/*!
 Flattens the object graph of a [`KeyedArchive`] back into an ordinary plist tree.

 Supported classes:

 | Class | Result |
 |---|---|
 | `NSDictionary`, `NSMutableDictionary` | Dictionary |
 | `NSArray`, `NSMutableArray` | Array |
 | `NSString`, `NSMutableString` | String |
 | `NSData`, `NSMutableData` | Data |
 | `NSDate` | Date |

 Primitive objects and values stored inline are copied as they are. A reference to slot `0`
 yields the string `$null`.
*/

use plist::{Dictionary, Value};

use crate::{
    error::keyed_archive::KeyedArchiveError,
    keyed_archive::{
        archive::invalid_index, KeyedArchive, DEFAULT_TOP_KEY, MAX_DEPTH, NS_DATA, NS_KEYS,
        NS_OBJECTS, NS_STRING, NS_TIME, TOP_KEY,
    },
    util::{dates::from_apple_seconds, plist::kind_name},
};

impl KeyedArchive {
    /// Flatten the graph reachable from the root object
    pub fn to_plist(&self) -> Result<Value, KeyedArchiveError> {
        let top = self
            .top_uid(None)
            .ok_or_else(|| KeyedArchiveError::MissingKey(format!("{TOP_KEY}.{DEFAULT_TOP_KEY}")))?;
        self.object_to_plist(top)
    }

    /// Flatten the graph reachable from the object at `uid`
    pub fn object_to_plist(&self, uid: u64) -> Result<Value, KeyedArchiveError> {
        self.parse_object(uid, 0)
    }

    fn parse_object(&self, uid: u64, depth: usize) -> Result<Value, KeyedArchiveError> {
        if depth > MAX_DEPTH {
            return Err(KeyedArchiveError::RecursionLimit(MAX_DEPTH));
        }

        let object = self.object(uid)?;
        match object {
            Value::Boolean(_)
            | Value::Integer(_)
            | Value::Real(_)
            | Value::String(_)
            | Value::Data(_) => return Ok(object.clone()),
            Value::Dictionary(_) => {}
            other => {
                return Err(invalid_index(
                    uid,
                    &format!("object, found {}", kind_name(other)),
                ))
            }
        }

        let classname = self
            .classname(uid)
            .ok_or(KeyedArchiveError::MissingClassName(uid))?;
        match classname {
            "NSDictionary" | "NSMutableDictionary" => {
                let keys = self.list_property(uid, NS_KEYS)?;
                let values = self.list_property(uid, NS_OBJECTS)?;
                if keys.len() != values.len() {
                    return Err(KeyedArchiveError::MismatchedKeys(keys.len(), values.len()));
                }

                let mut dict = Dictionary::new();
                for (key, value) in keys.iter().zip(values) {
                    let key = match self.resolve_node(key, depth)? {
                        Value::String(key) => key,
                        other => return Err(wrong_kind(NS_KEYS, "string", &other)),
                    };
                    dict.insert(key, self.resolve_node(value, depth)?);
                }
                Ok(Value::Dictionary(dict))
            }
            "NSArray" | "NSMutableArray" => {
                let items = self.list_property(uid, NS_OBJECTS)?;
                let mut array = Vec::with_capacity(items.len());
                for item in items {
                    array.push(self.resolve_node(item, depth)?);
                }
                Ok(Value::Array(array))
            }
            "NSString" | "NSMutableString" => match self.resolve_property(uid, NS_STRING, depth)? {
                Value::String(text) => Ok(Value::String(text)),
                other => Err(wrong_kind(NS_STRING, "string", &other)),
            },
            "NSData" | "NSMutableData" => match self.resolve_property(uid, NS_DATA, depth)? {
                Value::Data(bytes) => Ok(Value::Data(bytes)),
                other => Err(wrong_kind(NS_DATA, "data", &other)),
            },
            "NSDate" => match self.resolve_property(uid, NS_TIME, depth)? {
                Value::Real(seconds) => from_apple_seconds(seconds)
                    .map(Value::Date)
                    .ok_or(KeyedArchiveError::InvalidDate(seconds)),
                other => Err(wrong_kind(NS_TIME, "real", &other)),
            },
            other => Err(KeyedArchiveError::UnsupportedClass(other.to_string())),
        }
    }

    /// Read a property holding an array of children
    fn list_property(&self, uid: u64, name: &str) -> Result<&Vec<Value>, KeyedArchiveError> {
        self.class_property(uid, name)
            .ok_or_else(|| KeyedArchiveError::MissingKey(name.to_string()))?
            .as_array()
            .ok_or_else(|| KeyedArchiveError::InvalidType(name.to_string(), "array".to_string()))
    }

    /// Flatten the target of a UID, or copy a value that was stored inline
    fn resolve_node(&self, node: &Value, depth: usize) -> Result<Value, KeyedArchiveError> {
        match node {
            Value::Uid(target) => self.parse_object(target.get(), depth + 1),
            inline => Ok(inline.clone()),
        }
    }

    fn resolve_property(
        &self,
        uid: u64,
        name: &str,
        depth: usize,
    ) -> Result<Value, KeyedArchiveError> {
        let node = self
            .class_property(uid, name)
            .ok_or_else(|| KeyedArchiveError::MissingKey(name.to_string()))?;
        self.resolve_node(node, depth)
    }
}

fn wrong_kind(key: &str, expected: &str, found: &Value) -> KeyedArchiveError {
    KeyedArchiveError::InvalidType(
        key.to_string(),
        format!("{expected}, found {}", kind_name(found)),
    )
}
