/*!
 Helpers to pull typed data out of [`plist`] trees.
*/

use plist::{Dictionary, Uid, Value};

use crate::error::keyed_archive::KeyedArchiveError;

/// XML property lists have no UID type; Apple writes them as a dictionary with this single key
pub const XML_UID_KEY: &str = "CF$UID";

/// Get the name of the kind of a plist node, used in error messages
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Array(_) => "array",
        Value::Dictionary(_) => "dictionary",
        Value::Boolean(_) => "boolean",
        Value::Data(_) => "data",
        Value::Date(_) => "date",
        Value::Real(_) => "real",
        Value::Integer(_) => "integer",
        Value::String(_) => "string",
        Value::Uid(_) => "uid",
        _ => "unknown",
    }
}

/// Get the unsigned 64-bit representation of an integer node; signed values are reinterpreted
pub fn integer_bits(value: &Value) -> Option<u64> {
    match value {
        Value::Integer(int) => int
            .as_unsigned()
            .or_else(|| int.as_signed().map(|signed| signed as u64)),
        _ => None,
    }
}

/// Extract a dictionary from a key of `body`
pub fn extract_dictionary<'a>(
    body: &'a Dictionary,
    key: &str,
) -> Result<&'a Dictionary, KeyedArchiveError> {
    body.get(key)
        .ok_or_else(|| KeyedArchiveError::MissingKey(key.to_string()))?
        .as_dictionary()
        .ok_or_else(|| KeyedArchiveError::InvalidType(key.to_string(), "dictionary".to_string()))
}

/// Extract an array from a key of `body`
pub fn extract_array_key<'a>(
    body: &'a Dictionary,
    key: &str,
) -> Result<&'a Vec<Value>, KeyedArchiveError> {
    body.get(key)
        .ok_or_else(|| KeyedArchiveError::MissingKey(key.to_string()))?
        .as_array()
        .ok_or_else(|| KeyedArchiveError::InvalidType(key.to_string(), "array".to_string()))
}

/// Extract a mutable array from a key of `body`
pub fn extract_array_key_mut<'a>(
    body: &'a mut Dictionary,
    key: &str,
) -> Result<&'a mut Vec<Value>, KeyedArchiveError> {
    body.get_mut(key)
        .ok_or_else(|| KeyedArchiveError::MissingKey(key.to_string()))?
        .as_array_mut()
        .ok_or_else(|| KeyedArchiveError::InvalidType(key.to_string(), "array".to_string()))
}

/// Replace every `{"CF$UID": n}` dictionary in a tree read from XML with a [`Uid`]
pub fn uids_from_xml(value: &mut Value) {
    let uid = match value {
        Value::Dictionary(dict) if dict.len() == 1 => dict
            .get(XML_UID_KEY)
            .and_then(Value::as_unsigned_integer),
        _ => None,
    };
    if let Some(uid) = uid {
        *value = Value::Uid(Uid::new(uid));
        return;
    }
    match value {
        Value::Dictionary(dict) => dict.values_mut().for_each(uids_from_xml),
        Value::Array(items) => items.iter_mut().for_each(uids_from_xml),
        _ => {}
    }
}

/// Copy a tree, replacing every [`Uid`] with the `{"CF$UID": n}` form XML writers understand
pub fn uids_to_xml(value: &Value) -> Value {
    match value {
        Value::Uid(uid) => {
            let mut dict = Dictionary::new();
            dict.insert(XML_UID_KEY.to_string(), Value::Integer(uid.get().into()));
            Value::Dictionary(dict)
        }
        Value::Dictionary(dict) => Value::Dictionary(
            dict.iter()
                .map(|(key, item)| (key.clone(), uids_to_xml(item)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(uids_to_xml).collect()),
        other => other.clone(),
    }
}
