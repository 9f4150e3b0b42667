use std::path::Path;

use base64::prelude::{Engine as _, BASE64_STANDARD};
use json::{from, object::Object, JsonValue};
use plist::Value;

use imobiledevice_glue::util::{dates, plist::XML_UID_KEY};

use crate::{
    app::{error::RuntimeError, runtime::Config},
    exporters::exporter::Exporter,
};

/// Writes the tree as pretty-printed JSON
pub struct JSON<'a> {
    pub config: &'a Config,
}

impl<'a> Exporter<'a> for JSON<'a> {
    fn new(config: &'a Config) -> Self {
        JSON { config }
    }

    fn render(&self) -> Result<Vec<u8>, RuntimeError> {
        Ok((to_json(&self.config.tree).pretty(2) + "\n").into_bytes())
    }

    fn export_path(&self) -> Option<&Path> {
        self.config.options.export_path.as_deref()
    }
}

/// Convert a plist node to JSON
///
/// Data becomes base64 text, dates become RFC 3339 strings when in range, and UIDs
/// take the same `{"CF$UID": n}` shape they have in XML plists.
pub fn to_json(value: &Value) -> JsonValue {
    match value {
        Value::Boolean(flag) => from(*flag),
        Value::Integer(int) => match int.as_unsigned() {
            Some(unsigned) => from(unsigned),
            None => int.as_signed().map_or(JsonValue::Null, from),
        },
        Value::Real(real) => from(*real),
        Value::String(string) => from(string.as_str()),
        Value::Data(data) => from(BASE64_STANDARD.encode(data)),
        // Dates chrono cannot represent fall back to seconds since the Apple reference date
        Value::Date(date) => match dates::format(date) {
            Some(text) => from(text),
            None => from(dates::lossy_apple_seconds(date)),
        },
        Value::Uid(uid) => {
            let mut object = Object::new();
            object.insert(XML_UID_KEY, from(uid.get()));
            JsonValue::Object(object)
        }
        Value::Array(items) => JsonValue::Array(items.iter().map(to_json).collect()),
        Value::Dictionary(dict) => {
            let mut object = Object::with_capacity(dict.len());
            for (key, item) in dict {
                object.insert(key, to_json(item));
            }
            JsonValue::Object(object)
        }
        _ => JsonValue::Null,
    }
}
