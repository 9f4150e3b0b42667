use std::{fs::File, io::Cursor, io::Read, path::Path};

use plist::{Dictionary, Value};

use imobiledevice_glue::{keyed_archive::KeyedArchive, opack, tlv};

use crate::{
    app::{
        error::RuntimeError,
        options::{InputFormat, Options, OutputFormat},
    },
    exporters::{exporter::Exporter, json::JSON, opack::OPACK, xml::XML},
};

/// Stores the application state and handles application lifecycle
pub struct Config {
    /// App configuration options
    pub options: Options,
    /// The decoded input
    pub tree: Value,
}

impl Config {
    /// Read and decode the input file named by `options`
    pub fn new(options: Options) -> Result<Config, RuntimeError> {
        eprintln!(
            "Decoding {} as {}...",
            options.input.display(),
            options.input_format
        );
        let bytes = read_input(&options.input)?;
        let tree = decode_input(
            &bytes,
            options.input_format,
            options.top_key.as_deref(),
            &options.input,
        )?;
        Ok(Config { options, tree })
    }

    /// Write the decoded tree in the requested format
    pub fn start(&self) -> Result<(), RuntimeError> {
        match self.options.output_format {
            OutputFormat::Xml => XML::new(self).export()?,
            OutputFormat::Json => JSON::new(self).export()?,
            OutputFormat::Opack => OPACK::new(self).export()?,
        }
        if let Some(path) = &self.options.export_path {
            eprintln!("Wrote {} to {}", self.options.output_format, path.display());
        }
        Ok(())
    }
}

fn read_input(path: &Path) -> Result<Vec<u8>, RuntimeError> {
    let mut file =
        File::open(path).map_err(|err| RuntimeError::ReadError(err, path.to_path_buf()))?;
    let mut bytes = vec![];
    file.read_to_end(&mut bytes)
        .map_err(|err| RuntimeError::ReadError(err, path.to_path_buf()))?;
    Ok(bytes)
}

/// Decode `bytes` into a plist tree according to `format`
pub fn decode_input(
    bytes: &[u8],
    format: InputFormat,
    top_key: Option<&str>,
    path: &Path,
) -> Result<Value, RuntimeError> {
    match format {
        InputFormat::Opack => opack::decode(bytes).map_err(RuntimeError::OpackError),
        InputFormat::Tlv => Ok(tlv_to_tree(bytes)),
        InputFormat::Plist => {
            Value::from_reader(Cursor::new(bytes)).map_err(RuntimeError::PlistError)
        }
        InputFormat::Archive => {
            let archive = KeyedArchive::from_bytes(bytes)
                .map_err(RuntimeError::ArchiveError)?
                .ok_or_else(|| RuntimeError::NotAnArchive(path.to_path_buf()))?;
            let tree = match top_key {
                Some(name) => {
                    let uid = archive.top_uid(Some(name)).ok_or_else(|| {
                        RuntimeError::InvalidOptions(format!("Archive has no $top entry named {name}"))
                    })?;
                    archive.object_to_plist(uid)
                }
                None => archive.to_plist(),
            };
            tree.map_err(RuntimeError::ArchiveError)
        }
    }
}

/// Group `TLV8` records by tag, in order of first appearance, reassembling split values
pub fn tlv_to_tree(bytes: &[u8]) -> Value {
    let mut dict = Dictionary::new();
    for record in tlv::records(bytes) {
        let key = record.tag.to_string();
        if dict.contains_key(&key) {
            continue;
        }
        if let Some(value) = tlv::copy_data(bytes, record.tag) {
            dict.insert(key, Value::Data(value));
        }
    }
    Value::Dictionary(dict)
}

#[cfg(test)]
mod tests {
    use std::{env::current_dir, path::Path};

    use plist::Value;

    use imobiledevice_glue::tlv::TlvBuffer;

    use crate::app::{
        error::RuntimeError,
        options::InputFormat,
        runtime::{decode_input, read_input, tlv_to_tree},
    };

    #[test]
    fn can_group_tlv_records() {
        let mut tlv = TlvBuffer::new();
        tlv.append(6, &[0x01]);
        tlv.append(3, &[0xAA; 300]);
        tlv.append(6, &[0x02]);

        let tree = tlv_to_tree(tlv.as_bytes());
        let dict = tree.as_dictionary().unwrap();
        let keys: Vec<&String> = dict.keys().collect();
        assert_eq!(keys, vec!["6", "3"]);
        assert_eq!(dict.get("6"), Some(&Value::Data(vec![0x01, 0x02])));
        assert_eq!(dict.get("3").and_then(Value::as_data).map(|d| d.len()), Some(300));
    }

    #[test]
    fn cant_read_missing_input() {
        let path = current_dir()
            .unwrap()
            .as_path()
            .join("test_data/does_not_exist.bin");

        let result = read_input(&path);
        assert!(matches!(
            result,
            Err(RuntimeError::ReadError(_, ref missing)) if missing == &path
        ));
    }

    #[test]
    fn can_decode_opack_input() {
        let tree = decode_input(&[0x42, b'h', b'i'], InputFormat::Opack, None, Path::new("in")).unwrap();
        assert_eq!(tree, Value::String("hi".to_string()));
    }

    #[test]
    fn cant_decode_non_plist_archive() {
        let result = decode_input(b"hello", InputFormat::Archive, None, Path::new("in"));
        assert!(matches!(result, Err(RuntimeError::NotAnArchive(_))));
    }

    #[test]
    fn can_decode_archive_top_key() {
        let path = current_dir()
            .unwrap()
            .as_path()
            .join("../imobiledevice-glue/test_data/keyed_archive/DeviceInfo.bplist");
        let bytes = std::fs::read(&path).unwrap();

        let tree = decode_input(&bytes, InputFormat::Archive, Some("root"), &path).unwrap();
        assert!(tree.as_dictionary().unwrap().contains_key("name"));

        let result = decode_input(&bytes, InputFormat::Archive, Some("$0"), &path);
        assert!(matches!(result, Err(RuntimeError::InvalidOptions(_))));
    }
}
