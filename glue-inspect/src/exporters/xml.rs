use std::path::Path;

use imobiledevice_glue::util::plist::uids_to_xml;

use crate::{
    app::{error::RuntimeError, runtime::Config},
    exporters::exporter::Exporter,
};

/// Writes the tree as an XML property list
pub struct XML<'a> {
    pub config: &'a Config,
}

impl<'a> Exporter<'a> for XML<'a> {
    fn new(config: &'a Config) -> Self {
        XML { config }
    }

    fn render(&self) -> Result<Vec<u8>, RuntimeError> {
        // XML plists cannot carry UIDs, so write them in their `CF$UID` form
        let mut bytes = vec![];
        uids_to_xml(&self.config.tree)
            .to_writer_xml(&mut bytes)
            .map_err(RuntimeError::PlistError)?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    fn export_path(&self) -> Option<&Path> {
        self.config.options.export_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use plist::{Dictionary, Uid, Value};

    use crate::{
        app::{
            options::{InputFormat, Options, OutputFormat},
            runtime::Config,
        },
        exporters::{exporter::Exporter, xml::XML},
    };

    #[test]
    fn can_render_uid_as_dictionary() {
        let mut dict = Dictionary::new();
        dict.insert("ref".to_string(), Value::Uid(Uid::new(7)));
        let config = Config {
            options: Options {
                input_format: InputFormat::Plist,
                output_format: OutputFormat::Xml,
                input: PathBuf::from("in.plist"),
                export_path: None,
                top_key: None,
            },
            tree: Value::Dictionary(dict),
        };

        let text = String::from_utf8(XML::new(&config).render().unwrap()).unwrap();
        assert!(text.contains("<key>CF$UID</key>"));
        assert!(text.contains("<integer>7</integer>"));
    }
}
