use std::path::Path;

use imobiledevice_glue::opack;

use crate::{
    app::{error::RuntimeError, runtime::Config},
    exporters::exporter::Exporter,
};

/// Re-encodes the tree as `OPACK`
pub struct OPACK<'a> {
    pub config: &'a Config,
}

impl<'a> Exporter<'a> for OPACK<'a> {
    fn new(config: &'a Config) -> Self {
        OPACK { config }
    }

    fn render(&self) -> Result<Vec<u8>, RuntimeError> {
        opack::encode(&self.config.tree).map_err(RuntimeError::OpackError)
    }

    fn export_path(&self) -> Option<&Path> {
        self.config.options.export_path.as_deref()
    }
}
