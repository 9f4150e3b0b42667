use std::{
    fs::File,
    io::{stdout, BufWriter, Write},
    path::Path,
};

use crate::app::{error::RuntimeError, runtime::Config};

/// Defines behavior for rendering a decoded tree and writing it out
pub trait Exporter<'a> {
    /// Create a new exporter with a reference to the decoded tree
    fn new(config: &'a Config) -> Self;
    /// Render the decoded tree in the output format
    fn render(&self) -> Result<Vec<u8>, RuntimeError>;
    /// Where the rendered bytes go; stdout if `None`
    fn export_path(&self) -> Option<&Path>;

    /// Render the tree and write it to the export path
    fn export(&self) -> Result<(), RuntimeError> {
        let rendered = self.render()?;
        match self.export_path() {
            Some(path) => {
                let file = File::create(path)
                    .map_err(|err| RuntimeError::CreateError(err, path.to_path_buf()))?;
                write_to(BufWriter::new(file), &rendered)
            }
            None => write_to(stdout().lock(), &rendered),
        }
    }
}

fn write_to<W: Write>(mut writer: W, bytes: &[u8]) -> Result<(), RuntimeError> {
    writer.write_all(bytes).map_err(RuntimeError::DiskError)?;
    writer.flush().map_err(RuntimeError::DiskError)
}
