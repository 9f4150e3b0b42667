pub mod exporter;
pub mod json;
pub mod opack;
pub mod xml;
