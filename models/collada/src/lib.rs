#[cfg(feature = "export")]
pub mod dae;

#[cfg(feature = "export")]
pub use dae::ColladaExporter;

pub const EXTENSION: &str = "dae";
