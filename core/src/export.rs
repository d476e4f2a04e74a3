use std::{
	fs,
	io,
	path::Path
};

use thiserror::Error;

use crate::scene::Scene;

#[derive(Debug, Error)]
pub enum ExportError {
	#[error("Nothing to export")]
	Empty,
	#[error("I/O error")]
	IO {
		#[from]
		source: io::Error,
	},
	#[error("Failed to write document: {0}")]
	Writer(String),
}

/// A sink that serializes a finished [`Scene`] to some interchange format
pub trait Exporter {
	/// File extension of the produced files, without the dot
	fn extension(&self) -> &'static str;

	fn write<W>(&self, scene: &Scene, out: &mut W) -> Result<(), ExportError>
	where
		W: io::Write;

	/// Writes `scene` to `path`, creating missing parent directories
	fn export(&self, scene: &Scene, path: &Path) -> Result<(), ExportError> {
		if scene.mesh_count() == 0 {
			return Err(ExportError::Empty);
		}

		if let Some(parent) = path.parent() {
			if !parent.as_os_str().is_empty() {
				fs::create_dir_all(parent)?;
			}
		}

		// serialize fully before touching the destination
		let mut buf = vec![];
		self.write(scene, &mut buf)?;
		fs::write(path, buf)?;

		log::debug!("Exported {} mesh(es) to {}", scene.mesh_count(), path.display());

		Ok(())
	}
}
