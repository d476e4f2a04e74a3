#[cfg(all(feature = "import", feature = "export"))]
pub mod batch;
#[cfg(feature = "import")]
pub mod chunk;
#[cfg(feature = "import")]
pub mod csg;
#[cfg(feature = "import")]
pub mod dxtv;
#[cfg(feature = "import")]
pub mod hierarchy;
#[cfg(feature = "import")]
pub mod index;
#[cfg(feature = "import")]
pub mod resync;

#[cfg(all(test, feature = "import"))]
mod fixture;

use bitflags::bitflags;

use std::{
	io,
	path::{
		Path,
		PathBuf
	}
};

use thiserror::Error;

use mdkit_core::io_ext::CursorError;

#[cfg(feature = "import")]
pub use import::*;

/// Extension of the source files
pub const EXTENSION: &str = "model";
/// Furthest offset from the expected position at which a sub-mesh marker may begin
pub const MAX_LOOKAHEAD: usize = 128;

#[derive(Debug, Error)]
pub enum TTImportError {
	#[error(transparent)]
	Cursor(#[from] CursorError),
	#[error("I/O error")]
	IO {
		#[from]
		source: io::Error,
	},
	#[error("Invalid signature {found:?} at {offset:#X}, expected {expected:?}")]
	InvalidSignature {
		expected: &'static str,
		found: String,
		offset: usize,
	},
	#[error("Unknown/unsupported attribute format: {0}")]
	UnknownAttributeFormat(u8),
	#[error("Unknown/unsupported index format: {0}")]
	UnsupportedIndexFormat(u32),
	#[error("Sub-mesh at {offset:#X} declares {num_verts} vertices but holds no vertex data")]
	NoVertexData {
		num_verts: u32,
		offset: usize,
	},
}

bitflags! {
	pub struct ImportFlag: u32 {
		/// Scan for the sub-mesh marker before reading each sub-mesh header
		const RESYNC_SCAN = 1;
		/// Map color set bytes to `0.0..=1.0`
		const NORMALIZE_COLORS = 2;
		/// Attach the material table to the scene
		const INCLUDE_MATERIALS = 4;
	}
}

impl Default for ImportFlag {
	fn default() -> Self {
		ImportFlag::RESYNC_SCAN | ImportFlag::NORMALIZE_COLORS | ImportFlag::INCLUDE_MATERIALS
	}
}

/// Layout details that differ between known variants of the format
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormatProfile {
	pub name: &'static str,
	/// Padding after the index list of every sub-mesh
	pub trailing_pad: usize,
	/// Accepted index format codes
	pub index_formats: &'static [u32],
}

impl FormatProfile {
	pub const WIDE: FormatProfile = FormatProfile {
		name: "wide",
		trailing_pad: 70,
		index_formats: &[2, 4],
	};

	pub const STRICT: FormatProfile = FormatProfile {
		name: "strict",
		trailing_pad: 78,
		index_formats: &[2],
	};

	pub const ALL: [FormatProfile; 2] = [FormatProfile::WIDE, FormatProfile::STRICT];

	pub fn by_name(name: &str) -> Option<FormatProfile> {
		FormatProfile::ALL.iter().copied().find(|p| p.name.eq_ignore_ascii_case(name))
	}

	pub fn accepts_index_format(&self, code: u32) -> bool {
		self.index_formats.contains(&code)
	}
}

impl Default for FormatProfile {
	fn default() -> Self {
		FormatProfile::WIDE
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImportCfg {
	pub flags: ImportFlag,
	pub profile: FormatProfile,
	/// How far past the expected position a sub-mesh marker may start
	pub max_lookahead: usize,
	/// Bytes to skip per vertex buffer of the previous sub-mesh when no marker is found
	pub fallback_per_buffer: usize,
}

impl Default for ImportCfg {
	fn default() -> Self {
		Self {
			flags: ImportFlag::default(),
			profile: FormatProfile::default(),
			max_lookahead: MAX_LOOKAHEAD,
			fallback_per_buffer: 4,
		}
	}
}

/// Destination of the export of an asset named `name`: the first character is dropped, the rest
/// is taken as a relative path below `root`, with its extension replaced by `ext`. Empty, `.` and
/// `..` components are skipped.
pub fn output_path(root: &Path, name: &str, ext: &str) -> Option<PathBuf> {
	let mut chars = name.chars();
	chars.next()?;

	let parts: Vec<&str> = chars.as_str().split(|c| c == '/' || c == '\\')
		.filter(|p| !p.is_empty() && *p != "." && *p != "..")
		.collect();
	if parts.is_empty() {
		return None;
	}

	let mut path = root.to_path_buf();
	path.extend(parts);
	path.set_extension(ext);

	Some(path)
}

#[cfg(feature = "import")]
pub mod import {
	use log::{
		debug,
		warn
	};

	use std::{
		fs,
		path::{
			Path,
			PathBuf
		}
	};

	use ultraviolet::vec::{
		Vec2,
		Vec3,
		Vec4
	};

	use mdkit_core::{
		io_ext::{
			ByteCursor,
			Endian
		},
		scene::{
			Material,
			Mesh,
			Model,
			Polygon,
			Scene,
			Vertex
		}
	};

	use crate::{
		chunk::{
			self,
			ChunkHeader,
			ChunkKind
		},
		csg::{
			SceneData,
			SubMesh
		},
		dxtv::AttributeType,
		hierarchy,
		output_path,
		ImportCfg,
		ImportFlag,
		TTImportError
	};

	/// Everything decoded from one `.model` file
	#[derive(Clone, Debug, Default, PartialEq)]
	pub struct TTModel {
		/// Asset name from the resource hierarchy
		pub name: Option<String>,
		pub chunks: Vec<ChunkHeader>,
		pub materials: Vec<Material>,
		pub meshes: Vec<SubMesh>,
	}

	impl TTModel {
		pub fn read(data: &[u8], cfg: &ImportCfg) -> Result<TTModel, TTImportError> {
			let mut buf = ByteCursor::new(data);
			buf.set_endian(Endian::Big);

			let mut model = TTModel::default();
			let chunks = chunk::walk(&mut buf, |header, buf| {
				match header.kind() {
					ChunkKind::Hierarchy => model.name = Some(hierarchy::read_name(buf)?),
					ChunkKind::Scene => {
						let scene = SceneData::read(buf, cfg)?;
						model.materials.extend(scene.materials);
						model.meshes.extend(scene.meshes);
					},
					ChunkKind::Unknown => {},
				}

				Ok(())
			})?;
			model.chunks = chunks;

			debug!("Decoded {:?}: {} chunk(s), {} material(s), {} sub-mesh(es)", model.name,
				model.chunks.len(), model.materials.len(), model.meshes.len());

			Ok(model)
		}

		/// Name for the exported model, the asset's file stem when there is one
		pub fn model_name(&self) -> String {
			self.name.as_deref()
				.map(|n| {
					let mut chars = n.chars();
					chars.next();
					chars.as_str()
				})
				.and_then(|n| n.rsplit(|c| c == '/' || c == '\\').next())
				.map(|n| n.split('.').next().unwrap_or(n))
				.filter(|n| !n.is_empty())
				.unwrap_or("Model")
				.to_string()
		}

		pub fn to_scene(&self, cfg: &ImportCfg) -> Scene {
			let mut model = Model::new(&self.model_name());
			model.meshes = self.meshes.iter().enumerate()
				.map(|(i, sub)| assemble(i, sub, cfg))
				.collect();

			let mut scene = Scene::new();
			scene.models.push(model);
			if cfg.flags.contains(ImportFlag::INCLUDE_MATERIALS) {
				scene.materials = self.materials.clone();
			}

			scene
		}

		/// Export destination below `root` derived from the asset name
		pub fn output_path(&self, root: &Path, ext: &str) -> Option<PathBuf> {
			self.name.as_deref().and_then(|n| output_path(root, n, ext))
		}
	}

	/// Folds the decoded buffers and indices of a sub-mesh into a generic mesh
	pub fn assemble(index: usize, sub: &SubMesh, cfg: &ImportCfg) -> Mesh {
		let normalize = cfg.flags.contains(ImportFlag::NORMALIZE_COLORS);
		let color = |c: Vec4| if normalize { c / 255.0 } else { c };

		let mut mesh = Mesh::new(&format!("Mesh_{}", index));
		let num_verts = sub.buffers.iter()
			.flat_map(|b| b.attributes.iter())
			.map(|a| a.data.len())
			.max()
			.unwrap_or(0);

		for buffer in sub.buffers.iter() {
			for attr in buffer.attributes.iter() {
				if let AttributeType::Other(t) = attr.kind {
					warn!("Mesh_{}: ignoring attribute of unknown type {}", index, t);
				}
			}
		}

		for v in 0..num_verts {
			let mut vert = Vertex::new();

			for buffer in sub.buffers.iter() {
				for attr in buffer.attributes.iter() {
					let d = match attr.data.get(v) {
						Some(d) => *d,
						None => continue,
					};

					match attr.kind {
						AttributeType::Position => vert.position = Vec3::new(d.x, d.y, d.z),
						AttributeType::Normal => vert.normal = Some(Vec3::new(d.x, d.y, d.z)),
						AttributeType::UvSet0 => vert.set_uv(0, Vec2::new(d.x, d.y)),
						AttributeType::UvSet1 => vert.set_uv(1, Vec2::new(d.x, d.y)),
						AttributeType::ColorSet0 => vert.set_color(0, color(d)),
						AttributeType::ColorSet1 => vert.set_color(1, color(d)),
						_ => {},
					}
				}
			}

			mesh.vertices.push(vert);
		}

		mesh.polygons.push(Polygon::new(sub.indices.iter().map(|i| *i as usize).collect()));

		mesh
	}

	/// Reads and decodes the file at `path`
	pub fn read(path: &Path, cfg: &ImportCfg) -> Result<TTModel, TTImportError> {
		let data = fs::read(path)?;
		debug!("Read {} byte(s) from {}", data.len(), path.display());

		TTModel::read(&data, cfg)
	}

}
