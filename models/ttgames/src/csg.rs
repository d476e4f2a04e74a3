use log::{
	debug,
	warn
};

use mdkit_core::{
	io_ext::ByteCursor,
	scene::Material,
	tag4
};

use crate::{
	dxtv::{
		read_buffers,
		VertexBuffer
	},
	ImportCfg,
	ImportFlag,
	index::{
		read_indices,
		IndexFormat
	},
	resync::{
		seek_to_marker,
		Resync,
		MARKER
	},
	TTImportError
};

pub const SUBMESH_MAGIC: u32 = tag4!(b"SMNR");

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubMeshHeader {
	pub magic: u32,
	pub version: u32,
	pub num_buffers: u32,
	pub unknown_0c: u32,
	pub unknown_10: u32,
	pub num_verts: u32,
}

impl SubMeshHeader {
	fn read(buf: &mut ByteCursor) -> Result<SubMeshHeader, TTImportError> {
		let offset = buf.position();
		let magic = buf.read_u32()?;
		if magic != SUBMESH_MAGIC {
			warn!("Sub-mesh header at {:#X} starts with {:#010X}, not SMNR", offset, magic);
		}

		Ok(SubMeshHeader {
			magic: magic,
			version: buf.read_u32()?,
			num_buffers: buf.read_u32()?,
			unknown_0c: buf.read_u32()?,
			unknown_10: buf.read_u32()?,
			num_verts: buf.read_u32()?,
		})
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct SubMesh {
	pub header: SubMeshHeader,
	pub buffers: Vec<VertexBuffer>,
	pub index_format: IndexFormat,
	pub indices: Vec<u32>,
	/// How the header was located, when scanning for it
	pub resync: Option<Resync>,
}

fn read_material(buf: &mut ByteCursor) -> Result<Material, TTImportError> {
	buf.read_u8()?;
	let path = buf.read_cstr_pair()?;
	buf.read_u8()?;
	let name = buf.read_cstr_pair()?;
	buf.read_bytes(3)?;

	debug!("\tMaterial {:?} at {:?}", name, path);
	Ok(Material::new(&name, Some(&path)))
}

/// Contents of one scene data chunk
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneData {
	pub materials: Vec<Material>,
	pub meshes: Vec<SubMesh>,
}

impl SceneData {
	pub fn read(buf: &mut ByteCursor, cfg: &ImportCfg) -> Result<SceneData, TTImportError> {
		let num_materials = buf.read_u32()?;
		let unknown = buf.read_u16()?;
		buf.read_i16()?;
		debug!("{} material(s), unknown {}", num_materials, unknown);

		let mut materials = vec![];
		for _ in 0..num_materials {
			materials.push(read_material(buf)?);
		}

		buf.read_u32()?;
		let num_meshes = buf.read_u32()?;
		buf.read_u32()?;
		debug!("{} sub-mesh(es) from {:#X}", num_meshes, buf.position());

		let mut meshes = vec![];
		let mut fallback = 0;
		for i in 0..num_meshes {
			let resync = if cfg.flags.contains(ImportFlag::RESYNC_SCAN) {
				Some(seek_to_marker(buf, &MARKER, cfg.max_lookahead, fallback)?)
			} else {
				None
			};

			let offset = buf.position();
			debug!("Sub-mesh {}/{} at {:#X}", i + 1, num_meshes, offset);
			let header = SubMeshHeader::read(buf)?;
			debug!("\tversion {}, {} buffer(s), {} vertices, unknowns {} {}", header.version,
				header.num_buffers, header.num_verts, header.unknown_0c, header.unknown_10);

			let buffers = read_buffers(buf, header.num_buffers as usize, header.num_verts as usize)?;
			if header.num_verts > 0 && buffers.iter().all(|b| b.stride == 0) {
				return Err(TTImportError::NoVertexData {
					num_verts: header.num_verts,
					offset: offset,
				});
			}
			let (index_format, indices) = read_indices(buf, &cfg.profile)?;

			let pad = cfg.profile.trailing_pad.min(buf.remaining());
			if pad < cfg.profile.trailing_pad {
				debug!("\tStream ends {} byte(s) into the trailing padding", pad);
			}
			buf.seek_relative(pad as i64)?;

			fallback = header.num_buffers as usize * cfg.fallback_per_buffer;
			meshes.push(SubMesh {
				header: header,
				buffers: buffers,
				index_format: index_format,
				indices: indices,
				resync: resync,
			});
		}

		Ok(SceneData {
			materials: materials,
			meshes: meshes,
		})
	}
}
