//! Builders for synthetic `.model` streams used by the unit tests

use crate::{
	chunk::{
		TAG_HIERARCHY,
		TAG_SCENE
	},
	dxtv::SIGNATURE,
	resync::MARKER
};

#[derive(Clone, Debug, Default)]
pub struct Bytes(pub Vec<u8>);

impl Bytes {
	pub fn new() -> Bytes {
		Bytes(vec![])
	}

	pub fn u8(&mut self, v: u8) -> &mut Self {
		self.0.push(v);
		self
	}

	pub fn u16_be(&mut self, v: u16) -> &mut Self {
		self.0.extend_from_slice(&v.to_be_bytes());
		self
	}

	pub fn u16_le(&mut self, v: u16) -> &mut Self {
		self.0.extend_from_slice(&v.to_le_bytes());
		self
	}

	pub fn u32_be(&mut self, v: u32) -> &mut Self {
		self.0.extend_from_slice(&v.to_be_bytes());
		self
	}

	pub fn u32_le(&mut self, v: u32) -> &mut Self {
		self.0.extend_from_slice(&v.to_le_bytes());
		self
	}

	pub fn f32_le(&mut self, v: f32) -> &mut Self {
		self.0.extend_from_slice(&v.to_le_bytes());
		self
	}

	pub fn bytes(&mut self, b: &[u8]) -> &mut Self {
		self.0.extend_from_slice(b);
		self
	}

	pub fn zeros(&mut self, n: usize) -> &mut Self {
		self.0.resize(self.0.len() + n, 0);
		self
	}

	pub fn cstr(&mut self, s: &str) -> &mut Self {
		self.0.extend_from_slice(s.as_bytes());
		self.0.push(0);
		self
	}

	pub fn build(&self) -> Vec<u8> {
		self.0.clone()
	}
}

/// Wraps `body` in a chunk header, sized so the next chunk starts right after it
pub fn chunk(tag: &[u8; 12], version: u32, body: &[u8]) -> Vec<u8> {
	let mut b = Bytes::new();
	b.u32_be((body.len() + 16) as u32).bytes(tag).u32_be(version).bytes(body);
	b.build()
}

pub fn hierarchy(name: &str) -> Vec<u8> {
	let mut b = Bytes::new();
	b.cstr("ResourceHeader").cstr(name).cstr("");
	chunk(&TAG_HIERARCHY, 1, &b.build())
}

#[derive(Clone, Debug)]
pub struct BufferSpec {
	pub attrs: Vec<(u8, u8, u8)>,
	pub payload: Vec<u8>,
}

impl BufferSpec {
	/// A single `Vec3Float` position attribute
	pub fn positions(points: &[[f32; 3]]) -> BufferSpec {
		let mut payload = Bytes::new();
		for p in points.iter() {
			payload.f32_le(p[0]).f32_le(p[1]).f32_le(p[2]);
		}

		BufferSpec {
			attrs: vec![(0, 3, 0)],
			payload: payload.build(),
		}
	}
}

#[derive(Clone, Debug)]
pub struct MeshSpec {
	/// Junk placed in front of the sub-mesh marker
	pub gap: Vec<u8>,
	pub version: u32,
	pub num_verts: u32,
	pub buffers: Vec<BufferSpec>,
	pub index_format: u32,
	pub indices: Vec<u32>,
	pub trailing_pad: usize,
}

impl MeshSpec {
	pub fn triangle() -> MeshSpec {
		MeshSpec {
			gap: vec![],
			version: 1,
			num_verts: 3,
			buffers: vec![BufferSpec::positions(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0],
				[-7.0, 8.5, 0.25]])],
			index_format: 2,
			indices: vec![0, 1, 2],
			trailing_pad: 70,
		}
	}

	pub fn write(&self, b: &mut Bytes) {
		b.bytes(&self.gap);
		b.bytes(&MARKER).u32_be(self.version).u32_be(self.buffers.len() as u32).u32_be(0)
			.u32_be(0).u32_be(self.num_verts);

		for buffer in self.buffers.iter() {
			b.bytes(&SIGNATURE).u32_be(1).u32_be(buffer.attrs.len() as u32);
			for (kind, format, offset) in buffer.attrs.iter() {
				b.u8(*kind).u8(*format).u8(*offset);
			}
			b.zeros(6).bytes(&buffer.payload).zeros(16);
		}

		b.u32_be(self.indices.len() as u32).u32_be(self.index_format);
		for i in self.indices.iter() {
			match self.index_format {
				4 => b.u32_le(*i),
				_ => b.u16_le(*i as u16),
			};
		}
		b.zeros(self.trailing_pad);
	}
}

pub fn scene_body(materials: &[(&str, &str)], meshes: &[MeshSpec]) -> Vec<u8> {
	let mut b = Bytes::new();
	b.u32_be(materials.len() as u32).u16_be(0x0101).u16_be(0);

	for (path, name) in materials.iter() {
		b.u8(0).cstr(path).cstr("").u8(0).cstr(name).cstr("").zeros(3);
	}

	b.u32_be(0).u32_be(meshes.len() as u32).u32_be(1);
	for mesh in meshes.iter() {
		mesh.write(&mut b);
	}

	b.build()
}

pub fn scene(materials: &[(&str, &str)], meshes: &[MeshSpec]) -> Vec<u8> {
	chunk(&TAG_SCENE, 1, &scene_body(materials, meshes))
}

/// Hierarchy and scene chunks holding a single triangle
pub fn triangle_model() -> Vec<u8> {
	let mut data = hierarchy("-Assets/Core/RopeAssets/ledge_end2_dx11.model");
	data.extend(scene(&[("Assets/Materials/rope.mat", "rope")], &[MeshSpec::triangle()]));
	data
}
