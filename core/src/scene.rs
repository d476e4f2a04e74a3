use ultraviolet::vec::{
	Vec2,
	Vec3,
	Vec4
};

/// Number of texture coordinate sets a [`Vertex`] can hold
pub const UV_SETS: usize = 2;
/// Number of vertex color sets a [`Vertex`] can hold
pub const COLOR_SETS: usize = 2;

#[derive(Clone, Debug, PartialEq)]
pub struct Material {
	pub name: String,
	pub path: Option<String>,
}

impl Material {
	pub fn new(name: &str, path: Option<&str>) -> Material {
		Material {
			name: name.to_string(),
			path: path.map(str::to_string),
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Vertex {
	pub position: Vec3,
	pub normal: Option<Vec3>,
	pub uvs: [Option<Vec2>; UV_SETS],
	pub colors: [Option<Vec4>; COLOR_SETS],
}

impl Vertex {
	pub fn new() -> Vertex {
		Vertex {
			position: Vec3::zero(),
			normal: None,
			uvs: [None; UV_SETS],
			colors: [None; COLOR_SETS],
		}
	}

	/// Sets texture coordinate set `set`, ignoring sets this vertex can't hold
	pub fn set_uv(&mut self, set: usize, uv: Vec2) {
		if let Some(slot) = self.uvs.get_mut(set) {
			*slot = Some(uv);
		}
	}

	/// Sets color set `set`, ignoring sets this vertex can't hold
	pub fn set_color(&mut self, set: usize, color: Vec4) {
		if let Some(slot) = self.colors.get_mut(set) {
			*slot = Some(color);
		}
	}
}

impl Default for Vertex {
	fn default() -> Self {
		Vertex::new()
	}
}

/// A flat list of vertex indices, read three at a time as triangles
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polygon {
	pub indices: Vec<usize>,
}

impl Polygon {
	pub fn new(indices: Vec<usize>) -> Polygon {
		Polygon {
			indices: indices,
		}
	}

	/// Iterates over complete triangles, dropping any trailing partial one
	pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
		self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
	pub name: String,
	pub vertices: Vec<Vertex>,
	pub polygons: Vec<Polygon>,
	/// Index into [`Scene::materials`], if the source links one
	pub material: Option<usize>,
}

impl Mesh {
	pub fn new(name: &str) -> Mesh {
		Mesh {
			name: name.to_string(),
			..Default::default()
		}
	}

	pub fn has_normals(&self) -> bool {
		self.vertices.iter().any(|v| v.normal.is_some())
	}

	pub fn has_uv_set(&self, set: usize) -> bool {
		self.vertices.iter().any(|v| v.uvs.get(set).map_or(false, |uv| uv.is_some()))
	}

	pub fn has_color_set(&self, set: usize) -> bool {
		self.vertices.iter().any(|v| v.colors.get(set).map_or(false, |c| c.is_some()))
	}

	/// Returns the indices of polygons referencing a vertex that doesn't exist
	pub fn find_dangling_polygons(&self) -> Vec<usize> {
		let nverts = self.vertices.len();

		self.polygons.iter().enumerate()
			.filter(|(_, p)| p.indices.iter().any(|i| *i >= nverts))
			.map(|(i, _)| i)
			.collect()
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Model {
	pub name: String,
	pub meshes: Vec<Mesh>,
}

impl Model {
	pub fn new(name: &str) -> Model {
		Model {
			name: name.to_string(),
			meshes: vec![],
		}
	}
}

/// Top level of the 3D environment
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
	pub models: Vec<Model>,
	pub materials: Vec<Material>,
}

impl Scene {
	pub fn new() -> Scene {
		Scene {
			models: vec![],
			materials: vec![],
		}
	}

	pub fn mesh_count(&self) -> usize {
		self.models.iter().map(|m| m.meshes.len()).sum()
	}
}

impl Default for Scene {
	fn default() -> Self {
		Scene::new()
	}
}
