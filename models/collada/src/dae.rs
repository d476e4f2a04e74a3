use chrono::{
	DateTime,
	SecondsFormat,
	Utc
};

use log::warn;

use std::io;

use xml::writer::{
	EmitterConfig,
	EventWriter,
	XmlEvent
};

use mdkit_core::{
	export::{
		ExportError,
		Exporter
	},
	scene::{
		Material,
		Mesh,
		Scene,
		COLOR_SETS,
		UV_SETS
	}
};

use crate::EXTENSION;

pub const NAMESPACE: &str = "http://www.collada.org/2005/11/COLLADASchema";
pub const VERSION: &str = "1.4.1";
pub const UP_AXIS: &str = "Y_UP";

/// Serializes scenes to COLLADA 1.4.1 documents
#[derive(Clone, Debug, PartialEq)]
pub struct ColladaExporter {
	pub authoring_tool: String,
	pub indent: bool,
	/// Written as the creation and modification time of the document, the current time if unset
	pub timestamp: Option<DateTime<Utc>>,
}

impl Default for ColladaExporter {
	fn default() -> Self {
		Self {
			authoring_tool: format!("mdkit {}", env!("CARGO_PKG_VERSION")),
			indent: true,
			timestamp: None,
		}
	}
}

struct DaeWriter<W: io::Write> {
	w: EventWriter<W>,
}

impl<W: io::Write> DaeWriter<W> {
	fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), ExportError> {
		let mut e = XmlEvent::start_element(name);
		for (k, v) in attrs.iter() {
			e = e.attr(*k, v);
		}

		self.w.write(e).map_err(|e| ExportError::Writer(e.to_string()))
	}

	fn end(&mut self) -> Result<(), ExportError> {
		self.w.write(XmlEvent::end_element()).map_err(|e| ExportError::Writer(e.to_string()))
	}

	fn text(&mut self, text: &str) -> Result<(), ExportError> {
		self.w.write(XmlEvent::characters(text)).map_err(|e| ExportError::Writer(e.to_string()))
	}

	/// Writes an element holding only text
	fn leaf(&mut self, name: &str, attrs: &[(&str, &str)], text: &str) -> Result<(), ExportError> {
		self.start(name, attrs)?;
		self.text(text)?;
		self.end()
	}

	/// Writes an element with no content
	fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), ExportError> {
		self.start(name, attrs)?;
		self.end()
	}

	/// Writes a `<source>` of `count` elements made of one float per parameter
	fn source(&mut self, id: &str, params: &[&str], values: &[f32]) -> Result<(), ExportError> {
		let array_id = format!("{}-array", id);
		let count = (values.len() / params.len()).to_string();
		let stride = params.len().to_string();

		self.start("source", &[("id", id)])?;
		self.leaf("float_array", &[("id", &array_id), ("count", &values.len().to_string())],
			&join(values.iter()))?;
		self.start("technique_common", &[])?;
		self.start("accessor", &[("source", &format!("#{}", array_id)), ("count", &count),
			("stride", &stride)])?;
		for p in params.iter() {
			self.empty("param", &[("name", p), ("type", "float")])?;
		}
		self.end()?;
		self.end()?;
		self.end()
	}
}

fn join<T, I>(values: I) -> String
where
	T: ToString,
	I: Iterator<Item = T>,
{
	values.map(|v| v.to_string()).collect::<Vec<_>>().join(" ")
}

fn material_id(index: usize) -> String {
	format!("material{}", index)
}

fn write_materials<W>(dae: &mut DaeWriter<W>, materials: &[Material]) -> Result<(), ExportError>
where
	W: io::Write,
{
	if materials.is_empty() {
		return Ok(());
	}

	dae.start("library_effects", &[])?;
	for i in 0..materials.len() {
		dae.start("effect", &[("id", &format!("{}-effect", material_id(i)))])?;
		dae.start("profile_COMMON", &[])?;
		dae.start("technique", &[("sid", "common")])?;
		dae.start("lambert", &[])?;
		dae.start("diffuse", &[])?;
		dae.leaf("color", &[("sid", "diffuse")], "0.8 0.8 0.8 1")?;
		dae.end()?;
		dae.end()?;
		dae.end()?;
		dae.end()?;
		dae.end()?;
	}
	dae.end()?;

	dae.start("library_materials", &[])?;
	for (i, mat) in materials.iter().enumerate() {
		let id = material_id(i);
		dae.start("material", &[("id", &id), ("name", &mat.name)])?;
		dae.empty("instance_effect", &[("url", &format!("#{}-effect", id))])?;
		if let Some(path) = &mat.path {
			dae.start("extra", &[])?;
			dae.start("technique", &[("profile", "mdkit")])?;
			dae.leaf("source_path", &[], path)?;
			dae.end()?;
			dae.end()?;
		}
		dae.end()?;
	}
	dae.end()
}

fn write_geometry<W>(dae: &mut DaeWriter<W>, id: &str, mesh: &Mesh, materials: &[Material])
	-> Result<(), ExportError>
where
	W: io::Write,
{
	let nverts = mesh.vertices.len();
	let mut inputs: Vec<(&str, String, Option<usize>)> = vec![];

	dae.start("geometry", &[("id", id), ("name", &mesh.name)])?;
	dae.start("mesh", &[])?;

	let positions: Vec<f32> = mesh.vertices.iter()
		.flat_map(|v| [v.position.x, v.position.y, v.position.z])
		.collect();
	dae.source(&format!("{}-positions", id), &["X", "Y", "Z"], &positions)?;

	if mesh.has_normals() {
		let normals: Vec<f32> = mesh.vertices.iter()
			.map(|v| v.normal.unwrap_or_default())
			.flat_map(|n| [n.x, n.y, n.z])
			.collect();
		let src = format!("{}-normals", id);
		dae.source(&src, &["X", "Y", "Z"], &normals)?;
		inputs.push(("NORMAL", src, None));
	}

	for set in 0..UV_SETS {
		if mesh.has_uv_set(set) {
			let uvs: Vec<f32> = mesh.vertices.iter()
				.map(|v| v.uvs[set].unwrap_or_default())
				.flat_map(|uv| [uv.x, uv.y])
				.collect();
			let src = format!("{}-uv{}", id, set);
			dae.source(&src, &["S", "T"], &uvs)?;
			inputs.push(("TEXCOORD", src, Some(set)));
		}
	}

	for set in 0..COLOR_SETS {
		if mesh.has_color_set(set) {
			let colors: Vec<f32> = mesh.vertices.iter()
				.map(|v| v.colors[set].unwrap_or_default())
				.flat_map(|c| [c.x, c.y, c.z, c.w])
				.collect();
			let src = format!("{}-color{}", id, set);
			dae.source(&src, &["R", "G", "B", "A"], &colors)?;
			inputs.push(("COLOR", src, Some(set)));
		}
	}

	let vertices_id = format!("{}-vertices", id);
	dae.start("vertices", &[("id", &vertices_id)])?;
	dae.empty("input", &[("semantic", "POSITION"), ("source", &format!("#{}-positions", id))])?;
	dae.end()?;

	let material = mesh.material.filter(|m| *m < materials.len()).map(material_id);
	let dangling = mesh.find_dangling_polygons();
	for (pi, poly) in mesh.polygons.iter().enumerate() {
		let tris: Vec<[usize; 3]> = if dangling.contains(&pi) {
			let tris: Vec<[usize; 3]> = poly.triangles()
				.filter(|t| t.iter().all(|i| *i < nverts))
				.collect();
			warn!("{}: polygon {} references missing vertices, dropping {} triangle(s)", mesh.name, pi,
				poly.indices.len() / 3 - tris.len());
			tris
		} else {
			poly.triangles().collect()
		};
		if poly.indices.len() % 3 != 0 {
			warn!("{}: dropping {} trailing index(es) of polygon {}", mesh.name, poly.indices.len() % 3,
				pi);
		}

		let count = tris.len().to_string();
		let mut attrs = vec![("count", count.as_str())];
		if let Some(m) = &material {
			attrs.push(("material", m.as_str()));
		}
		dae.start("triangles", &attrs)?;

		dae.empty("input", &[("semantic", "VERTEX"), ("source", &format!("#{}", vertices_id)),
			("offset", "0")])?;
		for (semantic, src, set) in inputs.iter() {
			let src = format!("#{}", src);
			match set {
				Some(set) => dae.empty("input", &[("semantic", semantic), ("source", &src),
					("offset", "0"), ("set", &set.to_string())])?,
				None => dae.empty("input", &[("semantic", semantic), ("source", &src),
					("offset", "0")])?,
			}
		}

		dae.leaf("p", &[], &join(tris.iter().flatten()))?;
		dae.end()?;
	}

	dae.end()?;
	dae.end()
}

impl Exporter for ColladaExporter {
	fn extension(&self) -> &'static str {
		EXTENSION
	}

	fn write<W>(&self, scene: &Scene, out: &mut W) -> Result<(), ExportError>
	where
		W: io::Write,
	{
		let w = EmitterConfig::new().perform_indent(self.indent).create_writer(out);
		let mut dae = DaeWriter { w: w };

		let root = XmlEvent::start_element("COLLADA").default_ns(NAMESPACE).attr("version", VERSION);
		dae.w.write(root).map_err(|e| ExportError::Writer(e.to_string()))?;

		let stamp = self.timestamp.unwrap_or_else(Utc::now).to_rfc3339_opts(SecondsFormat::Secs, true);

		dae.start("asset", &[])?;
		dae.start("contributor", &[])?;
		dae.leaf("authoring_tool", &[], &self.authoring_tool)?;
		dae.end()?;
		dae.leaf("created", &[], &stamp)?;
		dae.leaf("modified", &[], &stamp)?;
		dae.empty("unit", &[("name", "meter"), ("meter", "1")])?;
		dae.leaf("up_axis", &[], UP_AXIS)?;
		dae.end()?;

		write_materials(&mut dae, &scene.materials)?;

		dae.start("library_geometries", &[])?;
		for (mi, model) in scene.models.iter().enumerate() {
			for (i, mesh) in model.meshes.iter().enumerate() {
				write_geometry(&mut dae, &format!("model{}-mesh{}", mi, i), mesh, &scene.materials)?;
			}
		}
		dae.end()?;

		dae.start("library_visual_scenes", &[])?;
		dae.start("visual_scene", &[("id", "Scene"), ("name", "Scene")])?;
		for (mi, model) in scene.models.iter().enumerate() {
			dae.start("node", &[("id", &format!("model{}", mi)), ("name", &model.name)])?;
			for (i, mesh) in model.meshes.iter().enumerate() {
				dae.start("instance_geometry", &[("url", &format!("#model{}-mesh{}", mi, i))])?;
				if let Some(m) = mesh.material.filter(|m| *m < scene.materials.len()) {
					let id = material_id(m);
					dae.start("bind_material", &[])?;
					dae.start("technique_common", &[])?;
					dae.empty("instance_material", &[("symbol", &id), ("target", &format!("#{}", id))])?;
					dae.end()?;
					dae.end()?;
				}
				dae.end()?;
			}
			dae.end()?;
		}
		dae.end()?;
		dae.end()?;

		dae.start("scene", &[])?;
		dae.empty("instance_visual_scene", &[("url", "#Scene")])?;
		dae.end()?;

		dae.end()
	}
}
