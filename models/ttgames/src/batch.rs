//! Conversion of many `.model` files in one go. A file that fails to decode or export is logged
//! and counted, and never stops the rest of the batch.

use log::{
	error,
	info,
	warn
};

use std::{
	fs,
	io,
	path::{
		Path,
		PathBuf
	}
};

use thiserror::Error;

use mdkit_core::export::{
	ExportError,
	Exporter
};

use crate::{
	ImportCfg,
	TTImportError,
	TTModel,
	EXTENSION
};

#[derive(Debug, Error)]
pub enum ConvertError {
	#[error("Export failed: {0}")]
	Export(#[from] ExportError),
	#[error("Import failed: {0}")]
	Import(#[from] TTImportError),
}

#[derive(Clone, Debug, PartialEq)]
pub struct BatchOptions {
	/// Directory the asset paths are resolved against
	pub output: PathBuf,
	/// Decode only, write nothing
	pub dry_run: bool,
}

impl Default for BatchOptions {
	fn default() -> Self {
		Self {
			output: PathBuf::from("."),
			dry_run: false,
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchReport {
	/// Input and output paths of every converted file
	pub converted: Vec<(PathBuf, PathBuf)>,
	/// Input path and error message of every failed file
	pub failed: Vec<(PathBuf, String)>,
}

impl BatchReport {
	pub fn is_success(&self) -> bool {
		self.failed.is_empty()
	}
}

fn has_model_ext(path: &Path) -> bool {
	path.extension().and_then(|e| e.to_str())
		.map_or(false, |e| e.eq_ignore_ascii_case(EXTENSION))
}

fn walk_dir(dir: &Path, out: &mut Vec<PathBuf>) -> io::Result<()> {
	let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
		.map(|e| e.map(|e| e.path()))
		.collect::<io::Result<_>>()?;
	entries.sort();

	for path in entries {
		if path.is_dir() {
			walk_dir(&path, out)?;
		} else if has_model_ext(&path) {
			out.push(path);
		}
	}

	Ok(())
}

/// Expands `paths` into the list of model files to convert. Directories are searched recursively;
/// files without the model extension and paths that don't exist are skipped with a warning.
pub fn collect_inputs(paths: &[PathBuf]) -> Vec<PathBuf> {
	let mut files = vec![];

	for path in paths.iter() {
		if path.is_dir() {
			if let Err(e) = walk_dir(path, &mut files) {
				warn!("Unable to read directory {}: {}", path.display(), e);
			}
		} else if !path.exists() {
			warn!("{} does not exist", path.display());
		} else if has_model_ext(path) {
			files.push(path.clone());
		} else {
			warn!("Skipping {}: not a .{} file", path.display(), EXTENSION);
		}
	}

	files
}

/// Where the export of `model` decoded from `input` goes
pub fn destination<X>(model: &TTModel, input: &Path, opts: &BatchOptions, exporter: &X) -> PathBuf
where
	X: Exporter,
{
	model.output_path(&opts.output, exporter.extension()).unwrap_or_else(|| {
		let stem = input.file_stem().map_or_else(|| "model".into(), |s| s.to_os_string());
		let mut path = opts.output.join(stem);
		path.set_extension(exporter.extension());
		path
	})
}

/// Decodes one file and exports it, returning the destination
pub fn process_file<X>(input: &Path, cfg: &ImportCfg, opts: &BatchOptions, exporter: &X)
	-> Result<PathBuf, ConvertError>
where
	X: Exporter,
{
	let model = crate::read(input, cfg)?;
	let dest = destination(&model, input, opts, exporter);

	if opts.dry_run {
		info!("{}: {} sub-mesh(es), would write {}", input.display(), model.meshes.len(),
			dest.display());
	} else {
		exporter.export(&model.to_scene(cfg), &dest)?;
		info!("{} -> {}", input.display(), dest.display());
	}

	Ok(dest)
}

/// Converts every model found in `paths`
pub fn run<X>(paths: &[PathBuf], cfg: &ImportCfg, opts: &BatchOptions, exporter: &X) -> BatchReport
where
	X: Exporter,
{
	let mut report = BatchReport::default();

	for input in collect_inputs(paths) {
		match process_file(&input, cfg, opts, exporter) {
			Ok(dest) => report.converted.push((input, dest)),
			Err(e) => {
				error!("{}: {}", input.display(), e);
				report.failed.push((input, e.to_string()));
			},
		}
	}

	report
}

#[cfg(test)]
mod tests {
	use std::{
		fs,
		io
	};

	use mdkit_core::{
		export::{
			ExportError,
			Exporter
		},
		scene::Scene
	};

	use crate::{
		fixture::{
			self,
			MeshSpec
		},
		ImportCfg
	};

	use super::*;

	/// Writes one line per mesh
	struct MeshList;

	impl Exporter for MeshList {
		fn extension(&self) -> &'static str {
			"txt"
		}

		fn write<W>(&self, scene: &Scene, out: &mut W) -> Result<(), ExportError>
		where
			W: io::Write,
		{
			for model in scene.models.iter() {
				for mesh in model.meshes.iter() {
					writeln!(out, "{} {} {}", model.name, mesh.name, mesh.vertices.len())?;
				}
			}

			Ok(())
		}
	}

	#[test]
	fn test_collect_inputs() {
		let dir = tempfile::tempdir().unwrap();
		let sub = dir.path().join("b");
		fs::create_dir(&sub).unwrap();
		fs::write(dir.path().join("a.model"), b"").unwrap();
		fs::write(sub.join("c.MODEL"), b"").unwrap();
		fs::write(sub.join("notes.txt"), b"").unwrap();
		let single = dir.path().join("single.txt");
		fs::write(&single, b"").unwrap();

		let files = collect_inputs(&[dir.path().to_path_buf(), single, dir.path().join("missing.model")]);
		assert_eq!(vec![dir.path().join("a.model"), sub.join("c.MODEL")], files);
	}

	#[test]
	fn test_batch_continues_after_failure() {
		let dir = tempfile::tempdir().unwrap();
		let input = dir.path().join("in");
		fs::create_dir(&input).unwrap();

		let mut bad = MeshSpec::triangle();
		bad.index_format = 3;
		let mut bad_data = fixture::hierarchy("-Assets/bad.model");
		bad_data.extend(fixture::scene(&[], &[bad]));
		fs::write(input.join("a_bad.model"), bad_data).unwrap();
		fs::write(input.join("b_good.model"), fixture::triangle_model()).unwrap();
		fs::write(input.join("c_truncated.model"), &fixture::triangle_model()[..50]).unwrap();

		let opts = BatchOptions {
			output: dir.path().join("out"),
			dry_run: false,
		};
		let report = run(&[input.clone()], &ImportCfg::default(), &opts, &MeshList);

		assert!(!report.is_success());
		assert_eq!(2, report.failed.len());
		assert_eq!(input.join("a_bad.model"), report.failed[0].0);
		assert_eq!(input.join("c_truncated.model"), report.failed[1].0);

		let expected = opts.output.join("Assets").join("Core").join("RopeAssets").join("ledge_end2_dx11.txt");
		assert_eq!(vec![(input.join("b_good.model"), expected.clone())], report.converted);
		assert_eq!("ledge_end2_dx11 Mesh_0 3\n", fs::read_to_string(&expected).unwrap());

		// nothing written for the failed file
		assert!(!opts.output.join("Assets").join("bad.txt").exists());
	}

	#[test]
	fn test_nameless_destination() {
		let dir = tempfile::tempdir().unwrap();
		let input = dir.path().join("anon.model");
		fs::write(&input, fixture::scene(&[], &[MeshSpec::triangle()])).unwrap();

		let opts = BatchOptions {
			output: dir.path().join("out"),
			dry_run: false,
		};
		let dest = process_file(&input, &ImportCfg::default(), &opts, &MeshList).unwrap();
		assert_eq!(opts.output.join("anon.txt"), dest);
		assert_eq!("Model Mesh_0 3\n", fs::read_to_string(&dest).unwrap());
	}

	#[test]
	fn test_dry_run() {
		let dir = tempfile::tempdir().unwrap();
		let input = dir.path().join("x.model");
		fs::write(&input, fixture::triangle_model()).unwrap();

		let opts = BatchOptions {
			output: dir.path().join("out"),
			dry_run: true,
		};
		let report = run(&[input], &ImportCfg::default(), &opts, &MeshList);
		assert!(report.is_success());
		assert_eq!(1, report.converted.len());
		assert!(!opts.output.exists());
	}
}
