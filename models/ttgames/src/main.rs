use clap::Parser;

use std::{
	path::PathBuf,
	process::ExitCode
};

use mdkit_models_collada::ColladaExporter;

use mdkit_models_ttgames::{
	batch::{
		self,
		BatchOptions
	},
	FormatProfile,
	ImportCfg,
	ImportFlag
};

#[derive(Parser)]
#[command(name = "mdkit-ttgames")]
#[command(about = "Converts TT Games .model files to COLLADA")]
struct Cli {
	/// Files or directories to convert, directories are searched recursively
	#[arg(required = true)]
	inputs: Vec<PathBuf>,
	/// Directory the asset paths are recreated in
	#[arg(short, long, default_value = ".")]
	output: PathBuf,
	/// Format variant: wide (70 byte sub-mesh padding, 16/32-bit indices) or strict (78 byte
	/// padding, 16-bit indices)
	#[arg(long, default_value = "wide")]
	profile: String,
	/// Trust the sub-mesh layout instead of scanning for each sub-mesh marker
	#[arg(long)]
	no_resync: bool,
	/// Keep vertex colors as raw bytes
	#[arg(long)]
	raw_colors: bool,
	/// Leave materials out of the exported scene
	#[arg(long)]
	no_materials: bool,
	/// Decode only, write nothing
	#[arg(long)]
	dry_run: bool,
	/// Log every chunk and sub-mesh
	#[arg(short, long)]
	verbose: bool,
}

impl Cli {
	fn import_cfg(&self) -> Option<ImportCfg> {
		let mut cfg = ImportCfg {
			profile: FormatProfile::by_name(&self.profile)?,
			..Default::default()
		};

		cfg.flags.set(ImportFlag::RESYNC_SCAN, !self.no_resync);
		cfg.flags.set(ImportFlag::NORMALIZE_COLORS, !self.raw_colors);
		cfg.flags.set(ImportFlag::INCLUDE_MATERIALS, !self.no_materials);

		Some(cfg)
	}
}

fn main() -> ExitCode {
	let cli = Cli::parse();

	let level = if cli.verbose { "debug" } else { "info" };
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

	let cfg = match cli.import_cfg() {
		Some(cfg) => cfg,
		None => {
			log::error!("Unknown profile {:?}, expected wide or strict", cli.profile);
			return ExitCode::FAILURE;
		},
	};

	let opts = BatchOptions {
		output: cli.output.clone(),
		dry_run: cli.dry_run,
	};

	let report = batch::run(&cli.inputs, &cfg, &opts, &ColladaExporter::default());
	log::info!("{} converted, {} failed", report.converted.len(), report.failed.len());

	if report.is_success() {
		ExitCode::SUCCESS
	} else {
		ExitCode::FAILURE
	}
}
