use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};

use photomap_prepare::cli::{AppConfig, Cli};
use photomap_prepare::exif_parser::NativeExif;
use photomap_prepare::exiftool::ExifTool;
use photomap_prepare::extractor::{ExtractorKind, MetadataExtractor};
use photomap_prepare::logging;
use photomap_prepare::pipeline::{self, RunOutcome};
use photomap_prepare::settings::Settings;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.json_logs);

    match run(cli) {
        Ok(RunOutcome::Completed(summary)) => {
            info!(
                "Done: {} features, {} photos with GPS, {} failed chunks",
                summary.features, summary.records, summary.failed_chunks
            );
            ExitCode::SUCCESS
        }
        Ok(RunOutcome::NoGpsRecords) => ExitCode::from(1),
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<RunOutcome> {
    let settings = Settings::load(cli.config.as_deref())?;
    let config = cli.resolve(settings)?;
    info!("PhotoMap prepare v{}", env!("CARGO_PKG_VERSION"));
    info!("Photo directory: {}", config.pipeline.photo_dir.display());

    let extractor = build_extractor(&config)?;
    pipeline::run(&config.pipeline, extractor.as_ref())
}

/// exiftool is checked up front unless the run will not call it.
fn build_extractor(config: &AppConfig) -> Result<Box<dyn MetadataExtractor>> {
    match config.extractor {
        ExtractorKind::Exiftool => {
            let tool = ExifTool::new(&config.exiftool);
            if !config.pipeline.reuse_metadata {
                let version = tool.check_available()?;
                info!("Using exiftool {} ({})", version, tool.program().display());
            }
            Ok(Box::new(tool))
        }
        ExtractorKind::Native => Ok(Box::new(NativeExif)),
    }
}
