/// CLI: hh-prep path/to/hh.csv

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use hh_prep::Pipeline;

#[derive(Parser, Debug)]
#[command(
    name = "hh-prep",
    version,
    about = "Convert a salary survey CSV into x_data.npy / y_data.npy"
)]
struct Cli {
    /// Path to the survey CSV export
    csv_path: PathBuf,
}

fn main() -> ExitCode {
    // Инициализация логирования
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(1);
        }
    };

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let pipeline = Pipeline::default();
    let (output, summary) = pipeline
        .run_and_save(&cli.csv_path)
        .with_context(|| format!("processing {}", cli.csv_path.display()))?;

    tracing::info!(
        "Done: {} samples ({} loaded, {} outliers removed, {} targets imputed)",
        output.report.samples,
        output.report.loaded_rows,
        output.report.outliers.removed,
        output.report.imputed_targets
    );

    println!(
        "✅ x_data.npy: {} ({:.1}MB)",
        summary.features.path.display(),
        summary.features.megabytes()
    );
    println!(
        "✅ y_data.npy: {} ({:.1}MB)",
        summary.targets.path.display(),
        summary.targets.megabytes()
    );

    Ok(())
}
