use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dicom_series_csv::{extract, logging};

#[derive(Parser)]
#[command(name = "dicom-series-info")]
#[command(about = "Extract DICOM metadata from each series directory and save to CSV")]
#[command(version)]
struct Cli {
    /// Root directory to scan for DICOM series
    #[arg(long, value_name = "DIR")]
    input: PathBuf,

    /// Destination CSV file
    #[arg(long = "output_csv", value_name = "CSV")]
    output_csv: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init();

    extract(&cli.input, &cli.output_csv)
        .with_context(|| format!("Failed to extract series metadata from {:?}", cli.input))?;

    Ok(())
}
