use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dicom_series_csv::{aggregate, logging};

#[derive(Parser)]
#[command(name = "study-series-groups")]
#[command(about = "Group DICOM series by modality and study")]
#[command(version)]
struct Cli {
    /// Series CSV produced by dicom-series-info
    #[arg(long = "input_csv", value_name = "CSV")]
    input_csv: PathBuf,

    /// Destination CSV file
    #[arg(long = "output_csv", value_name = "CSV")]
    output_csv: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init();

    aggregate(&cli.input_csv, &cli.output_csv)
        .with_context(|| format!("Failed to group series from {:?}", cli.input_csv))?;

    Ok(())
}
