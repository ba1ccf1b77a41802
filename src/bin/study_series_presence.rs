use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dicom_series_csv::{logging, reduce_presence};

#[derive(Parser)]
#[command(name = "study-series-presence")]
#[command(about = "Check sequence presence per PatientID and StudyDate")]
#[command(version)]
struct Cli {
    /// Study CSV produced by study-series-groups
    #[arg(long = "input_csv", value_name = "CSV")]
    input_csv: PathBuf,

    /// Destination CSV file
    #[arg(long = "output_csv", value_name = "CSV")]
    output_csv: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init();

    reduce_presence(&cli.input_csv, &cli.output_csv)
        .with_context(|| format!("Failed to reduce studies from {:?}", cli.input_csv))?;

    Ok(())
}
