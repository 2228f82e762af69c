use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use oncodash_core::DashboardConfig;
use oncodash_record::assemble_record_str;

#[derive(Parser, Debug)]
#[command(
    name = "oncodash-cli",
    about = "Assemble a dashboard snapshot from a patient record JSON file."
)]
struct Args {
    /// Path to the patient record JSON file.
    #[arg(short, long)]
    input: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let data = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Could not read file {:?}", args.input))?;

    let config = DashboardConfig::default();
    let snapshot = assemble_record_str(&data, &config)?;

    println!(
        "Patient: {}\nTreatment response: {}\nRecurrence: {}\nImaging trend: {}\nLongitudinal trend: {}\nDriver mutations: {}\nTimeline events: {}",
        snapshot.header.name,
        snapshot.disease_status.treatment_response.display_label,
        snapshot.disease_status.recurrence_status.display_label,
        snapshot.disease_status.imaging_trend.display_label,
        snapshot.disease_status.longitudinal_trend.display_label,
        snapshot.drivers().len(),
        snapshot.timeline().len()
    );

    Ok(())
}
