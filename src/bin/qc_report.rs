use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use eegclean::recording::StRecordingReader;
use eegclean::{build_global_report, write_csv, QcConfig};

#[derive(Parser)]
#[command(
    name = "qc_report",
    about = "Build a global QC report (variance reduction proxy) for cleaned CHB-MIT files"
)]
struct Args {
    /// CHB-MIT root (contains chb01..chb24)
    #[arg(long, default_value = "Dataset/CHB-MIT")]
    dataset_root: PathBuf,

    /// Root containing per-patient cleaned folders
    #[arg(long, default_value = "ProcessedDataset/Cleaned_Data")]
    cleaned_root: PathBuf,

    /// Where to save the CSV report
    #[arg(long, default_value = "ProcessedDataset/Global_Quality_Report.csv")]
    out_csv: PathBuf,

    /// Raw file extension used when matching cleaned files back to raw ones
    #[arg(long, default_value = "st")]
    raw_ext: String,

    /// Cleaned file extension
    #[arg(long, default_value = "st")]
    clean_ext: String,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    println!("Starting Global Quality Control Analysis...");
    let records = build_global_report(
        &args.dataset_root,
        &args.cleaned_root,
        &args.raw_ext,
        &args.clean_ext,
        &StRecordingReader,
        &QcConfig::default(),
    );

    write_csv(&records, &args.out_csv)?;
    println!(
        "Saved QC report to: {} (rows={})",
        args.out_csv.display(),
        records.len()
    );

    Ok(())
}
