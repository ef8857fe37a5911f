use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use eegclean::recording::{StDiagnosticWriter, StRecordingReader, StRecordingWriter};
use eegclean::{patient_ids, run_corpus, CleanConfig, FastIca};

#[derive(Parser)]
#[command(name = "clean_corpus", about = "Batch EEG cleaning (CHB-MIT) via ICA")]
struct Args {
    /// CHB-MIT root (contains chb01..chb24)
    #[arg(long, default_value = "Dataset/CHB-MIT")]
    dataset_root: PathBuf,

    /// Output root folder (Cleaned_Data/ and ICA_Reports/ land here)
    #[arg(long, default_value = "ProcessedDataset")]
    out_root: PathBuf,

    /// Raw file extension to scan for
    #[arg(long, default_value = "st")]
    raw_ext: String,

    /// Mains notch frequency in Hz
    #[arg(long, default_value_t = 60.0)]
    notch_hz: f64,

    /// Band-pass low cutoff in Hz
    #[arg(long, default_value_t = 1.0)]
    l_freq: f64,

    /// Band-pass high cutoff in Hz
    #[arg(long, default_value_t = 40.0)]
    h_freq: f64,

    /// Maximum number of ICA components
    #[arg(long, default_value_t = 15)]
    max_components: usize,

    /// Decomposition random seed
    #[arg(long, default_value_t = 97)]
    seed: u64,

    /// Decomposition iteration cap
    #[arg(long, default_value_t = 800)]
    max_iter: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let cfg = CleanConfig {
        notch_hz: args.notch_hz,
        l_freq: args.l_freq,
        h_freq: args.h_freq,
        max_components: args.max_components,
        random_seed: args.seed,
        max_iter: args.max_iter,
        ..CleanConfig::default()
    };

    println!(
        "Starting batch processing for {} patients...",
        patient_ids().len()
    );

    let summary = run_corpus(
        &args.dataset_root,
        &args.out_root,
        &args.raw_ext,
        &cfg,
        &StRecordingReader,
        &StRecordingWriter,
        &StDiagnosticWriter,
        &FastIca::default(),
    );

    println!(
        "All patients processed: {}/{} files succeeded.",
        summary.n_success(),
        summary.n_files
    );
    for (status, count) in &summary.tallies {
        println!("  {status}: {count}");
    }

    Ok(())
}
