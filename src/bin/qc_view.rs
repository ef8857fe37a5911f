use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use eegclean::psd::welch_psd;
use eegclean::recording::{RecordingReader, StRecordingReader};
use eegclean::{pair_metrics, QcConfig};

#[derive(Parser)]
#[command(
    name = "qc_view",
    about = "QC summary for one raw/clean pair (metrics + spectral band powers)"
)]
struct Args {
    /// Path to the raw recording
    #[arg(long)]
    raw: PathBuf,

    /// Path to the cleaned recording
    #[arg(long)]
    clean: PathBuf,

    /// Seconds to analyse from t=0 for the spectral summary
    #[arg(long, default_value_t = 10.0)]
    duration: f64,

    /// Max frequency for the PSD summary
    #[arg(long, default_value_t = 80.0)]
    fmax: f64,
}

const BANDS: [(&str, f64, f64); 5] = [
    ("delta", 1.0, 4.0),
    ("theta", 4.0, 8.0),
    ("alpha", 8.0, 13.0),
    ("beta", 13.0, 30.0),
    ("gamma", 30.0, 80.0),
];

/// Mean power (dB) of the PSD bins falling inside [lo, hi).
fn band_power_db(freqs: &[f64], psd: &[f64], lo: f64, hi: f64) -> Option<f64> {
    let vals: Vec<f64> = freqs
        .iter()
        .zip(psd.iter())
        .filter(|(f, _)| **f >= lo && **f < hi)
        .map(|(_, p)| *p)
        .collect();
    if vals.is_empty() {
        return None;
    }
    let mean = vals.iter().sum::<f64>() / vals.len() as f64;
    Some(10.0 * mean.max(1e-30).log10())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let raw = StRecordingReader
        .read(&args.raw)
        .with_context(|| format!("reading {}", args.raw.display()))?;
    let clean = StRecordingReader
        .read(&args.clean)
        .with_context(|| format!("reading {}", args.clean.display()))?;

    let m = pair_metrics(&raw, &clean, &QcConfig::default())
        .context("recordings have no channels to compare")?;

    println!("QC REPORT");
    println!("{}", "-".repeat(40));
    println!("Raw channel:   {}", m.target_raw);
    println!("Clean channel: {}", m.target_clean);
    println!("Variance reduction: {:.2}%", m.variance_reduction_percent);
    println!("Kurtosis: {:.2} -> {:.2}", m.kurtosis_raw, m.kurtosis_clean);
    println!("Estimated SNR: {:.2} dB", m.estimated_snr_db);
    println!("{}", "-".repeat(40));

    // Spectral summary over the first `duration` seconds of the compared
    // channels (stands in for the PSD plot of the interactive tooling).
    let n_window = (args.duration * raw.sfreq) as usize;
    let idx_raw = raw.channel_index(&m.target_raw).context("raw channel vanished")?;
    let idx_clean = clean
        .channel_index(&m.target_clean)
        .context("clean channel vanished")?;
    let d_raw: Vec<f64> = raw.channel(idx_raw).into_iter().take(n_window).collect();
    let d_clean: Vec<f64> = clean.channel(idx_clean).into_iter().take(n_window).collect();

    let (f_r, psd_r) = welch_psd(&d_raw, raw.sfreq, 256, args.fmax);
    let (f_c, psd_c) = welch_psd(&d_clean, clean.sfreq, 256, args.fmax);

    println!("Band power (dB), first {:.1} s:", args.duration);
    println!("{:>8}  {:>10}  {:>10}", "band", "raw", "clean");
    for (name, lo, hi) in BANDS {
        if lo >= args.fmax {
            continue;
        }
        let hi = hi.min(args.fmax);
        let r = band_power_db(&f_r, &psd_r, lo, hi);
        let c = band_power_db(&f_c, &psd_c, lo, hi);
        if let (Some(r), Some(c)) = (r, c) {
            println!("{name:>8}  {r:>10.2}  {c:>10.2}");
        }
    }

    Ok(())
}
