//! Quality-control metrics comparing raw and cleaned signals.
//!
//! Three pure per-channel measures: variance-reduction proxy, excess
//! kurtosis before/after, and an estimated SNR in dB where the "noise" is
//! the raw−clean residual. All are proxies for cleaning strength, not
//! ground-truth artifact measures — in particular the comparison channels
//! are picked heuristically (see [`pick_front_channels`]) and may not carry
//! the same physical signal.
use crate::config::QcConfig;
use crate::recording::Recording;

/// Population variance of a sample sequence.
pub fn variance(x: &[f64]) -> f64 {
    let n = x.len() as f64;
    if n == 0.0 {
        return 0.0;
    }
    let mean = x.iter().sum::<f64>() / n;
    x.iter().map(|&v| (v - mean) * (v - mean)).sum::<f64>() / n
}

/// Variance reduction proxy in percent: `(1 - var(clean)/var(raw)) * 100`.
///
/// Zero raw variance yields exactly `0.0` (no reduction), never a division
/// fault.
pub fn variance_reduction_proxy(raw: &[f64], clean: &[f64]) -> f64 {
    let var_raw = variance(raw);
    if var_raw == 0.0 {
        return 0.0;
    }
    (1.0 - variance(clean) / var_raw) * 100.0
}

/// Excess kurtosis (0 for a Gaussian), population moments.
///
/// Returns 0.0 for fewer than 4 samples or a (near-)constant signal.
pub fn excess_kurtosis(x: &[f64]) -> f64 {
    let n = x.len() as f64;
    if n < 4.0 {
        return 0.0;
    }
    let mean = x.iter().sum::<f64>() / n;
    let m2 = x.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / n;
    let m4 = x.iter().map(|&v| (v - mean).powi(4)).sum::<f64>() / n;
    if m2 < 1e-30 {
        return 0.0;
    }
    m4 / (m2 * m2) - 3.0
}

/// Estimated SNR in dB: `10·log10(mean(clean²) / mean(noise²))` with
/// `noise = raw - clean` sample-wise. Zero noise power yields `+∞`.
pub fn estimated_snr_db(raw: &[f64], clean: &[f64]) -> f64 {
    let n = raw.len().min(clean.len()) as f64;
    let power_signal = clean.iter().map(|&v| v * v).sum::<f64>() / n;
    let power_noise = raw
        .iter()
        .zip(clean.iter())
        .map(|(&r, &c)| (r - c) * (r - c))
        .sum::<f64>()
        / n;
    if power_noise == 0.0 {
        return f64::INFINITY;
    }
    10.0 * (power_signal / power_noise).log10()
}

/// Pick the comparison channel in each recording: the preferred label when
/// present, otherwise the first channel (best-effort fallback).
pub fn pick_front_channels(raw: &Recording, clean: &Recording, cfg: &QcConfig) -> (String, String) {
    let target_raw = if raw.channel_index(&cfg.preferred_raw).is_some() {
        cfg.preferred_raw.clone()
    } else {
        raw.ch_names.first().cloned().unwrap_or_default()
    };
    let target_clean = if clean.channel_index(&cfg.preferred_clean).is_some() {
        cfg.preferred_clean.clone()
    } else {
        clean.ch_names.first().cloned().unwrap_or_default()
    };
    (target_raw, target_clean)
}

/// Full QC bundle for one raw/clean pair.
#[derive(Debug, Clone)]
pub struct PairMetrics {
    pub target_raw: String,
    pub target_clean: String,
    pub variance_reduction_percent: f64,
    pub raw_variance: f64,
    pub clean_variance: f64,
    pub kurtosis_raw: f64,
    pub kurtosis_clean: f64,
    pub estimated_snr_db: f64,
}

/// Compute all QC metrics on the heuristically matched channel pair.
///
/// Returns `None` when either recording has no channels.
pub fn pair_metrics(raw: &Recording, clean: &Recording, cfg: &QcConfig) -> Option<PairMetrics> {
    if raw.n_channels() == 0 || clean.n_channels() == 0 {
        return None;
    }
    let (target_raw, target_clean) = pick_front_channels(raw, clean, cfg);
    let d_raw = raw.channel(raw.channel_index(&target_raw)?);
    let d_clean = clean.channel(clean.channel_index(&target_clean)?);

    Some(PairMetrics {
        variance_reduction_percent: variance_reduction_proxy(&d_raw, &d_clean),
        raw_variance: variance(&d_raw),
        clean_variance: variance(&d_clean),
        kurtosis_raw: excess_kurtosis(&d_raw),
        kurtosis_clean: excess_kurtosis(&d_clean),
        estimated_snr_db: estimated_snr_db(&d_raw, &d_clean),
        target_raw,
        target_clean,
    })
}
