//! Welch power spectral density estimation.
//!
//! Averages Hamming-windowed, 50 %-overlapping periodograms into a one-sided
//! PSD in V²/Hz, the standard EEG estimator (`scipy.signal.welch`,
//! MNE's `psd_array_welch`). Used by the QC visualization to summarize
//! raw-vs-clean spectral power.
use rustfft::{num_complex::Complex, FftPlanner};

use crate::filter::design::hamming;

/// One-sided Welch PSD of `x`.
///
/// Returns `(freqs, psd)`, both of length `n_fft/2 + 1`, restricted to
/// `freqs <= fmax`. Segments of `n_fft` samples with 50 % overlap; signals
/// shorter than `n_fft` produce a single zero-padded segment.
pub fn welch_psd(x: &[f64], sfreq: f64, n_fft: usize, fmax: f64) -> (Vec<f64>, Vec<f64>) {
    let n_bins = n_fft / 2 + 1;
    let win = hamming(n_fft);
    let win_power: f64 = win.iter().map(|w| w * w).sum();

    let step = n_fft / 2;
    let mut acc = vec![0.0_f64; n_bins];
    let mut n_segments = 0usize;

    let mut planner: FftPlanner<f64> = FftPlanner::new();
    let fft = planner.plan_fft_forward(n_fft);

    let mut start = 0usize;
    loop {
        let end = start + n_fft;
        let mut buf: Vec<Complex<f64>> = (0..n_fft)
            .map(|i| {
                let v = x.get(start + i).copied().unwrap_or(0.0);
                Complex { re: v * win[i], im: 0.0 }
            })
            .collect();
        fft.process(&mut buf);

        for (k, slot) in acc.iter_mut().enumerate() {
            let p = buf[k].norm_sqr();
            // One-sided: double everything except DC and Nyquist.
            let scale = if k == 0 || (n_fft % 2 == 0 && k == n_bins - 1) {
                1.0
            } else {
                2.0
            };
            *slot += scale * p / (sfreq * win_power);
        }
        n_segments += 1;

        if end >= x.len() {
            break;
        }
        start += step;
    }

    let mut freqs = Vec::with_capacity(n_bins);
    let mut psd = Vec::with_capacity(n_bins);
    for k in 0..n_bins {
        let f = k as f64 * sfreq / n_fft as f64;
        if f > fmax {
            break;
        }
        freqs.push(f);
        psd.push(acc[k] / n_segments as f64);
    }
    (freqs, psd)
}
