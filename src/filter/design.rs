//! FIR filter design matching MNE / `scipy.signal.firwin`.
//!
//! For a band edge at `f` Hz with sampling rate `sfreq`:
//!   • transition bandwidth = min(max(0.25 * f, 2.0), f)
//!   • filter length N      = ceil(3.3 / trans_bw * sfreq), rounded to odd
//!   • windowed-sinc design (Hamming window); band-pass is the difference of
//!     two lowpass kernels, band-stop is its spectral inversion
use std::f64::consts::PI;

/// Compute MNE-compatible transition bandwidth for a band edge.
///
/// Rule: `min(max(0.25 * freq, 2.0), freq)`
pub fn auto_trans_bandwidth(freq: f64) -> f64 {
    (0.25 * freq).max(2.0).min(freq)
}

/// Compute the number of FIR taps for a given transition bandwidth.
/// Returns an odd integer (required for zero-phase linear-phase FIR).
///
/// Formula: `ceil(3.3 / trans_bw * sfreq)` rounded up to odd.
pub fn auto_filter_length(trans_bw: f64, sfreq: f64) -> usize {
    let n_raw = (3.3 / trans_bw * sfreq).ceil() as usize;
    if n_raw % 2 == 0 {
        n_raw + 1
    } else {
        n_raw
    }
}

/// Design a zero-phase band-pass FIR (Hamming-windowed sinc).
///
/// Matches `mne.filter.create_filter(None, sfreq, l_freq=l_freq,
/// h_freq=h_freq, fir_window='hamming', fir_design='firwin', phase='zero')`
/// with automatic transition bandwidths. The narrower transition band
/// (usually the low edge) dictates the tap count.
pub fn design_bandpass(l_freq: f64, h_freq: f64, sfreq: f64) -> Vec<f64> {
    let l_bw = auto_trans_bandwidth(l_freq);
    let h_bw = auto_trans_bandwidth(h_freq);
    let n = auto_filter_length(l_bw.min(h_bw), sfreq);

    // firwin cutoffs at the midpoints of the transition bands.
    let lo = l_freq - l_bw / 2.0;
    let hi = h_freq + h_bw / 2.0;

    // bandpass = lowpass(hi) - lowpass(lo)
    let h_hi = firwin(n, hi, sfreq);
    let h_lo = firwin(n, lo, sfreq);
    h_hi.iter().zip(h_lo.iter()).map(|(a, b)| a - b).collect()
}

/// Design a zero-phase band-stop (notch) FIR centered at `freq` Hz with the
/// given transition bandwidth, by spectral inversion of a band-pass over
/// `[freq - bw/2, freq + bw/2]`.
///
/// Matches `raw.notch_filter(freqs=[freq], trans_bandwidth=bw)` for a single
/// mains frequency.
pub fn design_notch(freq: f64, trans_bw: f64, sfreq: f64) -> Vec<f64> {
    let n = auto_filter_length(trans_bw, sfreq);
    let lo = freq - trans_bw / 2.0;
    let hi = freq + trans_bw / 2.0;

    let h_hi = firwin(n, hi, sfreq);
    let h_lo = firwin(n, lo, sfreq);

    // bandstop = delta - (lowpass(hi) - lowpass(lo))
    let mut h: Vec<f64> = h_hi
        .iter()
        .zip(h_lo.iter())
        .map(|(a, b)| -(a - b))
        .collect();
    h[n / 2] += 1.0;
    h
}

/// Design a lowpass FIR filter using a Hamming-windowed sinc.
///
/// `cutoff_hz` is the -6 dB point. Unit DC gain.
pub fn firwin(n: usize, cutoff_hz: f64, sfreq: f64) -> Vec<f64> {
    assert!(n % 2 == 1, "firwin requires odd N for linear-phase filter");
    let alpha = (n - 1) as f64 / 2.0;
    let nyq = sfreq / 2.0;
    let fc = cutoff_hz / nyq; // normalised [0, 1]

    let win = hamming(n);

    let mut h: Vec<f64> = (0..n)
        .map(|i| {
            let x = i as f64 - alpha;
            // f(x) = sin(π·fc·x) / (π·x);  lim_{x→0} f(x) = fc  (L'Hôpital)
            let sinc = if x == 0.0 { fc } else { (PI * fc * x).sin() / (PI * x) };
            sinc * win[i]
        })
        .collect();

    // Normalise so sum = 1 (unit DC gain for lowpass).
    let s: f64 = h.iter().sum();
    h.iter_mut().for_each(|v| *v /= s);

    h
}

/// Hamming window of length `n`.
pub fn hamming(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f64 / (n - 1) as f64).cos())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_length_is_odd() {
        for f in [1.0_f64, 2.0, 3.0, 40.0] {
            let tb = auto_trans_bandwidth(f);
            let n = auto_filter_length(tb, 256.0);
            assert!(n % 2 == 1, "N={n} is even for f={f}");
        }
    }

    #[test]
    fn bandpass_dc_gain_zero() {
        // A band-pass passes no DC.
        let h = design_bandpass(1.0, 40.0, 256.0);
        let s: f64 = h.iter().sum();
        assert!(s.abs() < 1e-6, "bandpass sum = {s}");
    }

    #[test]
    fn bandpass_is_symmetric() {
        let h = design_bandpass(1.0, 40.0, 256.0);
        let n = h.len();
        for i in 0..n / 2 {
            approx::assert_abs_diff_eq!(h[i], h[n - 1 - i], epsilon = 1e-12);
        }
    }

    #[test]
    fn notch_dc_gain_unity() {
        // A band-stop passes DC untouched.
        let h = design_notch(60.0, 3.0, 256.0);
        let s: f64 = h.iter().sum();
        approx::assert_abs_diff_eq!(s, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn notch_kills_center_frequency() {
        // Frequency response at the notch center should be near zero.
        let sfreq = 256.0;
        let h = design_notch(60.0, 3.0, sfreq);
        let w = 2.0 * std::f64::consts::PI * 60.0 / sfreq;
        let (mut re, mut im) = (0.0, 0.0);
        for (k, &hk) in h.iter().enumerate() {
            re += hk * (w * k as f64).cos();
            im -= hk * (w * k as f64).sin();
        }
        let mag = (re * re + im * im).sqrt();
        assert!(mag < 1e-3, "gain at 60 Hz = {mag}");
    }

    #[test]
    fn lowpass_dc_gain_unity() {
        let h = firwin(101, 10.0, 256.0);
        let dc: f64 = h.iter().sum();
        approx::assert_abs_diff_eq!(dc, 1.0, epsilon = 1e-9);
    }
}
