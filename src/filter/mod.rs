//! FIR filter design and application (signal conditioning).
//!
//! - [`design`]: Hamming-windowed sinc band-pass and band-stop (notch) FIR
//!   design, matching `mne.filter.create_filter(fir_window='hamming',
//!   phase='zero')`.
//! - [`apply`]: Overlap-add zero-phase convolution, matching MNE's
//!   `_overlap_add_filter` / `_1d_overlap_filter`.
//!
//! Conditioning order is notch first, then band-pass: the 40 Hz ceiling
//! already attenuates 60 Hz, but the notch guards against incomplete
//! attenuation and lower sampling configurations.

pub mod apply;
pub mod design;

pub use apply::{apply_fir_zero_phase, filter_1d};
pub use design::{
    auto_filter_length, auto_trans_bandwidth, design_bandpass, design_notch, firwin, hamming,
};

use crate::config::CleanConfig;
use crate::error::Result;
use crate::recording::Recording;

/// Condition a recording in place: notch at the mains frequency, then
/// band-pass. Same channel set, same length, no resampling.
pub fn condition_inplace(rec: &mut Recording, cfg: &CleanConfig) -> Result<()> {
    let h_notch = design_notch(cfg.notch_hz, cfg.notch_trans_bw, rec.sfreq);
    apply_fir_zero_phase(&mut rec.data, &h_notch)?;

    let h_band = design_bandpass(cfg.l_freq, cfg.h_freq, rec.sfreq);
    apply_fir_zero_phase(&mut rec.data, &h_band)?;
    Ok(())
}
