//! # eegclean — ICA-based ocular-artifact removal for EEG corpora
//!
//! `eegclean` cleans multi-channel EEG recordings (CHB-MIT layout) of
//! blink/ocular artifacts via independent component analysis, then
//! quantifies how much the cleaning changed the signal.
//!
//! ## Pipeline overview
//!
//! ```text
//! chb01_03.st
//!   │
//!   ├─ montage::canonicalize()   map bipolar/duplicated labels → 10-20 montage
//!   │                            (< 5 canonical channels → skip file)
//!   ├─ filter (notch 60 Hz)      FIR band-stop, 3 Hz transition
//!   ├─ filter (band-pass)        1–40 Hz Hamming-windowed FIR
//!   ├─ ica::decompose()          FastICA, K = min(15, C−1)  (K < 2 → skip)
//!   ├─ artifact selection        correlate components vs conditioned Fp1,
//!   │                            z-score > 3 → excluded (fail-open)
//!   ├─ reconstruct               mixing · sources (excluded rows zeroed)
//!   └─ persist                   Cleaned_Data/<pid>/clean_<base>_eeg.st
//!        │
//!        └─→ qc::pair_metrics()  variance reduction · kurtosis shift · SNR
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use eegclean::{clean_one_file, CleanConfig, FastIca};
//! use eegclean::recording::{StDiagnosticWriter, StRecordingReader, StRecordingWriter};
//! use std::path::Path;
//!
//! let cfg = CleanConfig::default();
//! let report = clean_one_file(
//!     Path::new("Dataset/CHB-MIT/chb01/chb01_03.st"),
//!     Path::new("Processed/Cleaned_Data/chb01"),
//!     Path::new("Processed/ICA_Reports/chb01"),
//!     &cfg,
//!     &StRecordingReader,
//!     &StRecordingWriter,
//!     &StDiagnosticWriter,
//!     &FastIca::default(),
//! );
//! println!("{}", report.status);
//! ```
//!
//! Whole-corpus processing and the global QC report live in [`batch`]; the
//! three CLI entry points (`clean_corpus`, `qc_report`, `qc_view`) are thin
//! wrappers over those functions.
//!
//! ## Design notes
//!
//! The decomposition solver sits behind the [`SourceSeparator`] trait, so
//! the pipeline is testable with a deterministic stub. Raw-format parsing
//! and persistence are likewise trait seams ([`recording`]); the shipped
//! implementations use a minimal safetensors container. The QC comparison
//! channel is picked heuristically (raw `FP1-F7` vs clean `Fp1`, first
//! channel otherwise) — a deliberate approximation carried over from the
//! corpus tooling this crate reimplements.

pub mod artifact;
pub mod batch;
pub mod config;
pub mod error;
pub mod filter;
pub mod ica;
pub mod montage;
pub mod pipeline;
pub mod psd;
pub mod qc;
pub mod recording;
pub mod report;

// ── Crate-root re-exports ─────────────────────────────────────────────────
//
// Everything a downstream user is likely to need is available directly as
// `eegclean::Foo` without having to know the internal module layout.

// config
pub use config::{CleanConfig, QcConfig, MIN_CANONICAL_CHANNELS};

// error
pub use error::{CleanError, Result};

// recording
pub use recording::{Recording, RecordingReader, RecordingWriter};

// montage
pub use montage::{canonicalize, plan_renames, RenamePlan, MAPPING_TABLE, TARGET_CHANNELS};

// filter
pub use filter::{condition_inplace, design_bandpass, design_notch};

// ica
pub use ica::{Decomposition, FastIca, SourceSeparator};

// artifact
pub use artifact::find_eog_components;

// qc
pub use qc::{
    estimated_snr_db, excess_kurtosis, pair_metrics, pick_front_channels, variance,
    variance_reduction_proxy, PairMetrics,
};

// pipeline + batch
pub use batch::{build_global_report, patient_ids, run_corpus, BatchSummary};
pub use pipeline::{clean_one_file, FileReport, ProcessingStatus, SideStep};

// report
pub use report::{write_csv, QcRecord};
