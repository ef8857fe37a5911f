//! Per-file cleaning pipeline.
//!
//! One call of [`clean_one_file`] runs the full chain on a single raw file:
//! load → canonicalize channels → notch + band-pass → ICA → blink-component
//! selection → reconstruct without the flagged components → persist. Every
//! terminal outcome is a [`ProcessingStatus`]; quality-degrading side steps
//! (artifact scoring, diagnostic dump) are reported as [`SideStep`] and
//! never abort the file.
use log::{debug, warn};
use std::fmt;
use std::path::Path;

use crate::artifact::find_eog_components;
use crate::config::{CleanConfig, MIN_CANONICAL_CHANNELS};
use crate::error::CleanError;
use crate::filter::condition_inplace;
use crate::ica::SourceSeparator;
use crate::montage::{canonicalize, TARGET_CHANNELS};
use crate::recording::{DiagnosticWriter, Recording, RecordingReader, RecordingWriter};

/// Terminal outcome of one file's pipeline. Computed once, never retried.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessingStatus {
    Success,
    /// The reader could not parse the input.
    LoadError(String),
    /// Canonicalization failed or produced an invalid channel set.
    RenameError(String),
    /// Fewer than 5 canonical channels survived mapping; ICA on so few
    /// channels is statistically unreliable.
    SkippedInsufficientChannels,
    /// Fewer than 2 components derivable from the channel count.
    SkippedLowRank,
    /// Conditioning or decomposition failed for a reason outside the named
    /// skip conditions.
    ProcessingError(String),
    /// Cleaned output could not be persisted.
    WriteError(String),
}

impl ProcessingStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ProcessingStatus::Success)
    }

    /// Status kind without the per-file message, for tallying.
    pub fn kind(&self) -> &'static str {
        match self {
            ProcessingStatus::Success => "Success",
            ProcessingStatus::LoadError(_) => "Load Error",
            ProcessingStatus::RenameError(_) => "Rename Error",
            ProcessingStatus::SkippedInsufficientChannels => "Skipped (Not enough channels)",
            ProcessingStatus::SkippedLowRank => "Skipped (Low Rank)",
            ProcessingStatus::ProcessingError(_) => "Processing Error",
            ProcessingStatus::WriteError(_) => "Write Error",
        }
    }
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessingStatus::Success => write!(f, "Success"),
            ProcessingStatus::LoadError(e) => write!(f, "Load Error: {e}"),
            ProcessingStatus::RenameError(e) => write!(f, "Rename Error: {e}"),
            ProcessingStatus::SkippedInsufficientChannels => {
                write!(f, "Skipped (Not enough channels)")
            }
            ProcessingStatus::SkippedLowRank => write!(f, "Skipped (Low Rank)"),
            ProcessingStatus::ProcessingError(e) => write!(f, "Processing Error: {e}"),
            ProcessingStatus::WriteError(e) => write!(f, "Write Error: {e}"),
        }
    }
}

/// Outcome of a best-effort sub-step: completed, or degraded for a reason.
#[derive(Debug, Clone, PartialEq)]
pub enum SideStep {
    Ok,
    Degraded(String),
}

/// Full report for one file: status plus side-step outcomes, so a caller can
/// tell "fully clean" from "clean but without blink removal / diagnostics".
#[derive(Debug, Clone)]
pub struct FileReport {
    pub status: ProcessingStatus,
    /// Component indices removed from the reconstruction.
    pub excluded: Vec<usize>,
    /// Outcome of blink-component scoring (fail-open).
    pub artifact_step: SideStep,
    /// Outcome of the diagnostic component dump (best-effort).
    pub diagnostic_step: SideStep,
}

impl FileReport {
    fn terminal(status: ProcessingStatus) -> Self {
        Self {
            status,
            excluded: vec![],
            artifact_step: SideStep::Ok,
            diagnostic_step: SideStep::Ok,
        }
    }
}

/// Clean one raw file and persist the result.
///
/// Outputs land in `clean_dir/clean_<basename>_eeg.<ext>` and
/// `report_dir/<basename>_ica.st`; both directories are created on demand.
#[allow(clippy::too_many_arguments)]
pub fn clean_one_file(
    path: &Path,
    clean_dir: &Path,
    report_dir: &Path,
    cfg: &CleanConfig,
    reader: &dyn RecordingReader,
    writer: &dyn RecordingWriter,
    diag: &dyn DiagnosticWriter,
    separator: &dyn SourceSeparator,
) -> FileReport {
    let base_name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    // 1) Load.
    let raw = match reader.read(path) {
        Ok(r) => r,
        Err(e) => return FileReport::terminal(ProcessingStatus::LoadError(e.to_string())),
    };

    // 2) Rename + pick canonical channels.
    let mut rec = canonicalize(&raw);
    if let Err(e) = check_canonical(&rec) {
        return FileReport::terminal(ProcessingStatus::RenameError(e.to_string()));
    }
    if rec.n_channels() < MIN_CANONICAL_CHANNELS {
        return FileReport::terminal(ProcessingStatus::SkippedInsufficientChannels);
    }

    // 3) Notch, then band-pass.
    if let Err(e) = condition_inplace(&mut rec, cfg) {
        return FileReport::terminal(ProcessingStatus::ProcessingError(e.to_string()));
    }

    // 4) Decompose. k < 2 never reaches the separator.
    let n_comps = cfg.max_components.min(rec.n_channels() - 1);
    if n_comps < 2 {
        return FileReport::terminal(ProcessingStatus::SkippedLowRank);
    }
    let dec = match separator.decompose(&rec.data, n_comps, cfg.random_seed, cfg.max_iter) {
        Ok(d) => d,
        Err(CleanError::Decomposition(_)) => {
            return FileReport::terminal(ProcessingStatus::SkippedLowRank)
        }
        Err(e) => {
            return FileReport::terminal(ProcessingStatus::ProcessingError(e.to_string()))
        }
    };
    debug!("{base_name}: {} components from {} channels", dec.n_components(), rec.n_channels());

    // 5) Blink detection against the conditioned frontal reference.
    //    Fail-open: no reference, or scoring failure, means no exclusions.
    let mut artifact_step = SideStep::Ok;
    let excluded = match rec.channel_index(&cfg.eog_channel) {
        Some(idx) => {
            match find_eog_components(&dec, &rec.channel(idx), cfg.eog_threshold) {
                Ok(idxs) => idxs,
                Err(e) => {
                    warn!("{base_name}: artifact scoring degraded: {e}");
                    artifact_step = SideStep::Degraded(e.to_string());
                    vec![]
                }
            }
        }
        None => vec![],
    };

    // 6) Diagnostic component dump, best-effort.
    let diagnostic_step = {
        let diag_path = report_dir.join(format!("{base_name}_ica.st"));
        let res = std::fs::create_dir_all(report_dir)
            .map_err(CleanError::Io)
            .and_then(|_| diag.write(&dec.sources, &excluded, &diag_path));
        match res {
            Ok(()) => SideStep::Ok,
            Err(e) => {
                warn!("{base_name}: diagnostic dump degraded: {e}");
                SideStep::Degraded(e.to_string())
            }
        }
    };

    // 7) Reconstruct without the flagged components and persist.
    let cleaned_data = dec.reconstruct(&excluded);
    let cleaned = Recording {
        ch_names: rec.ch_names.clone(),
        sfreq: rec.sfreq,
        data: cleaned_data,
    };
    let out_path = clean_dir.join(format!("clean_{base_name}_eeg.{}", writer.extension()));
    let persisted = std::fs::create_dir_all(clean_dir)
        .map_err(CleanError::Io)
        .and_then(|_| writer.write(&cleaned, &out_path));
    if let Err(e) = persisted {
        return FileReport {
            status: ProcessingStatus::WriteError(e.to_string()),
            excluded,
            artifact_step,
            diagnostic_step,
        };
    }

    FileReport {
        status: ProcessingStatus::Success,
        excluded,
        artifact_step,
        diagnostic_step,
    }
}

/// Post-canonicalization invariants: every label is a montage member and no
/// label repeats.
fn check_canonical(rec: &Recording) -> crate::error::Result<()> {
    for (i, name) in rec.ch_names.iter().enumerate() {
        if !TARGET_CHANNELS.contains(&name.as_str()) {
            return Err(CleanError::Rename(format!("non-canonical label '{name}'")));
        }
        if rec.ch_names[..i].contains(name) {
            return Err(CleanError::Rename(format!("duplicate label '{name}'")));
        }
    }
    Ok(())
}
