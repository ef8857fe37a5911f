//! Corpus orchestration: batch cleaning and the global QC report.
//!
//! The corpus is a directory tree of per-patient folders (`chb01`..`chb24`).
//! Files are processed strictly one at a time; each file's pipeline owns its
//! buffers and its failure is captured as a status, never propagated to the
//! batch. Output paths are derived deterministically from the input file
//! name, so runs are collision-free and repeatable.
use glob::glob;
use log::info;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::{CleanConfig, QcConfig};
use crate::ica::SourceSeparator;
use crate::pipeline::{clean_one_file, FileReport};
use crate::qc::pair_metrics;
use crate::recording::{DiagnosticWriter, RecordingReader, RecordingWriter};
use crate::report::QcRecord;

/// Fixed patient id scheme of the CHB-MIT corpus.
pub fn patient_ids() -> Vec<String> {
    (1..=24).map(|i| format!("chb{i:02}")).collect()
}

/// Per-status tally for a whole batch run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Number of files attempted.
    pub n_files: usize,
    /// Status string → count, ordered for stable printing.
    pub tallies: BTreeMap<String, usize>,
}

impl BatchSummary {
    fn record(&mut self, report: &FileReport) {
        self.n_files += 1;
        *self
            .tallies
            .entry(report.status.kind().to_string())
            .or_insert(0) += 1;
    }

    /// Count of files that reached `Success`.
    pub fn n_success(&self) -> usize {
        self.tallies.get("Success").copied().unwrap_or(0)
    }
}

fn sorted_files(folder: &Path, ext: &str) -> Vec<PathBuf> {
    let pattern = folder.join(format!("*.{ext}"));
    let mut files: Vec<PathBuf> = glob(&pattern.to_string_lossy())
        .map(|paths| paths.filter_map(|p| p.ok()).collect())
        .unwrap_or_default();
    files.sort();
    files
}

/// Clean every raw file of every existing patient folder under
/// `dataset_root`, writing cleaned recordings to
/// `<out_root>/Cleaned_Data/<pid>/` and diagnostics to
/// `<out_root>/ICA_Reports/<pid>/`.
///
/// Per-patient progress goes to stdout; per-file failures are tallied and
/// the batch always runs to completion.
#[allow(clippy::too_many_arguments)]
pub fn run_corpus(
    dataset_root: &Path,
    out_root: &Path,
    raw_ext: &str,
    cfg: &CleanConfig,
    reader: &dyn RecordingReader,
    writer: &dyn RecordingWriter,
    diag: &dyn DiagnosticWriter,
    separator: &dyn SourceSeparator,
) -> BatchSummary {
    let mut summary = BatchSummary::default();

    for pid in patient_ids() {
        let in_folder = dataset_root.join(&pid);
        if !in_folder.exists() {
            println!("Dataset folder for {pid} not found. Skipping.");
            continue;
        }

        let files = sorted_files(&in_folder, raw_ext);
        if files.is_empty() {
            println!("No raw files in {pid}. Skipping.");
            continue;
        }

        let clean_out = out_root.join("Cleaned_Data").join(&pid);
        let report_out = out_root.join("ICA_Reports").join(&pid);

        println!("Processing {pid} ({} files)...", files.len());
        for fpath in &files {
            let report = clean_one_file(
                fpath, &clean_out, &report_out, cfg, reader, writer, diag, separator,
            );
            if !report.status.is_success() {
                info!(
                    "[{pid}] {} -> {}",
                    fpath.file_name().unwrap_or_default().to_string_lossy(),
                    report.status
                );
            }
            summary.record(&report);
        }
    }

    summary
}

/// Derive the raw counterpart of a cleaned file name: strip the `clean_`
/// prefix and `_eeg.<clean_ext>` suffix and substitute the raw extension.
///
/// Returns `None` when the name does not follow the convention.
pub fn raw_name_for(clean_name: &str, clean_ext: &str, raw_ext: &str) -> Option<String> {
    let stem = clean_name.strip_prefix("clean_")?;
    let stem = stem.strip_suffix(&format!("_eeg.{clean_ext}"))?;
    Some(format!("{stem}.{raw_ext}"))
}

/// Build the global QC table by re-reading each persisted raw/clean pair.
///
/// Cleaned files whose raw counterpart cannot be matched by the filename
/// convention, or for which either side fails to load, are silently omitted
/// (not reported as zero rows). The variance-reduction proxy is clipped to
/// exactly −100 below −100.
pub fn build_global_report(
    dataset_root: &Path,
    cleaned_root: &Path,
    raw_ext: &str,
    clean_ext: &str,
    reader: &dyn RecordingReader,
    qc_cfg: &QcConfig,
) -> Vec<QcRecord> {
    let mut records = Vec::new();

    for pid in patient_ids() {
        let clean_folder = cleaned_root.join(&pid);
        if !clean_folder.exists() {
            continue;
        }

        for c_file in sorted_files(&clean_folder, clean_ext) {
            let clean_name = c_file
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let Some(base_name) = raw_name_for(&clean_name, clean_ext, raw_ext) else {
                continue;
            };
            let raw_file = dataset_root.join(&pid).join(&base_name);
            if !raw_file.exists() {
                continue;
            }

            let (Ok(raw), Ok(clean)) = (reader.read(&raw_file), reader.read(&c_file)) else {
                continue;
            };
            let Some(m) = pair_metrics(&raw, &clean, qc_cfg) else {
                continue;
            };

            // Clip nonsensical blow-ups from channel mismatch.
            let red = m.variance_reduction_percent.max(-100.0);

            records.push(QcRecord {
                patient: pid.clone(),
                file: base_name,
                variance_reduction_percent: red,
                raw_variance: m.raw_variance,
                clean_variance: m.clean_variance,
            });
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patient_ids_span_chb01_to_chb24() {
        let ids = patient_ids();
        assert_eq!(ids.len(), 24);
        assert_eq!(ids.first().unwrap(), "chb01");
        assert_eq!(ids.last().unwrap(), "chb24");
    }

    #[test]
    fn raw_name_round_trip() {
        assert_eq!(
            raw_name_for("clean_chb01_03_eeg.st", "st", "edf"),
            Some("chb01_03.edf".to_string())
        );
    }

    #[test]
    fn raw_name_rejects_nonconforming() {
        assert_eq!(raw_name_for("chb01_03.st", "st", "edf"), None);
        assert_eq!(raw_name_for("clean_chb01_03.st", "st", "edf"), None);
    }
}
