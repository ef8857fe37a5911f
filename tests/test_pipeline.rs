mod common;
use common::{synthetic_recording, write_corpus_file, SIX_BIPOLAR};

use eegclean::ica::{Decomposition, SourceSeparator};
use eegclean::recording::{StDiagnosticWriter, StRecordingReader, StRecordingWriter};
use eegclean::{
    clean_one_file, CleanConfig, CleanError, FastIca, ProcessingStatus, Result, SideStep,
};
use ndarray::{Array1, Array2};
use std::path::Path;

/// A separator that must never be reached; panics on use.
struct PanicSeparator;

impl SourceSeparator for PanicSeparator {
    fn decompose(
        &self,
        _data: &Array2<f64>,
        _k: usize,
        _seed: u64,
        _max_iter: usize,
    ) -> Result<Decomposition> {
        panic!("separator must not be invoked for skipped files");
    }
}

/// Returns a fixed two-component decomposition regardless of the input, so
/// tests can reach the post-decomposition steps deterministically.
struct CannedSeparator;

impl SourceSeparator for CannedSeparator {
    fn decompose(
        &self,
        data: &Array2<f64>,
        _k: usize,
        _seed: u64,
        _max_iter: usize,
    ) -> Result<Decomposition> {
        let (c, t) = (data.nrows(), data.ncols());
        let sources = Array2::from_shape_fn((2, t), |(k, j)| {
            (j as f64 * 0.1 * (k as f64 + 1.0)).sin()
        });
        Ok(Decomposition {
            sources,
            mixing: Array2::zeros((c, 2)),
            means: Array1::zeros(c),
        })
    }
}

/// A separator that fails with an error outside the low-rank taxonomy.
struct FailingSeparator;

impl SourceSeparator for FailingSeparator {
    fn decompose(
        &self,
        _data: &Array2<f64>,
        _k: usize,
        _seed: u64,
        _max_iter: usize,
    ) -> Result<Decomposition> {
        Err(CleanError::Load("solver backend unavailable".into()))
    }
}

fn run_one(
    path: &Path,
    out: &Path,
    cfg: &CleanConfig,
    sep: &dyn SourceSeparator,
) -> eegclean::FileReport {
    clean_one_file(
        path,
        &out.join("clean"),
        &out.join("reports"),
        cfg,
        &StRecordingReader,
        &StRecordingWriter,
        &StDiagnosticWriter,
        sep,
    )
}

#[test]
fn too_few_canonical_channels_short_circuits() {
    let dir = tempfile::tempdir().unwrap();
    // Only 3 mappable channels; the separator must never run.
    let rec = synthetic_recording(&["FP1-F7", "F7-T7", "T7-P7"], 256.0, 1024);
    write_corpus_file(dir.path(), "chb01", "chb01_01.st", &rec);

    let report = run_one(
        &dir.path().join("chb01/chb01_01.st"),
        dir.path(),
        &CleanConfig::default(),
        &PanicSeparator,
    );
    assert_eq!(report.status, ProcessingStatus::SkippedInsufficientChannels);
}

#[test]
fn unmapped_channels_do_not_count_as_canonical() {
    let dir = tempfile::tempdir().unwrap();
    // Plenty of channels, but only 4 map onto the montage.
    let rec = synthetic_recording(
        &["FP1-F7", "F7-T7", "T7-P7", "P7-O1", "ECG", "VNS", "LOC-ROC"],
        256.0,
        1024,
    );
    write_corpus_file(dir.path(), "chb01", "chb01_01.st", &rec);

    let report = run_one(
        &dir.path().join("chb01/chb01_01.st"),
        dir.path(),
        &CleanConfig::default(),
        &PanicSeparator,
    );
    assert_eq!(report.status, ProcessingStatus::SkippedInsufficientChannels);
}

#[test]
fn component_cap_below_two_skips_as_low_rank() {
    let dir = tempfile::tempdir().unwrap();
    let rec = synthetic_recording(&SIX_BIPOLAR, 256.0, 2048);
    write_corpus_file(dir.path(), "chb01", "chb01_01.st", &rec);

    let cfg = CleanConfig {
        max_components: 1,
        ..CleanConfig::default()
    };
    let report = run_one(
        &dir.path().join("chb01/chb01_01.st"),
        dir.path(),
        &cfg,
        &PanicSeparator,
    );
    assert_eq!(report.status, ProcessingStatus::SkippedLowRank);
}

#[test]
fn unreadable_file_reports_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.st");
    std::fs::write(&path, b"\x00\x01garbage").unwrap();

    let report = run_one(&path, dir.path(), &CleanConfig::default(), &PanicSeparator);
    assert!(matches!(report.status, ProcessingStatus::LoadError(_)));
}

#[test]
fn successful_clean_persists_with_naming_convention() {
    let dir = tempfile::tempdir().unwrap();
    let rec = synthetic_recording(&SIX_BIPOLAR, 256.0, 2048);
    write_corpus_file(dir.path(), "chb01", "chb01_03.st", &rec);

    let report = run_one(
        &dir.path().join("chb01/chb01_03.st"),
        dir.path(),
        &CleanConfig::default(),
        &FastIca::default(),
    );
    assert_eq!(report.status, ProcessingStatus::Success);
    assert_eq!(report.artifact_step, SideStep::Ok);
    assert_eq!(report.diagnostic_step, SideStep::Ok);

    let cleaned = dir.path().join("clean/clean_chb01_03_eeg.st");
    assert!(cleaned.exists(), "cleaned output missing");
    assert!(dir.path().join("reports/chb01_03_ica.st").exists());

    // Cleaned recording is canonical: montage labels, same length.
    use eegclean::recording::RecordingReader;
    let out = StRecordingReader.read(&cleaned).unwrap();
    assert_eq!(
        out.ch_names,
        vec!["Fp1", "F7", "T7", "P7", "F3", "P3"]
    );
    assert_eq!(out.n_samples(), 2048);
}

#[test]
fn zero_variance_reference_degrades_artifact_step() {
    let dir = tempfile::tempdir().unwrap();
    // FP1-F7 (canonical Fp1) identically zero: conditioning keeps it zero,
    // so component scoring has no reference variance to work with. The file
    // must still clean, with an empty exclusion set.
    let mut rec = synthetic_recording(&SIX_BIPOLAR, 256.0, 2048);
    rec.data.row_mut(0).fill(0.0);
    write_corpus_file(dir.path(), "chb01", "chb01_09.st", &rec);

    let report = run_one(
        &dir.path().join("chb01/chb01_09.st"),
        dir.path(),
        &CleanConfig::default(),
        &CannedSeparator,
    );
    assert_eq!(report.status, ProcessingStatus::Success);
    assert!(matches!(report.artifact_step, SideStep::Degraded(_)));
    assert!(report.excluded.is_empty());
    assert!(dir.path().join("clean/clean_chb01_09_eeg.st").exists());
}

#[test]
fn unexpected_separator_error_gets_its_own_status() {
    let dir = tempfile::tempdir().unwrap();
    let rec = synthetic_recording(&SIX_BIPOLAR, 256.0, 2048);
    write_corpus_file(dir.path(), "chb01", "chb01_11.st", &rec);

    let report = run_one(
        &dir.path().join("chb01/chb01_11.st"),
        dir.path(),
        &CleanConfig::default(),
        &FailingSeparator,
    );
    assert!(matches!(report.status, ProcessingStatus::ProcessingError(_)));
    assert_eq!(report.status.kind(), "Processing Error");
}

#[test]
fn missing_frontal_reference_fails_open() {
    let dir = tempfile::tempdir().unwrap();
    // Five canonical channels, none of which is Fp1.
    let rec = synthetic_recording(
        &["F7-T7", "T7-P7", "P7-O1", "C3-P3", "F3-C3"],
        256.0,
        2048,
    );
    write_corpus_file(dir.path(), "chb01", "chb01_05.st", &rec);

    let report = run_one(
        &dir.path().join("chb01/chb01_05.st"),
        dir.path(),
        &CleanConfig::default(),
        &FastIca::default(),
    );
    // Still a success; no components excluded.
    assert_eq!(report.status, ProcessingStatus::Success);
    assert!(report.excluded.is_empty());
}
