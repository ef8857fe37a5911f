/// Shared helpers for building synthetic recordings and corpus trees.
use eegclean::recording::{Recording, RecordingWriter, StRecordingWriter};
use ndarray::Array2;
use std::path::Path;

/// CHB-MIT-style bipolar labels that map onto six distinct canonical
/// channels (Fp1, F7, T7, P7, F3, P3).
#[allow(unused)]
pub const SIX_BIPOLAR: [&str; 6] = [
    "FP1-F7", "F7-T7", "T7-P7", "P7-O1", "FP1-F3", "C3-P3",
];

/// Build a recording of per-channel sine mixtures with periodic blink-like
/// spikes added to the first channel.
#[allow(unused)]
pub fn synthetic_recording(names: &[&str], sfreq: f64, n_samples: usize) -> Recording {
    let data = Array2::from_shape_fn((names.len(), n_samples), |(c, t)| {
        let time = t as f64 / sfreq;
        let base = (2.0 * std::f64::consts::PI * (4.0 + c as f64 * 3.0) * time).sin()
            + 0.4 * (2.0 * std::f64::consts::PI * (9.0 + c as f64) * time).cos();
        let blink = if c == 0 && t % 512 < 25 { 6.0 } else { 0.0 };
        base + blink
    });
    Recording::new(names.iter().map(|s| s.to_string()).collect(), sfreq, data).unwrap()
}

#[allow(unused)]
/// Write a recording into `<root>/<pid>/<name>` creating directories.
pub fn write_corpus_file(root: &Path, pid: &str, name: &str, rec: &Recording) {
    let folder = root.join(pid);
    std::fs::create_dir_all(&folder).unwrap();
    StRecordingWriter.write(rec, &folder.join(name)).unwrap();
}
