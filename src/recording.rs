//! Recording data model and safetensors-backed I/O.
//!
//! The pipeline is format-agnostic: loading and persistence go through the
//! [`RecordingReader`] / [`RecordingWriter`] traits so the corpus format can
//! be swapped without touching the cleaning code. The shipped implementations
//! use a minimal safetensors container (`data` [C, T] F64, `sfreq` [1] F64,
//! `ch_names` U8 newline-joined), extension `.st`.
use ndarray::Array2;
use std::collections::HashMap;
use std::path::Path;

use crate::error::{CleanError, Result};

/// A continuous multichannel recording: `data` is [C, T], one row per
/// channel, all channels sharing one sample rate.
#[derive(Debug, Clone)]
pub struct Recording {
    /// Channel labels, unique, order-significant, one per row of `data`.
    pub ch_names: Vec<String>,
    /// Sampling rate in Hz.
    pub sfreq: f64,
    /// Signal, shape [C, T], volts.
    pub data: Array2<f64>,
}

impl Recording {
    /// Build a recording, checking that labels and rows agree.
    pub fn new(ch_names: Vec<String>, sfreq: f64, data: Array2<f64>) -> Result<Self> {
        if ch_names.len() != data.nrows() {
            return Err(CleanError::ShapeMismatch(format!(
                "{} channel labels but {} data rows",
                ch_names.len(),
                data.nrows()
            )));
        }
        Ok(Self { ch_names, sfreq, data })
    }

    /// Number of channels.
    pub fn n_channels(&self) -> usize {
        self.data.nrows()
    }

    /// Number of samples per channel.
    pub fn n_samples(&self) -> usize {
        self.data.ncols()
    }

    /// Row index of a channel label, if present.
    pub fn channel_index(&self, name: &str) -> Option<usize> {
        self.ch_names.iter().position(|n| n == name)
    }

    /// One channel's samples as a contiguous vector.
    pub fn channel(&self, idx: usize) -> Vec<f64> {
        self.data.row(idx).to_vec()
    }

    /// Restrict to the given row indices, in the given order.
    pub fn pick(&self, indices: &[usize]) -> Recording {
        let names = indices.iter().map(|&i| self.ch_names[i].clone()).collect();
        let mut data = Array2::zeros((indices.len(), self.n_samples()));
        for (out_row, &i) in indices.iter().enumerate() {
            data.row_mut(out_row).assign(&self.data.row(i));
        }
        Recording { ch_names: names, sfreq: self.sfreq, data }
    }
}

// ── Collaborator traits ──────────────────────────────────────────────────────

/// Loads a [`Recording`] from disk. Raw-format parsing lives behind this
/// seam; the pipeline only sees the in-memory model.
pub trait RecordingReader {
    fn read(&self, path: &Path) -> Result<Recording>;
}

/// Persists a cleaned [`Recording`]. Must overwrite an existing file.
pub trait RecordingWriter {
    fn write(&self, rec: &Recording, path: &Path) -> Result<()>;
    /// File extension (without dot) this writer produces.
    fn extension(&self) -> &'static str;
}

/// Best-effort writer for per-file diagnostics (component time courses and
/// the excluded indices). Failures here degrade, never abort.
pub trait DiagnosticWriter {
    fn write(&self, sources: &Array2<f64>, excluded: &[usize], path: &Path) -> Result<()>;
}

// ── Safetensors header parsing ───────────────────────────────────────────────

fn parse_header(bytes: &[u8]) -> Result<(HashMap<String, serde_json::Value>, usize)> {
    if bytes.len() < 8 {
        return Err(CleanError::Load("safetensors file too small".into()));
    }
    let n = u64::from_le_bytes(bytes[..8].try_into().unwrap()) as usize;
    if bytes.len() < 8 + n {
        return Err(CleanError::Load("safetensors header truncated".into()));
    }
    let header: HashMap<String, serde_json::Value> = serde_json::from_slice(&bytes[8..8 + n])
        .map_err(|e| CleanError::Load(format!("bad safetensors header: {e}")))?;
    Ok((header, 8 + n))
}

fn tensor_bytes<'a>(
    bytes: &'a [u8],
    data_start: usize,
    entry: &serde_json::Value,
) -> Result<&'a [u8]> {
    let offsets = entry["data_offsets"]
        .as_array()
        .ok_or_else(|| CleanError::Load("missing data_offsets".into()))?;
    let s = offsets
        .first()
        .and_then(|v| v.as_u64())
        .ok_or_else(|| CleanError::Load("malformed data_offsets".into()))? as usize;
    let e = offsets
        .get(1)
        .and_then(|v| v.as_u64())
        .ok_or_else(|| CleanError::Load("malformed data_offsets".into()))? as usize;
    bytes
        .get(data_start + s..data_start + e)
        .ok_or_else(|| CleanError::Load("tensor data out of bounds".into()))
}

fn read_f64_tensor(
    bytes: &[u8],
    data_start: usize,
    entry: &serde_json::Value,
) -> Result<Vec<f64>> {
    let raw = tensor_bytes(bytes, data_start, entry)?;
    if raw.len() % 8 != 0 {
        return Err(CleanError::Load(format!(
            "F64 tensor byte length {} is not a multiple of 8",
            raw.len()
        )));
    }
    Ok(raw
        .chunks_exact(8)
        .map(|b| f64::from_le_bytes(b.try_into().unwrap()))
        .collect())
}

fn shape_of(entry: &serde_json::Value) -> Vec<usize> {
    entry["shape"]
        .as_array()
        .map(|a| a.iter().map(|v| v.as_u64().unwrap_or(0) as usize).collect())
        .unwrap_or_default()
}

// ── Safetensors reader ───────────────────────────────────────────────────────

/// Reads `.st` recordings (the container written by [`StRecordingWriter`]).
pub struct StRecordingReader;

impl RecordingReader for StRecordingReader {
    fn read(&self, path: &Path) -> Result<Recording> {
        let bytes = std::fs::read(path)
            .map_err(|e| CleanError::Load(format!("{}: {e}", path.display())))?;
        let (header, data_start) = parse_header(&bytes)?;

        let data_entry = header
            .get("data")
            .ok_or_else(|| CleanError::Load("missing 'data' tensor".into()))?;
        let shape = shape_of(data_entry);
        if shape.len() != 2 {
            return Err(CleanError::Load(format!("'data' must be 2-D, got {shape:?}")));
        }
        let data_vec = read_f64_tensor(&bytes, data_start, data_entry)?;
        let data = Array2::from_shape_vec((shape[0], shape[1]), data_vec)
            .map_err(|e| CleanError::Load(format!("'data' shape mismatch: {e}")))?;

        let sfreq_entry = header
            .get("sfreq")
            .ok_or_else(|| CleanError::Load("missing 'sfreq' tensor".into()))?;
        let sfreq = *read_f64_tensor(&bytes, data_start, sfreq_entry)?
            .first()
            .ok_or_else(|| CleanError::Load("empty 'sfreq' tensor".into()))?;

        let names_entry = header
            .get("ch_names")
            .ok_or_else(|| CleanError::Load("missing 'ch_names' tensor".into()))?;
        let raw_str = std::str::from_utf8(tensor_bytes(&bytes, data_start, names_entry)?)
            .map_err(|e| CleanError::Load(format!("ch_names not UTF-8: {e}")))?;
        let ch_names: Vec<String> = raw_str
            .split('\n')
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        Recording::new(ch_names, sfreq, data)
            .map_err(|e| CleanError::Load(e.to_string()))
    }
}

// ── Safetensors builder ──────────────────────────────────────────────────────

/// Minimal safetensors writer handling F64, I32, and U8 tensors.
pub struct StWriter {
    entries: Vec<(String, Vec<u8>, &'static str, Vec<usize>)>,
}

impl StWriter {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn add_f64(&mut self, name: &str, data: &[f64], shape: &[usize]) {
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.entries.push((name.to_string(), bytes, "F64", shape.to_vec()));
    }

    pub fn add_f64_arr2(&mut self, name: &str, arr: &Array2<f64>) {
        let data: Vec<f64> = arr.iter().copied().collect();
        self.add_f64(name, &data, &[arr.nrows(), arr.ncols()]);
    }

    pub fn add_i32(&mut self, name: &str, data: &[i32], shape: &[usize]) {
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.entries.push((name.to_string(), bytes, "I32", shape.to_vec()));
    }

    pub fn add_bytes(&mut self, name: &str, data: &[u8]) {
        self.entries
            .push((name.to_string(), data.to_vec(), "U8", vec![data.len()]));
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        use std::io::Write;
        let mut header_map = serde_json::Map::new();
        let mut offset: usize = 0;
        for (name, data, dtype, shape) in &self.entries {
            header_map.insert(
                name.clone(),
                serde_json::json!({
                    "dtype": dtype,
                    "shape": shape,
                    "data_offsets": [offset, offset + data.len()],
                }),
            );
            offset += data.len();
        }
        let hdr_bytes = serde_json::to_vec(&header_map)
            .map_err(|e| CleanError::Write(e.to_string()))?;
        let pad = (8 - hdr_bytes.len() % 8) % 8;
        let padded: Vec<u8> = hdr_bytes
            .into_iter()
            .chain(std::iter::repeat(b' ').take(pad))
            .collect();
        let mut f = std::fs::File::create(path)?;
        f.write_all(&(padded.len() as u64).to_le_bytes())?;
        f.write_all(&padded)?;
        for (_, data, _, _) in &self.entries {
            f.write_all(data)?;
        }
        Ok(())
    }
}

impl Default for StWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes `.st` recordings readable by [`StRecordingReader`].
pub struct StRecordingWriter;

impl RecordingWriter for StRecordingWriter {
    fn write(&self, rec: &Recording, path: &Path) -> Result<()> {
        let mut w = StWriter::new();
        w.add_f64_arr2("data", &rec.data);
        w.add_f64("sfreq", &[rec.sfreq], &[1]);
        w.add_bytes("ch_names", rec.ch_names.join("\n").as_bytes());
        w.write(path)
    }

    fn extension(&self) -> &'static str {
        "st"
    }
}

/// Dumps component traces and the exclusion set as a safetensors file.
pub struct StDiagnosticWriter;

impl DiagnosticWriter for StDiagnosticWriter {
    fn write(&self, sources: &Array2<f64>, excluded: &[usize], path: &Path) -> Result<()> {
        let mut w = StWriter::new();
        w.add_f64_arr2("sources", sources);
        let exc: Vec<i32> = excluded.iter().map(|&i| i as i32).collect();
        w.add_i32("excluded", &exc, &[exc.len()]);
        w.write(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn new_rejects_label_row_mismatch() {
        let data = array![[1.0, 2.0], [3.0, 4.0]];
        let err = Recording::new(vec!["Fp1".into()], 256.0, data).unwrap_err();
        assert!(matches!(err, CleanError::ShapeMismatch(_)));
    }

    #[test]
    fn pick_reorders_channels() {
        let data = array![[1.0, 1.0], [2.0, 2.0], [3.0, 3.0]];
        let rec = Recording::new(
            vec!["A".into(), "B".into(), "C".into()],
            128.0,
            data,
        )
        .unwrap();
        let picked = rec.pick(&[2, 0]);
        assert_eq!(picked.ch_names, vec!["C", "A"]);
        assert_eq!(picked.data.row(0).to_vec(), vec![3.0, 3.0]);
        assert_eq!(picked.data.row(1).to_vec(), vec![1.0, 1.0]);
    }

    #[test]
    fn st_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rec.st");
        let data = array![[0.5, -0.5, 0.25], [1.0, 0.0, -1.0]];
        let rec = Recording::new(vec!["Fp1".into(), "Cz".into()], 256.0, data).unwrap();

        StRecordingWriter.write(&rec, &path).unwrap();
        let back = StRecordingReader.read(&path).unwrap();

        assert_eq!(back.ch_names, rec.ch_names);
        assert_eq!(back.sfreq, rec.sfreq);
        assert_eq!(back.data, rec.data);
    }

    #[test]
    fn read_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.st");
        std::fs::write(&path, b"not a safetensors file at all").unwrap();
        assert!(StRecordingReader.read(&path).is_err());
    }

    fn write_with_header(path: &std::path::Path, header: &[u8], payload: &[u8]) {
        let mut bytes = (header.len() as u64).to_le_bytes().to_vec();
        bytes.extend_from_slice(header);
        bytes.extend_from_slice(payload);
        std::fs::write(path, &bytes).unwrap();
    }

    #[test]
    fn read_rejects_malformed_offsets() {
        // A syntactically valid header whose data_offsets has too few
        // elements must surface a load error, not panic.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad_offsets.st");
        write_with_header(
            &path,
            br#"{"data":{"dtype":"F64","shape":[1,1],"data_offsets":[]}}"#,
            &[],
        );
        let err = StRecordingReader.read(&path).unwrap_err();
        assert!(matches!(err, CleanError::Load(_)));

        let path = dir.path().join("one_offset.st");
        write_with_header(
            &path,
            br#"{"data":{"dtype":"F64","shape":[1,1],"data_offsets":[0]}}"#,
            &[0u8; 8],
        );
        assert!(StRecordingReader.read(&path).is_err());
    }

    #[test]
    fn read_rejects_truncated_f64_payload() {
        // 9 bytes cannot hold whole f64 samples; the trailing byte must not
        // be silently discarded.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ragged.st");
        write_with_header(
            &path,
            br#"{"data":{"dtype":"F64","shape":[1,1],"data_offsets":[0,9]}}"#,
            &[0u8; 9],
        );
        let err = StRecordingReader.read(&path).unwrap_err();
        assert!(matches!(err, CleanError::Load(_)));
    }
}
