//! Corpus-level QC report table.
use std::io::Write;
use std::path::Path;

use crate::error::{CleanError, Result};

/// One row of the global QC report; immutable once created.
#[derive(Debug, Clone)]
pub struct QcRecord {
    pub patient: String,
    pub file: String,
    pub variance_reduction_percent: f64,
    pub raw_variance: f64,
    pub clean_variance: f64,
}

/// Write the report as a flat CSV with the fixed column set.
///
/// Parent directories are created on demand; an existing file is overwritten.
pub fn write_csv(records: &[QcRecord], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut f = std::fs::File::create(path).map_err(|e| CleanError::Write(e.to_string()))?;
    writeln!(
        f,
        "Patient,File,Variance_Reduction_Percent,Raw_Variance,Clean_Variance"
    )?;
    for r in records {
        writeln!(
            f,
            "{},{},{},{},{}",
            r.patient, r.file, r.variance_reduction_percent, r.raw_variance, r.clean_variance
        )?;
    }
    Ok(())
}
