//! Ocular-artifact component selection.
//!
//! Blink activity dominates frontal electrodes, so each component is scored
//! by its correlation with the conditioned frontal reference channel
//! (`Fp1`). Scores are z-scored across components and outliers are flagged
//! for exclusion, mirroring the correlation criterion of MNE's
//! `find_bads_eog`. A missing reference channel yields an empty exclusion
//! set: artifact removal degrades, the file is never aborted for it.
use crate::error::{CleanError, Result};
use crate::ica::Decomposition;

/// Pearson correlation coefficient of two equal-length signals.
///
/// Returns 0.0 when either signal has (near-)zero variance.
pub fn correlation(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n < 2 {
        return 0.0;
    }
    let nf = n as f64;
    let mean_a = a[..n].iter().sum::<f64>() / nf;
    let mean_b = b[..n].iter().sum::<f64>() / nf;
    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for i in 0..n {
        let da = a[i] - mean_a;
        let db = b[i] - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }
    if var_a < 1e-30 || var_b < 1e-30 {
        return 0.0;
    }
    cov / (var_a * var_b).sqrt()
}

/// Score every component against the frontal reference series and return
/// the indices whose |z-scored correlation| exceeds `threshold`.
///
/// Errors when the reference carries no variance (scoring is meaningless);
/// the caller recovers that locally to an empty exclusion set.
pub fn find_eog_components(
    dec: &Decomposition,
    reference: &[f64],
    threshold: f64,
) -> Result<Vec<usize>> {
    let k = dec.n_components();
    if reference.len() < 2 {
        return Err(CleanError::ArtifactDetection(
            "reference channel too short to score".into(),
        ));
    }
    let ref_var = {
        let n = reference.len() as f64;
        let m = reference.iter().sum::<f64>() / n;
        reference.iter().map(|&v| (v - m) * (v - m)).sum::<f64>() / n
    };
    if ref_var < 1e-30 {
        return Err(CleanError::ArtifactDetection(
            "reference channel has zero variance".into(),
        ));
    }

    let scores: Vec<f64> = (0..k)
        .map(|i| correlation(&dec.source(i), reference))
        .collect();

    // z-score |r| across components; a blink component stands far out from
    // the bulk of neural components.
    let n = scores.len() as f64;
    let mean = scores.iter().map(|s| s.abs()).sum::<f64>() / n;
    let var = scores
        .iter()
        .map(|s| {
            let d = s.abs() - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    let std = var.sqrt();
    if std < 1e-30 {
        // All components equally (un)correlated: nothing stands out.
        return Ok(vec![]);
    }

    Ok(scores
        .iter()
        .enumerate()
        .filter(|(_, s)| (s.abs() - mean) / std > threshold)
        .map(|(i, _)| i)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2};

    fn dec_from_sources(sources: Array2<f64>) -> Decomposition {
        let k = sources.nrows();
        Decomposition {
            mixing: Array2::eye(k),
            means: Array1::zeros(k),
            sources,
        }
    }

    #[test]
    fn correlation_of_identical_signals_is_one() {
        let x: Vec<f64> = (0..200).map(|i| (i as f64 * 0.3).sin()).collect();
        approx::assert_abs_diff_eq!(correlation(&x, &x), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn correlation_zero_variance_is_zero() {
        let flat = vec![2.0; 100];
        let x: Vec<f64> = (0..100).map(|i| i as f64).collect();
        assert_eq!(correlation(&flat, &x), 0.0);
    }

    #[test]
    fn blink_like_component_is_flagged() {
        // Component 0 tracks the reference; the rest are unrelated tones.
        let n = 1000;
        let blink: Vec<f64> = (0..n)
            .map(|i| if i % 250 < 20 { 80.0 } else { 0.0 })
            .collect();
        let sources = Array2::from_shape_fn((6, n), |(c, j)| match c {
            0 => blink[j],
            c => ((j as f64) * 0.01 * (c as f64 + 2.0)).sin(),
        });
        let dec = dec_from_sources(sources);

        let flagged = find_eog_components(&dec, &blink, 1.5).unwrap();
        assert_eq!(flagged, vec![0]);
    }

    #[test]
    fn unrelated_components_are_not_flagged() {
        let n = 1000;
        let reference: Vec<f64> = (0..n).map(|i| (i as f64 * 0.05).sin()).collect();
        let sources = Array2::from_shape_fn((4, n), |(c, j)| {
            ((j as f64) * 0.013 * (c as f64 + 3.0)).cos()
        });
        let dec = dec_from_sources(sources);

        let flagged = find_eog_components(&dec, &reference, 3.0).unwrap();
        assert!(flagged.is_empty(), "flagged {flagged:?}");
    }

    #[test]
    fn zero_variance_reference_errors() {
        let sources = Array2::from_shape_fn((3, 100), |(c, j)| (c + j) as f64);
        let dec = dec_from_sources(sources);
        assert!(find_eog_components(&dec, &[1.0; 100], 3.0).is_err());
    }
}
