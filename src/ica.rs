//! Independent component decomposition (source separation seam).
//!
//! The pipeline only depends on the [`SourceSeparator`] trait, so tests can
//! inject a deterministic stub and the numerical solver stays swappable.
//! The shipped [`FastIca`] implements fixed-point FastICA with a logcosh
//! contrast, deflation orthogonalization, and PCA whitening via seeded power
//! iteration. Given identical input, seed, component count, and iteration
//! cap, the decomposition is bit-for-bit reproducible.
use ndarray::{Array1, Array2};

use crate::error::{CleanError, Result};

/// A fitted decomposition: component time courses plus the linear relation
/// back to channel space. Owned by one pipeline run and discarded after
/// reconstruction.
#[derive(Debug, Clone)]
pub struct Decomposition {
    /// Component time courses, shape [K, T].
    pub sources: Array2<f64>,
    /// Mixing matrix, shape [C, K]: columns are per-component scalp maps.
    pub mixing: Array2<f64>,
    /// Per-channel means removed before whitening, length C.
    pub means: Array1<f64>,
}

impl Decomposition {
    /// Number of extracted components.
    pub fn n_components(&self) -> usize {
        self.sources.nrows()
    }

    /// One component's time course as a contiguous vector.
    pub fn source(&self, idx: usize) -> Vec<f64> {
        self.sources.row(idx).to_vec()
    }

    /// Rebuild the channel-space signal omitting the excluded components.
    ///
    /// With an empty exclusion set this reproduces the conditioned input up
    /// to whitening-truncation and convergence tolerance.
    pub fn reconstruct(&self, exclude: &[usize]) -> Array2<f64> {
        let mut kept = self.sources.clone();
        for &idx in exclude {
            if idx < kept.nrows() {
                kept.row_mut(idx).fill(0.0);
            }
        }
        let mut out = self.mixing.dot(&kept);
        for (mut row, &m) in out.rows_mut().into_iter().zip(self.means.iter()) {
            row.mapv_inplace(|v| v + m);
        }
        out
    }
}

/// Strategy seam for the decomposition solver.
pub trait SourceSeparator {
    /// Decompose `data` ([C, T]) into `k` maximally independent components.
    fn decompose(
        &self,
        data: &Array2<f64>,
        k: usize,
        seed: u64,
        max_iter: usize,
    ) -> Result<Decomposition>;
}

/// Fixed-point FastICA with logcosh contrast and deflation.
#[derive(Debug, Clone)]
pub struct FastIca {
    /// Convergence tolerance on the weight-vector dot product.
    pub tolerance: f64,
}

impl Default for FastIca {
    fn default() -> Self {
        Self { tolerance: 1e-6 }
    }
}

impl SourceSeparator for FastIca {
    fn decompose(
        &self,
        data: &Array2<f64>,
        k: usize,
        seed: u64,
        max_iter: usize,
    ) -> Result<Decomposition> {
        let c = data.nrows();
        let t = data.ncols();
        if c == 0 || t == 0 {
            return Err(CleanError::Decomposition("empty input".into()));
        }
        if k < 2 {
            return Err(CleanError::Decomposition(format!(
                "need at least 2 components, got {k}"
            )));
        }
        let k = k.min(c);

        // Center.
        let means: Array1<f64> =
            Array1::from_iter(data.rows().into_iter().map(|r| r.sum() / t as f64));
        let mut centered = data.clone();
        for (mut row, &m) in centered.rows_mut().into_iter().zip(means.iter()) {
            row.mapv_inplace(|v| v - m);
        }

        let mut rng = Lcg::new(seed);

        // Whiten via PCA: Z = D^{-1/2}·Eᵀ·Xc. Rank-deficient directions
        // (tiny eigenvalues) are truncated, which can lower K.
        let cov = centered.dot(&centered.t()) / t as f64;
        let (eigvals, eigvecs) = eigen_symmetric(&cov, k, &mut rng);
        let floor = eigvals.first().copied().unwrap_or(0.0).abs() * 1e-12;
        let usable = eigvals.iter().take_while(|&&l| l > floor && l > 0.0).count();
        if usable < 2 {
            return Err(CleanError::Decomposition(
                "input covariance has rank below 2".into(),
            ));
        }
        let k = k.min(usable);

        let mut whitening = Array2::<f64>::zeros((k, c));
        let mut dewhitening = Array2::<f64>::zeros((c, k));
        for i in 0..k {
            let scale = eigvals[i].sqrt();
            for j in 0..c {
                whitening[[i, j]] = eigvecs[[i, j]] / scale;
                dewhitening[[j, i]] = eigvecs[[i, j]] * scale;
            }
        }
        let whitened = whitening.dot(&centered); // [K, T]

        // Fixed-point iteration, one component at a time.
        let w = self.deflation(&whitened, k, max_iter, &mut rng);

        let sources = w.dot(&whitened); // [K, T]
        let mixing = dewhitening.dot(&w.t()); // [C, K]

        Ok(Decomposition { sources, mixing, means })
    }
}

impl FastIca {
    /// Extract `k` unmixing rows by deflation. `whitened` is [K, T].
    fn deflation(
        &self,
        whitened: &Array2<f64>,
        k: usize,
        max_iter: usize,
        rng: &mut Lcg,
    ) -> Array2<f64> {
        let p = whitened.nrows();
        let t = whitened.ncols();
        let mut w_all = Array2::<f64>::zeros((k, p));

        for comp in 0..k {
            let mut w: Array1<f64> = Array1::from_iter((0..p).map(|_| rng.next_f64()));
            normalize(&mut w);

            for _ in 0..max_iter {
                // u = wᵀ·z for all samples.
                let u = w.dot(whitened); // [T]

                // logcosh contrast: g(u) = tanh(u), g'(u) = 1 - tanh²(u).
                let gu = u.mapv(f64::tanh);
                let g_prime_mean =
                    gu.iter().map(|&g| 1.0 - g * g).sum::<f64>() / t as f64;

                // w_new = E{z·g(u)} - E{g'(u)}·w
                let mut w_new = whitened.dot(&gu) / t as f64;
                w_new.zip_mut_with(&w, |n, &o| *n -= g_prime_mean * o);

                // Orthogonalize against previously extracted components.
                for prev in 0..comp {
                    let prev_row = w_all.row(prev).to_owned();
                    let dot = w_new.dot(&prev_row);
                    w_new.zip_mut_with(&prev_row, |n, &q| *n -= dot * q);
                }
                normalize(&mut w_new);

                let dot = w.dot(&w_new);
                w = w_new;
                if (dot.abs() - 1.0).abs() < self.tolerance {
                    break;
                }
            }

            w_all.row_mut(comp).assign(&w);
        }
        w_all
    }
}

// ── Internal helpers ─────────────────────────────────────────────────────────

/// Deterministic LCG for reproducible initialization (Knuth multiplier).
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Uniform in [-0.5, 0.5).
    fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 33) as f64 / (1u64 << 31) as f64 - 0.5
    }
}

fn normalize(v: &mut Array1<f64>) {
    let norm = v.dot(&*v).sqrt();
    if norm > 1e-30 {
        v.mapv_inplace(|x| x / norm);
    }
}

/// Top-`k` eigenpairs of a symmetric matrix via power iteration with
/// deflation. Eigenvalues come out in decreasing order of magnitude; the
/// returned eigenvector matrix is [k, n], one eigenvector per row.
fn eigen_symmetric(matrix: &Array2<f64>, k: usize, rng: &mut Lcg) -> (Vec<f64>, Array2<f64>) {
    let n = matrix.nrows();
    let k = k.min(n);
    let mut eigenvalues = Vec::with_capacity(k);
    let mut eigenvectors = Array2::<f64>::zeros((k, n));

    let mut a = matrix.clone();

    for comp in 0..k {
        let mut v: Array1<f64> = Array1::from_iter((0..n).map(|_| rng.next_f64()));
        normalize(&mut v);

        let mut eigenvalue = 0.0;
        for _ in 0..300 {
            let mut v_new = a.dot(&v);
            eigenvalue = v_new.dot(&v_new).sqrt();
            if eigenvalue < 1e-30 {
                break;
            }
            v_new.mapv_inplace(|x| x / eigenvalue);

            let dot = v.dot(&v_new);
            v = v_new;
            if (dot.abs() - 1.0).abs() < 1e-12 {
                break;
            }
        }

        // Sign of the eigenvalue.
        let av = a.dot(&v);
        if av.dot(&v) < 0.0 {
            eigenvalue = -eigenvalue;
        }

        eigenvalues.push(eigenvalue);
        eigenvectors.row_mut(comp).assign(&v);

        // Deflate: A ← A - λ·v·vᵀ
        for i in 0..n {
            for j in 0..n {
                a[[i, j]] -= eigenvalue * v[i] * v[j];
            }
        }
    }

    (eigenvalues, eigenvectors)
}
