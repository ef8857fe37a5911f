//! Pipeline configuration.
//!
//! [`CleanConfig`] holds every tunable parameter for the per-file cleaning
//! pipeline; [`QcConfig`] holds the QC channel-selection heuristic. All
//! defaults match the values used to clean the CHB-MIT corpus.

/// Configuration for the per-file artifact-removal pipeline.
///
/// All fields are `pub` so you can construct one with struct-update syntax:
///
/// ```
/// use eegclean::CleanConfig;
///
/// let cfg = CleanConfig {
///     notch_hz: 50.0,   // European mains
///     ..CleanConfig::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct CleanConfig {
    /// Mains frequency suppressed by the notch filter, in Hz.
    ///
    /// Applied before the band-pass. The 40 Hz band-pass ceiling already
    /// attenuates 60 Hz, but the explicit notch guards against incomplete
    /// attenuation and lower sampling configurations.
    ///
    /// Default: `60.0` Hz.
    pub notch_hz: f64,

    /// Transition bandwidth of the notch band-stop, in Hz.
    ///
    /// Default: `3.0` Hz.
    pub notch_trans_bw: f64,

    /// Low cutoff of the band-pass filter, in Hz (removes slow drift).
    ///
    /// Default: `1.0` Hz.
    pub l_freq: f64,

    /// High cutoff of the band-pass filter, in Hz (removes high-frequency
    /// muscle and noise content).
    ///
    /// Default: `40.0` Hz.
    pub h_freq: f64,

    /// Upper bound on the number of independent components.
    ///
    /// The effective component count is `min(max_components, C - 1)` for a
    /// C-channel recording; below 2 the file is skipped as low-rank.
    ///
    /// Default: `15`.
    pub max_components: usize,

    /// Seed for the decomposition's internal initialization. Identical
    /// input, seed, and component count always yield the same decomposition.
    ///
    /// Default: `97`.
    pub random_seed: u64,

    /// Iteration cap for the decomposition's fixed-point solver.
    ///
    /// Default: `800`.
    pub max_iter: usize,

    /// Frontal reference channel used to score components for ocular
    /// artifacts. When absent from a recording no components are excluded
    /// and the cleaned output equals the conditioned signal (fail-open).
    ///
    /// Default: `"Fp1"`.
    pub eog_channel: String,

    /// Z-score threshold on component/reference correlation above which a
    /// component is flagged as an ocular artifact.
    ///
    /// Default: `3.0`.
    pub eog_threshold: f64,
}

impl Default for CleanConfig {
    /// Returns the CHB-MIT corpus settings:
    /// 60 Hz notch · 1–40 Hz band-pass · ≤15 components · seed 97.
    fn default() -> Self {
        Self {
            notch_hz: 60.0,
            notch_trans_bw: 3.0,
            l_freq: 1.0,
            h_freq: 40.0,
            max_components: 15,
            random_seed: 97,
            max_iter: 800,
            eog_channel: "Fp1".to_string(),
            eog_threshold: 3.0,
        }
    }
}

/// Minimum number of canonical channels required to attempt ICA; below this
/// the decomposition is statistically unreliable and the file is skipped.
pub const MIN_CANONICAL_CHANNELS: usize = 5;

/// QC comparison-channel heuristic.
///
/// The preferred raw label is a bipolar derivation while the preferred clean
/// label is a single electrode; they are not guaranteed to carry the same
/// physical signal. The pairing is kept as-is — the reported metrics are
/// proxies, and changing it would silently change their values. When a
/// preferred label is absent, the recording's first channel is used instead.
#[derive(Debug, Clone)]
pub struct QcConfig {
    /// Preferred channel label in the raw recording. Default: `"FP1-F7"`.
    pub preferred_raw: String,
    /// Preferred channel label in the cleaned recording. Default: `"Fp1"`.
    pub preferred_clean: String,
}

impl Default for QcConfig {
    fn default() -> Self {
        Self {
            preferred_raw: "FP1-F7".to_string(),
            preferred_clean: "Fp1".to_string(),
        }
    }
}
