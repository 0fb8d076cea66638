//! Agreement and content-validity statistics engine
//!
//! Pure functions over an immutable snapshot of a project's rating sheets.
//! No I/O, no caching: every report request recomputes from the sheets the
//! database handed over. Every division guards its denominator with an
//! explicit branch; no statistic ever yields NaN.

pub mod delphi;
pub mod face_validity;
pub mod kappa;

pub use delphi::{delphi_report, CellStats, DelphiReport};
pub use face_validity::{face_validity_report, FaceValidityReport, ItemAgreement};
pub use kappa::{interpret_kappa, mean_pairwise_kappa, KappaSummary};

/// Tunable thresholds of the statistics engine
///
/// The defaults reproduce the values established in the instrument-validation
/// literature (Lynn 1986; Polit & Beck 2006). Treat them as configuration,
/// not constants, but do not change the defaults without changing the study
/// protocol.
#[derive(Debug, Clone)]
pub struct StatsConfig {
    /// Minimum "Yes" count for an expert to retain a face-validity item
    pub retention_threshold: usize,
    /// Minimum Delphi rating counted as content-valid for I-CVI
    pub icvi_cutoff: u8,
    /// Upper edge (inclusive) of the low Delphi band
    pub low_band_max: u8,
    /// Upper edge (inclusive) of the medium Delphi band
    pub medium_band_max: u8,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            retention_threshold: 8,
            icvi_cutoff: 7,
            low_band_max: 3,
            medium_band_max: 6,
        }
    }
}

/// Whole-percent share, 0 when the denominator is 0
pub(crate) fn pct_round(numerator: usize, denominator: usize) -> u32 {
    if denominator == 0 {
        return 0;
    }
    (100.0 * numerator as f64 / denominator as f64).round() as u32
}

/// One-decimal percent share, 0.0 when the denominator is 0
pub(crate) fn pct_one_decimal(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    round1(100.0 * numerator as f64 / denominator as f64)
}

/// Two-decimal proportion, 0.0 when the denominator is 0
pub(crate) fn ratio_two_decimals(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    round2(numerator as f64 / denominator as f64)
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
