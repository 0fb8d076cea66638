//! Delphi-round content-validity statistics
//!
//! Ordinal ratings 1..=9 per (item, criterion) cell; 0 marks an unanswered
//! cell. Unanswered cells stay in the band-split denominator (the expert was
//! asked) but are excluded from I-CVI, median, SD and CV.

use super::{pct_one_decimal, ratio_two_decimals, round2, StatsConfig};
use ksc_common::RatingSheet;
use serde::Serialize;

/// Statistics for one (item, criterion) cell
#[derive(Debug, Clone, Serialize)]
pub struct CellStats {
    /// Share of experts in the low band (0..=low_band_max), one decimal
    pub low_pct: f64,
    /// Share of experts in the medium band, one decimal
    pub medium_pct: f64,
    /// Share of experts in the high band, one decimal
    pub high_pct: f64,
    /// Item Content Validity Index: raters at or above the cutoff over
    /// raters with a nonzero rating
    pub icvi: f64,
    /// Median of the nonzero ratings
    pub median: f64,
    /// Population standard deviation of the nonzero ratings
    pub std_dev: f64,
    /// Coefficient of variation (SD / mean), 0.00 when the mean is 0
    pub cv: f64,
    /// Number of experts with a nonzero rating
    pub answered: usize,

    /// Whether every answering expert rated at or above the cutoff.
    /// Count-based, so S-CVI/UA never depends on float equality.
    #[serde(skip)]
    pub(crate) unanimous: bool,
}

/// Full Delphi report for one project
#[derive(Debug, Clone, Serialize)]
pub struct DelphiReport {
    pub expert_count: usize,
    pub item_count: usize,
    pub criterion_count: usize,
    /// Per-item, per-criterion statistics: `cells[item][criterion]`
    pub cells: Vec<Vec<CellStats>>,
    /// S-CVI/UA per criterion: fraction of items with I-CVI exactly 1.00
    pub scvi_ua: Vec<f64>,
}

/// Compute the Delphi report over an immutable snapshot of sheets
pub fn delphi_report(
    sheets: &[RatingSheet],
    item_count: usize,
    criterion_count: usize,
    config: &StatsConfig,
) -> DelphiReport {
    let expert_count = sheets.len();

    let cells: Vec<Vec<CellStats>> = (0..item_count)
        .map(|item| {
            (0..criterion_count)
                .map(|criterion| {
                    let ratings: Vec<u8> =
                        sheets.iter().map(|s| s.get(item, criterion)).collect();
                    cell_stats(&ratings, config)
                })
                .collect()
        })
        .collect();

    // S-CVI/UA: per criterion, the share of items every answering expert
    // rated at or above the cutoff
    let scvi_ua: Vec<f64> = (0..criterion_count)
        .map(|criterion| {
            let unanimous_items = cells
                .iter()
                .filter(|item_cells| item_cells[criterion].unanimous)
                .count();
            ratio_two_decimals(unanimous_items, item_count)
        })
        .collect();

    DelphiReport {
        expert_count,
        item_count,
        criterion_count,
        cells,
        scvi_ua,
    }
}

/// Statistics for one cell's ratings across all experts
fn cell_stats(ratings: &[u8], config: &StatsConfig) -> CellStats {
    let expert_count = ratings.len();

    let low = ratings.iter().filter(|&&v| v <= config.low_band_max).count();
    let medium = ratings
        .iter()
        .filter(|&&v| v > config.low_band_max && v <= config.medium_band_max)
        .count();
    let high = ratings.iter().filter(|&&v| v > config.medium_band_max).count();

    // Nonzero subset drives the validity and dispersion statistics
    let answered: Vec<f64> = ratings
        .iter()
        .filter(|&&v| v != 0)
        .map(|&v| v as f64)
        .collect();
    let at_cutoff = ratings.iter().filter(|&&v| v >= config.icvi_cutoff).count();

    let (median, std_dev, cv) = if answered.is_empty() {
        // Defined fallbacks, not incidental float behavior
        (0.0, 0.0, 0.0)
    } else {
        let n = answered.len() as f64;
        let mean = answered.iter().sum::<f64>() / n;
        let variance = answered.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std_dev = variance.sqrt();
        let cv = if mean == 0.0 { 0.0 } else { std_dev / mean };
        (median_of(&answered), std_dev, cv)
    };

    CellStats {
        low_pct: pct_one_decimal(low, expert_count),
        medium_pct: pct_one_decimal(medium, expert_count),
        high_pct: pct_one_decimal(high, expert_count),
        icvi: ratio_two_decimals(at_cutoff, answered.len()),
        median: round2(median),
        std_dev: round2(std_dev),
        cv: round2(cv),
        answered: answered.len(),
        unanimous: !answered.is_empty() && at_cutoff == answered.len(),
    }
}

/// Median of a nonempty slice (unsorted input)
fn median_of(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_cell_sheets(ratings: &[u8]) -> Vec<RatingSheet> {
        ratings
            .iter()
            .map(|&v| {
                let mut s = RatingSheet::new(1, 1);
                s.set(0, 0, v);
                s
            })
            .collect()
    }

    #[test]
    fn three_experts_one_per_band() {
        // Ratings [2, 5, 8]: each band gets one of three experts
        let sheets = single_cell_sheets(&[2, 5, 8]);
        let report = delphi_report(&sheets, 1, 1, &StatsConfig::default());
        let cell = &report.cells[0][0];

        assert_eq!(cell.low_pct, 33.3);
        assert_eq!(cell.medium_pct, 33.3);
        assert_eq!(cell.high_pct, 33.3);
        assert_eq!(cell.icvi, 0.33);
        assert_eq!(cell.median, 5.0);
        assert_eq!(cell.answered, 3);
    }

    #[test]
    fn zero_ratings_excluded_from_validity_but_counted_in_bands() {
        // One unanswered (0) and two high ratings
        let sheets = single_cell_sheets(&[0, 8, 9]);
        let report = delphi_report(&sheets, 1, 1, &StatsConfig::default());
        let cell = &report.cells[0][0];

        // Band denominators still count all three experts; 0 falls in low
        assert_eq!(cell.low_pct, 33.3);
        assert_eq!(cell.high_pct, 66.7);
        // I-CVI over the two answering experts only
        assert_eq!(cell.answered, 2);
        assert_eq!(cell.icvi, 1.0);
        assert_eq!(cell.median, 8.5);
    }

    #[test]
    fn icvi_is_one_exactly_when_all_answering_experts_hit_cutoff() {
        let all_high = single_cell_sheets(&[7, 9, 8]);
        let report = delphi_report(&all_high, 1, 1, &StatsConfig::default());
        assert_eq!(report.cells[0][0].icvi, 1.0);
        assert_eq!(report.scvi_ua, vec![1.0]);

        let one_low = single_cell_sheets(&[7, 9, 6]);
        let report = delphi_report(&one_low, 1, 1, &StatsConfig::default());
        assert!(report.cells[0][0].icvi < 1.0);
        assert_eq!(report.scvi_ua, vec![0.0]);
    }

    #[test]
    fn scvi_counts_unanimous_items_per_criterion() {
        // 2 items, 1 criterion, 2 experts: item 0 unanimous, item 1 not
        let mut a = RatingSheet::new(2, 1);
        a.set(0, 0, 8);
        a.set(1, 0, 9);
        let mut b = RatingSheet::new(2, 1);
        b.set(0, 0, 7);
        b.set(1, 0, 4);
        let report = delphi_report(&[a, b], 2, 1, &StatsConfig::default());
        assert_eq!(report.scvi_ua, vec![0.5]);
    }

    #[test]
    fn population_standard_deviation() {
        // [2, 4, 6]: mean 4, population variance 8/3
        let sheets = single_cell_sheets(&[2, 4, 6]);
        let report = delphi_report(&sheets, 1, 1, &StatsConfig::default());
        let cell = &report.cells[0][0];
        assert_eq!(cell.std_dev, round2((8.0f64 / 3.0).sqrt()));
        assert_eq!(cell.cv, round2((8.0f64 / 3.0).sqrt() / 4.0));
    }

    #[test]
    fn all_unanswered_cell_reports_defined_fallbacks() {
        let sheets = single_cell_sheets(&[0, 0]);
        let report = delphi_report(&sheets, 1, 1, &StatsConfig::default());
        let cell = &report.cells[0][0];
        assert_eq!(cell.answered, 0);
        assert_eq!(cell.icvi, 0.0);
        assert_eq!(cell.median, 0.0);
        assert_eq!(cell.std_dev, 0.0);
        assert_eq!(cell.cv, 0.0);
        assert_eq!(cell.low_pct, 100.0);
        assert_eq!(report.scvi_ua, vec![0.0]);
    }

    #[test]
    fn no_experts_reports_all_zero() {
        let report = delphi_report(&[], 1, 2, &StatsConfig::default());
        let cell = &report.cells[0][0];
        assert_eq!(cell.low_pct, 0.0);
        assert_eq!(cell.icvi, 0.0);
        assert_eq!(report.scvi_ua, vec![0.0, 0.0]);
    }

    #[test]
    fn proportions_stay_in_unit_interval() {
        let sheets = single_cell_sheets(&[1, 5, 9, 0, 7]);
        let report = delphi_report(&sheets, 1, 1, &StatsConfig::default());
        let cell = &report.cells[0][0];
        for pct in [cell.low_pct, cell.medium_pct, cell.high_pct] {
            assert!((0.0..=100.0).contains(&pct));
        }
        assert!((0.0..=1.0).contains(&cell.icvi));
        assert!((0.0..=1.0).contains(&report.scvi_ua[0]));
    }

    #[test]
    fn median_even_count_averages_middle_pair() {
        let sheets = single_cell_sheets(&[3, 5, 7, 9]);
        let report = delphi_report(&sheets, 1, 1, &StatsConfig::default());
        assert_eq!(report.cells[0][0].median, 6.0);
    }
}
