//! Face-validity agreement statistics
//!
//! Binary Yes/No ratings per (item, criterion) cell. Produces per-criterion
//! and per-item agreement percentages, per-expert retention flags, the
//! overall agreement percentage, and the mean pairwise Cohen's Kappa.

use super::kappa::{mean_pairwise_kappa, KappaSummary};
use super::{pct_round, StatsConfig};
use ksc_common::RatingSheet;
use serde::Serialize;

/// Agreement figures for one scale item
#[derive(Debug, Clone, Serialize)]
pub struct ItemAgreement {
    pub item_index: usize,
    /// Percent of experts answering Yes, per criterion, rounded to whole
    /// percents
    pub criterion_agreement_pct: Vec<u32>,
    /// Percent of all (expert x criterion) cells answering Yes for this item
    pub agreement_pct: u32,
    /// Per-expert retention: Yes count across the item's criteria reached
    /// the retention threshold
    pub retained_by: Vec<bool>,
    /// How many experts retained the item
    pub retained_count: usize,
}

/// Full face-validity report for one project
#[derive(Debug, Clone, Serialize)]
pub struct FaceValidityReport {
    pub expert_count: usize,
    pub item_count: usize,
    pub criterion_count: usize,
    pub items: Vec<ItemAgreement>,
    /// Total Yes cells over all possible cells, as a rounded percentage
    pub overall_agreement_pct: u32,
    pub kappa: KappaSummary,
}

/// Compute the face-validity report over an immutable snapshot of sheets
///
/// All sheets share the `(item_count, criterion_count)` dimensions; intake
/// rejects anything else before it reaches storage.
pub fn face_validity_report(
    sheets: &[RatingSheet],
    item_count: usize,
    criterion_count: usize,
    config: &StatsConfig,
) -> FaceValidityReport {
    let expert_count = sheets.len();
    let mut total_yes = 0usize;
    let mut items = Vec::with_capacity(item_count);

    for item in 0..item_count {
        let mut criterion_yes = vec![0usize; criterion_count];
        let mut item_yes = 0usize;
        let mut retained_by = Vec::with_capacity(expert_count);

        for sheet in sheets {
            let mut expert_yes = 0usize;
            for (criterion, yes) in criterion_yes.iter_mut().enumerate() {
                if sheet.get(item, criterion) == 1 {
                    *yes += 1;
                    expert_yes += 1;
                }
            }
            item_yes += expert_yes;
            retained_by.push(expert_yes >= config.retention_threshold);
        }

        total_yes += item_yes;
        let retained_count = retained_by.iter().filter(|&&r| r).count();

        items.push(ItemAgreement {
            item_index: item,
            criterion_agreement_pct: criterion_yes
                .iter()
                .map(|&yes| pct_round(yes, expert_count))
                .collect(),
            agreement_pct: pct_round(item_yes, expert_count * criterion_count),
            retained_by,
            retained_count,
        });
    }

    FaceValidityReport {
        expert_count,
        item_count,
        criterion_count,
        items,
        overall_agreement_pct: pct_round(total_yes, item_count * expert_count * criterion_count),
        kappa: mean_pairwise_kappa(sheets),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(rows: &[&[u8]]) -> RatingSheet {
        let items = rows.len();
        let criteria = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut s = RatingSheet::new(items, criteria);
        for (i, row) in rows.iter().enumerate() {
            for (c, &v) in row.iter().enumerate() {
                s.set(i, c, v);
            }
        }
        s
    }

    #[test]
    fn all_yes_versus_all_no_splits_fifty_fifty() {
        // 1 item, 10 criteria, expert A all-Yes, expert B all-No
        let a = sheet(&[&[1; 10]]);
        let b = sheet(&[&[0; 10]]);
        let report = face_validity_report(&[a, b], 1, 10, &StatsConfig::default());

        assert_eq!(report.overall_agreement_pct, 50);
        assert_eq!(report.items[0].agreement_pct, 50);
        // Every criterion: exactly one of two experts said Yes
        assert!(report.items[0]
            .criterion_agreement_pct
            .iter()
            .all(|&p| p == 50));
        // A retained (10 >= 8), B did not (0 < 8)
        assert_eq!(report.items[0].retained_by, vec![true, false]);
        assert_eq!(report.items[0].retained_count, 1);
        // Constant disagreement: kappa must not be positive
        assert!(report.kappa.mean.unwrap() <= 0.0);
    }

    #[test]
    fn retention_uses_threshold_of_eight() {
        // Expert with exactly 8 Yes retains, expert with 7 does not
        let eight = sheet(&[&[1, 1, 1, 1, 1, 1, 1, 1, 0, 0]]);
        let seven = sheet(&[&[1, 1, 1, 1, 1, 1, 1, 0, 0, 0]]);
        let report =
            face_validity_report(&[eight, seven], 1, 10, &StatsConfig::default());
        assert_eq!(report.items[0].retained_by, vec![true, false]);
    }

    #[test]
    fn retention_threshold_is_configurable() {
        let config = StatsConfig {
            retention_threshold: 3,
            ..StatsConfig::default()
        };
        let s = sheet(&[&[1, 1, 1, 0]]);
        let report = face_validity_report(&[s], 1, 4, &config);
        assert_eq!(report.items[0].retained_by, vec![true]);
    }

    #[test]
    fn overall_matches_per_item_sum() {
        // The aggregate computed two ways must agree to rounding
        let sheets = vec![
            sheet(&[&[1, 0, 1], &[0, 0, 1]]),
            sheet(&[&[1, 1, 1], &[1, 0, 0]]),
            sheet(&[&[0, 0, 0], &[1, 1, 1]]),
        ];
        let report = face_validity_report(&sheets, 2, 3, &StatsConfig::default());

        let per_item_yes: usize = (0..2)
            .map(|i| {
                sheets
                    .iter()
                    .map(|s| s.row(i).iter().filter(|&&v| v == 1).count())
                    .sum::<usize>()
            })
            .sum();
        assert_eq!(report.overall_agreement_pct, pct_round(per_item_yes, 2 * 3 * 3));
    }

    #[test]
    fn percentages_stay_in_range() {
        let sheets = vec![sheet(&[&[1, 1], &[0, 1]]), sheet(&[&[0, 0], &[1, 1]])];
        let report = face_validity_report(&sheets, 2, 2, &StatsConfig::default());
        assert!(report.overall_agreement_pct <= 100);
        for item in &report.items {
            assert!(item.agreement_pct <= 100);
            assert!(item.criterion_agreement_pct.iter().all(|&p| p <= 100));
        }
    }

    #[test]
    fn no_experts_yields_zeroes_not_nan() {
        let report = face_validity_report(&[], 2, 10, &StatsConfig::default());
        assert_eq!(report.expert_count, 0);
        assert_eq!(report.overall_agreement_pct, 0);
        assert_eq!(report.items.len(), 2);
        assert_eq!(report.items[0].agreement_pct, 0);
        assert_eq!(report.kappa.mean, None);
        assert_eq!(report.kappa.interpretation, "N/A");
    }

    #[test]
    fn two_agreeing_experts_reach_kappa_one() {
        let a = sheet(&[&[1, 0, 1, 1, 0]]);
        let b = a.clone();
        let report = face_validity_report(&[a, b], 1, 5, &StatsConfig::default());
        assert_eq!(report.kappa.mean, Some(1.0));
        assert_eq!(report.kappa.interpretation, "almost perfect");
    }
}
