//! Pairwise Cohen's Kappa for binary face-validity ratings
//!
//! Kappa corrects observed agreement for the agreement expected by chance
//! from each rater's own Yes/No marginals. The project-level figure is the
//! arithmetic mean over all C(n,2) unordered expert pairs.

use super::round2;
use ksc_common::RatingSheet;
use serde::Serialize;

/// Mean pairwise kappa plus its interpretation band
#[derive(Debug, Clone, Serialize)]
pub struct KappaSummary {
    /// Mean kappa over all expert pairs; `None` (serialized null) with
    /// fewer than 2 experts
    pub mean: Option<f64>,
    /// Landis & Koch interpretation band, or "N/A" when mean is undefined
    pub interpretation: String,
    /// Number of expert pairs averaged
    pub pair_count: usize,
}

/// Cohen's Kappa between two experts over every (item, criterion) cell
///
/// `Po` is the fraction of cells with identical answers. `Pe` uses the
/// product-of-marginals formula: `P(yes_a)*P(yes_b) + P(no_a)*P(no_b)`.
/// When `Pe == 1` (both raters constant and identical) kappa is defined
/// as 1 rather than 0/0.
pub fn pairwise_kappa(a: &RatingSheet, b: &RatingSheet) -> f64 {
    let cells = a.items() * a.criteria();
    if cells == 0 {
        // No rated cells: nothing to agree or disagree on
        return 0.0;
    }

    let mut matches = 0usize;
    let mut yes_a = 0usize;
    let mut yes_b = 0usize;

    for item in 0..a.items() {
        for criterion in 0..a.criteria() {
            let va = a.get(item, criterion);
            let vb = b.get(item, criterion);
            if va == vb {
                matches += 1;
            }
            if va == 1 {
                yes_a += 1;
            }
            if vb == 1 {
                yes_b += 1;
            }
        }
    }

    let n = cells as f64;
    let po = matches as f64 / n;
    let p_yes_a = yes_a as f64 / n;
    let p_yes_b = yes_b as f64 / n;
    let pe = p_yes_a * p_yes_b + (1.0 - p_yes_a) * (1.0 - p_yes_b);

    if (pe - 1.0).abs() < f64::EPSILON {
        1.0
    } else {
        (po - pe) / (1.0 - pe)
    }
}

/// Mean kappa across all unordered expert pairs
///
/// With fewer than 2 experts the statistic is not applicable and the mean
/// is `None`; it is never reported as 0 or an error.
pub fn mean_pairwise_kappa(sheets: &[RatingSheet]) -> KappaSummary {
    if sheets.len() < 2 {
        return KappaSummary {
            mean: None,
            interpretation: "N/A".to_string(),
            pair_count: 0,
        };
    }

    let mut sum = 0.0;
    let mut pairs = 0usize;
    for i in 0..sheets.len() {
        for j in (i + 1)..sheets.len() {
            sum += pairwise_kappa(&sheets[i], &sheets[j]);
            pairs += 1;
        }
    }

    let mean = round2(sum / pairs as f64);
    KappaSummary {
        mean: Some(mean),
        interpretation: interpret_kappa(mean).to_string(),
        pair_count: pairs,
    }
}

/// Landis & Koch interpretation bands
pub fn interpret_kappa(kappa: f64) -> &'static str {
    if kappa < 0.0 {
        "poor"
    } else if kappa < 0.20 {
        "slight"
    } else if kappa < 0.40 {
        "fair"
    } else if kappa < 0.60 {
        "moderate"
    } else if kappa < 0.80 {
        "substantial"
    } else {
        "almost perfect"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a sheet from rows without intake validation
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
    fn perfect_agreement_with_mixed_marginals_is_one() {
        let a = sheet(&[&[1, 0, 1, 0, 1]]);
        let b = a.clone();
        assert_eq!(pairwise_kappa(&a, &b), 1.0);
    }

    #[test]
    fn identical_constant_raters_report_one_not_nan() {
        // Both all-Yes: Po = 1, Pe = 1, defined as kappa = 1
        let a = sheet(&[&[1, 1, 1, 1]]);
        let b = a.clone();
        let k = pairwise_kappa(&a, &b);
        assert!(!k.is_nan());
        assert_eq!(k, 1.0);
    }

    #[test]
    fn constant_disagreement_is_nonpositive() {
        // A all-Yes, B all-No: Po = 0, Pe = 0, kappa = 0
        let a = sheet(&[&[1, 1, 1, 1, 1, 1, 1, 1, 1, 1]]);
        let b = sheet(&[&[0, 0, 0, 0, 0, 0, 0, 0, 0, 0]]);
        let k = pairwise_kappa(&a, &b);
        assert!(k <= 0.0);
    }

    #[test]
    fn balanced_disagreement_is_minus_one() {
        // Each rater half Yes, always opposite: Po = 0, Pe = 0.5, kappa = -1
        let a = sheet(&[&[1, 1, 1, 1, 1, 0, 0, 0, 0, 0]]);
        let b = sheet(&[&[0, 0, 0, 0, 0, 1, 1, 1, 1, 1]]);
        let k = pairwise_kappa(&a, &b);
        assert!((k - (-1.0)).abs() < 1e-9);
    }

    #[test]
    fn fewer_than_two_experts_is_not_applicable() {
        let one = vec![sheet(&[&[1, 0]])];
        let summary = mean_pairwise_kappa(&one);
        assert_eq!(summary.mean, None);
        assert_eq!(summary.interpretation, "N/A");
        assert_eq!(summary.pair_count, 0);

        let none: Vec<RatingSheet> = vec![];
        assert_eq!(mean_pairwise_kappa(&none).mean, None);
    }

    #[test]
    fn three_experts_average_three_pairs() {
        let a = sheet(&[&[1, 0, 1, 0]]);
        let b = a.clone();
        let c = sheet(&[&[0, 1, 0, 1]]);
        let summary = mean_pairwise_kappa(&[a.clone(), b.clone(), c.clone()]);
        assert_eq!(summary.pair_count, 3);
        // Pairs: (a,b) = 1, (a,c) = -1, (b,c) = -1
        let expected =
            (pairwise_kappa(&a, &b) + pairwise_kappa(&a, &c) + pairwise_kappa(&b, &c)) / 3.0;
        assert!((summary.mean.unwrap() - round2(expected)).abs() < 1e-9);
    }

    #[test]
    fn interpretation_bands() {
        assert_eq!(interpret_kappa(-0.5), "poor");
        assert_eq!(interpret_kappa(0.0), "slight");
        assert_eq!(interpret_kappa(0.19), "slight");
        assert_eq!(interpret_kappa(0.20), "fair");
        assert_eq!(interpret_kappa(0.45), "moderate");
        assert_eq!(interpret_kappa(0.70), "substantial");
        assert_eq!(interpret_kappa(0.85), "almost perfect");
        assert_eq!(interpret_kappa(1.0), "almost perfect");
    }
}
