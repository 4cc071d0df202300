use std::collections::BTreeMap;

use serde::Serialize;

use crate::axes::AxisPairs;
use crate::percentage::percentage;

pub type AxisValues = BTreeMap<String, f64>;

/// Percentages derived from one set of per-axis averages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairedBreakdown {
    /// Each axis as a share of its own pair (`calm` vs `anxious`).
    pub per_pair: AxisValues,
    /// Each axis as a share of its polarity index (`calm` among all positives).
    pub polarity_share: AxisValues,
    pub positivity_index: f64,
    pub negativity_index: f64,
    pub overall_positive: f64,
    pub overall_negative: f64,
}

fn value(averages: &AxisValues, axis: &str) -> f64 {
    averages.get(axis).copied().unwrap_or(0.0)
}

/// Normalizes every pair to its own 100%. A pair with two zero averages
/// stays at 0/0.
pub fn pair_relative(averages: &AxisValues, pairs: &AxisPairs) -> AxisValues {
    let mut shares = AxisValues::new();
    for (positive, negative) in pairs.pairs() {
        let p = value(averages, positive);
        let n = value(averages, negative);
        shares.insert(positive.to_string(), percentage(p, p + n));
        shares.insert(negative.to_string(), percentage(n, p + n));
    }
    shares
}

/// Sum of the averages of the positive and negative axes respectively.
pub fn polarity_indices(averages: &AxisValues, pairs: &AxisPairs) -> (f64, f64) {
    let positive: f64 = pairs.positive_axes().map(|axis| value(averages, axis)).sum();
    let negative: f64 = pairs.negative_axes().map(|axis| value(averages, axis)).sum();
    (positive, negative)
}

/// Each axis as a share of the index of its own polarity.
pub fn polarity_relative(averages: &AxisValues, pairs: &AxisPairs) -> AxisValues {
    let (positive_index, negative_index) = polarity_indices(averages, pairs);
    let mut shares = AxisValues::new();
    for axis in pairs.positive_axes() {
        shares.insert(
            axis.to_string(),
            percentage(value(averages, axis), positive_index),
        );
    }
    for axis in pairs.negative_axes() {
        shares.insert(
            axis.to_string(),
            percentage(value(averages, axis), negative_index),
        );
    }
    shares
}

pub fn aggregate(averages: &AxisValues, pairs: &AxisPairs) -> PairedBreakdown {
    let (positivity_index, negativity_index) = polarity_indices(averages, pairs);
    let total = positivity_index + negativity_index;

    PairedBreakdown {
        per_pair: pair_relative(averages, pairs),
        polarity_share: polarity_relative(averages, pairs),
        positivity_index,
        negativity_index,
        // Rounded independently; the two need not add up to exactly 100.
        overall_positive: percentage(positivity_index, total),
        overall_negative: percentage(negativity_index, total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axes::MoodKind;

    fn averages(values: &[(&str, f64)]) -> AxisValues {
        values
            .iter()
            .map(|(axis, value)| (axis.to_string(), *value))
            .collect()
    }

    #[test]
    fn pair_shares_split_three_to_one() {
        let pairs = MoodKind::Personal.pairs();
        let shares = pair_relative(&averages(&[("calm", 3.0), ("anxious", 1.0)]), pairs);
        assert_eq!(shares["calm"], 75.0);
        assert_eq!(shares["anxious"], 25.0);
    }

    #[test]
    fn empty_pair_is_zero_not_half() {
        let pairs = MoodKind::Personal.pairs();
        let shares = pair_relative(&averages(&[("calm", 3.0), ("anxious", 1.0)]), pairs);
        assert_eq!(shares["happy"], 0.0);
        assert_eq!(shares["angry"], 0.0);
        assert_eq!(shares.len(), 20);
    }

    #[test]
    fn overall_split_uses_polarity_indices() {
        let pairs = MoodKind::Personal.pairs();
        let breakdown = aggregate(
            &averages(&[("calm", 2.0), ("happy", 1.0), ("tired", 1.0)]),
            pairs,
        );
        assert_eq!(breakdown.positivity_index, 3.0);
        assert_eq!(breakdown.negativity_index, 1.0);
        assert_eq!(breakdown.overall_positive, 75.0);
        assert_eq!(breakdown.overall_negative, 25.0);
    }

    #[test]
    fn overall_split_rounds_each_side_independently() {
        let pairs = MoodKind::Professional.pairs();
        let breakdown = aggregate(
            &averages(&[
                ("focused", 1.0),
                ("engaged", 4.0),
                ("bored", 1.0),
                ("isolated", 2.0),
            ]),
            pairs,
        );
        // 62.5 and 37.5 both round up.
        assert_eq!(breakdown.overall_positive, 63.0);
        assert_eq!(breakdown.overall_negative, 38.0);
    }

    #[test]
    fn polarity_share_uses_one_sided_denominator() {
        let pairs = MoodKind::Personal.pairs();
        let shares = polarity_relative(
            &averages(&[("calm", 1.0), ("happy", 3.0), ("anxious", 5.0)]),
            pairs,
        );
        assert_eq!(shares["calm"], 25.0);
        assert_eq!(shares["happy"], 75.0);
        assert_eq!(shares["anxious"], 100.0);
        assert_eq!(shares["sad"], 0.0);
    }

    #[test]
    fn all_zero_input_never_produces_nan() {
        let breakdown = aggregate(&AxisValues::new(), MoodKind::Personal.pairs());
        assert_eq!(breakdown.overall_positive, 0.0);
        assert_eq!(breakdown.overall_negative, 0.0);
        assert!(breakdown
            .per_pair
            .values()
            .chain(breakdown.polarity_share.values())
            .all(|value| *value == 0.0));
    }
}
