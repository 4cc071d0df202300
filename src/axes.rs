use std::collections::BTreeMap;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Which check-in a sample came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MoodKind {
    Personal,
    Professional,
}

impl MoodKind {
    pub fn pairs(self) -> &'static AxisPairs {
        match self {
            MoodKind::Personal => &PERSONAL,
            MoodKind::Professional => &PROFESSIONAL,
        }
    }

    pub fn table(self) -> &'static str {
        match self {
            MoodKind::Personal => "mood_analytics.personal_moods",
            MoodKind::Professional => "mood_analytics.professional_moods",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MoodKind::Personal => "personal",
            MoodKind::Professional => "professional",
        }
    }
}

/// Ten `(positive, negative)` opposites. Every axis of a kind appears in
/// exactly one pair.
#[derive(Debug)]
pub struct AxisPairs {
    pairs: [(&'static str, &'static str); 10],
}

pub static PERSONAL: AxisPairs = AxisPairs {
    pairs: [
        ("motivated", "demotivated"),
        ("content", "low"),
        ("happy", "angry"),
        ("i_can_manage", "need_support"),
        ("i_am_in_control", "helpless"),
        ("energised", "tired"),
        ("balanced", "stressed"),
        ("calm", "anxious"),
        ("relaxed", "sad"),
        ("great", "not_good"),
    ],
};

pub static PROFESSIONAL: AxisPairs = AxisPairs {
    pairs: [
        ("very_satisfied", "dissatisfied"),
        ("positive", "unpleasant"),
        ("focused", "distracted"),
        ("productive", "unproductive"),
        ("valued", "undervalued"),
        ("supported", "isolated"),
        ("confident", "overwhelmed"),
        ("engaged", "bored"),
        ("inspired", "frustrated"),
        ("well_rested", "burnt_out"),
    ],
};

impl AxisPairs {
    pub fn pairs(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.pairs.iter().copied()
    }

    pub fn positive_axes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.pairs.iter().map(|(positive, _)| *positive)
    }

    pub fn negative_axes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.pairs.iter().map(|(_, negative)| *negative)
    }

    /// All axes in pair order, positive before negative.
    pub fn all_axes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.pairs
            .iter()
            .flat_map(|(positive, negative)| [*positive, *negative])
    }

    pub fn contains(&self, axis: &str) -> bool {
        self.all_axes().any(|name| name == axis)
    }

    /// A map holding every axis of this kind at zero.
    pub fn zeroed<T: Default>(&self) -> BTreeMap<String, T> {
        self.all_axes()
            .map(|axis| (axis.to_string(), T::default()))
            .collect()
    }
}

/// True when the positive axes of a single check-in outweigh the negative ones.
pub fn positivity(values: &BTreeMap<String, f64>, pairs: &AxisPairs) -> bool {
    let value = |axis: &str| values.get(axis).copied().unwrap_or(0.0);
    let positive: f64 = pairs.positive_axes().map(value).sum();
    let negative: f64 = pairs.negative_axes().map(value).sum();
    positive > negative
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn each_kind_has_twenty_distinct_axes() {
        for kind in [MoodKind::Personal, MoodKind::Professional] {
            let axes: Vec<&str> = kind.pairs().all_axes().collect();
            let unique: HashSet<&str> = axes.iter().copied().collect();
            assert_eq!(axes.len(), 20);
            assert_eq!(unique.len(), 20, "{} axes overlap", kind.label());
        }
    }

    #[test]
    fn pairs_keep_positive_first() {
        let pairs = MoodKind::Personal.pairs();
        assert!(pairs.pairs().any(|pair| pair == ("calm", "anxious")));
        assert!(pairs.positive_axes().all(|axis| !pairs.negative_axes().any(|n| n == axis)));
        assert!(!pairs.contains("very_satisfied"));
        assert!(MoodKind::Professional.pairs().contains("burnt_out"));
    }

    #[test]
    fn positivity_compares_polarity_sums() {
        let pairs = MoodKind::Personal.pairs();
        let mut values = BTreeMap::new();
        values.insert("calm".to_string(), 3.0);
        values.insert("happy".to_string(), 1.0);
        values.insert("anxious".to_string(), 4.0);
        assert!(!positivity(&values, pairs));

        values.insert("great".to_string(), 1.0);
        assert!(positivity(&values, pairs));
    }

    #[test]
    fn empty_check_in_is_not_positive() {
        assert!(!positivity(&BTreeMap::new(), MoodKind::Professional.pairs()));
    }
}
