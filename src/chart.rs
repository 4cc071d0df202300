use std::collections::HashMap;

use serde::Serialize;

use crate::axes::AxisPairs;
use crate::breakdown::{aggregate, AxisValues, PairedBreakdown};
use crate::buckets::BucketKey;
use crate::models::{AxisCounts, BucketAggregate};

/// One bucket of a gap-free trend series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DenseSeriesPoint {
    pub bucket: BucketKey,
    pub sample_count: i64,
    pub averages: AxisValues,
    pub counts: AxisCounts,
    pub breakdown: PairedBreakdown,
}

impl From<&DenseSeriesPoint> for BucketAggregate {
    fn from(point: &DenseSeriesPoint) -> Self {
        BucketAggregate {
            bucket: point.bucket,
            sample_count: point.sample_count,
            averages: point.averages.clone(),
            counts: point.counts.clone(),
        }
    }
}

/// Lays sparse aggregation rows over the expected buckets. The result has
/// one point per expected bucket, in the expected order; buckets without a
/// row are zero-filled. Percentages are computed per bucket.
pub fn densify(
    sparse: &[BucketAggregate],
    expected: &[BucketKey],
    pairs: &AxisPairs,
) -> Vec<DenseSeriesPoint> {
    let mut by_bucket: HashMap<BucketKey, &BucketAggregate> = HashMap::new();
    for row in sparse {
        by_bucket.entry(row.bucket).or_insert(row);
    }

    expected
        .iter()
        .map(|bucket| {
            let mut averages: AxisValues = pairs.zeroed();
            let mut counts: AxisCounts = pairs.zeroed();
            let mut sample_count = 0;

            if let Some(row) = by_bucket.get(bucket) {
                sample_count = row.sample_count;
                for (axis, value) in averages.iter_mut() {
                    *value = row.averages.get(axis).copied().unwrap_or(0.0);
                }
                for (axis, count) in counts.iter_mut() {
                    *count = row.counts.get(axis).copied().unwrap_or(0);
                }
            }

            let breakdown = aggregate(&averages, pairs);
            DenseSeriesPoint {
                bucket: *bucket,
                sample_count,
                averages,
                counts,
                breakdown,
            }
        })
        .collect()
}
