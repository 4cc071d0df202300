use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::axes::{positivity, MoodKind};
use crate::breakdown::{AxisValues, PairedBreakdown};
use crate::buckets::{BucketKey, DateWindow, ReportGranularity};
use crate::chart::DenseSeriesPoint;
use crate::verdict::Classification;

pub type AxisCounts = BTreeMap<String, i64>;

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub display_name: String,
    pub email: String,
}

/// One check-in as stored.
#[derive(Debug, Clone)]
pub struct MoodSample {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: MoodKind,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub values: AxisValues,
    pub positivity: bool,
}

impl MoodSample {
    /// A fresh check-in; positivity is derived from the values once, here.
    pub fn new(
        kind: MoodKind,
        user_id: Uuid,
        created_at: DateTime<Utc>,
        values: AxisValues,
    ) -> Self {
        let positivity = positivity(&values, kind.pairs());
        Self {
            id: Uuid::new_v4(),
            user_id,
            kind,
            created_at,
            deleted_at: None,
            values,
            positivity,
        }
    }
}

/// Per-axis averages and non-zero counts of one user over one window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AverageMood {
    pub sample_count: i64,
    pub averages: AxisValues,
    pub counts: AxisCounts,
}

/// One populated bucket as returned by the grouped aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketAggregate {
    pub bucket: BucketKey,
    pub sample_count: i64,
    pub averages: AxisValues,
    pub counts: AxisCounts,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportSubject {
    pub display_name: String,
    pub email: String,
}

/// Payload handed to the JSON and markdown renderers.
#[derive(Debug, Clone, Serialize)]
pub struct MoodReport {
    pub subject: ReportSubject,
    pub kind: MoodKind,
    pub granularity: ReportGranularity,
    pub window: DateWindow,
    pub average_mood: AverageMood,
    pub breakdown: PairedBreakdown,
    pub verdict: Classification,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub series: Vec<DenseSeriesPoint>,
}

/// Everything the download renderer needs beyond the percentages.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadDocument {
    pub display_name: String,
    pub from: String,
    pub to: String,
    pub positive_percentage: f64,
    pub negative_percentage: f64,
    pub verdict: Classification,
    pub headline: String,
    pub icon_url: String,
    pub axis_icons: Vec<AxisIcon>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AxisIcon {
    pub axis: String,
    pub percentage: f64,
    pub icon_url: String,
}

#[derive(Debug, Clone)]
pub struct CheckInSeed {
    pub source_key: &'static str,
    pub email: &'static str,
    pub kind: MoodKind,
    pub created_on: NaiveDate,
    pub values: &'static [(&'static str, f64)],
}
