use std::fmt;

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use clap::ValueEnum;
use serde::{Deserialize, Serialize, Serializer};

/// Forward-fill widths. Charts downstream expect exactly this many buckets.
pub const WEEKLY_BUCKETS: u32 = 6;
pub const MONTHLY_BUCKETS: u32 = 6;
pub const YEARLY_BUCKETS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportGranularity {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// Identifies one chart bucket. Weeks are keyed by their ISO Monday and
/// months by their first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BucketKey {
    Day(NaiveDate),
    Week(NaiveDate),
    Month(NaiveDate),
    Year(i32),
}

impl BucketKey {
    pub fn containing(granularity: ReportGranularity, date: NaiveDate) -> Self {
        match granularity {
            ReportGranularity::Daily => BucketKey::Day(date),
            ReportGranularity::Weekly => BucketKey::Week(iso_week_start(date)),
            ReportGranularity::Monthly => BucketKey::Month(month_start(date)),
            ReportGranularity::Yearly => BucketKey::Year(date.year()),
        }
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketKey::Day(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            BucketKey::Week(date) => write!(f, "{}", date.format("%G-W%V")),
            BucketKey::Month(date) => write!(f, "{}", date.format("%Y-%m")),
            BucketKey::Year(year) => write!(f, "{year}"),
        }
    }
}

impl Serialize for BucketKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A `[start, end)` range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Builds a window from inclusive bounds as typed by a user.
    pub fn from_inclusive(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            start: from,
            end: next_day(to),
        }
    }

    /// The last day covered by the window.
    pub fn last_day(&self) -> NaiveDate {
        self.end.pred_opt().unwrap_or(self.start).max(self.start)
    }
}

/// How far back each trend granularity reaches from the anchor date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lookback {
    pub weeks: u32,
    pub months: u32,
    pub years: u32,
}

impl Default for Lookback {
    fn default() -> Self {
        Self {
            weeks: 5,
            months: 5,
            years: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketPlan {
    pub window: DateWindow,
    pub buckets: Vec<BucketKey>,
}

/// Fixed windows offered by the download flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
pub enum DownloadRange {
    #[value(name = "last30")]
    #[serde(rename = "last30")]
    Last30Days,
    #[value(name = "last60")]
    #[serde(rename = "last60")]
    Last60Days,
}

impl DownloadRange {
    pub fn days(self) -> u64 {
        match self {
            DownloadRange::Last30Days => 30,
            DownloadRange::Last60Days => 60,
        }
    }

    pub fn window(self, anchor: NaiveDate) -> DateWindow {
        DateWindow {
            start: anchor
                .checked_sub_days(Days::new(self.days()))
                .unwrap_or(NaiveDate::MIN),
            end: next_day(anchor),
        }
    }
}

pub fn resolve_buckets(
    granularity: ReportGranularity,
    anchor: NaiveDate,
    lookback: &Lookback,
) -> BucketPlan {
    // The window never reaches past the last bucket, so aggregates over it
    // cover exactly the dates the series shows.
    let (start, buckets, series_end) = match granularity {
        ReportGranularity::Daily => (anchor, vec![BucketKey::Day(anchor)], next_day(anchor)),
        ReportGranularity::Weekly => {
            let back = anchor
                .checked_sub_days(Days::new(7 * u64::from(lookback.weeks)))
                .unwrap_or(NaiveDate::MIN);
            let start = iso_week_start(back);
            let series_end = start
                .checked_add_days(Days::new(7 * u64::from(WEEKLY_BUCKETS)))
                .unwrap_or(NaiveDate::MAX);
            let buckets = (0..WEEKLY_BUCKETS)
                .filter_map(|i| start.checked_add_days(Days::new(7 * u64::from(i))))
                .map(BucketKey::Week)
                .collect();
            (start, buckets, series_end)
        }
        ReportGranularity::Monthly => {
            let back = anchor
                .checked_sub_months(Months::new(lookback.months))
                .unwrap_or(NaiveDate::MIN);
            let start = month_start(back);
            let series_end = start
                .checked_add_months(Months::new(MONTHLY_BUCKETS))
                .unwrap_or(NaiveDate::MAX);
            let buckets = (0..MONTHLY_BUCKETS)
                .filter_map(|i| start.checked_add_months(Months::new(i)))
                .map(BucketKey::Month)
                .collect();
            (start, buckets, series_end)
        }
        ReportGranularity::Yearly => {
            let years_back = i32::try_from(lookback.years).unwrap_or(i32::MAX);
            let start_year = anchor.year().saturating_sub(years_back);
            let start = NaiveDate::from_ymd_opt(start_year, 1, 1).unwrap_or(NaiveDate::MIN);
            let series_end = NaiveDate::from_ymd_opt(
                start_year.saturating_add(YEARLY_BUCKETS as i32),
                1,
                1,
            )
            .unwrap_or(NaiveDate::MAX);
            let buckets = (0..YEARLY_BUCKETS as i32)
                .map(|i| BucketKey::Year(start_year.saturating_add(i)))
                .collect();
            (start, buckets, series_end)
        }
    };

    BucketPlan {
        window: DateWindow {
            start,
            end: next_day(anchor).min(series_end),
        },
        buckets,
    }
}

/// Window of a single-period summary. Explicit inclusive bounds win over
/// the granularity's resolved window.
pub fn summary_window(
    granularity: ReportGranularity,
    anchor: NaiveDate,
    bounds: Option<(NaiveDate, NaiveDate)>,
    lookback: &Lookback,
) -> DateWindow {
    match bounds {
        Some((from, to)) => DateWindow::from_inclusive(from, to),
        None => resolve_buckets(granularity, anchor, lookback).window,
    }
}

/// Monday of the ISO week containing `date`, which may fall in the
/// previous calendar year.
pub fn iso_week_start(date: NaiveDate) -> NaiveDate {
    let week = date.iso_week();
    NaiveDate::from_isoywd_opt(week.year(), week.week(), Weekday::Mon).unwrap_or(date)
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn next_day(date: NaiveDate) -> NaiveDate {
    date.succ_opt().unwrap_or(date)
}
