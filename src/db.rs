use anyhow::{bail, Context};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{debug, info};
use uuid::Uuid;

use crate::axes::{AxisPairs, MoodKind};
use crate::breakdown::AxisValues;
use crate::buckets::{BucketKey, DateWindow, ReportGranularity};
use crate::models::{
    AverageMood, AxisCounts, BucketAggregate, CheckInSeed, MoodSample, UserRecord,
};
use crate::percentage::round_half_up;

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn upsert_user(pool: &PgPool, display_name: &str, email: &str) -> anyhow::Result<Uuid> {
    let id: Uuid = sqlx::query(
        r#"
        INSERT INTO mood_analytics.users (id, display_name, email)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO UPDATE
        SET display_name = EXCLUDED.display_name
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(display_name)
    .bind(email)
    .fetch_one(pool)
    .await?
    .get("id");
    Ok(id)
}

pub async fn find_user(pool: &PgPool, email: &str) -> anyhow::Result<Option<UserRecord>> {
    let row = sqlx::query("SELECT id, display_name, email FROM mood_analytics.users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|row| UserRecord {
        id: row.get("id"),
        display_name: row.get("display_name"),
        email: row.get("email"),
    }))
}

/// A check-in ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCheckIn {
    pub email: String,
    pub display_name: String,
    pub source_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub values: AxisValues,
}

/// Inserts one check-in. Returns false when the source key was already
/// imported.
pub async fn insert_check_in(
    pool: &PgPool,
    sample: &MoodSample,
    source_key: &str,
) -> anyhow::Result<bool> {
    let axes: Vec<&str> = sample.kind.pairs().all_axes().collect();
    let placeholders: Vec<String> = (0..axes.len()).map(|i| format!("${}", i + 7)).collect();
    let sql = format!(
        "INSERT INTO {} (id, user_id, source_key, created_at, deleted_at, positivity, {}) \
         VALUES ($1, $2, $3, $4, $5, $6, {}) \
         ON CONFLICT (source_key) DO NOTHING",
        sample.kind.table(),
        axes.join(", "),
        placeholders.join(", ")
    );

    let mut query = sqlx::query(&sql)
        .bind(sample.id)
        .bind(sample.user_id)
        .bind(source_key)
        .bind(sample.created_at)
        .bind(sample.deleted_at)
        .bind(sample.positivity);
    for axis in &axes {
        query = query.bind(sample.values.get(*axis).copied().unwrap_or(0.0));
    }

    let result = query.execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<usize> {
    let users = [
        ("Avery Lee", "avery.lee@example.com"),
        ("Jules Moreno", "jules.moreno@example.com"),
        ("Kiara Patel", "kiara.patel@example.com"),
    ];
    for (name, email) in users {
        upsert_user(pool, name, email).await?;
    }

    let mut inserted = 0usize;
    for check_in in seed_check_ins()? {
        let user = find_user(pool, check_in.email)
            .await?
            .with_context(|| format!("seed user {} missing", check_in.email))?;
        let values: AxisValues = check_in
            .values
            .iter()
            .map(|(axis, value)| (axis.to_string(), *value))
            .collect();
        let created_at = start_of_day(check_in.created_on) + chrono::Duration::hours(9);
        let sample = MoodSample::new(check_in.kind, user.id, created_at, values);

        if insert_check_in(pool, &sample, check_in.source_key).await? {
            inserted += 1;
        }
    }

    Ok(inserted)
}

fn seed_check_ins() -> anyhow::Result<Vec<CheckInSeed>> {
    let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).context("invalid date");
    Ok(vec![
        CheckInSeed {
            source_key: "seed-001",
            email: "avery.lee@example.com",
            kind: MoodKind::Personal,
            created_on: date(2026, 9, 28)?,
            values: &[("calm", 3.0), ("happy", 2.0), ("tired", 1.0)],
        },
        CheckInSeed {
            source_key: "seed-002",
            email: "avery.lee@example.com",
            kind: MoodKind::Personal,
            created_on: date(2026, 10, 6)?,
            values: &[("anxious", 4.0), ("stressed", 3.0), ("calm", 1.0)],
        },
        CheckInSeed {
            source_key: "seed-003",
            email: "avery.lee@example.com",
            kind: MoodKind::Personal,
            created_on: date(2026, 10, 14)?,
            values: &[("relaxed", 2.0), ("great", 3.0), ("motivated", 2.0)],
        },
        CheckInSeed {
            source_key: "seed-004",
            email: "jules.moreno@example.com",
            kind: MoodKind::Professional,
            created_on: date(2026, 10, 2)?,
            values: &[("focused", 3.0), ("overwhelmed", 2.0), ("valued", 1.0)],
        },
        CheckInSeed {
            source_key: "seed-005",
            email: "jules.moreno@example.com",
            kind: MoodKind::Professional,
            created_on: date(2026, 10, 9)?,
            values: &[("burnt_out", 4.0), ("frustrated", 3.0), ("supported", 1.0)],
        },
        CheckInSeed {
            source_key: "seed-006",
            email: "kiara.patel@example.com",
            kind: MoodKind::Personal,
            created_on: date(2026, 8, 20)?,
            values: &[("sad", 2.0), ("need_support", 2.0), ("content", 2.0)],
        },
    ])
}

pub async fn import_csv(
    pool: &PgPool,
    kind: MoodKind,
    csv_path: &std::path::Path,
) -> anyhow::Result<usize> {
    let reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let check_ins = read_check_ins(reader, kind.pairs())?;
    info!(rows = check_ins.len(), kind = kind.label(), "parsed check-in csv");

    let mut inserted = 0usize;
    for check_in in check_ins {
        let user_id = upsert_user(pool, &check_in.display_name, &check_in.email).await?;
        let source_key = check_in
            .source_key
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

        let sample = MoodSample::new(kind, user_id, check_in.created_at, check_in.values);

        if insert_check_in(pool, &sample, &source_key).await? {
            inserted += 1;
        } else {
            debug!(source_key = %source_key, "skipping already imported check-in");
        }
    }

    Ok(inserted)
}

/// Parses check-in rows: `email`, `display_name`, `created_at`, an optional
/// `source_key`, then one column per axis of the kind.
pub fn read_check_ins<R: std::io::Read>(
    mut reader: csv::Reader<R>,
    pairs: &AxisPairs,
) -> anyhow::Result<Vec<NewCheckIn>> {
    const FIXED: [&str; 4] = ["email", "display_name", "created_at", "source_key"];

    let headers = reader.headers()?.clone();
    for header in headers.iter() {
        if !FIXED.contains(&header) && !pairs.contains(header) {
            bail!("unknown mood axis column {header:?}");
        }
    }
    let column = |name: &str| headers.iter().position(|h| h == name);
    let email_col = column("email").context("csv is missing the email column")?;
    let name_col = column("display_name").context("csv is missing the display_name column")?;
    let created_col = column("created_at").context("csv is missing the created_at column")?;
    let source_col = column("source_key");

    let mut check_ins = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let field = |col: usize| record.get(col).unwrap_or("").trim();

        let mut values = AxisValues::new();
        for axis in pairs.all_axes() {
            let Some(col) = column(axis) else { continue };
            let raw = field(col);
            let value: f64 = if raw.is_empty() {
                0.0
            } else {
                raw.parse::<f64>()
                    .with_context(|| format!("row {}: invalid {axis} value {raw:?}", line + 1))?
            };
            if !value.is_finite() || value < 0.0 {
                bail!("row {}: {axis} must be a non-negative number", line + 1);
            }
            values.insert(axis.to_string(), value);
        }

        check_ins.push(NewCheckIn {
            email: field(email_col).to_string(),
            display_name: field(name_col).to_string(),
            source_key: source_col
                .map(field)
                .filter(|key| !key.is_empty())
                .map(str::to_string),
            created_at: parse_timestamp(field(created_col))
                .with_context(|| format!("row {}: invalid created_at", line + 1))?,
            values,
        });
    }

    Ok(check_ins)
}

fn parse_timestamp(raw: &str) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")?;
    Ok(start_of_day(date))
}

pub async fn soft_delete(pool: &PgPool, kind: MoodKind, sample_id: Uuid) -> anyhow::Result<bool> {
    let sql = format!(
        "UPDATE {} SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL",
        kind.table()
    );
    let result = sqlx::query(&sql).bind(sample_id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn aggregate_columns(pairs: &AxisPairs) -> String {
    pairs
        .all_axes()
        .map(|axis| {
            format!(
                "COALESCE(AVG({axis}), 0)::float8 AS avg_{axis}, \
                 COUNT(*) FILTER (WHERE {axis} > 0) AS cnt_{axis}"
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn trunc_unit(granularity: ReportGranularity) -> &'static str {
    match granularity {
        ReportGranularity::Daily => "day",
        ReportGranularity::Weekly => "week",
        ReportGranularity::Monthly => "month",
        ReportGranularity::Yearly => "year",
    }
}

/// Averages are rounded to two places here, before any percentage is derived.
fn decode_axes(row: &PgRow, pairs: &AxisPairs) -> anyhow::Result<(AxisValues, AxisCounts)> {
    let mut averages = AxisValues::new();
    let mut counts = AxisCounts::new();
    for axis in pairs.all_axes() {
        let avg: f64 = row.try_get(format!("avg_{axis}").as_str())?;
        let count: i64 = row.try_get(format!("cnt_{axis}").as_str())?;
        averages.insert(axis.to_string(), round_half_up(avg, 2));
        counts.insert(axis.to_string(), count);
    }
    Ok((averages, counts))
}

pub async fn fetch_average_mood(
    pool: &PgPool,
    kind: MoodKind,
    user_id: Uuid,
    window: DateWindow,
) -> anyhow::Result<AverageMood> {
    let pairs = kind.pairs();
    let sql = format!(
        "SELECT COUNT(*) AS sample_count, {} FROM {} \
         WHERE user_id = $1 AND deleted_at IS NULL \
         AND created_at >= $2 AND created_at < $3",
        aggregate_columns(pairs),
        kind.table()
    );

    let row = sqlx::query(&sql)
        .bind(user_id)
        .bind(start_of_day(window.start))
        .bind(start_of_day(window.end))
        .fetch_one(pool)
        .await?;

    let (averages, counts) = decode_axes(&row, pairs)?;
    Ok(AverageMood {
        sample_count: row.try_get("sample_count")?,
        averages,
        counts,
    })
}

/// Aggregates per bucket of each sample's own `created_at` (in UTC).
pub async fn fetch_bucket_aggregates(
    pool: &PgPool,
    kind: MoodKind,
    user_id: Uuid,
    granularity: ReportGranularity,
    window: DateWindow,
) -> anyhow::Result<Vec<BucketAggregate>> {
    let pairs = kind.pairs();
    let sql = format!(
        "SELECT date_trunc('{unit}', created_at AT TIME ZONE 'UTC')::date AS bucket_date, \
         COUNT(*) AS sample_count, {columns} FROM {table} \
         WHERE user_id = $1 AND deleted_at IS NULL \
         AND created_at >= $2 AND created_at < $3 \
         GROUP BY bucket_date ORDER BY bucket_date",
        unit = trunc_unit(granularity),
        columns = aggregate_columns(pairs),
        table = kind.table()
    );

    let rows = sqlx::query(&sql)
        .bind(user_id)
        .bind(start_of_day(window.start))
        .bind(start_of_day(window.end))
        .fetch_all(pool)
        .await?;
    debug!(rows = rows.len(), unit = trunc_unit(granularity), "fetched bucket aggregates");

    let mut aggregates = Vec::with_capacity(rows.len());
    for row in rows {
        let bucket_date: NaiveDate = row.try_get("bucket_date")?;
        let (averages, counts) = decode_axes(&row, pairs)?;
        aggregates.push(BucketAggregate {
            bucket: BucketKey::containing(granularity, bucket_date),
            sample_count: row.try_get("sample_count")?,
            averages,
            counts,
        });
    }

    Ok(aggregates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reader(data: &str) -> csv::Reader<&[u8]> {
        csv::Reader::from_reader(data.as_bytes())
    }

    #[test]
    fn reads_check_ins_with_optional_source_key() {
        let data = "email,display_name,created_at,source_key,calm,anxious\n\
                    avery@example.com,Avery Lee,2026-10-01,row-1,3,1\n\
                    avery@example.com,Avery Lee,2026-10-02T08:30:00Z,,,2\n";
        let rows = read_check_ins(reader(data), MoodKind::Personal.pairs()).expect("rows");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].source_key.as_deref(), Some("row-1"));
        assert_eq!(rows[0].values["calm"], 3.0);
        assert_eq!(
            rows[0].created_at,
            Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(rows[1].source_key, None);
        assert_eq!(rows[1].values["calm"], 0.0);
        assert_eq!(rows[1].values["anxious"], 2.0);
        assert_eq!(
            rows[1].created_at,
            Utc.with_ymd_and_hms(2026, 10, 2, 8, 30, 0).unwrap()
        );
    }

    #[test]
    fn rejects_axes_of_the_other_kind() {
        let data = "email,display_name,created_at,calm\nx@example.com,X,2026-10-01,1\n";
        let err = read_check_ins(reader(data), MoodKind::Professional.pairs()).unwrap_err();
        assert!(err.to_string().contains("calm"));
    }

    #[test]
    fn rejects_negative_values() {
        let data = "email,display_name,created_at,calm\nx@example.com,X,2026-10-01,-1\n";
        assert!(read_check_ins(reader(data), MoodKind::Personal.pairs()).is_err());
    }

    #[test]
    fn aggregate_columns_cover_every_axis() {
        let columns = aggregate_columns(MoodKind::Personal.pairs());
        assert_eq!(columns.matches("AVG(").count(), 20);
        assert!(columns.contains("COUNT(*) FILTER (WHERE not_good > 0) AS cnt_not_good"));
    }

    #[test]
    fn seed_check_ins_use_known_axes() {
        for check_in in seed_check_ins().expect("seed") {
            let pairs = check_in.kind.pairs();
            assert!(check_in.values.iter().all(|(axis, _)| pairs.contains(axis)));
        }
    }
}
