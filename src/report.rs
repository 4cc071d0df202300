use std::fmt::Write;

use crate::axes::MoodKind;
use crate::breakdown::{aggregate, PairedBreakdown};
use crate::buckets::{BucketPlan, DateWindow, ReportGranularity};
use crate::chart::densify;
use crate::config::Config;
use crate::models::{
    AverageMood, AxisIcon, BucketAggregate, DownloadDocument, MoodReport, ReportSubject,
};
use crate::verdict::{classify, narration};

const DISPLAY_DATE: &str = "%d %b %Y";

pub fn build_summary(
    subject: ReportSubject,
    kind: MoodKind,
    granularity: ReportGranularity,
    window: DateWindow,
    average_mood: AverageMood,
) -> MoodReport {
    let breakdown = aggregate(&average_mood.averages, kind.pairs());
    let verdict = classify(breakdown.overall_positive, breakdown.overall_negative);

    MoodReport {
        subject,
        kind,
        granularity,
        window,
        average_mood,
        breakdown,
        verdict,
        series: Vec::new(),
    }
}

pub fn build_trend(
    subject: ReportSubject,
    kind: MoodKind,
    granularity: ReportGranularity,
    plan: &BucketPlan,
    average_mood: AverageMood,
    sparse: &[BucketAggregate],
) -> MoodReport {
    let mut report = build_summary(subject, kind, granularity, plan.window, average_mood);
    report.series = densify(sparse, &plan.buckets, kind.pairs());
    report
}

pub fn build_download(
    config: &Config,
    display_name: &str,
    kind: MoodKind,
    window: DateWindow,
    average_mood: &AverageMood,
) -> DownloadDocument {
    let breakdown = aggregate(&average_mood.averages, kind.pairs());
    let verdict = classify(breakdown.overall_positive, breakdown.overall_negative);
    let copy = narration(&verdict);

    let mut axis_icons: Vec<AxisIcon> = breakdown
        .polarity_share
        .iter()
        .filter(|(_, share)| **share > 0.0)
        .map(|(axis, share)| AxisIcon {
            axis: axis.clone(),
            percentage: *share,
            icon_url: config.icon_url(&format!("{axis}.png")),
        })
        .collect();
    axis_icons.sort_by(|a, b| {
        b.percentage
            .partial_cmp(&a.percentage)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.axis.cmp(&b.axis))
    });

    DownloadDocument {
        display_name: display_name.to_string(),
        from: window.start.format(DISPLAY_DATE).to_string(),
        to: window.last_day().format(DISPLAY_DATE).to_string(),
        positive_percentage: breakdown.overall_positive,
        negative_percentage: breakdown.overall_negative,
        verdict,
        headline: copy.headline.to_string(),
        icon_url: config.icon_url(copy.icon),
        axis_icons,
    }
}

fn write_pairs(output: &mut String, kind: MoodKind, breakdown: &PairedBreakdown) {
    for (positive, negative) in kind.pairs().pairs() {
        let share = |axis: &str| breakdown.per_pair.get(axis).copied().unwrap_or(0.0);
        let _ = writeln!(
            output,
            "- {positive} {:.0}% / {negative} {:.0}%",
            share(positive),
            share(negative)
        );
    }
}

pub fn render_markdown(report: &MoodReport) -> String {
    let mut output = String::new();
    let copy = narration(&report.verdict);

    let _ = writeln!(output, "# Mood Report");
    let _ = writeln!(
        output,
        "Generated for {} ({} {} check-ins, {} to {})",
        report.subject.display_name,
        report.kind.label(),
        report.average_mood.sample_count,
        report.window.start,
        report.window.last_day()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Overall");
    let _ = writeln!(
        output,
        "Positive {:.0}% / Negative {:.0}% ({})",
        report.breakdown.overall_positive,
        report.breakdown.overall_negative,
        report.verdict.token()
    );
    let _ = writeln!(output, "{}", copy.headline);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Paired Axes");
    write_pairs(&mut output, report.kind, &report.breakdown);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Most Reported");
    let mut counts: Vec<(&String, &i64)> = report
        .average_mood
        .counts
        .iter()
        .filter(|(_, count)| **count > 0)
        .collect();
    counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    if counts.is_empty() {
        let _ = writeln!(output, "No axes reported for this window.");
    } else {
        for (axis, count) in counts.iter().take(5) {
            let average = report.average_mood.averages.get(*axis).copied().unwrap_or(0.0);
            let _ = writeln!(
                output,
                "- {axis}: {count} check-ins (avg {average:.2})"
            );
        }
    }

    if !report.series.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Trend");
        let _ = writeln!(output, "| Bucket | Check-ins | Positive | Negative |");
        let _ = writeln!(output, "|---|---|---|---|");
        for point in &report.series {
            let _ = writeln!(
                output,
                "| {} | {} | {:.0}% | {:.0}% |",
                point.bucket,
                point.sample_count,
                point.breakdown.overall_positive,
                point.breakdown.overall_negative
            );
        }
    }

    output
}

pub fn render_download(document: &DownloadDocument) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Mood Summary for {}", document.display_name);
    let _ = writeln!(output, "{} - {}", document.from, document.to);
    let _ = writeln!(output);
    let _ = writeln!(output, "![{}]({})", document.verdict.token(), document.icon_url);
    let _ = writeln!(output, "{}", document.headline);
    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "Positive {:.0}% / Negative {:.0}%",
        document.positive_percentage, document.negative_percentage
    );

    if !document.axis_icons.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Breakdown");
        for icon in &document.axis_icons {
            let _ = writeln!(
                output,
                "- ![{}]({}) {} {:.0}%",
                icon.axis, icon.icon_url, icon.axis, icon.percentage
            );
        }
    }

    output
}
