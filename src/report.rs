//! Text and CSV rendering of S-curve series and summaries.

use crate::curve::{DailyProgressPoint, ProgressSummary};
use crate::fields::{format_health, format_weighting, Curve};

/// Format a percentage for display with one decimal place.
pub fn format_pct(v: f64) -> String {
    format!("{v:.1}%")
}

/// Format a signed variance in percentage points.
pub fn format_variance(v: f64) -> String {
    format!("{v:+.1} pts")
}

/// Render the series as an aligned table. `limit` keeps the first N rows.
pub fn format_table(series: &[DailyProgressPoint], limit: Option<usize>) -> String {
    let mut out = format!(
        "{:<12} {:>14} {:>14} {:>16}\n",
        "Date",
        Curve::Baseline.label(),
        Curve::Planned.label(),
        Curve::Actual.label()
    );
    let rows = limit.unwrap_or(series.len());
    for p in series.iter().take(rows) {
        out.push_str(&format!(
            "{:<12} {:>14} {:>14} {:>16}\n",
            p.date.format("%Y-%m-%d").to_string(),
            format_pct(p.baseline_pct),
            format_pct(p.planned_pct),
            format_pct(p.actual_pct)
        ));
    }
    out
}

/// Print the series table to stdout.
pub fn print_table(series: &[DailyProgressPoint], limit: Option<usize>) {
    print!("{}", format_table(series, limit));
}

/// Quote a CSV field when it contains a separator, quote or newline.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Render the series as CSV, one row per day.
pub fn series_to_csv(series: &[DailyProgressPoint]) -> String {
    let mut csv = String::new();
    let header: Vec<String> = std::iter::once("Date")
        .chain(Curve::ALL.iter().map(|c| c.label()))
        .map(escape_csv)
        .collect();
    csv.push_str(&header.join(","));
    csv.push('\n');

    for p in series {
        csv.push_str(&format!(
            "{},{:.1},{:.1},{:.1}\n",
            p.date.format("%Y-%m-%d"),
            p.baseline_pct,
            p.planned_pct,
            p.actual_pct
        ));
    }
    csv
}

/// Render a summary as labelled lines.
pub fn format_summary(project: Option<&str>, summary: &ProgressSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("Project:            {}\n", project.unwrap_or("(all)")));
    out.push_str(&format!("As of:              {}\n", summary.as_of));
    out.push_str(&format!(
        "Tasks:              {} ({} completed)\n",
        summary.task_count, summary.completed_count
    ));
    out.push_str(&format!(
        "Weighting:          {} total {}\n",
        format_weighting(summary.weighting),
        summary.total_weight
    ));
    for (curve, pct) in [
        (Curve::Baseline, summary.baseline_pct),
        (Curve::Planned, summary.planned_pct),
        (Curve::Actual, summary.actual_pct),
    ] {
        let label = format!("{}:", curve.label());
        out.push_str(&format!("{label:<20}{}\n", format_pct(pct)));
    }
    out.push_str(&format!("vs plan:            {}\n", format_variance(summary.schedule_variance)));
    out.push_str(&format!("vs baseline:        {}\n", format_variance(summary.baseline_variance)));
    out.push_str(&format!("Status:             {}\n", format_health(summary.health)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn point(d: u32, b: f64, p: f64, a: f64) -> DailyProgressPoint {
        DailyProgressPoint {
            date: NaiveDate::from_ymd_opt(2024, 1, d).unwrap(),
            baseline_pct: b,
            planned_pct: p,
            actual_pct: a,
        }
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_csv("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_series_to_csv() {
        let csv = series_to_csv(&[point(5, 0.0, 50.0, 12.5), point(6, 100.0, 66.7, 20.0)]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Date,Baseline Plan,Expected Plan,Actual Progress");
        assert_eq!(lines[1], "2024-01-05,0.0,50.0,12.5");
        assert_eq!(lines[2], "2024-01-06,100.0,66.7,20.0");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_format_table_respects_limit() {
        let series = vec![
            point(1, 0.0, 0.0, 0.0),
            point(2, 1.0, 2.0, 3.0),
            point(3, 4.0, 5.0, 6.0),
        ];
        let table = format_table(&series, Some(2));
        assert_eq!(table.lines().count(), 3);
        assert!(table.contains("2024-01-02"));
        assert!(!table.contains("2024-01-03"));
    }

    #[test]
    fn test_format_variance_sign() {
        assert_eq!(format_variance(-12.5), "-12.5 pts");
        assert_eq!(format_variance(3.0), "+3.0 pts");
        assert_eq!(format_pct(50.0), "50.0%");
    }

    #[test]
    fn test_format_summary_aligns_curve_lines() {
        use crate::fields::{ScheduleHealth, WeightingMode};

        let summary = ProgressSummary {
            as_of: NaiveDate::from_ymd_opt(2024, 1, 6).unwrap(),
            baseline_pct: 100.0,
            planned_pct: 50.0,
            actual_pct: 50.0,
            schedule_variance: 0.0,
            baseline_variance: -50.0,
            health: ScheduleHealth::OnTrack,
            task_count: 2,
            completed_count: 1,
            total_weight: 100.0,
            weighting: WeightingMode::Weighted,
        };
        let text = format_summary(Some("PROJ-A"), &summary);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Project:            PROJ-A");
        assert_eq!(lines[4], "Baseline Plan:      100.0%");
        assert_eq!(lines[5], "Expected Plan:      50.0%");
        assert_eq!(lines[6], "Actual Progress:    50.0%");
        assert_eq!(lines[8], "vs baseline:        -50.0 pts");
        assert_eq!(lines[9], "Status:             On track");
    }
}
