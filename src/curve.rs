//! S-curve calculation.
//!
//! Turns a set of weighted tasks into a gap-free daily series of cumulative
//! completion percentages for three curves:
//!
//! - **Baseline**: tasks whose originally committed end date has passed
//! - **Planned**: tasks whose currently scheduled end date has passed
//! - **Actual**: completed tasks whose real finish date has passed
//!
//! The series runs from the earliest milestone date in the input to the latest
//! one plus a trailing buffer, so that a chart's final point does not sit on
//! the plot edge.
//!
//! The calculator is a pure function of its input. Anomalies in the data are
//! absorbed rather than reported: a task without a date for a curve never
//! counts toward that curve, a set of tasks without any points is weighted by
//! task count, and input without any dates produces an empty series.

use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::fields::{Curve, ScheduleHealth, WeightingMode};
use crate::task::WeightedTask;

/// Days appended after the last milestone date.
pub const DEFAULT_BUFFER_DAYS: u32 = 7;
/// Decimal places kept in each percentage.
pub const DEFAULT_DECIMALS: u32 = 1;
/// Upper bound on decimal places; `10^d` stays exact well inside f64.
pub const MAX_DECIMALS: u32 = 6;

/// Tunables for a calculation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CurveSettings {
    pub buffer_days: u32,
    pub decimals: u32,
    /// Let task start dates widen the timeline. They never add weight.
    pub include_start_dates: bool,
}

impl Default for CurveSettings {
    fn default() -> Self {
        CurveSettings {
            buffer_days: DEFAULT_BUFFER_DAYS,
            decimals: DEFAULT_DECIMALS,
            include_start_dates: false,
        }
    }
}

/// Cumulative progress of the three curves on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyProgressPoint {
    pub date: NaiveDate,
    pub baseline_pct: f64,
    pub planned_pct: f64,
    pub actual_pct: f64,
}

impl DailyProgressPoint {
    fn zero(date: NaiveDate) -> Self {
        DailyProgressPoint {
            date,
            baseline_pct: 0.0,
            planned_pct: 0.0,
            actual_pct: 0.0,
        }
    }

    pub fn value(&self, curve: Curve) -> f64 {
        match curve {
            Curve::Baseline => self.baseline_pct,
            Curve::Planned => self.planned_pct,
            Curve::Actual => self.actual_pct,
        }
    }
}

/// Compute the S-curve with default settings.
pub fn compute_s_curve(tasks: &[WeightedTask]) -> Vec<DailyProgressPoint> {
    compute_s_curve_with(tasks, &CurveSettings::default())
}

/// Compute the S-curve.
///
/// Returns one point per day from the earliest date found in the input through
/// the latest date plus `settings.buffer_days`, in ascending order. Returns an
/// empty series when no task carries any date.
pub fn compute_s_curve_with(
    tasks: &[WeightedTask],
    settings: &CurveSettings,
) -> Vec<DailyProgressPoint> {
    let Some((start, end)) = date_range(tasks, settings) else {
        debug!(tasks = tasks.len(), "no dated tasks, empty s-curve");
        return Vec::new();
    };

    let (weights, total, mode) = resolve_weights(tasks);
    let last = end
        .checked_add_signed(Duration::days(i64::from(settings.buffer_days)))
        .unwrap_or(end);

    let mut baseline = Accumulator::new(tasks, &weights, |t| t.baseline_end);
    let mut planned = Accumulator::new(tasks, &weights, |t| t.planned_end);
    let mut actual = Accumulator::new(tasks, &weights, WeightedTask::effective_actual_end);

    let capacity = (last - start).num_days() as usize + 1;
    let mut series = Vec::with_capacity(capacity);
    for day in start.iter_days().take_while(|d| *d <= last) {
        series.push(DailyProgressPoint {
            date: day,
            baseline_pct: percentage(baseline.advance_to(day), total, settings.decimals),
            planned_pct: percentage(planned.advance_to(day), total, settings.decimals),
            actual_pct: percentage(actual.advance_to(day), total, settings.decimals),
        });
    }

    debug!(
        tasks = tasks.len(),
        days = series.len(),
        %start,
        %last,
        weighting = ?mode,
        "computed s-curve"
    );
    series
}

/// Earliest and latest milestone date across all tasks.
///
/// Actual end dates count toward the range even for tasks that are not
/// completed; they are excluded only from the actual curve's sums.
pub fn date_range(
    tasks: &[WeightedTask],
    settings: &CurveSettings,
) -> Option<(NaiveDate, NaiveDate)> {
    let mut range: Option<(NaiveDate, NaiveDate)> = None;
    for t in tasks {
        let ends = [t.baseline_end, t.planned_end, t.actual_end];
        let starts = [t.baseline_start, t.planned_start, t.actual_start];
        let extra: &[Option<NaiveDate>] = if settings.include_start_dates { &starts } else { &[] };

        for d in ends.iter().chain(extra).flatten() {
            range = Some(match range {
                None => (*d, *d),
                Some((lo, hi)) => (lo.min(*d), hi.max(*d)),
            });
        }
    }
    range
}

/// Per-task weights, their total, and which weighting was applied.
///
/// Negative and non-finite weights count as 0. When nothing carries weight,
/// every task weighs 1. Weights whose sum overflows are scaled down by the
/// largest one, which keeps every ratio intact.
pub fn resolve_weights(tasks: &[WeightedTask]) -> (Vec<f64>, f64, WeightingMode) {
    let mut weights: Vec<f64> = tasks
        .iter()
        .map(|t| if t.weight.is_finite() && t.weight > 0.0 { t.weight } else { 0.0 })
        .collect();
    let mut total: f64 = weights.iter().sum();

    if !total.is_finite() {
        let max = weights.iter().copied().fold(0.0, f64::max);
        debug!(max, "task weights overflow, rescaling");
        for w in &mut weights {
            *w /= max;
        }
        total = weights.iter().sum();
    }

    if total > 0.0 {
        (weights, total, WeightingMode::Weighted)
    } else {
        (vec![1.0; tasks.len()], tasks.len() as f64, WeightingMode::Uniform)
    }
}

/// Round to `decimals` places, capped at `MAX_DECIMALS`.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals.min(MAX_DECIMALS) as i32);
    (value * factor).round() / factor
}

fn percentage(done: f64, total: f64, decimals: u32) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    let ratio = done / total * 100.0;
    if ratio.is_nan() {
        return 0.0;
    }
    round_to(ratio.clamp(0.0, 100.0), decimals)
}

/// Running sum over one curve's completion events, sorted by date.
/// Each task's weight is added exactly once, on the first day at or after its
/// end date.
struct Accumulator {
    events: Vec<(NaiveDate, f64)>,
    next: usize,
    sum: f64,
}

impl Accumulator {
    fn new<F>(tasks: &[WeightedTask], weights: &[f64], end_of: F) -> Self
    where
        F: Fn(&WeightedTask) -> Option<NaiveDate>,
    {
        let mut events: Vec<(NaiveDate, f64)> = tasks
            .iter()
            .zip(weights)
            .filter_map(|(t, &w)| end_of(t).map(|d| (d, w)))
            .collect();
        events.sort_by_key(|(d, _)| *d);
        Accumulator { events, next: 0, sum: 0.0 }
    }

    fn advance_to(&mut self, day: NaiveDate) -> f64 {
        while let Some(&(d, w)) = self.events.get(self.next) {
            if d > day {
                break;
            }
            self.sum += w;
            self.next += 1;
        }
        self.sum
    }
}

/// The series value on `date`.
///
/// Before the first day every curve is 0; after the last day the final values
/// hold. Returns `None` for an empty series.
pub fn point_on(series: &[DailyProgressPoint], date: NaiveDate) -> Option<DailyProgressPoint> {
    let first = series.first()?;
    let last = series.last()?;

    if date < first.date {
        return Some(DailyProgressPoint::zero(date));
    }
    if date > last.date {
        return Some(DailyProgressPoint { date, ..*last });
    }

    let idx = (date - first.date).num_days() as usize;
    series.get(idx).copied()
}

/// Progress snapshot on a given day.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSummary {
    pub as_of: NaiveDate,
    pub baseline_pct: f64,
    pub planned_pct: f64,
    pub actual_pct: f64,
    /// Actual minus planned, in percentage points.
    pub schedule_variance: f64,
    /// Actual minus baseline, in percentage points.
    pub baseline_variance: f64,
    pub health: ScheduleHealth,
    pub task_count: usize,
    pub completed_count: usize,
    pub total_weight: f64,
    pub weighting: WeightingMode,
}

/// Summarise `series` (computed from `tasks` with `settings`) on `as_of`.
pub fn summarize(
    tasks: &[WeightedTask],
    series: &[DailyProgressPoint],
    as_of: NaiveDate,
    settings: &CurveSettings,
) -> Option<ProgressSummary> {
    let point = point_on(series, as_of)?;
    let (_, total_weight, weighting) = resolve_weights(tasks);

    let schedule_variance = round_to(point.actual_pct - point.planned_pct, settings.decimals);
    let baseline_variance = round_to(point.actual_pct - point.baseline_pct, settings.decimals);

    let tolerance = 0.5 / 10f64.powi(settings.decimals.min(MAX_DECIMALS) as i32);
    let health = if schedule_variance > tolerance {
        ScheduleHealth::Ahead
    } else if schedule_variance < -tolerance {
        ScheduleHealth::Behind
    } else {
        ScheduleHealth::OnTrack
    };

    let completed_count = tasks
        .iter()
        .filter(|t| t.effective_actual_end().is_some_and(|d| d <= as_of))
        .count();

    Some(ProgressSummary {
        as_of,
        baseline_pct: point.baseline_pct,
        planned_pct: point.planned_pct,
        actual_pct: point.actual_pct,
        schedule_variance,
        baseline_variance,
        health,
        task_count: tasks.len(),
        completed_count,
        total_weight,
        weighting,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn scenario() -> Vec<WeightedTask> {
        vec![
            WeightedTask::new("A", 50.0).with_planned_end(date(2024, 1, 5)),
            WeightedTask::new("B", 30.0).with_planned_end(date(2024, 1, 10)),
            WeightedTask::new("C", 20.0).with_planned_end(date(2024, 1, 10)),
        ]
    }

    /// Deterministic pseudo-random task set spread over about a year.
    fn generated_tasks(n: usize) -> Vec<WeightedTask> {
        let mut seed: u64 = 0x2545_F491_4F6C_DD1D;
        let mut next = move || {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (seed >> 33) as i64
        };
        let origin = date(2023, 1, 1);
        (0..n)
            .map(|i| {
                let mut t = WeightedTask::new(format!("T{i}"), (next() % 13) as f64);
                if next() % 4 != 0 {
                    t.baseline_end = Some(origin + Duration::days(next() % 365));
                }
                if next() % 5 != 0 {
                    t.planned_end = Some(origin + Duration::days(next() % 365));
                }
                if next() % 3 != 0 {
                    t.actual_end = Some(origin + Duration::days(next() % 400));
                    t.completed = next() % 2 == 0;
                }
                t
            })
            .collect()
    }

    #[test]
    fn test_empty_input_gives_empty_series() {
        assert!(compute_s_curve(&[]).is_empty());
    }

    #[test]
    fn test_dateless_tasks_give_empty_series() {
        let tasks = vec![WeightedTask::new("A", 3.0), WeightedTask::new("B", 0.0)];
        assert!(compute_s_curve(&tasks).is_empty());
    }

    #[test]
    fn test_planned_scenario() {
        let series = compute_s_curve(&scenario());

        for p in &series {
            let expected = if p.date < date(2024, 1, 5) {
                0.0
            } else if p.date < date(2024, 1, 10) {
                50.0
            } else {
                100.0
            };
            assert_eq!(p.planned_pct, expected, "on {}", p.date);
            assert_eq!(p.baseline_pct, 0.0);
            assert_eq!(p.actual_pct, 0.0);
        }
        assert_eq!(series.first().unwrap().date, date(2024, 1, 5));
        assert_eq!(series.last().unwrap().date, date(2024, 1, 17));
    }

    #[test]
    fn test_range_spans_min_to_max_plus_buffer() {
        let tasks = vec![
            WeightedTask::new("A", 1.0).with_baseline_end(date(2024, 3, 1)),
            WeightedTask::new("B", 1.0).with_planned_end(date(2024, 2, 10)),
            WeightedTask::new("C", 1.0).with_actual_end(date(2024, 4, 2), true),
        ];
        let series = compute_s_curve(&tasks);
        let first = series.first().unwrap().date;
        let last = series.last().unwrap().date;

        assert_eq!(first, date(2024, 2, 10));
        assert_eq!(last, date(2024, 4, 9));
        assert_eq!(series.len() as i64, (last - first).num_days() + 1);
        for pair in series.windows(2) {
            assert_eq!(pair[1].date - pair[0].date, Duration::days(1));
        }
    }

    #[test]
    fn test_custom_buffer_days() {
        let settings = CurveSettings { buffer_days: 0, ..Default::default() };
        let series = compute_s_curve_with(&scenario(), &settings);
        assert_eq!(series.last().unwrap().date, date(2024, 1, 10));
        assert_eq!(series.len(), 6);
    }

    #[test]
    fn test_single_date_series() {
        let tasks = vec![WeightedTask::new("A", 2.0).with_planned_end(date(2024, 6, 1))];
        let series = compute_s_curve(&tasks);
        assert_eq!(series.len(), 8);
        assert_eq!(series[0].planned_pct, 100.0);
    }

    #[test]
    fn test_uniform_fallback_when_weights_zero() {
        let day = date(2024, 5, 20);
        let tasks: Vec<WeightedTask> = (0..4)
            .map(|i| WeightedTask::new(format!("T{i}"), 0.0).with_planned_end(day))
            .collect();
        let series = compute_s_curve(&tasks);
        for p in series.iter().filter(|p| p.date >= day) {
            assert_eq!(p.planned_pct, 100.0);
        }
        assert_eq!(resolve_weights(&tasks).2, WeightingMode::Uniform);
    }

    #[test]
    fn test_uniform_fallback_counts_tasks() {
        let tasks = vec![
            WeightedTask::new("A", 0.0).with_planned_end(date(2024, 1, 1)),
            WeightedTask::new("B", 0.0).with_planned_end(date(2024, 1, 2)),
            WeightedTask::new("C", 0.0).with_planned_end(date(2024, 1, 3)),
        ];
        let series = compute_s_curve(&tasks);
        assert_eq!(series[0].planned_pct, 33.3);
        assert_eq!(series[1].planned_pct, 66.7);
        assert_eq!(series[2].planned_pct, 100.0);
    }

    #[test]
    fn test_incomplete_task_never_counts_as_actual() {
        let tasks = vec![
            WeightedTask::new("stale", 60.0).with_actual_end(date(2020, 1, 1), false),
            WeightedTask::new("done", 40.0).with_actual_end(date(2024, 1, 1), true),
        ];
        let series = compute_s_curve(&tasks);

        // The stale actual date still opens the range.
        assert_eq!(series.first().unwrap().date, date(2020, 1, 1));
        for p in &series {
            assert!(p.actual_pct <= 40.0, "on {}: {}", p.date, p.actual_pct);
        }
        assert_eq!(series.last().unwrap().actual_pct, 40.0);
    }

    #[test]
    fn test_curves_are_independent() {
        // Actual before planned, baseline after planned: accepted as-is.
        let tasks = vec![WeightedTask {
            id: "X".into(),
            weight: 1.0,
            baseline_end: Some(date(2024, 1, 20)),
            planned_end: Some(date(2024, 1, 10)),
            actual_end: Some(date(2024, 1, 5)),
            completed: true,
            ..Default::default()
        }];
        let series = compute_s_curve(&tasks);
        let on = |d| point_on(&series, d).unwrap();

        assert_eq!(on(date(2024, 1, 5)).actual_pct, 100.0);
        assert_eq!(on(date(2024, 1, 5)).planned_pct, 0.0);
        assert_eq!(on(date(2024, 1, 10)).planned_pct, 100.0);
        assert_eq!(on(date(2024, 1, 19)).baseline_pct, 0.0);
        assert_eq!(on(date(2024, 1, 20)).baseline_pct, 100.0);
    }

    #[test]
    fn test_monotonic_and_bounded() {
        let tasks = generated_tasks(2_000);
        let series = compute_s_curve(&tasks);
        assert!(!series.is_empty());

        for p in &series {
            for curve in Curve::ALL {
                let v = p.value(curve);
                assert!((0.0..=100.0).contains(&v), "{curve:?} out of bounds on {}: {v}", p.date);
            }
        }
        for pair in series.windows(2) {
            for curve in Curve::ALL {
                assert!(
                    pair[1].value(curve) >= pair[0].value(curve),
                    "{curve:?} decreased on {}",
                    pair[1].date
                );
            }
        }
    }

    #[test]
    fn test_matches_per_day_recompute() {
        let tasks = generated_tasks(300);
        let settings = CurveSettings::default();
        let series = compute_s_curve_with(&tasks, &settings);
        let (weights, total, _) = resolve_weights(&tasks);

        for p in series.iter().step_by(17) {
            let planned: f64 = tasks
                .iter()
                .zip(&weights)
                .filter(|(t, _)| t.planned_end.is_some_and(|d| d <= p.date))
                .map(|(_, w)| *w)
                .sum();
            assert_eq!(p.planned_pct, percentage(planned, total, settings.decimals));
        }
    }

    #[test]
    fn test_negative_weights_are_ignored() {
        let tasks = vec![
            WeightedTask::new("A", -10.0).with_planned_end(date(2024, 1, 1)),
            WeightedTask::new("B", 10.0).with_planned_end(date(2024, 1, 2)),
        ];
        let series = compute_s_curve(&tasks);
        assert_eq!(series[0].planned_pct, 0.0);
        assert_eq!(series[1].planned_pct, 100.0);
    }

    #[test]
    fn test_start_dates_only_widen_range_when_enabled() {
        let mut task = WeightedTask::new("A", 1.0).with_planned_end(date(2024, 1, 10));
        task.planned_start = Some(date(2024, 1, 1));
        let tasks = vec![task];

        let default_series = compute_s_curve(&tasks);
        assert_eq!(default_series.first().unwrap().date, date(2024, 1, 10));

        let settings = CurveSettings { include_start_dates: true, ..Default::default() };
        let wide = compute_s_curve_with(&tasks, &settings);
        assert_eq!(wide.first().unwrap().date, date(2024, 1, 1));
        assert_eq!(wide.first().unwrap().planned_pct, 0.0);

        let dateless_but_started = vec![WeightedTask {
            planned_start: Some(date(2024, 1, 1)),
            ..WeightedTask::new("B", 1.0)
        }];
        assert!(compute_s_curve(&dateless_but_started).is_empty());
        assert_eq!(compute_s_curve_with(&dateless_but_started, &settings).len(), 8);
    }

    #[test]
    fn test_decimals_setting() {
        let tasks = vec![
            WeightedTask::new("A", 1.0).with_planned_end(date(2024, 1, 1)),
            WeightedTask::new("B", 2.0).with_planned_end(date(2024, 1, 2)),
        ];
        let two = CurveSettings { decimals: 2, ..Default::default() };
        assert_eq!(compute_s_curve_with(&tasks, &two)[0].planned_pct, 33.33);
        let none = CurveSettings { decimals: 0, ..Default::default() };
        assert_eq!(compute_s_curve_with(&tasks, &none)[0].planned_pct, 33.0);
    }

    #[test]
    fn test_oversized_decimals_are_capped() {
        let tasks = vec![
            WeightedTask::new("A", 1.0).with_planned_end(date(2024, 1, 1)),
            WeightedTask::new("B", 2.0).with_planned_end(date(2024, 1, 2)),
        ];
        let huge = CurveSettings { decimals: 400, ..Default::default() };
        let capped = CurveSettings { decimals: MAX_DECIMALS, ..Default::default() };
        let series = compute_s_curve_with(&tasks, &huge);

        assert!(series.iter().all(|p| p.planned_pct.is_finite()));
        assert_eq!(series, compute_s_curve_with(&tasks, &capped));
        assert_eq!(series[0].planned_pct, 33.333333);
        assert_eq!(round_to(12.5, u32::MAX), 12.5);

        let summary = summarize(&tasks, &series, date(2024, 1, 1), &huge).unwrap();
        assert_eq!(summary.health, ScheduleHealth::Behind);
    }

    #[test]
    fn test_huge_weights_stay_bounded() {
        let tasks = vec![
            WeightedTask::new("A", 1e308).with_planned_end(date(2024, 1, 1)),
            WeightedTask::new("B", 1e308).with_planned_end(date(2024, 1, 2)),
        ];
        let series = compute_s_curve(&tasks);
        assert_eq!(series[0].planned_pct, 50.0);
        assert_eq!(series[1].planned_pct, 100.0);
        assert_eq!(resolve_weights(&tasks).2, WeightingMode::Weighted);

        let extreme = vec![
            WeightedTask::new("A", f64::MAX).with_planned_end(date(2024, 1, 1)),
            WeightedTask::new("B", f64::MAX).with_planned_end(date(2024, 1, 2)),
            WeightedTask::new("C", 1.0).with_planned_end(date(2024, 1, 3)),
        ];
        let series = compute_s_curve(&extreme);
        for p in &series {
            assert!((0.0..=100.0).contains(&p.planned_pct), "on {}: {}", p.date, p.planned_pct);
        }
        assert_eq!(series[0].planned_pct, 50.0);
        assert_eq!(series.last().unwrap().planned_pct, 100.0);
    }

    #[test]
    fn test_point_on_clamps_outside_range() {
        let series = compute_s_curve(&scenario());
        let before = point_on(&series, date(2023, 12, 1)).unwrap();
        assert_eq!(before.date, date(2023, 12, 1));
        assert_eq!(before.planned_pct, 0.0);

        let after = point_on(&series, date(2025, 1, 1)).unwrap();
        assert_eq!(after.date, date(2025, 1, 1));
        assert_eq!(after.planned_pct, 100.0);

        assert_eq!(point_on(&series, date(2024, 1, 7)).unwrap().planned_pct, 50.0);
        assert!(point_on(&[], date(2024, 1, 7)).is_none());
    }

    #[test]
    fn test_summarize_reports_variance_and_health() {
        let tasks = vec![
            WeightedTask::new("A", 50.0)
                .with_planned_end(date(2024, 1, 5))
                .with_actual_end(date(2024, 1, 6), true),
            WeightedTask::new("B", 50.0)
                .with_baseline_end(date(2024, 1, 3))
                .with_planned_end(date(2024, 1, 10)),
        ];
        let settings = CurveSettings::default();
        let series = compute_s_curve_with(&tasks, &settings);

        let behind = summarize(&tasks, &series, date(2024, 1, 5), &settings).unwrap();
        assert_eq!(behind.planned_pct, 50.0);
        assert_eq!(behind.actual_pct, 0.0);
        assert_eq!(behind.schedule_variance, -50.0);
        assert_eq!(behind.health, ScheduleHealth::Behind);
        assert_eq!(behind.completed_count, 0);

        let on_track = summarize(&tasks, &series, date(2024, 1, 6), &settings).unwrap();
        assert_eq!(on_track.health, ScheduleHealth::OnTrack);
        assert_eq!(on_track.baseline_variance, 0.0);
        assert_eq!(on_track.completed_count, 1);
        assert_eq!(on_track.total_weight, 100.0);
        assert_eq!(on_track.weighting, WeightingMode::Weighted);
        assert_eq!(on_track.task_count, 2);

        let early = vec![WeightedTask::new("A", 1.0)
            .with_planned_end(date(2024, 2, 1))
            .with_actual_end(date(2024, 1, 20), true)];
        let early_series = compute_s_curve(&early);
        let ahead = summarize(&early, &early_series, date(2024, 1, 25), &settings).unwrap();
        assert_eq!(ahead.health, ScheduleHealth::Ahead);

        assert!(summarize(&[], &[], date(2024, 1, 1), &settings).is_none());
    }
}
