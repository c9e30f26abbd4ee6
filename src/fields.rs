//! Enumerations used across the curve calculator and its front ends.
//!
//! This module defines task status values as the platform exports them, the
//! three curves of an S-curve, and the classifications reported in summaries.

/// Task workflow status as exported by the platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    #[default]
    Open,
    Working,
    PendingReview,
    Overdue,
    Template,
    Completed,
    Cancelled,
}

impl TaskStatus {
    /// Whether the task has reached its terminal "done" state.
    pub fn is_completed(self) -> bool {
        self == TaskStatus::Completed
    }
}

/// Parse a raw status string. Unknown values fall back to `Open`.
pub fn parse_status(s: &str) -> TaskStatus {
    match s.trim().to_lowercase().as_str() {
        "open" => TaskStatus::Open,
        "working" => TaskStatus::Working,
        "pending review" | "pending-review" => TaskStatus::PendingReview,
        "overdue" => TaskStatus::Overdue,
        "template" => TaskStatus::Template,
        "completed" => TaskStatus::Completed,
        "cancelled" | "canceled" => TaskStatus::Cancelled,
        _ => TaskStatus::Open,
    }
}

/// One of the three cumulative progress lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Curve {
    Baseline,
    Planned,
    Actual,
}

impl Curve {
    pub const ALL: [Curve; 3] = [Curve::Baseline, Curve::Planned, Curve::Actual];

    /// Legend label used by the chart and the CSV header.
    pub fn label(self) -> &'static str {
        match self {
            Curve::Baseline => "Baseline Plan",
            Curve::Planned => "Expected Plan",
            Curve::Actual => "Actual Progress",
        }
    }
}

/// How task weights were resolved for a calculation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightingMode {
    /// Each task counts its own points.
    Weighted,
    /// No task carried points, so every task counts as 1.
    Uniform,
}

/// Actual progress compared against the planned curve on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleHealth {
    Ahead,
    OnTrack,
    Behind,
}

/// Format a weighting mode for display.
pub fn format_weighting(mode: WeightingMode) -> &'static str {
    match mode {
        WeightingMode::Weighted => "Weighted (points)",
        WeightingMode::Uniform => "Uniform (task count)",
    }
}

/// Format a schedule health value for display.
pub fn format_health(health: ScheduleHealth) -> &'static str {
    match health {
        ScheduleHealth::Ahead => "Ahead of plan",
        ScheduleHealth::OnTrack => "On track",
        ScheduleHealth::Behind => "Behind plan",
    }
}
