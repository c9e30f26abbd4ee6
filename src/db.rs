//! Task record store and the adapter into curve inputs.
//!
//! This module provides the `Database` struct holding the task rows of a
//! platform export, project filtering over those rows, and the functions that
//! turn loose record fields into typed `WeightedTask` values. All date parsing
//! for the crate lives here.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::fields::parse_status;
use crate::task::{TaskRecord, WeightedTask};

/// Accepted shapes of an export file: a bare array, or the array wrapped in
/// the platform's `data` / `message` envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum ExportFile {
    Rows(Vec<TaskRecord>),
    Data { data: Vec<TaskRecord> },
    Message { message: Vec<TaskRecord> },
}

/// In-memory set of task records loaded from an export.
#[derive(Debug, Default)]
pub struct Database {
    pub tasks: Vec<TaskRecord>,
}

impl Database {
    /// Load task records from a JSON export file.
    pub fn load(path: &Path) -> AppResult<Self> {
        let buf = fs::read_to_string(path)?;
        let db = Self::from_json_str(&buf)?;
        debug!(path = %path.display(), tasks = db.tasks.len(), "loaded task export");
        Ok(db)
    }

    /// Parse task records from JSON text.
    pub fn from_json_str(json: &str) -> AppResult<Self> {
        let tasks = match serde_json::from_str::<ExportFile>(json)? {
            ExportFile::Rows(rows) => rows,
            ExportFile::Data { data } => data,
            ExportFile::Message { message } => message,
        };
        Ok(Database { tasks })
    }

    /// Records belonging to `project`, or every record when no project is given.
    pub fn for_project(&self, project: Option<&str>) -> Vec<&TaskRecord> {
        self.tasks
            .iter()
            .filter(|t| match project {
                Some(p) => t.project.as_deref() == Some(p),
                None => true,
            })
            .collect()
    }

    /// Distinct project names with their task counts. Unassigned tasks are keyed "-".
    pub fn projects(&self) -> BTreeMap<String, usize> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for t in &self.tasks {
            let key = t.project.clone().unwrap_or_else(|| "-".into());
            *counts.entry(key).or_default() += 1;
        }
        counts
    }

    /// Curve inputs for a project.
    ///
    /// An explicitly named project with no records is an error so that typos
    /// don't silently render an empty chart.
    pub fn weighted_tasks(&self, project: Option<&str>) -> AppResult<Vec<WeightedTask>> {
        let records = self.for_project(project);
        if let Some(p) = project {
            if records.is_empty() {
                return Err(AppError::ProjectNotFound { project: p.to_string() });
            }
        }
        Ok(records.into_iter().map(to_weighted_task).collect())
    }
}

/// Parse a date field leniently.
///
/// Accepts:
/// - "YYYY-MM-DD"
/// - "YYYY-MM-DD HH:MM[:SS[.ffffff]]"
/// - "YYYY-MM-DDTHH:MM:SS[.f]"
/// - RFC 3339 timestamps (the calendar date in the given offset is kept)
///
/// Blank or unparseable input yields `None`.
pub fn parse_date_lenient(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }

    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

/// Parse an optional date field, treating null and garbage alike.
pub fn parse_optional_date(s: Option<&str>) -> Option<NaiveDate> {
    s.and_then(parse_date_lenient)
}

/// Resolve a record's point value into a usable weight.
/// Missing, negative and non-finite values count as 0.
pub fn resolve_weight(record: &TaskRecord) -> f64 {
    match record.custom_points {
        Some(p) if p.is_finite() && p > 0.0 => p,
        Some(p) if p != 0.0 => {
            warn!(task = %record.name, points = p, "ignoring invalid task points");
            0.0
        }
        _ => 0.0,
    }
}

/// Convert a raw record into the calculator's input shape.
///
/// The actual finish date prefers `completed_on` and falls back to the
/// record's own actual end date.
pub fn to_weighted_task(record: &TaskRecord) -> WeightedTask {
    let completed = record
        .status
        .as_deref()
        .map(|s| parse_status(s).is_completed())
        .unwrap_or(false);

    let actual_end = parse_optional_date(record.completed_on.as_deref())
        .or_else(|| parse_optional_date(record.custom_actual_end_date.as_deref()));

    WeightedTask {
        id: record.name.clone(),
        weight: resolve_weight(record),
        baseline_end: parse_optional_date(record.custom_baseline_end_date.as_deref()),
        planned_end: parse_optional_date(record.exp_end_date.as_deref()),
        actual_end,
        completed,
        baseline_start: parse_optional_date(record.custom_baseline_start_date.as_deref()),
        planned_start: parse_optional_date(record.exp_start_date.as_deref()),
        actual_start: parse_optional_date(record.custom_actual_start_date.as_deref()),
    }
}

/// Parse a user-supplied `YYYY-MM-DD` date (e.g. `--as-of`), strictly.
pub fn parse_date_arg(s: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::InvalidDate { input: s.to_string() })
}
