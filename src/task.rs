//! Task data structures.
//!
//! `TaskRecord` mirrors a row of the platform's task list export, with loose
//! string-typed dates. `WeightedTask` is the strict shape the curve
//! calculator consumes; `db::to_weighted_task` converts one into the other.

use chrono::NaiveDate;
use serde::Deserialize;

/// A task row as exported from the project platform.
///
/// Field names follow the export so that files can be fed in unchanged.
/// Every field except `name` may be missing or null.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskRecord {
    pub name: String,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub exp_start_date: Option<String>,
    #[serde(default)]
    pub exp_end_date: Option<String>,
    #[serde(default, rename = "custom_baseline_start_date_")]
    pub custom_baseline_start_date: Option<String>,
    #[serde(default)]
    pub custom_baseline_end_date: Option<String>,
    #[serde(default)]
    pub custom_actual_start_date: Option<String>,
    #[serde(default)]
    pub custom_actual_end_date: Option<String>,
    #[serde(default)]
    pub completed_on: Option<String>,
    #[serde(default)]
    pub custom_points: Option<f64>,
}

/// A task reduced to what an S-curve needs: a weight and milestone dates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightedTask {
    pub id: String,
    pub weight: f64,
    pub baseline_end: Option<NaiveDate>,
    pub planned_end: Option<NaiveDate>,
    pub actual_end: Option<NaiveDate>,
    pub completed: bool,
    pub baseline_start: Option<NaiveDate>,
    pub planned_start: Option<NaiveDate>,
    pub actual_start: Option<NaiveDate>,
}

impl WeightedTask {
    /// Actual finish date, only when the task is completed.
    pub fn effective_actual_end(&self) -> Option<NaiveDate> {
        if self.completed {
            self.actual_end
        } else {
            None
        }
    }
}

#[cfg(test)]
impl WeightedTask {
    pub fn new(id: impl Into<String>, weight: f64) -> Self {
        WeightedTask {
            id: id.into(),
            weight,
            ..Default::default()
        }
    }

    pub fn with_baseline_end(mut self, date: NaiveDate) -> Self {
        self.baseline_end = Some(date);
        self
    }

    pub fn with_planned_end(mut self, date: NaiveDate) -> Self {
        self.planned_end = Some(date);
        self
    }

    /// Set the actual finish date and the completion flag together.
    pub fn with_actual_end(mut self, date: NaiveDate, completed: bool) -> Self {
        self.actual_end = Some(date);
        self.completed = completed;
        self
    }
}
