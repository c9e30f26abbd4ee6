//! Caller-side memoization of computed S-curves.
//!
//! The calculator is stateless. Views that redraw many times per second keep a
//! `CurveMemo` and only pay for a recompute when the tasks or settings change.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use tracing::trace;

use crate::curve::{compute_s_curve_with, CurveSettings, DailyProgressPoint};
use crate::task::WeightedTask;

/// Hash of every task field the calculator reads, plus the settings.
pub fn input_key(tasks: &[WeightedTask], settings: &CurveSettings) -> u64 {
    let mut hasher = DefaultHasher::new();
    settings.hash(&mut hasher);
    tasks.len().hash(&mut hasher);
    for t in tasks {
        t.id.hash(&mut hasher);
        t.weight.to_bits().hash(&mut hasher);
        t.baseline_end.hash(&mut hasher);
        t.planned_end.hash(&mut hasher);
        t.actual_end.hash(&mut hasher);
        t.completed.hash(&mut hasher);
        t.baseline_start.hash(&mut hasher);
        t.planned_start.hash(&mut hasher);
        t.actual_start.hash(&mut hasher);
    }
    hasher.finish()
}

/// Holds the most recent series and the key it was computed from.
#[derive(Debug, Default)]
pub struct CurveMemo {
    key: Option<u64>,
    series: Vec<DailyProgressPoint>,
    hits: u64,
    misses: u64,
}

impl CurveMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached series for this input, computing it on a key change.
    pub fn get_or_compute(
        &mut self,
        tasks: &[WeightedTask],
        settings: &CurveSettings,
    ) -> &[DailyProgressPoint] {
        let key = input_key(tasks, settings);
        if self.key == Some(key) {
            self.hits += 1;
        } else {
            trace!(key, hits = self.hits, misses = self.misses, "s-curve memo miss");
            self.series = compute_s_curve_with(tasks, settings);
            self.key = Some(key);
            self.misses += 1;
        }
        &self.series
    }

    /// The last computed series, if any.
    pub fn current(&self) -> Option<&[DailyProgressPoint]> {
        self.key.map(|_| self.series.as_slice())
    }

    #[cfg(test)]
    pub fn invalidate(&mut self) {
        self.key = None;
        self.series.clear();
    }

    /// (hits, misses) since creation.
    #[cfg(test)]
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}
