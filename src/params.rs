use crate::types::Length;
use std::time::{Duration, Instant};

/// Run configuration threaded by reference through generation and search.
///
/// `min_waste` is the minimum admissible dimension of any waste piece
/// produced between two consecutive parallel cuts. `dominance_tolerance`
/// relaxes the front comparison: coordinates are compared after integer
/// division by the tolerance, so the relation stays transitive. Zero means
/// exact comparison.
#[derive(Debug, Clone)]
pub struct Params {
    pub min_waste: Length,
    pub dominance_tolerance: Length,
    pub time_limit: Option<Duration>,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            min_waste: 20,
            dominance_tolerance: 0,
            time_limit: None,
        }
    }
}

impl Params {
    pub fn with_min_waste(mut self, min_waste: Length) -> Self {
        self.min_waste = min_waste;
        self
    }

    pub fn with_dominance_tolerance(mut self, tolerance: Length) -> Self {
        self.dominance_tolerance = tolerance;
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Deadline for the current run, if a time budget was configured.
    /// The driver checks it between generation calls; the core never blocks.
    pub fn deadline_from(&self, start: Instant) -> Option<Instant> {
        self.time_limit.map(|limit| start + limit)
    }
}
