//! # Portfolio Metrics
//!
//! Counts derived from the full set of prototypes on every read.
//! Nothing here is persisted.

use crate::gate;
use crate::{PrototypeView, Status};

// =============================================================================
// STATUS COUNTS
// =============================================================================

/// Number of prototypes in each lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusCounts {
    pub design: usize,
    pub build: usize,
    pub test: usize,
    pub ready: usize,
}

impl StatusCounts {
    /// Count for one status.
    #[must_use]
    pub fn get(&self, status: Status) -> usize {
        match status {
            Status::Design => self.design,
            Status::Build => self.build,
            Status::Test => self.test,
            Status::Ready => self.ready,
        }
    }

    fn bump(&mut self, status: Status) {
        let slot = match status {
            Status::Design => &mut self.design,
            Status::Build => &mut self.build,
            Status::Test => &mut self.test,
            Status::Ready => &mut self.ready,
        };
        *slot = slot.saturating_add(1);
    }
}

// =============================================================================
// PORTFOLIO METRICS
// =============================================================================

/// Snapshot of the whole portfolio.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PortfolioMetrics {
    /// Total number of prototypes.
    pub prototype_count: usize,
    /// Total number of test cases across all prototypes.
    pub test_case_count: usize,
    pub by_status: StatusCounts,
    /// Prototypes in TEST whose current tests would pass the release gate.
    pub releasable: usize,
}

impl PortfolioMetrics {
    /// Compute metrics from read models.
    #[must_use]
    pub fn from_views(views: &[PrototypeView]) -> Self {
        let mut metrics = Self::default();
        for view in views {
            metrics.prototype_count = metrics.prototype_count.saturating_add(1);
            metrics.test_case_count = metrics.test_case_count.saturating_add(view.tests.len());
            metrics.by_status.bump(view.prototype.status);

            if view.prototype.status == Status::Test
                && gate::evaluate(&view.tests, view.readiness).allowed
            {
                metrics.releasable = metrics.releasable.saturating_add(1);
            }
        }
        metrics
    }
}
