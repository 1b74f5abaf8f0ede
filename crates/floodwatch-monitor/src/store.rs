//! Report store holding the all-time and active views
//!
//! The store is the only shared mutable resource in the engine. It is
//! mutated exclusively through [`ReportStore::replace_all`] and
//! [`ReportStore::patch_status`]; every successful mutation publishes a
//! [`StoreEvent`] so derived views recompute without being polled.

use chrono::{DateTime, Utc};
use floodwatch_core::{Report, ReportId, ReportStatus};
use parking_lot::RwLock;
use tokio::sync::broadcast;

/// Change event published after a store mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// Both views were replaced wholesale by a poll tick
    Replaced {
        /// Number of reports in the new all-time view
        total: usize,
    },

    /// One report's status changed
    Patched {
        /// Identifier of the patched report
        id: ReportId,
    },
}

/// Thread-safe store for the latest known report collection
#[derive(Debug)]
pub struct ReportStore {
    all_time: RwLock<Vec<Report>>,
    active: RwLock<Vec<Report>>,
    last_update: RwLock<Option<DateTime<Utc>>>,
    events: broadcast::Sender<StoreEvent>,
}

impl Default for ReportStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            all_time: RwLock::new(Vec::new()),
            active: RwLock::new(Vec::new()),
            last_update: RwLock::new(None),
            events,
        }
    }

    /// Subscribe to store change events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Atomically replace both views with a freshly fetched collection
    ///
    /// The active view is recomputed as the non-resolved subset, so it is
    /// always a pure filter of the all-time view.
    pub fn replace_all(&self, reports: Vec<Report>) {
        let active: Vec<Report> = reports.iter().filter(|r| r.is_active()).cloned().collect();
        let total = reports.len();

        {
            let mut all_time = self.all_time.write();
            let mut active_view = self.active.write();
            *all_time = reports;
            *active_view = active;
            *self.last_update.write() = Some(Utc::now());
        }

        tracing::debug!(total, "report store replaced");
        let _ = self.events.send(StoreEvent::Replaced { total });
    }

    /// Update one report's status in place
    ///
    /// The report is removed from the active view when the new status is
    /// resolved. An unknown id is a no-op and publishes no event.
    pub fn patch_status(&self, id: ReportId, status: ReportStatus) {
        {
            let mut all_time = self.all_time.write();
            let mut active_view = self.active.write();

            let Some(report) = all_time.iter_mut().find(|r| r.id == id) else {
                return;
            };
            report.status = status.clone();

            if status.is_resolved() {
                active_view.retain(|r| r.id != id);
            } else if let Some(active_report) = active_view.iter_mut().find(|r| r.id == id) {
                active_report.status = status;
            }
        }

        tracing::debug!(report_id = id, "report status patched");
        let _ = self.events.send(StoreEvent::Patched { id });
    }

    /// Snapshot of the all-time view
    #[must_use]
    pub fn all_reports(&self) -> Vec<Report> {
        self.all_time.read().clone()
    }

    /// Snapshot of the active view
    #[must_use]
    pub fn active_reports(&self) -> Vec<Report> {
        self.active.read().clone()
    }

    /// When the store last accepted a wholesale replace
    #[must_use]
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        *self.last_update.read()
    }
}
