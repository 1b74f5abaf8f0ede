//! Monitoring service orchestrating polling, the report store, and the
//! notification queue
//!
//! One repeating timer drives the report and weather fetches. Fetch
//! failures are swallowed after logging; stale data stays visible until
//! the next successful tick. Overlapping ticks are permitted and the last
//! `replace_all` wins, which can revert a stale response over a fresher
//! one when requests complete out of order. Known limitation of a
//! monitoring view.

use crate::{
    config::MonitorConfig,
    notify::{NotificationKind, NotificationQueue},
    stats::{self, Stats},
    store::ReportStore,
};
use chrono::Utc;
use floodwatch_client::{ReportsClient, WeatherClient, WeatherSnapshot};
use floodwatch_core::{Report, ReportId, ReportStatus, Result};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::{
    sync::{Notify, broadcast},
    task::JoinHandle,
    time::interval,
};
use tracing::{debug, info, instrument, warn};

/// Task handles type alias
type TaskHandles = Arc<RwLock<Vec<JoinHandle<()>>>>;

/// Service status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ServiceStatus {
    /// Service is stopped
    #[default]
    Stopped,

    /// Service is starting up
    Starting,

    /// Service is running normally
    Running,

    /// Service is shutting down
    Stopping,
}

/// Poll cycle state
///
/// Every tick transitions `Idle -> Fetching -> Idle`; no path may leave
/// the state stuck in `Fetching`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PollState {
    /// Waiting for the next timer tick
    #[default]
    Idle,

    /// A fetch cycle is in flight
    Fetching,
}

/// Shared pieces each poll tick operates on
#[derive(Clone)]
struct PollContext {
    store: Arc<ReportStore>,
    notifications: Arc<NotificationQueue>,
    reports_client: ReportsClient,
    weather_client: WeatherClient,
    weather: Arc<RwLock<WeatherSnapshot>>,
    poll_state: Arc<RwLock<PollState>>,
}

/// Main monitoring service
pub struct MonitorService {
    /// Service configuration
    config: MonitorConfig,

    /// Shared report store
    store: Arc<ReportStore>,

    /// Notification queue
    notifications: Arc<NotificationQueue>,

    /// Latest weather snapshot
    weather: Arc<RwLock<WeatherSnapshot>>,

    /// Backend client used by ticks and the resolution command
    reports_client: ReportsClient,

    /// Weather feed client
    weather_client: WeatherClient,

    /// Poll cycle state
    poll_state: Arc<RwLock<PollState>>,

    /// Statistics recomputed on every store event
    stats: Arc<RwLock<Stats>>,

    /// Running task handles
    task_handles: TaskHandles,

    /// Shutdown sender (for broadcasting shutdown)
    shutdown_tx: broadcast::Sender<()>,

    /// Shutdown signal for external waiters
    shutdown_notify: Arc<Notify>,

    /// Service status
    status: Arc<RwLock<ServiceStatus>>,
}

impl std::fmt::Debug for MonitorService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorService")
            .field("service_name", &self.config.service.service_name)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

impl MonitorService {
    /// Create a new monitoring service
    ///
    /// # Errors
    ///
    /// Returns an error if configuration validation fails or an HTTP
    /// client cannot be constructed.
    pub fn new(config: MonitorConfig) -> Result<Self> {
        config.validate()?;

        let timeout = config.app.api.request_timeout();
        let reports_client = ReportsClient::new(config.app.api.base_url.clone(), timeout)?;
        let weather_client = WeatherClient::new(config.app.weather.clone(), timeout)?;

        let notifications = Arc::new(NotificationQueue::new(
            config.notifications.ttl(),
            config.notifications.visible_limit,
        ));
        let (shutdown_tx, _) = broadcast::channel(1);

        info!(
            service = %config.service.service_name,
            base_url = %config.app.api.base_url,
            "monitoring service initialized"
        );

        Ok(Self {
            config,
            store: Arc::new(ReportStore::new()),
            notifications,
            weather: Arc::new(RwLock::new(WeatherSnapshot::unavailable())),
            reports_client,
            weather_client,
            poll_state: Arc::new(RwLock::new(PollState::Idle)),
            stats: Arc::new(RwLock::new(Stats::default())),
            task_handles: Arc::new(RwLock::new(Vec::new())),
            shutdown_tx,
            shutdown_notify: Arc::new(Notify::new()),
            status: Arc::new(RwLock::new(ServiceStatus::Stopped)),
        })
    }

    /// Start the polling and expiry-sweep tasks
    ///
    /// # Errors
    ///
    /// Returns [`floodwatch_core::Error::ServiceAlreadyRunning`] if the
    /// service is not stopped.
    #[instrument(skip(self))]
    pub fn start(&self) -> Result<()> {
        {
            let mut status = self.status.write();
            if *status != ServiceStatus::Stopped {
                return Err(floodwatch_core::Error::ServiceAlreadyRunning);
            }
            *status = ServiceStatus::Starting;
        }

        info!("starting monitoring service");

        let mut handles = self.task_handles.write();
        handles.push(self.spawn_poll_task());
        handles.push(self.spawn_sweep_task());
        handles.push(self.spawn_stats_task());
        drop(handles);

        *self.status.write() = ServiceStatus::Running;

        info!(
            poll_interval_seconds = self.config.poll.poll_interval_seconds,
            "monitoring service started"
        );
        Ok(())
    }

    /// Stop the service, waiting up to the configured shutdown timeout
    #[instrument(skip(self))]
    pub async fn stop(&self) {
        {
            let mut status = self.status.write();
            if *status == ServiceStatus::Stopped {
                return;
            }
            *status = ServiceStatus::Stopping;
        }

        info!("stopping monitoring service");

        let _ = self.shutdown_tx.send(());
        self.shutdown_notify.notify_waiters();

        let handles: Vec<JoinHandle<()>> = self.task_handles.write().drain(..).collect();
        let shutdown = tokio::time::timeout(self.config.service.shutdown_timeout(), async {
            for handle in handles {
                let _ = handle.await;
            }
        })
        .await;

        if shutdown.is_err() {
            warn!("service shutdown timed out, some tasks may still be running");
        }

        *self.status.write() = ServiceStatus::Stopped;
        info!("monitoring service stopped");
    }

    /// Get service status
    #[must_use]
    pub fn status(&self) -> ServiceStatus {
        *self.status.read()
    }

    /// Get poll cycle state
    #[must_use]
    pub fn poll_state(&self) -> PollState {
        *self.poll_state.read()
    }

    /// Shared report store
    #[must_use]
    pub fn store(&self) -> Arc<ReportStore> {
        Arc::clone(&self.store)
    }

    /// Notification queue
    #[must_use]
    pub fn notifications(&self) -> Arc<NotificationQueue> {
        Arc::clone(&self.notifications)
    }

    /// Latest weather snapshot
    #[must_use]
    pub fn weather(&self) -> WeatherSnapshot {
        self.weather.read().clone()
    }

    /// Statistics as of the last store event
    ///
    /// Kept current by a subscriber task while the service runs; callers
    /// needing point-in-time numbers outside a running service can use
    /// [`stats::compute`] directly.
    #[must_use]
    pub fn stats(&self) -> Stats {
        self.stats.read().clone()
    }

    /// Run one fetch-and-reconcile cycle out of schedule
    pub async fn refresh(&self) {
        Self::poll_tick(&self.poll_context()).await;
    }

    /// Resolve one report via the backend and reconcile local state
    ///
    /// On success the report flips to resolved in the all-time view,
    /// leaves the active view, and a success notification is pushed. On
    /// failure nothing changes locally and the error propagates to the
    /// caller.
    ///
    /// # Errors
    ///
    /// Returns the backend error unchanged when the mutation fails.
    #[instrument(skip(self))]
    pub async fn resolve(&self, id: ReportId) -> Result<()> {
        self.reports_client.resolve(id).await?;

        self.store.patch_status(id, ReportStatus::Resolved);
        self.notifications
            .push("Incident marked as Resolved", NotificationKind::Success);

        info!(report_id = id, "incident resolved");
        Ok(())
    }

    /// Wait for shutdown signal
    pub async fn wait_for_shutdown(&self) {
        self.shutdown_notify.notified().await;
    }

    fn poll_context(&self) -> PollContext {
        PollContext {
            store: Arc::clone(&self.store),
            notifications: Arc::clone(&self.notifications),
            reports_client: self.reports_client.clone(),
            weather_client: self.weather_client.clone(),
            weather: Arc::clone(&self.weather),
            poll_state: Arc::clone(&self.poll_state),
        }
    }

    /// Spawn the repeating poll task
    fn spawn_poll_task(&self) -> JoinHandle<()> {
        let ctx = self.poll_context();
        let period = self.config.poll.poll_interval();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            let mut timer = interval(period);
            loop {
                tokio::select! {
                    _ = timer.tick() => {
                        Self::poll_tick(&ctx).await;
                    }
                    _ = shutdown_rx.recv() => {
                        debug!("poll task shutting down");
                        break;
                    }
                }
            }
        })
    }

    /// Spawn the store subscriber that recomputes statistics
    ///
    /// Statistics follow store events, not a render or poll cycle.
    fn spawn_stats_task(&self) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        let stats = Arc::clone(&self.stats);
        let mut events = self.store.subscribe();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    event = events.recv() => {
                        match event {
                            Ok(_) => {
                                let computed = stats::compute(&store.all_reports(), Utc::now());
                                *stats.write() = computed;
                            }
                            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                                debug!(skipped, "stats subscriber lagged, recomputing");
                                let computed = stats::compute(&store.all_reports(), Utc::now());
                                *stats.write() = computed;
                            }
                            Err(broadcast::error::RecvError::Closed) => break,
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        debug!("stats subscriber shutting down");
                        break;
                    }
                }
            }
        })
    }

    /// Spawn the notification expiry sweeper
    fn spawn_sweep_task(&self) -> JoinHandle<()> {
        let notifications = Arc::clone(&self.notifications);
        let period = self.config.notifications.sweep_interval();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            let mut timer = interval(period);
            loop {
                tokio::select! {
                    _ = timer.tick() => {
                        notifications.purge_expired(Utc::now());
                    }
                    _ = shutdown_rx.recv() => {
                        debug!("notification sweeper shutting down");
                        break;
                    }
                }
            }
        })
    }

    /// One fetch-and-reconcile cycle
    ///
    /// The report fetch and the weather fetch are independent; weather
    /// failure only degrades the snapshot. The state always returns to
    /// `Idle`, on every path.
    async fn poll_tick(ctx: &PollContext) {
        *ctx.poll_state.write() = PollState::Fetching;

        match ctx.reports_client.fetch_reports().await {
            Ok(reports) => {
                // The replace happens-before the critical check within a tick
                ctx.store.replace_all(reports);
                let new_criticals = count_new_criticals(&ctx.store.active_reports());

                if new_criticals > 0 {
                    ctx.notifications.push(
                        format!("{new_criticals} new critical incidents"),
                        NotificationKind::Critical,
                    );
                }
            }
            Err(error) => {
                // Stale data stays visible until the next successful tick
                warn!(%error, "report fetch failed, keeping stale data");
            }
        }

        let snapshot = ctx.weather_client.fetch_or_unavailable().await;
        *ctx.weather.write() = snapshot;

        *ctx.poll_state.write() = PollState::Idle;
    }
}

/// Active critical reports created within the recent window
fn count_new_criticals(reports: &[Report]) -> usize {
    let now = Utc::now();
    reports
        .iter()
        .filter(|r| {
            r.is_active()
                && r.criticality == floodwatch_core::Criticality::Critical
                && r.is_recent(now)
        })
        .count()
}

impl Drop for MonitorService {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(());
        self.shutdown_notify.notify_waiters();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MonitorConfig;
    use chrono::SecondsFormat;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> MonitorConfig {
        let mut config = MonitorConfig::default();
        config.app.api.base_url = server.uri();
        config.app.weather.endpoint = format!("{}/v1/forecast", server.uri());
        config
    }

    fn backend_report(id: i64, criticality: &str, status: &str, timestamp: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "district": "Colombo",
            "location": format!("site {id}"),
            "type": "Bridge Damage",
            "criticality": criticality,
            "status": status,
            "latitude": 6.9,
            "longitude": 79.8,
            "timestamp": timestamp,
        })
    }

    fn recent_timestamp() -> String {
        (Utc::now() - chrono::Duration::hours(1))
            .to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    fn old_timestamp() -> String {
        (Utc::now() - chrono::Duration::days(3))
            .to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    async fn mock_weather_failure(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(500))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_tick_replaces_store_and_detects_new_criticals() {
        let server = MockServer::start().await;
        mock_weather_failure(&server).await;

        Mock::given(method("GET"))
            .and(path("/api/reports"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                backend_report(1, "critical", "active", &recent_timestamp()),
                backend_report(2, "critical", "active", &recent_timestamp()),
                backend_report(3, "critical", "active", &old_timestamp()),
                backend_report(4, "high", "active", &recent_timestamp()),
                backend_report(5, "critical", "resolved", &recent_timestamp()),
            ])))
            .mount(&server)
            .await;

        let service = MonitorService::new(config_for(&server)).unwrap();
        service.refresh().await;

        assert_eq!(service.store().all_reports().len(), 5);
        assert_eq!(service.store().active_reports().len(), 4);
        assert_eq!(service.poll_state(), PollState::Idle);

        // Two recent critical actives -> one notification mentioning "2"
        let visible = service.notifications().visible(Utc::now());
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].kind, NotificationKind::Critical);
        assert!(visible[0].message.contains('2'));
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_stale_data() {
        let server = MockServer::start().await;
        mock_weather_failure(&server).await;

        let reports_mock = Mock::given(method("GET"))
            .and(path("/api/reports"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                backend_report(1, "medium", "active", &old_timestamp()),
            ])))
            .up_to_n_times(1)
            .mount_as_scoped(&server)
            .await;

        let service = MonitorService::new(config_for(&server)).unwrap();
        service.refresh().await;
        assert_eq!(service.store().all_reports().len(), 1);
        drop(reports_mock);

        // Next tick fails (no mock left); stale data must remain
        Mock::given(method("GET"))
            .and(path("/api/reports"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        service.refresh().await;
        assert_eq!(service.store().all_reports().len(), 1);
        assert_eq!(service.poll_state(), PollState::Idle);
    }

    #[tokio::test]
    async fn test_weather_failure_degrades_independently() {
        let server = MockServer::start().await;
        mock_weather_failure(&server).await;

        Mock::given(method("GET"))
            .and(path("/api/reports"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let service = MonitorService::new(config_for(&server)).unwrap();
        service.refresh().await;

        assert_eq!(service.weather().condition, "Unavailable");
        // Report polling was unaffected
        assert!(service.store().last_update().is_some());
    }

    #[tokio::test]
    async fn test_resolve_success_reconciles_and_notifies() {
        let server = MockServer::start().await;
        mock_weather_failure(&server).await;

        Mock::given(method("GET"))
            .and(path("/api/reports"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                backend_report(7, "high", "active", &old_timestamp()),
                backend_report(8, "medium", "active", &old_timestamp()),
            ])))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/api/reports/7/resolve"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let service = MonitorService::new(config_for(&server)).unwrap();
        service.refresh().await;

        service.resolve(7).await.unwrap();

        let active: Vec<i64> = service
            .store()
            .active_reports()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(active, vec![8]);

        let resolved = service
            .store()
            .all_reports()
            .into_iter()
            .find(|r| r.id == 7)
            .unwrap();
        assert_eq!(resolved.status, ReportStatus::Resolved);

        let visible = service.notifications().visible(Utc::now());
        assert!(
            visible
                .iter()
                .any(|n| n.kind == NotificationKind::Success
                    && n.message == "Incident marked as Resolved")
        );
    }

    #[tokio::test]
    async fn test_resolve_failure_leaves_state_untouched() {
        let server = MockServer::start().await;
        mock_weather_failure(&server).await;

        Mock::given(method("GET"))
            .and(path("/api/reports"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                backend_report(7, "high", "active", &old_timestamp()),
            ])))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/api/reports/7/resolve"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let service = MonitorService::new(config_for(&server)).unwrap();
        service.refresh().await;

        let err = service.resolve(7).await.unwrap_err();
        assert!(matches!(err, floodwatch_core::Error::Api { status: 500, .. }));

        // Both views unchanged, no success notification
        assert_eq!(service.store().active_reports().len(), 1);
        let report = service
            .store()
            .all_reports()
            .into_iter()
            .find(|r| r.id == 7)
            .unwrap();
        assert_eq!(report.status, ReportStatus::Active);
        assert!(
            service
                .notifications()
                .visible(Utc::now())
                .iter()
                .all(|n| n.kind != NotificationKind::Success)
        );
    }

    #[tokio::test]
    async fn test_stats_follow_store_events() {
        let server = MockServer::start().await;
        mock_weather_failure(&server).await;

        Mock::given(method("GET"))
            .and(path("/api/reports"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                backend_report(1, "medium", "active", &old_timestamp()),
                backend_report(2, "medium", "resolved", &old_timestamp()),
            ])))
            .mount(&server)
            .await;

        let service = MonitorService::new(config_for(&server)).unwrap();
        service.start().unwrap();
        service.refresh().await;

        // The subscriber task picks the store event up asynchronously
        let mut observed = Stats::default();
        for _ in 0..100 {
            observed = service.stats();
            if observed.total == 2 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        assert_eq!(observed.total, 2);
        assert_eq!(observed.resolved, 1);
        assert_eq!(observed.completion_rate, 50);

        service.stop().await;
    }

    #[tokio::test]
    async fn test_start_twice_is_rejected() {
        let server = MockServer::start().await;
        let service = MonitorService::new(config_for(&server)).unwrap();

        service.start().unwrap();
        assert_eq!(service.status(), ServiceStatus::Running);

        let err = service.start().unwrap_err();
        assert!(matches!(
            err,
            floodwatch_core::Error::ServiceAlreadyRunning
        ));

        service.stop().await;
        assert_eq!(service.status(), ServiceStatus::Stopped);
    }

    #[tokio::test]
    async fn test_stop_when_stopped_is_noop() {
        let server = MockServer::start().await;
        let service = MonitorService::new(config_for(&server)).unwrap();
        service.stop().await;
        assert_eq!(service.status(), ServiceStatus::Stopped);
    }
}
