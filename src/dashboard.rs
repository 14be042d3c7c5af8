//! Dashboard loop - drives the poll/render cycle
//!
//! Each tick fetches one snapshot, surfaces at most one new notification
//! and repaints the page from scratch. Ticks are independent: the timer
//! never waits for a previous tick, so two may be in flight at once. The
//! session state is only borrowed between awaits, never across one.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use tracing::{debug, error, warn};

use crate::client::DashboardApi;
use crate::config::DashboardConfig;
use crate::config_sync::ConfigSync;
use crate::dom::{ConfigForm, Surface};
use crate::error::Result;
use crate::notifications::NotificationTracker;
use crate::render::{Frame, toast_header_class};
use crate::types::StatusSnapshot;

/// Client-local state for the lifetime of the page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    /// Mirror of the last observed `running`
    pub is_running: bool,
    pub notifications: NotificationTracker,
}

/// What a tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Snapshot fetched and painted
    Rendered,
    /// Fetch failed; the previous render stays on screen
    Skipped,
}

/// Process-wide driver owning the session state
pub struct Dashboard<A, S> {
    api: A,
    surface: S,
    config: DashboardConfig,
    session: RefCell<SessionState>,
}

impl<A, S> Dashboard<A, S>
where
    A: DashboardApi,
    S: Surface + ConfigForm,
{
    pub fn new(api: A, surface: S, config: DashboardConfig) -> Self {
        Self {
            api,
            surface,
            config,
            session: RefCell::new(SessionState::default()),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Copy of the current session state
    pub fn session(&self) -> SessionState {
        self.session.borrow().clone()
    }

    /// One poll/render cycle. Never fails: fetch errors are logged and the
    /// page is left untouched.
    pub async fn tick(&self) -> TickOutcome {
        match self.api.fetch_status().await {
            Ok(snapshot) => {
                self.reconcile(&snapshot);
                TickOutcome::Rendered
            }
            Err(e) if e.is_transient() => {
                warn!(error = %e, "status poll failed, keeping previous render");
                TickOutcome::Skipped
            }
            Err(e) => {
                error!(error = %e, "status poll failed unexpectedly, keeping previous render");
                TickOutcome::Skipped
            }
        }
    }

    /// Apply one snapshot: notification first, then the full repaint
    pub fn reconcile(&self, snapshot: &StatusSnapshot) {
        let mut session = self.session.borrow_mut();

        if let Some(notification) = session.notifications.consider(snapshot) {
            debug!(time = notification.time, "new notification");
            if let Err(e) = self
                .surface
                .show_toast(&notification.msg, toast_header_class(notification.kind))
            {
                error!(error = %e, "failed to show toast");
            }
        }

        let frame = Frame::render(snapshot, self.config.max_log_lines);
        session.is_running = frame.power.is_running();
        if let Err(e) = frame.paint(&self.surface) {
            error!(error = %e, "failed to paint snapshot");
        }
    }

    /// Flip the bot on/off, then refresh without waiting for the timer
    pub async fn toggle(&self) -> Result<TickOutcome> {
        let is_running = self.session.borrow().is_running;
        ConfigSync::new(&self.api, &self.surface).toggle(is_running).await?;
        Ok(self.tick().await)
    }

    pub async fn save(&self) -> Result<()> {
        ConfigSync::new(&self.api, &self.surface).save().await
    }

    /// Hydrate the settings form. Failures are logged only.
    pub async fn load(&self) {
        if let Err(e) = ConfigSync::new(&self.api, &self.surface).load().await {
            warn!(error = %e, "failed to load saved configuration");
        }
    }
}

impl<A, S> Dashboard<A, S>
where
    A: DashboardApi + 'static,
    S: Surface + ConfigForm + 'static,
{
    /// Page startup: the first poll and the form hydration go to `spawn` as
    /// two separate tasks, so a stalled status request never holds back the
    /// settings form.
    pub fn boot<F>(self: &Rc<Self>, mut spawn: F)
    where
        F: FnMut(Pin<Box<dyn Future<Output = ()>>>),
    {
        let dashboard = Rc::clone(self);
        spawn(Box::pin(async move {
            let _ = dashboard.tick().await;
        }));

        let dashboard = Rc::clone(self);
        spawn(Box::pin(async move {
            dashboard.load().await;
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{MemoryDom, ids};
    use crate::error::DashboardError;
    use crate::types::{Ack, ConfigState, MarketBoard, Notification, NotificationKind};
    use std::collections::VecDeque;

    struct ScriptedApi {
        statuses: RefCell<VecDeque<Result<StatusSnapshot>>>,
        reject_submit: bool,
    }

    impl ScriptedApi {
        fn new(statuses: Vec<Result<StatusSnapshot>>) -> Self {
            Self {
                statuses: RefCell::new(statuses.into()),
                reject_submit: false,
            }
        }
    }

    impl DashboardApi for ScriptedApi {
        async fn fetch_status(&self) -> Result<StatusSnapshot> {
            self.statuses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(DashboardError::Network("exhausted".into())))
        }

        async fn fetch_config(&self) -> Result<ConfigState> {
            Ok(ConfigState::default())
        }

        async fn submit_config(&self, _update: &ConfigState) -> Result<Ack> {
            if self.reject_submit {
                return Err(DashboardError::Network("HTTP 500 Internal Server Error: boom".into()));
            }
            Ok(Ack::default())
        }
    }

    fn snapshot(running: bool, note_time: Option<f64>) -> StatusSnapshot {
        StatusSnapshot {
            balance: 50.0,
            total_profit: 1.0,
            daily_profit: -2.0,
            connected: false,
            running,
            notifications: note_time
                .map(|time| Notification {
                    time,
                    msg: "VENDA".into(),
                    kind: NotificationKind::Info,
                })
                .into_iter()
                .collect(),
            market_data: MarketBoard::new(),
            logs: vec!["boot".into()],
        }
    }

    #[tokio::test]
    async fn test_tick_renders_and_mirrors_running() {
        let api = ScriptedApi::new(vec![Ok(snapshot(true, Some(10.0)))]);
        let dashboard = Dashboard::new(api, MemoryDom::new(), DashboardConfig::default());

        assert_eq!(dashboard.tick().await, TickOutcome::Rendered);

        let session = dashboard.session();
        assert!(session.is_running);
        assert_eq!(session.notifications.last_time(), 10.0);

        let dom = dashboard.surface();
        assert_eq!(dom.element(ids::BALANCE).text, "$50.00");
        assert_eq!(dom.element(ids::DAILY_PROFIT).class, "text-danger");
        assert_eq!(dom.toasts().len(), 1);
        assert_eq!(dom.toasts()[0].header_class, "toast-header bg-info text-dark");
    }

    #[tokio::test]
    async fn test_failed_tick_leaves_page_alone() {
        let api = ScriptedApi::new(vec![
            Ok(snapshot(true, Some(1.0))),
            Err(DashboardError::Network("connection refused".into())),
        ]);
        let dashboard = Dashboard::new(api, MemoryDom::new(), DashboardConfig::default());

        dashboard.tick().await;
        let before = dashboard.surface().elements();
        let session = dashboard.session();

        assert_eq!(dashboard.tick().await, TickOutcome::Skipped);
        assert_eq!(dashboard.surface().elements(), before);
        assert_eq!(dashboard.session(), session);
    }

    #[tokio::test]
    async fn test_toggle_forces_refresh() {
        let api = ScriptedApi::new(vec![Ok(snapshot(false, None)), Ok(snapshot(true, None))]);
        let dashboard = Dashboard::new(api, MemoryDom::new(), DashboardConfig::default());

        dashboard.tick().await;
        assert!(!dashboard.session().is_running);

        let outcome = dashboard.toggle().await.expect("toggle should succeed");
        assert_eq!(outcome, TickOutcome::Rendered);
        assert!(dashboard.session().is_running);
    }

    #[tokio::test]
    async fn test_failed_toggle_skips_refresh() {
        let mut api = ScriptedApi::new(vec![Ok(snapshot(false, None)), Ok(snapshot(true, None))]);
        api.reject_submit = true;
        let dashboard = Dashboard::new(api, MemoryDom::new(), DashboardConfig::default());

        dashboard.tick().await;
        let before = dashboard.surface().elements();

        assert!(matches!(dashboard.toggle().await, Err(DashboardError::Network(_))));
        assert!(!dashboard.session().is_running);
        assert_eq!(dashboard.surface().elements(), before);
        assert_eq!(dashboard.api.statuses.borrow().len(), 1);
    }
}
