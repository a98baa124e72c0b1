//! Reliability state machine deciding which path shows the global actions
//! menu.
//!
//! All state lives in a single tokio task. Requests, primary surface
//! notifications, fallback dismissals and timeout expiries are messages on
//! one unbounded queue, so they are applied strictly in arrival order and
//! never concurrently.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::config::Config;
use crate::config::ReentryPolicy;
use crate::error::CoordinatorError;
use crate::fallback::DismissCallback;
use crate::fallback::FallbackFactory;
use crate::fallback::FallbackPresenter;
use crate::primary::GlobalActionsListener;
use crate::primary::PrimarySurface;
use crate::session::Phase;
use crate::session::SessionSnapshot;
use crate::session::SessionState;

/// How long the primary surface has to confirm it is showing the menu before
/// the fallback takes over.
pub const SHOW_TIMEOUT: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinatorOptions {
    pub reentry: ReentryPolicy,
}

impl From<&Config> for CoordinatorOptions {
    fn from(config: &Config) -> Self {
        Self {
            reentry: config.reentry,
        }
    }
}

#[derive(Debug)]
enum Message {
    RequestShow {
        keyguard_showing: bool,
        device_provisioned: bool,
    },
    PrimaryShown,
    PrimaryDismissed,
    PrimaryConnectivityChanged(bool),
    FallbackDismissed,
    ShowTimeout {
        generation: u64,
    },
    Snapshot(oneshot::Sender<SessionSnapshot>),
    Shutdown,
}

struct PendingTimeout {
    generation: u64,
    task: JoinHandle<()>,
}

/// Owner of the session state. Constructed through [`Coordinator::spawn`]
/// and only reachable via [`CoordinatorHandle`] afterwards.
pub struct Coordinator {
    state: SessionState,
    primary: Option<Arc<dyn PrimarySurface>>,
    factory: Box<dyn FallbackFactory>,
    fallback: Option<Box<dyn FallbackPresenter>>,
    pending_timeout: Option<PendingTimeout>,
    next_generation: u64,
    reentry: ReentryPolicy,
    // Weak so that timers and the fallback callback do not keep the task
    // alive once every handle is gone.
    tx: mpsc::WeakUnboundedSender<Message>,
}

impl Coordinator {
    /// Starts the coordinator task on the current tokio runtime.
    ///
    /// `primary` is `None` on devices without a primary surface; every show
    /// request then goes straight to the fallback. When present, the surface
    /// gets a listener that feeds the same queue as the returned handle but
    /// does not keep the task alive.
    pub fn spawn(
        primary: Option<Arc<dyn PrimarySurface>>,
        factory: Box<dyn FallbackFactory>,
        options: CoordinatorOptions,
    ) -> CoordinatorHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = CoordinatorHandle { tx };

        if let Some(surface) = &primary {
            surface.set_global_actions_listener(Arc::new(PrimaryListener {
                tx: handle.tx.downgrade(),
            }));
        } else {
            info!("no primary surface available; global actions will use the fallback");
        }

        let coordinator = Self {
            state: SessionState::default(),
            primary,
            factory,
            fallback: None,
            pending_timeout: None,
            next_generation: 0,
            reentry: options.reentry,
            tx: handle.tx.downgrade(),
        };
        tokio::spawn(coordinator.run(rx));

        handle
    }

    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Message>) {
        while let Some(message) = rx.recv().await {
            if self.handle_message(message).is_break() {
                break;
            }
        }
        self.disarm_timeout();
        debug!("global actions coordinator stopped");
    }

    fn handle_message(&mut self, message: Message) -> ControlFlow<()> {
        match message {
            Message::RequestShow {
                keyguard_showing,
                device_provisioned,
            } => self.request_show(keyguard_showing, device_provisioned),
            Message::PrimaryShown => self.on_primary_shown(),
            Message::PrimaryDismissed => self.on_dismissed("primary"),
            Message::PrimaryConnectivityChanged(connected) => {
                self.on_primary_connectivity_changed(connected)
            }
            Message::FallbackDismissed => self.on_dismissed("fallback"),
            Message::ShowTimeout { generation } => self.on_show_timeout(generation),
            Message::Snapshot(reply) => {
                // The caller may have given up waiting.
                let _ = reply.send(self.snapshot());
            }
            Message::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    fn request_show(&mut self, keyguard_showing: bool, device_provisioned: bool) {
        debug!(
            keyguard_showing,
            device_provisioned,
            phase = %self.state.phase,
            "show global actions requested"
        );
        if self.state.showing && self.reentry == ReentryPolicy::Ignore {
            debug!("global actions already showing; ignoring request");
            return;
        }

        self.state.begin(keyguard_showing, device_provisioned);

        let primary = if self.state.primary_connected {
            self.primary.clone()
        } else {
            None
        };
        match primary {
            Some(surface) => {
                surface.show_global_actions();
                self.arm_timeout();
                self.state.phase = Phase::AwaitingPrimary;
            }
            None => self.show_fallback(),
        }
    }

    fn on_primary_shown(&mut self) {
        debug!(phase = %self.state.phase, "primary surface showing global actions");
        self.disarm_timeout();
        if self.state.phase == Phase::AwaitingPrimary {
            self.state.phase = Phase::ShowingPrimary;
        }
    }

    fn on_dismissed(&mut self, source: &str) {
        self.disarm_timeout();
        if self.state.end() {
            debug!(source, "global actions dismissed");
        } else {
            debug!(source, "dismissal without an active session; ignoring");
        }
    }

    fn on_primary_connectivity_changed(&mut self, connected: bool) {
        debug!(connected, phase = %self.state.phase, "primary surface connectivity changed");
        if connected && self.primary.is_none() {
            warn!("connectivity reported without a primary surface; staying disconnected");
            return;
        }
        self.state.primary_connected = connected;

        if !connected && self.state.showing {
            if self.state.phase == Phase::ShowingFallback {
                debug!("fallback already showing; nothing to recover");
                return;
            }
            info!("primary surface died while showing global actions; showing fallback");
            self.show_fallback();
        }
    }

    fn on_show_timeout(&mut self, generation: u64) {
        match &self.pending_timeout {
            Some(pending) if pending.generation == generation => {
                self.pending_timeout = None;
            }
            _ => {
                debug!(generation, "ignoring stale show timeout");
                return;
            }
        }
        info!(
            "primary surface did not show global actions within {}ms; showing fallback",
            SHOW_TIMEOUT.as_millis()
        );
        self.show_fallback();
    }

    fn show_fallback(&mut self) {
        self.disarm_timeout();

        let tx = self.tx.clone();
        let factory = &mut self.factory;
        let presenter = self.fallback.get_or_insert_with(|| {
            debug!("creating fallback presenter");
            factory.create(DismissCallback::new(move || {
                if let Some(tx) = tx.upgrade() {
                    let _ = tx.send(Message::FallbackDismissed);
                }
            }))
        });
        presenter.show(self.state.keyguard_showing, self.state.device_provisioned);

        self.state.phase = Phase::ShowingFallback;
    }

    fn arm_timeout(&mut self) {
        self.disarm_timeout();
        self.next_generation += 1;
        let generation = self.next_generation;

        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(SHOW_TIMEOUT).await;
            if let Some(tx) = tx.upgrade() {
                let _ = tx.send(Message::ShowTimeout { generation });
            }
        });
        self.pending_timeout = Some(PendingTimeout { generation, task });
    }

    fn disarm_timeout(&mut self) {
        if let Some(pending) = self.pending_timeout.take() {
            pending.task.abort();
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            keyguard_showing: self.state.keyguard_showing,
            device_provisioned: self.state.device_provisioned,
            showing: self.state.showing,
            primary_connected: self.state.primary_connected,
            phase: self.state.phase,
            timeout_armed: self.pending_timeout.is_some(),
            fallback_created: self.fallback.is_some(),
        }
    }
}

/// Cheap, cloneable entry point into a running [`Coordinator`].
///
/// Every method only enqueues a message and returns immediately.
#[derive(Clone, Debug)]
pub struct CoordinatorHandle {
    tx: mpsc::UnboundedSender<Message>,
}

impl CoordinatorHandle {
    /// Shows the global actions menu through whichever path is available.
    /// Never fails from the caller's point of view.
    pub fn request_show(&self, keyguard_showing: bool, device_provisioned: bool) {
        self.send(Message::RequestShow {
            keyguard_showing,
            device_provisioned,
        });
    }

    /// Returns the state after every message enqueued before this call has
    /// been applied.
    pub async fn snapshot(&self) -> Result<SessionSnapshot, CoordinatorError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Message::Snapshot(reply_tx))
            .map_err(|_| CoordinatorError::Closed)?;
        reply_rx.await.map_err(|_| CoordinatorError::Closed)
    }

    /// Stops the coordinator after the messages already queued.
    pub fn shutdown(&self) {
        self.send(Message::Shutdown);
    }

    fn send(&self, message: Message) {
        if let Err(err) = self.tx.send(message) {
            warn!("global actions coordinator is gone; dropping {:?}", err.0);
        }
    }
}

/// Listener registered with the primary surface. Holds a weak sender because
/// the coordinator owns the surface that owns this listener.
struct PrimaryListener {
    tx: mpsc::WeakUnboundedSender<Message>,
}

impl PrimaryListener {
    fn send(&self, message: Message) {
        match self.tx.upgrade() {
            Some(tx) => {
                let _ = tx.send(message);
            }
            None => debug!("global actions coordinator is gone; dropping {message:?}"),
        }
    }
}

impl GlobalActionsListener for PrimaryListener {
    fn on_global_actions_shown(&self) {
        self.send(Message::PrimaryShown);
    }

    fn on_global_actions_dismissed(&self) {
        self.send(Message::PrimaryDismissed);
    }

    fn on_status_bar_connected_changed(&self, connected: bool) {
        self.send(Message::PrimaryConnectivityChanged(connected));
    }
}

impl GlobalActionsListener for CoordinatorHandle {
    fn on_global_actions_shown(&self) {
        self.send(Message::PrimaryShown);
    }

    fn on_global_actions_dismissed(&self) {
        self.send(Message::PrimaryDismissed);
    }

    fn on_status_bar_connected_changed(&self, connected: bool) {
        self.send(Message::PrimaryConnectivityChanged(connected));
    }
}
