use std::sync::Arc;
use std::sync::Mutex;
use std::sync::OnceLock;
use std::sync::PoisonError;
use std::time::Duration;

use global_actions_core::Config;
use global_actions_core::Coordinator;
use global_actions_core::CoordinatorHandle;
use global_actions_core::CoordinatorOptions;
use global_actions_core::DialogController;
use global_actions_core::DialogRequest;
use global_actions_core::DialogSink;
use global_actions_core::GlobalActionsListener;
use global_actions_core::LegacyDialogFactory;
use global_actions_core::PrimarySurface;
use global_actions_core::theme::ThemeCache;
use global_actions_core::theme::ThemeCallback;
use tokio::sync::mpsc;
use tracing::warn;

use crate::host_event::HostAction;
use crate::host_event::HostEvent;

/// Sends [`HostAction`]s to the stdout writer task.
#[derive(Clone, Debug)]
pub(crate) struct OutgoingActionSender {
    sender: mpsc::Sender<HostAction>,
}

impl OutgoingActionSender {
    pub(crate) fn new(sender: mpsc::Sender<HostAction>) -> Self {
        Self { sender }
    }

    pub(crate) async fn send(&self, action: HostAction) {
        let _ = self.sender.send(action).await;
    }

    /// For callers on the coordinator task, which must not wait.
    fn try_send(&self, action: HostAction) {
        if let Err(err) = self.sender.try_send(action) {
            warn!("dropping outgoing action: {err}");
        }
    }
}

/// Primary surface whose "show" is an outgoing action and whose
/// notifications come from host input.
pub(crate) struct SimulatedPrimarySurface {
    outgoing: OutgoingActionSender,
    listener: Mutex<Option<Arc<dyn GlobalActionsListener>>>,
}

impl SimulatedPrimarySurface {
    fn new(outgoing: OutgoingActionSender) -> Self {
        Self {
            outgoing,
            listener: Mutex::new(None),
        }
    }

    fn listener(&self) -> Option<Arc<dyn GlobalActionsListener>> {
        self.listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl PrimarySurface for SimulatedPrimarySurface {
    fn show_global_actions(&self) {
        self.outgoing.try_send(HostAction::PrimaryShow);
    }

    fn set_global_actions_listener(&self, listener: Arc<dyn GlobalActionsListener>) {
        *self.listener.lock().unwrap_or_else(PoisonError::into_inner) = Some(listener);
    }
}

struct OutgoingDialogSink {
    outgoing: OutgoingActionSender,
}

impl DialogSink for OutgoingDialogSink {
    fn show_dialog(&self, request: &DialogRequest) {
        self.outgoing.try_send(HostAction::FallbackShow(*request));
    }

    fn hide_dialog(&self) {
        self.outgoing.try_send(HostAction::FallbackHide);
    }
}

/// Wires a coordinator to simulated collaborators and applies host events.
pub(crate) struct SimulatedHost {
    coordinator: CoordinatorHandle,
    primary: Option<Arc<SimulatedPrimarySurface>>,
    dialog: Arc<OnceLock<DialogController>>,
    theme: ThemeCache,
    outgoing: OutgoingActionSender,
}

impl SimulatedHost {
    /// Must be called from within a tokio runtime.
    pub(crate) fn new(config: &Config, with_primary: bool, outgoing: OutgoingActionSender) -> Self {
        let theme = ThemeCache::new();
        let factory = LegacyDialogFactory::new(
            Arc::new(OutgoingDialogSink {
                outgoing: outgoing.clone(),
            }),
            theme.clone(),
            config.theme,
        );
        let dialog = factory.controller_slot();
        let primary =
            with_primary.then(|| Arc::new(SimulatedPrimarySurface::new(outgoing.clone())));

        let coordinator = Coordinator::spawn(
            primary
                .clone()
                .map(|surface| surface as Arc<dyn PrimarySurface>),
            Box::new(factory),
            CoordinatorOptions::from(config),
        );

        Self {
            coordinator,
            primary,
            dialog,
            theme,
            outgoing,
        }
    }

    pub(crate) async fn handle_event(&self, event: HostEvent) {
        match event {
            HostEvent::RequestShow {
                keyguard_showing,
                device_provisioned,
            } => self
                .coordinator
                .request_show(keyguard_showing, device_provisioned),
            HostEvent::PrimaryShown => {
                self.notify_primary(|listener| listener.on_global_actions_shown())
                    .await
            }
            HostEvent::PrimaryDismissed => {
                self.notify_primary(|listener| listener.on_global_actions_dismissed())
                    .await
            }
            HostEvent::PrimaryConnectivity { connected } => {
                self.notify_primary(|listener| listener.on_status_bar_connected_changed(connected))
                    .await
            }
            HostEvent::FallbackDismiss => {
                let dismissed = self.dialog.get().is_some_and(DialogController::dismiss);
                if !dismissed {
                    self.report_error("fallback dialog is not showing").await;
                }
            }
            HostEvent::ThemeChanged { mode, color } => self.theme.on_theme_changed(mode, color),
            HostEvent::Snapshot => match self.coordinator.snapshot().await {
                Ok(snapshot) => self.outgoing.send(HostAction::Snapshot(snapshot)).await,
                Err(err) => self.report_error(&err.to_string()).await,
            },
            HostEvent::Sleep { ms } => tokio::time::sleep(Duration::from_millis(ms)).await,
        }
    }

    pub(crate) fn shutdown(&self) {
        self.coordinator.shutdown();
    }

    async fn notify_primary(&self, notify: impl FnOnce(&dyn GlobalActionsListener)) {
        match self.primary.as_ref().and_then(|surface| surface.listener()) {
            Some(listener) => notify(listener.as_ref()),
            None => self.report_error("device has no primary surface").await,
        }
    }

    async fn report_error(&self, message: &str) {
        warn!("{message}");
        self.outgoing
            .send(HostAction::Error {
                message: message.to_string(),
            })
            .await;
    }
}
