use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::OnceLock;
use std::sync::PoisonError;

use serde::Serialize;
use tracing::debug;
use tracing::warn;

use crate::fallback::DismissCallback;
use crate::fallback::FallbackFactory;
use crate::fallback::FallbackPresenter;
use crate::theme::DialogTheme;
use crate::theme::ThemeCache;
use crate::theme::ThemeSettings;

/// What the fallback dialog is asked to display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DialogRequest {
    pub keyguard_showing: bool,
    pub device_provisioned: bool,
    pub theme: DialogTheme,
}

/// Rendering boundary of the fallback dialog.
pub trait DialogSink: Send + Sync {
    fn show_dialog(&self, request: &DialogRequest);

    fn hide_dialog(&self);
}

#[derive(Debug, Default)]
struct DialogState {
    visible: Option<DialogRequest>,
}

struct Shared {
    state: Mutex<DialogState>,
    sink: Arc<dyn DialogSink>,
    on_dismissed: DismissCallback,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, DialogState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Fallback presenter that draws its own dialog through a [`DialogSink`].
pub struct LegacyDialog {
    shared: Arc<Shared>,
    theme: ThemeCache,
    settings: ThemeSettings,
}

impl LegacyDialog {
    pub fn new(
        sink: Arc<dyn DialogSink>,
        theme: ThemeCache,
        settings: ThemeSettings,
        on_dismissed: DismissCallback,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(DialogState::default()),
                sink,
                on_dismissed,
            }),
            theme,
            settings,
        }
    }

    /// Handle the host uses to close the dialog on user action.
    pub fn controller(&self) -> DialogController {
        DialogController {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl FallbackPresenter for LegacyDialog {
    fn show(&mut self, keyguard_showing: bool, device_provisioned: bool) {
        let request = DialogRequest {
            keyguard_showing,
            device_provisioned,
            theme: DialogTheme::resolve(self.settings, &self.theme),
        };
        let replaced = self.shared.state().visible.replace(request);
        if replaced.is_some() {
            debug!("fallback dialog already visible; refreshing");
        }
        self.shared.sink.show_dialog(&request);
    }
}

/// Dismisses a [`LegacyDialog`] from outside the coordinator.
#[derive(Clone)]
pub struct DialogController {
    shared: Arc<Shared>,
}

impl DialogController {
    pub fn is_visible(&self) -> bool {
        self.shared.state().visible.is_some()
    }

    /// Hides the dialog and reports the dismissal. Returns `false` and does
    /// nothing if the dialog is not visible.
    pub fn dismiss(&self) -> bool {
        if self.shared.state().visible.take().is_none() {
            return false;
        }
        self.shared.sink.hide_dialog();
        self.shared.on_dismissed.dismissed();
        true
    }
}

/// Builds a [`LegacyDialog`] when the coordinator first needs one and
/// publishes its controller to the host.
pub struct LegacyDialogFactory {
    sink: Arc<dyn DialogSink>,
    theme: ThemeCache,
    settings: ThemeSettings,
    controller: Arc<OnceLock<DialogController>>,
}

impl LegacyDialogFactory {
    pub fn new(sink: Arc<dyn DialogSink>, theme: ThemeCache, settings: ThemeSettings) -> Self {
        Self {
            sink,
            theme,
            settings,
            controller: Arc::new(OnceLock::new()),
        }
    }

    /// Filled in once the dialog has been created.
    pub fn controller_slot(&self) -> Arc<OnceLock<DialogController>> {
        Arc::clone(&self.controller)
    }
}

impl FallbackFactory for LegacyDialogFactory {
    fn create(&mut self, on_dismissed: DismissCallback) -> Box<dyn FallbackPresenter> {
        let dialog = LegacyDialog::new(
            Arc::clone(&self.sink),
            self.theme.clone(),
            self.settings,
            on_dismissed,
        );
        if self.controller.set(dialog.controller()).is_err() {
            warn!("legacy dialog created more than once; keeping the first controller");
        }
        Box::new(dialog)
    }
}
