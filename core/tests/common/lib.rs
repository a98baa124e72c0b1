#![allow(clippy::expect_used)]

//! Recording doubles for the primary surface and the fallback presenter.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use global_actions_core::Coordinator;
use global_actions_core::CoordinatorHandle;
use global_actions_core::CoordinatorOptions;
use global_actions_core::DismissCallback;
use global_actions_core::FallbackFactory;
use global_actions_core::FallbackPresenter;
use global_actions_core::GlobalActionsListener;
use global_actions_core::PrimarySurface;
use global_actions_core::SessionSnapshot;

/// Primary surface that counts show requests and lets tests deliver
/// notifications through whatever listener the coordinator registered.
#[derive(Default)]
pub struct RecordingPrimarySurface {
    show_calls: AtomicUsize,
    listener: Mutex<Option<Arc<dyn GlobalActionsListener>>>,
}

impl RecordingPrimarySurface {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn show_calls(&self) -> usize {
        self.show_calls.load(Ordering::SeqCst)
    }

    pub fn shown(&self) {
        self.listener().on_global_actions_shown();
    }

    pub fn dismissed(&self) {
        self.listener().on_global_actions_dismissed();
    }

    pub fn set_connected(&self, connected: bool) {
        self.listener().on_status_bar_connected_changed(connected);
    }

    fn listener(&self) -> Arc<dyn GlobalActionsListener> {
        self.listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .expect("coordinator registers itself as listener")
    }
}

impl PrimarySurface for RecordingPrimarySurface {
    fn show_global_actions(&self) {
        self.show_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn set_global_actions_listener(&self, listener: Arc<dyn GlobalActionsListener>) {
        *self.listener.lock().unwrap_or_else(PoisonError::into_inner) = Some(listener);
    }
}

#[derive(Default)]
struct FallbackRecord {
    created: usize,
    shows: Vec<(bool, bool)>,
    on_dismissed: Option<DismissCallback>,
}

/// Observes every fallback presenter built from [`FallbackRecorder::factory`].
#[derive(Clone, Default)]
pub struct FallbackRecorder {
    inner: Arc<Mutex<FallbackRecord>>,
}

impl FallbackRecorder {
    pub fn factory(&self) -> Box<dyn FallbackFactory> {
        let recorder = self.clone();
        Box::new(
            move |on_dismissed: DismissCallback| -> Box<dyn FallbackPresenter> {
                {
                    let mut record = recorder.record();
                    record.created += 1;
                    record.on_dismissed = Some(on_dismissed);
                }
                Box::new(RecordingPresenter {
                    recorder: recorder.clone(),
                })
            },
        )
    }

    /// Number of presenters constructed.
    pub fn created(&self) -> usize {
        self.record().created
    }

    /// `(keyguard_showing, device_provisioned)` of every `show` call.
    pub fn shows(&self) -> Vec<(bool, bool)> {
        self.record().shows.clone()
    }

    /// Simulates the user closing the fallback menu.
    pub fn dismiss(&self) {
        let callback = self
            .record()
            .on_dismissed
            .clone()
            .expect("fallback presenter was never created");
        callback.dismissed();
    }

    fn record(&self) -> MutexGuard<'_, FallbackRecord> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct RecordingPresenter {
    recorder: FallbackRecorder,
}

impl FallbackPresenter for RecordingPresenter {
    fn show(&mut self, keyguard_showing: bool, device_provisioned: bool) {
        self.recorder
            .record()
            .shows
            .push((keyguard_showing, device_provisioned));
    }
}

pub struct Harness {
    pub handle: CoordinatorHandle,
    pub primary: Option<Arc<RecordingPrimarySurface>>,
    pub fallback: FallbackRecorder,
}

impl Harness {
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.handle
            .snapshot()
            .await
            .expect("coordinator should be running")
    }

    pub fn primary(&self) -> &RecordingPrimarySurface {
        self.primary
            .as_deref()
            .expect("harness was built with a primary surface")
    }
}

/// Spawns a coordinator. The primary surface, when present, starts out
/// disconnected.
pub fn spawn_harness(with_primary: bool, options: CoordinatorOptions) -> Harness {
    let primary = with_primary.then(RecordingPrimarySurface::new);
    let fallback = FallbackRecorder::default();
    let handle = Coordinator::spawn(
        primary
            .clone()
            .map(|surface| surface as Arc<dyn PrimarySurface>),
        fallback.factory(),
        options,
    );
    Harness {
        handle,
        primary,
        fallback,
    }
}

/// Spawns a coordinator whose primary surface has reported itself connected.
pub async fn connected_harness() -> Harness {
    let harness = spawn_harness(true, CoordinatorOptions::default());
    harness.primary().set_connected(true);
    assert!(harness.snapshot().await.primary_connected);
    harness
}
