use std::fmt;
use std::sync::Arc;

/// A self-contained presentation path used when the primary surface cannot
/// show the menu.
pub trait FallbackPresenter: Send {
    /// Displays the menu without waiting for it to be dismissed. The dismissal
    /// callback handed to the factory fires once the user closes it.
    fn show(&mut self, keyguard_showing: bool, device_provisioned: bool);
}

/// Builds the fallback presenter on first need. The coordinator calls
/// `create` at most once.
pub trait FallbackFactory: Send {
    fn create(&mut self, on_dismissed: DismissCallback) -> Box<dyn FallbackPresenter>;
}

impl<F> FallbackFactory for F
where
    F: FnMut(DismissCallback) -> Box<dyn FallbackPresenter> + Send,
{
    fn create(&mut self, on_dismissed: DismissCallback) -> Box<dyn FallbackPresenter> {
        self(on_dismissed)
    }
}

/// Reports that the fallback menu was dismissed. Bound once when the
/// presenter is created and reused for its whole lifetime.
#[derive(Clone)]
pub struct DismissCallback {
    inner: Arc<dyn Fn() + Send + Sync>,
}

impl DismissCallback {
    pub fn new(f: impl Fn() + Send + Sync + 'static) -> Self {
        Self { inner: Arc::new(f) }
    }

    pub fn dismissed(&self) {
        (self.inner)();
    }
}

impl fmt::Debug for DismissCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DismissCallback").finish_non_exhaustive()
    }
}
