use std::sync::Arc;

/// Notifications delivered by the primary surface integration.
///
/// Calls are fire-and-forget and may arrive on any thread; implementors must
/// hand them off instead of doing work inline.
pub trait GlobalActionsListener: Send + Sync {
    /// The primary surface is now displaying the menu.
    fn on_global_actions_shown(&self);

    /// The menu shown by the primary surface was dismissed.
    fn on_global_actions_dismissed(&self);

    fn on_status_bar_connected_changed(&self, connected: bool);
}

/// The preferred presentation path for the global actions menu.
pub trait PrimarySurface: Send + Sync {
    /// Asks the surface to show the menu. Progress is reported back through
    /// the registered [`GlobalActionsListener`].
    fn show_global_actions(&self);

    fn set_global_actions_listener(&self, listener: Arc<dyn GlobalActionsListener>);
}
