//! Root of the `global-actions-core` library.
//!
//! Decides whether the global actions menu is shown by the primary surface
//! (the status bar UI) or by a self-contained fallback dialog, and recovers
//! into the fallback when the primary surface is missing, slow or dies.

// Prevent accidental direct writes to stdout/stderr in library code. All
// user-visible output must go through the host or `tracing`.
#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod config;
mod coordinator;
pub mod error;
mod fallback;
mod legacy_dialog;
mod primary;
mod session;
pub mod theme;

pub use config::Config;
pub use config::ReentryPolicy;
pub use coordinator::Coordinator;
pub use coordinator::CoordinatorHandle;
pub use coordinator::CoordinatorOptions;
pub use coordinator::SHOW_TIMEOUT;
pub use error::CoordinatorError;
pub use fallback::DismissCallback;
pub use fallback::FallbackFactory;
pub use fallback::FallbackPresenter;
pub use legacy_dialog::DialogController;
pub use legacy_dialog::DialogRequest;
pub use legacy_dialog::DialogSink;
pub use legacy_dialog::LegacyDialog;
pub use legacy_dialog::LegacyDialogFactory;
pub use primary::GlobalActionsListener;
pub use primary::PrimarySurface;
pub use session::Phase;
pub use session::SessionSnapshot;
