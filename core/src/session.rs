use serde::Deserialize;
use serde::Serialize;
use strum_macros::Display;

/// Position of the coordinator in the show/dismiss state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    /// The primary surface was asked to show the menu and the timeout is armed.
    AwaitingPrimary,
    ShowingPrimary,
    ShowingFallback,
}

/// Mutable state owned by the coordinator task. Nothing else holds a
/// reference to it.
#[derive(Debug, Default)]
pub(crate) struct SessionState {
    pub(crate) keyguard_showing: bool,
    pub(crate) device_provisioned: bool,
    pub(crate) showing: bool,
    pub(crate) primary_connected: bool,
    pub(crate) phase: Phase,
}

impl SessionState {
    pub(crate) fn begin(&mut self, keyguard_showing: bool, device_provisioned: bool) {
        self.keyguard_showing = keyguard_showing;
        self.device_provisioned = device_provisioned;
        self.showing = true;
    }

    /// Ends the current session. Returns `false` when no session was active.
    pub(crate) fn end(&mut self) -> bool {
        let was_showing = self.showing;
        self.showing = false;
        self.phase = Phase::Idle;
        was_showing
    }
}

/// Point-in-time copy of the coordinator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub keyguard_showing: bool,
    pub device_provisioned: bool,
    pub showing: bool,
    pub primary_connected: bool,
    pub phase: Phase,
    pub timeout_armed: bool,
    pub fallback_created: bool,
}
