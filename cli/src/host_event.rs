use global_actions_core::DialogRequest;
use global_actions_core::SessionSnapshot;
use serde::Deserialize;
use serde::Serialize;

/// One line of input: something that happened on the simulated device.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum HostEvent {
    /// The power key was long-pressed.
    RequestShow {
        keyguard_showing: bool,
        device_provisioned: bool,
    },
    PrimaryShown,
    PrimaryDismissed,
    PrimaryConnectivity {
        connected: bool,
    },
    /// The user closed the fallback dialog.
    FallbackDismiss,
    ThemeChanged {
        mode: i32,
        color: i32,
    },
    Snapshot,
    Sleep {
        ms: u64,
    },
}

/// One line of output: something the coordinator made the device do.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum HostAction {
    PrimaryShow,
    FallbackShow(DialogRequest),
    FallbackHide,
    Snapshot(SessionSnapshot),
    Error { message: String },
}
