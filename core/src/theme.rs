//! Theme state consumed by the fallback dialog.
//!
//! The theme service reports the active overlay style through a callback.
//! Instead of a process-wide static, the last reported value lives in a
//! [`ThemeCache`] that has a single writer (the subscription) and any number
//! of readers.

use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use tokio::sync::watch;

/// Theme mode value meaning "light" in the secure settings.
const LIGHT_THEME_MODE: i32 = 0;
/// Accent color value meaning "default accent" in the secure settings.
const DEFAULT_ACCENT_COLOR: i32 = 0;

/// Callback contract of the theme service.
pub trait ThemeCallback: Send + Sync {
    fn on_theme_changed(&self, theme_mode: i32, color: i32);

    /// Delivered once when the callback is registered, with the current value.
    fn on_callback_added(&self, theme_mode: i32, color: i32);
}

/// Last theme color reported by the theme service.
#[derive(Clone, Debug)]
pub struct ThemeCache {
    tx: Arc<watch::Sender<i32>>,
}

impl ThemeCache {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx: Arc::new(tx) }
    }

    pub fn update(&self, color: i32) {
        let previous = self.tx.send_replace(color);
        if previous != color {
            tracing::debug!(previous, color, "theme color updated");
        }
    }

    pub fn current(&self) -> i32 {
        *self.tx.borrow()
    }

}

impl Default for ThemeCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ThemeCallback for ThemeCache {
    fn on_theme_changed(&self, theme_mode: i32, color: i32) {
        self.on_callback_added(theme_mode, color);
    }

    fn on_callback_added(&self, _theme_mode: i32, color: i32) {
        self.update(color);
    }
}

/// Secure settings that select the dialog theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeSettings {
    pub primary_mode: i32,
    pub accent_color: i32,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            primary_mode: 2,
            accent_color: 1,
        }
    }
}

/// Theme applied to the fallback dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DialogTheme {
    LightAlertDialog,
    Overlay { style: i32 },
}

impl DialogTheme {
    pub fn resolve(settings: ThemeSettings, cache: &ThemeCache) -> Self {
        if settings.primary_mode == LIGHT_THEME_MODE && settings.accent_color == DEFAULT_ACCENT_COLOR
        {
            Self::LightAlertDialog
        } else {
            Self::Overlay {
                style: cache.current(),
            }
        }
    }
}
