//! Preferences: persisted decoration settings, settings window and hotkeys

pub mod hotkeys;
pub mod prefs;
pub mod prefs_events;

pub use hotkeys::HotkeyHandler;
pub use prefs::{DecorPrefs, render_settings_window};
pub use prefs_events::{HotkeyAction, HotkeyWindow};
