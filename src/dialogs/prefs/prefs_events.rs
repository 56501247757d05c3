//! Preferences/settings events.

#[derive(Clone, Debug)]
pub struct ToggleSettingsEvent;

#[derive(Clone, Debug)]
pub struct ClearConsoleEvent;

/// Hotkey window context for context-aware shortcuts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HotkeyWindow {
    Global,
    Hierarchy,
}

/// Action bound to a key combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HotkeyAction {
    /// Flip the row decorations on or off.
    ToggleDecorations,
    ToggleSettings,
    ClearConsole,
}
