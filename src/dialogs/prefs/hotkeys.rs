//! Hotkey system - keyboard shortcuts management

use std::collections::HashMap;

use eframe::egui;

use super::prefs_events::{HotkeyAction, HotkeyWindow};
use crate::core::canvas::{InputEvent, Key};

/// Hotkey handler for managing keyboard shortcuts
#[derive(Debug, Clone)]
pub struct HotkeyHandler {
    bindings: HashMap<(HotkeyWindow, String), HotkeyAction>,
    focused_window: HotkeyWindow,
}

impl Default for HotkeyHandler {
    fn default() -> Self {
        let mut handler = Self::new();
        handler.setup_default_bindings();
        handler
    }
}

impl HotkeyHandler {
    /// Create a handler without bindings
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
            focused_window: HotkeyWindow::Global,
        }
    }

    /// Handle key press; falls back to global bindings
    pub fn handle_key(&self, key: &str) -> Option<HotkeyAction> {
        self.bindings
            .get(&(self.focused_window, key.to_string()))
            .or_else(|| self.bindings.get(&(HotkeyWindow::Global, key.to_string())))
            .copied()
    }

    /// Handle key with modifiers
    pub fn handle_key_with_modifiers(&self, key: &str, ctrl: bool, shift: bool, alt: bool) -> Option<HotkeyAction> {
        let mut key_combo = String::new();
        if ctrl {
            key_combo.push_str("Ctrl+");
        }
        if shift {
            key_combo.push_str("Shift+");
        }
        if alt {
            key_combo.push_str("Alt+");
        }
        key_combo.push_str(key);

        self.handle_key(&key_combo)
    }

    /// Set focused window context
    pub fn set_focused_window(&mut self, window: HotkeyWindow) {
        self.focused_window = window;
    }

    pub fn focused_window(&self) -> HotkeyWindow {
        self.focused_window
    }

    /// Add hotkey binding
    pub fn add_binding(&mut self, window: HotkeyWindow, key: &str, action: HotkeyAction) {
        self.bindings.insert((window, key.to_string()), action);
    }

    /// Remove hotkey binding
    pub fn remove_binding(&mut self, window: HotkeyWindow, key: &str) {
        self.bindings.remove(&(window, key.to_string()));
    }

    /// Setup default hotkey bindings
    pub fn setup_default_bindings(&mut self) {
        use HotkeyAction::*;
        use HotkeyWindow::*;

        self.add_binding(Hierarchy, "Ctrl+H", ToggleDecorations);

        self.add_binding(Global, "Ctrl+Comma", ToggleSettings);
        self.add_binding(Global, "Ctrl+L", ClearConsole);
    }

    /// Resolve a row-level input event.
    pub fn handle_event(&self, event: &InputEvent) -> Option<HotkeyAction> {
        let InputEvent::KeyDown { key, modifiers } = event else {
            return None;
        };
        let name = match key {
            Key::H => "H".to_string(),
            Key::Other(code) => format!("Key{code}"),
        };
        self.handle_key_with_modifiers(&name, modifiers.ctrl, modifiers.shift, modifiers.alt)
    }

    /// Handle keyboard input from egui with current focused window
    pub fn handle_input(&self, input: &egui::InputState) -> Option<HotkeyAction> {
        // key_pressed events only, not keys_down, to avoid repeats
        for event in &input.events {
            if let egui::Event::Key { key, pressed: true, modifiers, .. } = event {
                let key_str = format!("{:?}", key);
                if let Some(action) =
                    self.handle_key_with_modifiers(&key_str, modifiers.ctrl, modifiers.shift, modifiers.alt)
                {
                    return Some(action);
                }
            }
        }
        None
    }
}
