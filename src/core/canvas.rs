//! Immediate-mode drawing and input surface for one hierarchy row.
//!
//! The engine issues paint calls and widget calls against a [`Canvas`]; the
//! widget calls report user interaction back in the same call, the way
//! egui widgets return a `Response`. [`RecordingCanvas`] is a headless
//! implementation that records every call and replays scripted clicks.

use std::collections::{HashMap, VecDeque};

use eframe::egui::{Color32, Pos2, Rect};

use super::host::IconId;

/// Pointer button that produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

/// Keyboard key relevant to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    H,
    Other(u32),
}

/// Modifier state at the time of the event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self { ctrl: false, shift: false, alt: false };
    pub const CTRL: Self = Self { ctrl: true, shift: false, alt: false };
}

/// The input event being processed this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// `start` is where the button went down; `pos` is the current position.
    PointerDrag { button: PointerButton, start: Pos2, pos: Pos2, modifiers: Modifiers },
    PointerUp { button: PointerButton, pos: Pos2 },
    KeyDown { key: Key, modifiers: Modifiers },
}

/// Glyphs the engine asks the host to paint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Glyph {
    ActiveOn,
    ActiveOff,
    StaticOn,
    StaticOff,
    LockOn,
    LockOff,
    TagField,
    LayerField,
    TreeLine,
    TreeMiddle,
    TreeEnd,
    Info,
    Warning,
    Error,
}

/// Horizontal alignment of a text label inside its rect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Text measured or drawn by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    /// The node name as the host draws it.
    RowLabel,
    /// Small trailing tag/layer label.
    MiniLabel,
}

/// Drawing and widget surface for one row.
pub trait Canvas {
    /// Event delivered with this row callback, unless already consumed.
    fn event(&self) -> Option<InputEvent>;
    /// Mark the current event as used so nothing else reacts to it.
    fn consume_event(&mut self);

    fn measure_text(&self, text: &str, style: TextStyle) -> f32;

    fn fill_rect(&mut self, rect: Rect, color: Color32);
    fn glyph(&mut self, rect: Rect, glyph: Glyph, tint: Color32);
    fn label(&mut self, rect: Rect, text: &str, style: TextStyle, color: Color32, align: Align);
    /// Hover text for `rect`.
    fn tooltip(&mut self, rect: Rect, text: &str);

    /// Two-state toggle. Returns true when the user flipped it this frame.
    fn toggle(&mut self, rect: Rect, on: bool, glyphs: (Glyph, Glyph), background: Color32) -> bool;
    /// Flat text button. Returns true when clicked.
    fn button(&mut self, rect: Rect, text: &str, tint: Color32) -> bool;
    /// Clickable preview image. Returns true when clicked.
    fn icon_button(&mut self, rect: Rect, icon: IconId) -> bool;
    /// Popup choice field. Returns the index picked this frame, if any.
    fn choice(&mut self, rect: Rect, current: &str, options: &[String], style: TextStyle, color: Color32) -> Option<usize>;
}

/// One recorded call on a [`RecordingCanvas`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Fill { rect: Rect, color: Color32 },
    Glyph { rect: Rect, glyph: Glyph, tint: Color32 },
    Label { rect: Rect, text: String, color: Color32 },
    Tooltip { rect: Rect, text: String },
    Toggle { rect: Rect, on: bool, background: Color32 },
    Button { rect: Rect, text: String, tint: Color32 },
    IconButton { rect: Rect, icon: IconId },
    Choice { rect: Rect, current: String },
}

impl DrawCall {
    pub fn rect(&self) -> Rect {
        match self {
            DrawCall::Fill { rect, .. }
            | DrawCall::Glyph { rect, .. }
            | DrawCall::Label { rect, .. }
            | DrawCall::Tooltip { rect, .. }
            | DrawCall::Toggle { rect, .. }
            | DrawCall::Button { rect, .. }
            | DrawCall::IconButton { rect, .. }
            | DrawCall::Choice { rect, .. } => *rect,
        }
    }
}

/// Headless canvas: records calls, measures text with a fixed advance and
/// answers widget calls from a script of pending clicks.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub calls: Vec<DrawCall>,
    event: Option<InputEvent>,
    consumed: bool,
    /// Per-character advance used by `measure_text`.
    pub char_width: f32,
    /// Exact widths for specific strings, overriding `char_width`.
    pub widths: HashMap<String, f32>,
    /// Widget clicks to report, in call order. Each widget call pops one
    /// entry if the front matches its kind.
    clicks: VecDeque<Click>,
}

/// A scripted interaction for [`RecordingCanvas`].
#[derive(Debug, Clone, PartialEq)]
pub enum Click {
    /// Flip the n-th toggle drawn this row (0-based).
    Toggle(usize),
    /// Press the n-th text or icon button drawn this row.
    Button(usize),
    /// Pick `option` in the n-th choice field.
    Choice { nth: usize, option: usize },
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self {
            char_width: 7.0,
            ..Default::default()
        }
    }

    /// Deliver `event` with the next row.
    pub fn set_event(&mut self, event: Option<InputEvent>) {
        self.event = event;
        self.consumed = false;
    }

    pub fn event_consumed(&self) -> bool {
        self.consumed
    }

    pub fn script(&mut self, click: Click) {
        self.clicks.push_back(click);
    }

    /// Drop recorded calls (keeps event and script).
    pub fn clear(&mut self) {
        self.calls.clear();
    }

    pub fn toggles(&self) -> Vec<Rect> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Toggle { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect()
    }

    pub fn glyphs(&self, wanted: Glyph) -> Vec<Rect> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Glyph { rect, glyph, .. } if *glyph == wanted => Some(*rect),
                _ => None,
            })
            .collect()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Label { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn tooltips(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Tooltip { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn count(&self, pred: impl Fn(&DrawCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    fn take_toggle(&mut self) -> bool {
        let nth = self.count(|c| matches!(c, DrawCall::Toggle { .. }));
        if self.clicks.front() == Some(&Click::Toggle(nth)) {
            self.clicks.pop_front();
            return true;
        }
        false
    }

    fn take_button(&mut self) -> bool {
        let nth = self.count(|c| matches!(c, DrawCall::Button { .. } | DrawCall::IconButton { .. }));
        if self.clicks.front() == Some(&Click::Button(nth)) {
            self.clicks.pop_front();
            return true;
        }
        false
    }
}

impl Canvas for RecordingCanvas {
    fn event(&self) -> Option<InputEvent> {
        if self.consumed { None } else { self.event }
    }

    fn consume_event(&mut self) {
        self.consumed = true;
    }

    fn measure_text(&self, text: &str, _style: TextStyle) -> f32 {
        self.widths
            .get(text)
            .copied()
            .unwrap_or(text.chars().count() as f32 * self.char_width)
    }

    fn fill_rect(&mut self, rect: Rect, color: Color32) {
        self.calls.push(DrawCall::Fill { rect, color });
    }

    fn glyph(&mut self, rect: Rect, glyph: Glyph, tint: Color32) {
        self.calls.push(DrawCall::Glyph { rect, glyph, tint });
    }

    fn label(&mut self, rect: Rect, text: &str, _style: TextStyle, color: Color32, _align: Align) {
        self.calls.push(DrawCall::Label { rect, text: text.to_string(), color });
    }

    fn tooltip(&mut self, rect: Rect, text: &str) {
        self.calls.push(DrawCall::Tooltip { rect, text: text.to_string() });
    }

    fn toggle(&mut self, rect: Rect, on: bool, _glyphs: (Glyph, Glyph), background: Color32) -> bool {
        let clicked = self.take_toggle();
        self.calls.push(DrawCall::Toggle { rect, on, background });
        clicked
    }

    fn button(&mut self, rect: Rect, text: &str, tint: Color32) -> bool {
        let clicked = self.take_button();
        self.calls.push(DrawCall::Button { rect, text: text.to_string(), tint });
        clicked
    }

    fn icon_button(&mut self, rect: Rect, icon: IconId) -> bool {
        let clicked = self.take_button();
        self.calls.push(DrawCall::IconButton { rect, icon });
        clicked
    }

    /// Scripted options are returned as-is, even past the end of `options`.
    fn choice(&mut self, rect: Rect, current: &str, _options: &[String], _style: TextStyle, _color: Color32) -> Option<usize> {
        let nth = self.count(|c| matches!(c, DrawCall::Choice { .. }));
        let picked = match self.clicks.front() {
            Some(Click::Choice { nth: n, option }) if *n == nth => {
                let option = *option;
                self.clicks.pop_front();
                Some(option)
            }
            _ => None,
        };
        self.calls.push(DrawCall::Choice { rect, current: current.to_string() });
        picked
    }
}
