//! Row decoration engine.
//!
//! The host calls [`RowDecorationEngine::render_row`] once per visible row
//! per frame. Each call draws, in order: separators, banding, tree guides,
//! badges and the truncation overlay, then the decorator slots right to
//! left, the mini-label and the row tooltip. All per-frame state (last row,
//! drag gesture, log index, enabled flag) lives on the engine instance.
//!
//! Rendering a row returns `anyhow::Result` internally; `render_row` is the
//! only place failures are caught, and it feeds them to the circuit breaker.

use std::sync::Arc;

use anyhow::Result;
use eframe::egui::{Color32, Rect, pos2, vec2};
use log::{debug, info};

use super::breaker::CircuitBreaker;
use super::canvas::Canvas;
use super::decor_config::DecorConfig;
use super::decorators::{RowContext, draw_decorator};
use super::event_bus::{DecorationsToggledEvent, EventBus};
use super::host::{Host, LogSource, NodeId};
use super::labels::{Ellipsis, draw_badges, draw_mini_label, draw_truncation, mini_label_rect, mini_label_width, node_badges};
use super::log_index::{LogCorrelationIndex, LogSignal};
use super::selection_drag::SelectionDragController;
use super::tree_guides::draw_tree;
use crate::dialogs::prefs::hotkeys::HotkeyHandler;
use crate::dialogs::prefs::prefs_events::{HotkeyAction, HotkeyWindow};

pub struct RowDecorationEngine {
    config: Arc<DecorConfig>,
    enabled: bool,
    breaker: CircuitBreaker,
    /// Bounds of the last row rendered, for first-row detection and banding height.
    last_row: Option<Rect>,
    drag: SelectionDragController,
    log_index: LogCorrelationIndex,
    bus: EventBus,
    hotkeys: HotkeyHandler,
}

impl std::fmt::Debug for RowDecorationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowDecorationEngine")
            .field("enabled", &self.enabled)
            .field("failures", &self.breaker.failures())
            .field("last_row", &self.last_row)
            .field("dragging", &self.drag.is_dragging())
            .field("indexed_nodes", &self.log_index.len())
            .finish()
    }
}

impl RowDecorationEngine {
    /// Create an engine listening for log arrivals on `bus`.
    pub fn new(config: Arc<DecorConfig>, bus: EventBus) -> Self {
        let mut hotkeys = HotkeyHandler::default();
        hotkeys.set_focused_window(HotkeyWindow::Hierarchy);
        Self {
            config,
            enabled: true,
            breaker: CircuitBreaker::new(),
            last_row: None,
            drag: SelectionDragController::new(),
            log_index: LogCorrelationIndex::new(LogSignal::subscribed(&bus)),
            bus,
            hotkeys,
        }
    }

    pub fn config(&self) -> &Arc<DecorConfig> {
        &self.config
    }

    /// Swap in a new configuration snapshot.
    pub fn set_config(&mut self, config: Arc<DecorConfig>) {
        debug!("Decoration config replaced");
        self.config = config;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Turn the engine on or off. Re-enabling clears the failure count.
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled == self.enabled {
            return;
        }
        self.enabled = enabled;
        if enabled {
            self.breaker.reset();
            self.log_index.signal().notify();
        } else {
            self.drag.cancel();
        }
        self.bus.emit(DecorationsToggledEvent { enabled });
    }

    pub fn failures(&self) -> u32 {
        self.breaker.failures()
    }

    pub fn last_row(&self) -> Option<Rect> {
        self.last_row
    }

    pub fn log_index(&self) -> &LogCorrelationIndex {
        &self.log_index
    }

    /// Handle for hosts that learn about log arrivals outside the bus.
    pub fn log_signal(&self) -> LogSignal {
        self.log_index.signal().clone()
    }

    pub fn selection_drag(&self) -> &SelectionDragController {
        &self.drag
    }

    pub fn hotkeys_mut(&mut self) -> &mut HotkeyHandler {
        &mut self.hotkeys
    }

    /// Idle hook: rebuild the log index when a log arrived, badges are
    /// shown and the engine is on. Returns true when a rebuild ran.
    pub fn idle_tick<S: LogSource + ?Sized>(&mut self, source: &mut S) -> bool {
        let warnings = self.config.warnings;
        self.log_index.tick(source, warnings && self.enabled, warnings)
    }

    /// Decorate one row. Never fails; repeated failures switch the engine off.
    pub fn render_row<H: Host + ?Sized>(&mut self, host: &mut H, canvas: &mut dyn Canvas, node: NodeId, bounds: Rect) {
        if let Some(event) = canvas.event()
            && self.hotkeys.handle_event(&event) == Some(HotkeyAction::ToggleDecorations)
        {
            canvas.consume_event();
            let enabled = !self.enabled;
            info!("Row decorations {}", if enabled { "enabled" } else { "disabled" });
            self.set_enabled(enabled);
        }

        if !self.enabled {
            return;
        }

        if let Err(e) = self.decorate_row(host, canvas, node, bounds) {
            let e = e.context(format!("decorating row {node}"));
            if self.breaker.record_failure(&e) {
                self.enabled = false;
                self.drag.cancel();
                self.bus.emit(DecorationsToggledEvent { enabled: false });
            }
        }
    }

    fn is_first_visible(&self, bounds: Rect) -> bool {
        match self.last_row {
            Some(last) => bounds.min.y <= last.min.y,
            None => true,
        }
    }

    fn decorate_row<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        canvas: &mut dyn Canvas,
        node: NodeId,
        bounds: Rect,
    ) -> Result<()> {
        let config = Arc::clone(&self.config);
        let first_visible = self.is_first_visible(bounds);

        let Some(info) = host.node(node) else {
            return Ok(());
        };
        let color = config.palette.node_color(Some(&info));

        if config.selection {
            if self.drag.handle_event(canvas.event(), first_visible, host) {
                canvas.consume_event();
            }
            self.drag.test_row(node, bounds, host);
        }

        if !config.select_locked && first_visible {
            drop_locked_from_selection(host);
        }

        if config.line_separator() {
            self.draw_horizontal_separator(canvas, &config, bounds, first_visible);
        }
        if config.color_separator() && first_visible {
            self.draw_banding(canvas, &config, bounds);
        }
        if config.tree {
            draw_tree(canvas, &*host, &config.palette, &info, bounds);
        }

        let ellipsis = Ellipsis {
            selected: host.selection().contains(&node),
            playmode_tint: host.playmode_tint(),
            color,
        };
        if config.warnings {
            let badges = node_badges(&self.log_index, &info);
            if config.trailing {
                draw_truncation(canvas, &config, &info, bounds, config.draw_order.len() + badges.len(), ellipsis);
            }
            draw_badges(canvas, &config, &info, bounds, badges, Color32::WHITE);
        } else if config.trailing {
            draw_truncation(canvas, &config, &info, bounds, config.draw_order.len(), ellipsis);
        }

        let ctx = RowContext { config: &config, node: &info, color };
        let h = bounds.height();
        let mut slot = Rect::from_min_size(pos2(bounds.max.x - config.offset, bounds.min.y + 1.0), vec2(h, h));
        // A failing slot still lets the rest of the row draw; the first
        // error is reported once the row is complete.
        let mut first_err = None;
        for kind in config.draw_order.kinds() {
            slot = slot.translate(vec2(-h, 0.0));
            if let Err(e) = draw_decorator(*kind, canvas, host, &ctx, slot) {
                first_err.get_or_insert(e);
            }
            if config.line_separator() {
                draw_vertical_separator(canvas, &config, slot);
            }
        }

        let mini_width = mini_label_width(canvas, config.label_type, &info);
        let label = mini_label_rect(slot.min.x, slot.min.y, h, mini_width);
        if let Err(e) = draw_mini_label(canvas, host, config.label_type, &info, color, label) {
            first_err.get_or_insert(e);
        }

        if config.tooltips && !self.drag.is_dragging() {
            let rect = Rect::from_min_max(pos2(0.0, label.min.y), pos2(label.min.x, label.max.y));
            let layer = &info.layer_name;
            canvas.tooltip(rect, &format!("{}\nTag: {}\nLayer: {}", info.name, info.tag, layer));
        }

        self.last_row = Some(bounds);
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// 1 px line at the row top. The first visible row instead pre-draws
    /// the lines of the rows below it.
    fn draw_horizontal_separator(&self, canvas: &mut dyn Canvas, config: &DecorConfig, bounds: Rect, first_visible: bool) {
        let line = config.palette.line;
        let mut rect = Rect::from_min_max(pos2(0.0, bounds.min.y), pos2(bounds.max.x, bounds.min.y + 1.0));
        if !first_visible {
            canvas.fill_rect(rect, line);
            return;
        }
        let (count, step) = self.band_extent(config, bounds);
        for _ in 0..count {
            rect = rect.translate(vec2(0.0, step));
            canvas.fill_rect(rect, line);
        }
    }

    /// Alternating tint from the first visible row downwards.
    fn draw_banding(&self, canvas: &mut dyn Canvas, config: &DecorConfig, bounds: Rect) {
        let mut rect = Rect::from_min_max(pos2(0.0, bounds.min.y), bounds.max);
        let h = bounds.height();
        let (count, _) = self.band_extent(config, bounds);
        for _ in 0..count {
            if (rect.min.y / h) % 2.0 < 1.0 {
                canvas.fill_rect(rect, config.palette.sort);
            }
            rect = rect.translate(vec2(0.0, h));
        }
    }

    /// Row count and row height to cover, estimated from the last row of
    /// the previous pass.
    fn band_extent(&self, config: &DecorConfig, bounds: Rect) -> (usize, f32) {
        match self.last_row {
            Some(last) if last.height() > 0.0 => (config.band_rows(last.min.y, last.height()), last.height()),
            _ => (config.band_rows(0.0, 0.0), bounds.height()),
        }
    }
}

fn draw_vertical_separator(canvas: &mut dyn Canvas, config: &DecorConfig, slot: Rect) {
    let bottom = if config.objects_only() {
        slot.max.y
    } else {
        config.separator_extent.max(slot.max.y)
    };
    let rect = Rect::from_min_max(pos2(slot.min.x, slot.min.y), pos2(slot.min.x + 1.0, bottom));
    canvas.fill_rect(rect, config.palette.line);
}

/// Locked nodes may not stay selected.
fn drop_locked_from_selection<H: Host + ?Sized>(host: &mut H) {
    let selection = host.selection();
    let kept: Vec<NodeId> = selection
        .iter()
        .copied()
        .filter(|id| host.node(*id).is_none_or(|n| !n.locked()))
        .collect();
    if kept.len() != selection.len() {
        debug!("Dropping {} locked nodes from selection", selection.len() - kept.len());
        host.set_selection(&kept);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::canvas::{Click, DrawCall, Glyph, InputEvent, Key, Modifiers, PointerButton, RecordingCanvas};
    use crate::core::decor_config::{LabelType, Separators};
    use crate::core::event_bus::{LogMessageEvent, downcast_event};
    use crate::core::host::{HideFlags, Hierarchy, SelectionHost};
    use crate::core::log_index::{Severity, SeveritySet};
    use crate::core::registry::{DecoratorKind, DrawOrder};
    use crate::scene::MemoryScene;

    const H: f32 = 16.0;

    fn row(i: usize) -> Rect {
        let y = i as f32 * H;
        Rect::from_min_max(pos2(40.0, y), pos2(300.0, y + H))
    }

    /// Config with everything visual off, so tests only see what they enable.
    fn bare() -> DecorConfig {
        DecorConfig {
            draw_order: DrawOrder::empty(),
            tree: false,
            warnings: false,
            tooltips: false,
            selection: false,
            trailing: false,
            select_locked: true,
            label_type: LabelType::None,
            separators: Separators::empty(),
            ..Default::default()
        }
    }

    fn engine(config: DecorConfig) -> (RowDecorationEngine, EventBus) {
        let bus = EventBus::new();
        (RowDecorationEngine::new(Arc::new(config), bus.clone()), bus)
    }

    fn toggled_events(bus: &EventBus) -> Vec<bool> {
        bus.poll()
            .iter()
            .filter_map(|e| downcast_event::<DecorationsToggledEvent>(e).map(|t| t.enabled))
            .collect()
    }

    #[test]
    fn test_slots_laid_out_right_to_left_in_order() {
        use DecoratorKind::*;
        let orders = [vec![Active, Static, Lock], vec![Lock, Active, Static], vec![Static, Lock, Active]];
        for order in orders {
            let mut s = MemoryScene::new();
            let n = s.add("n", None);
            s.edit(n, |node| node.is_static = true);
            s.edit(n, |node| node.hide_flags = HideFlags::NOT_EDITABLE);
            s.edit(n, |node| node.active = false);

            let config = DecorConfig { draw_order: DrawOrder::new(order.clone()), offset: 2.0, ..bare() };
            let (mut e, _) = engine(config);
            let mut canvas = RecordingCanvas::new();
            e.render_row(&mut s, &mut canvas, n, row(0));

            let toggles: Vec<(Rect, bool)> = canvas
                .calls
                .iter()
                .filter_map(|c| match c {
                    DrawCall::Toggle { rect, on, .. } => Some((*rect, *on)),
                    _ => None,
                })
                .collect();
            assert_eq!(toggles.len(), order.len());
            for (i, (kind, (rect, on))) in order.iter().zip(toggles).enumerate() {
                assert_eq!(rect.min.x, 300.0 - 2.0 - (i as f32 + 1.0) * H);
                assert_eq!(rect.width(), H);
                assert_eq!(rect.min.y, 1.0);
                // Active is the only one off in this scene
                assert_eq!(on, *kind != Active);
            }
        }
    }

    #[test]
    fn test_duplicate_kind_draws_twice() {
        let mut s = MemoryScene::new();
        let n = s.add("n", None);
        let order = DrawOrder::new(vec![DecoratorKind::Active, DecoratorKind::Active]);
        let (mut e, _) = engine(DecorConfig { draw_order: order, ..bare() });
        let mut canvas = RecordingCanvas::new();
        e.render_row(&mut s, &mut canvas, n, row(0));
        assert_eq!(canvas.toggles().len(), 2);
    }

    #[test]
    fn test_hotkey_toggles_and_consumes() {
        let mut s = MemoryScene::new();
        let n = s.add("n", None);
        let config = DecorConfig { draw_order: DrawOrder::new(vec![DecoratorKind::Active]), ..bare() };
        let (mut e, bus) = engine(config);

        let mut canvas = RecordingCanvas::new();
        canvas.set_event(Some(InputEvent::KeyDown { key: Key::H, modifiers: Modifiers::CTRL }));
        e.render_row(&mut s, &mut canvas, n, row(0));
        assert!(!e.is_enabled());
        assert!(canvas.event_consumed());
        assert!(canvas.calls.is_empty());

        canvas.set_event(Some(InputEvent::KeyDown { key: Key::H, modifiers: Modifiers::CTRL }));
        e.render_row(&mut s, &mut canvas, n, row(0));
        assert!(e.is_enabled());
        assert_eq!(canvas.toggles().len(), 1);
        assert_eq!(toggled_events(&bus), vec![false, true]);
    }

    #[test]
    fn test_fourth_failure_disables_engine() {
        let mut s = MemoryScene::new();
        let n = s.add("n", None);
        s.read_only = true;
        let config = DecorConfig { draw_order: DrawOrder::new(vec![DecoratorKind::Active]), ..bare() };
        let (mut e, bus) = engine(config);
        let mut canvas = RecordingCanvas::new();

        let fail_row = |e: &mut RowDecorationEngine, canvas: &mut RecordingCanvas, s: &mut MemoryScene| {
            canvas.clear();
            canvas.script(Click::Toggle(0));
            e.render_row(s, canvas, n, row(0));
        };

        fail_row(&mut e, &mut canvas, &mut s);
        fail_row(&mut e, &mut canvas, &mut s);
        // A clean row in between does not clear the count
        canvas.clear();
        e.render_row(&mut s, &mut canvas, n, row(0));
        fail_row(&mut e, &mut canvas, &mut s);
        assert!(e.is_enabled());
        assert_eq!(e.failures(), 3);

        fail_row(&mut e, &mut canvas, &mut s);
        assert!(!e.is_enabled());
        assert_eq!(e.failures(), 0);
        assert_eq!(toggled_events(&bus), vec![false]);

        canvas.clear();
        e.render_row(&mut s, &mut canvas, n, row(0));
        assert!(canvas.calls.is_empty());

        e.set_enabled(true);
        e.render_row(&mut s, &mut canvas, n, row(0));
        assert_eq!(canvas.toggles().len(), 1);
    }

    #[test]
    fn test_failing_slot_still_draws_whole_row() {
        use DecoratorKind::*;
        let mut s = MemoryScene::new();
        let n = s.add("n", None);
        s.read_only = true;
        let config = DecorConfig {
            draw_order: DrawOrder::new(vec![Active, Lock, Static]),
            tooltips: true,
            ..bare()
        };
        let (mut e, _) = engine(config);
        let mut canvas = RecordingCanvas::new();
        canvas.script(Click::Toggle(0));

        e.render_row(&mut s, &mut canvas, n, row(0));

        assert_eq!(canvas.toggles().len(), 3);
        assert!(canvas.calls.iter().any(|c| matches!(c, DrawCall::Tooltip { .. })));
        assert_eq!(e.failures(), 1);
        assert!(e.is_enabled());
    }

    #[test]
    fn test_vanished_node_is_skipped() {
        let mut s = MemoryScene::new();
        let (mut e, _) = engine(DecorConfig::default());
        let mut canvas = RecordingCanvas::new();
        e.render_row(&mut s, &mut canvas, NodeId(42), row(0));
        assert!(canvas.calls.is_empty());
        assert_eq!(e.failures(), 0);
        assert!(e.last_row().is_none());
    }

    #[test]
    fn test_enemy_tag_label_end_to_end() {
        let mut s = MemoryScene::new();
        let n = s.add("Grunt", None);
        s.edit(n, |node| node.tag = "Enemy".into());
        let config = DecorConfig { label_type: LabelType::TagOrLayer, ..DecorConfig::default() };
        let (mut e, _) = engine(config);
        let mut canvas = RecordingCanvas::new();
        e.render_row(&mut s, &mut canvas, n, row(0));

        let labels: Vec<&str> = canvas
            .calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Choice { current, .. } if !current.is_empty() => Some(current.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(labels, vec!["Enemy"]);
        assert_eq!(canvas.tooltips().last().copied(), Some("Grunt\nTag: Enemy\nLayer: Default"));
    }

    #[test]
    fn test_mini_label_pick_writes_back() {
        let mut s = MemoryScene::new();
        let n = s.add("Grunt", None);
        s.edit(n, |node| node.tag = "Enemy".into());
        let player = s.tags().iter().position(|t| t == "Player").unwrap();
        let (mut e, _) = engine(DecorConfig { label_type: LabelType::Tag, ..bare() });
        let mut canvas = RecordingCanvas::new();
        canvas.script(Click::Choice { nth: 0, option: player });
        e.render_row(&mut s, &mut canvas, n, row(0));
        assert_eq!(s.node(n).unwrap().tag, "Player");
    }

    #[test]
    fn test_truncation_at_exact_boundary() {
        let mut s = MemoryScene::new();
        let n = s.add("Exact", None);
        let config = DecorConfig { trailing: true, ..bare() };
        let (mut e, _) = engine(config);
        let mut canvas = RecordingCanvas::new();
        // 260 wide row, no slots, offset 2
        canvas.widths.insert("Exact".into(), 258.0);
        e.render_row(&mut s, &mut canvas, n, row(0));
        assert_eq!(canvas.labels(), vec!["..."]);

        let mut canvas = RecordingCanvas::new();
        canvas.widths.insert("Exact".into(), 257.5);
        e.render_row(&mut s, &mut canvas, n, row(0));
        assert!(canvas.labels().is_empty());
    }

    #[test]
    fn test_badges_count_toward_truncation() {
        let mut s = MemoryScene::new();
        let n = s.add("Name", None);
        s.edit(n, |node| node.broken_behaviour = true);
        let (mut e, _) = engine(DecorConfig { trailing: true, warnings: true, ..bare() });
        let mut canvas = RecordingCanvas::new();
        // 260 - 1 badge * 16 - 2 = 242
        canvas.widths.insert("Name".into(), 242.0);
        e.render_row(&mut s, &mut canvas, n, row(0));
        assert_eq!(canvas.labels(), vec!["..."]);
        assert_eq!(canvas.glyphs(Glyph::Warning).len(), 1);
    }

    #[test]
    fn test_dangling_behaviour_warns_with_empty_log() {
        let mut s = MemoryScene::new();
        let n = s.add("n", None);
        s.edit(n, |node| node.broken_behaviour = true);
        let (mut e, bus) = engine(DecorConfig { warnings: true, ..bare() });
        bus.emit(LogMessageEvent { severity: Severity::Info });
        assert!(e.idle_tick(&mut s));
        assert!(e.log_index().is_empty());

        let mut canvas = RecordingCanvas::new();
        e.render_row(&mut s, &mut canvas, n, row(0));
        assert_eq!(canvas.glyphs(Glyph::Warning).len(), 1);
        assert!(canvas.glyphs(Glyph::Error).is_empty());
    }

    #[test]
    fn test_log_entries_become_badges_after_idle_tick() {
        let mut s = MemoryScene::new();
        let a = s.add("a", None);
        let b = s.add("b", None);
        s.log(a, Severity::Error);
        let comp = s.add_component(b);
        s.log_object(Some(comp), Severity::Warning.mode_bit());

        let (mut e, bus) = engine(DecorConfig { warnings: true, ..bare() });
        let mut canvas = RecordingCanvas::new();
        e.render_row(&mut s, &mut canvas, a, row(0));
        assert!(canvas.glyphs(Glyph::Error).is_empty());

        bus.emit(LogMessageEvent { severity: Severity::Error });
        assert!(e.idle_tick(&mut s));
        assert_eq!(e.log_index().severity(a), SeveritySet::of(&[Severity::Error]));
        assert_eq!(e.log_index().severity(b), SeveritySet::of(&[Severity::Warning]));

        canvas.clear();
        e.render_row(&mut s, &mut canvas, a, row(0));
        assert_eq!(canvas.glyphs(Glyph::Error).len(), 1);
    }

    #[test]
    fn test_idle_tick_waits_while_disabled_or_badges_off() {
        let mut s = MemoryScene::new();
        let a = s.add("a", None);
        s.log(a, Severity::Error);
        let (mut e, bus) = engine(DecorConfig { warnings: false, ..bare() });
        bus.emit(LogMessageEvent { severity: Severity::Error });
        assert!(!e.idle_tick(&mut s));

        e.set_config(Arc::new(DecorConfig { warnings: true, ..bare() }));
        e.set_enabled(false);
        assert!(!e.idle_tick(&mut s));
        e.set_enabled(true);
        assert!(e.idle_tick(&mut s));
        assert_eq!(e.log_index().len(), 1);
    }

    #[test]
    fn test_locked_nodes_leave_selection_on_first_row() {
        let mut s = MemoryScene::new();
        let a = s.add("a", None);
        let b = s.add("b", None);
        s.edit(b, |node| node.hide_flags = HideFlags::NOT_EDITABLE);
        s.set_selection(&[a, b]);

        let (mut e, _) = engine(DecorConfig { select_locked: false, ..bare() });
        let mut canvas = RecordingCanvas::new();
        e.render_row(&mut s, &mut canvas, a, row(0));
        assert_eq!(s.selection(), vec![a]);

        let mut s2 = MemoryScene::new();
        let a = s2.add("a", None);
        s2.edit(a, |node| node.hide_flags = HideFlags::NOT_EDITABLE);
        s2.set_selection(&[a]);
        let (mut e, _) = engine(bare());
        e.render_row(&mut s2, &mut canvas, a, row(0));
        assert_eq!(s2.selection(), vec![a]);
    }

    #[test]
    fn test_first_visible_row_detection() {
        let mut s = MemoryScene::new();
        let n = s.add("n", None);
        let (mut e, _) = engine(DecorConfig { separators: Separators::COLOR, ..bare() });
        let mut canvas = RecordingCanvas::new();

        e.render_row(&mut s, &mut canvas, n, row(0));
        // Banding covers row_cap rows, every other one tinted
        assert_eq!(canvas.calls.len(), 50);

        canvas.clear();
        e.render_row(&mut s, &mut canvas, n, row(1));
        assert!(canvas.calls.is_empty());

        // Next frame starts over at the top
        e.render_row(&mut s, &mut canvas, n, row(0));
        assert_eq!(canvas.calls.len(), 50);
    }

    #[test]
    fn test_line_separators() {
        let mut s = MemoryScene::new();
        let n = s.add("n", None);
        let config = DecorConfig {
            separators: Separators::LINE,
            draw_order: DrawOrder::new(vec![DecoratorKind::Active]),
            ..bare()
        };
        let (mut e, _) = engine(config.clone());
        let mut canvas = RecordingCanvas::new();

        e.render_row(&mut s, &mut canvas, n, row(0));
        let fills: Vec<Rect> = canvas
            .calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Fill { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect();
        // 100 pre-drawn lines below the first row, then one vertical slot separator
        assert_eq!(fills.len(), 101);
        assert_eq!(fills[0].min.y, H);
        assert_eq!(fills[0].height(), 1.0);
        let vertical = fills[100];
        assert_eq!(vertical.width(), 1.0);
        assert_eq!(vertical.max.y, config.separator_extent);

        canvas.clear();
        e.render_row(&mut s, &mut canvas, n, row(1));
        let DrawCall::Fill { rect, .. } = &canvas.calls[0] else { panic!("expected line") };
        assert_eq!(rect.min, pos2(0.0, H));
    }

    #[test]
    fn test_objects_only_limits_vertical_separator() {
        let mut s = MemoryScene::new();
        let n = s.add("n", None);
        let config = DecorConfig {
            separators: Separators::LINE | Separators::OBJECTS_ONLY,
            draw_order: DrawOrder::new(vec![DecoratorKind::Active]),
            ..bare()
        };
        let (mut e, _) = engine(config);
        let mut canvas = RecordingCanvas::new();
        e.render_row(&mut s, &mut canvas, n, row(0));
        // No cached row yet: nothing pre-drawn, only the slot separator
        assert_eq!(canvas.calls.len(), 2);
        let DrawCall::Fill { rect, .. } = &canvas.calls[1] else { panic!("expected separator") };
        assert_eq!(rect.max.y, 1.0 + H);
    }

    #[test]
    fn test_drag_selection_through_engine() {
        let mut s = MemoryScene::new();
        let ids: Vec<NodeId> = (0..6).map(|i| s.add(&format!("n{i}"), None)).collect();
        let (mut e, _) = engine(DecorConfig { selection: true, tooltips: true, ..bare() });
        let mut canvas = RecordingCanvas::new();

        let frame = |e: &mut RowDecorationEngine, canvas: &mut RecordingCanvas, s: &mut MemoryScene, y: f32| {
            canvas.clear();
            canvas.set_event(Some(InputEvent::PointerDrag {
                button: PointerButton::Secondary,
                start: pos2(60.0, 4.0),
                pos: pos2(60.0, y),
                modifiers: Modifiers::NONE,
            }));
            for (i, id) in ids.iter().enumerate() {
                e.render_row(s, canvas, *id, row(i));
            }
        };

        frame(&mut e, &mut canvas, &mut s, 4.0);
        assert!(canvas.event_consumed());
        frame(&mut e, &mut canvas, &mut s, 40.0);
        assert_eq!(s.selection(), ids[0..3].to_vec());
        // Row tooltips are suppressed while dragging
        assert!(canvas.tooltips().is_empty());

        canvas.set_event(Some(InputEvent::PointerUp { button: PointerButton::Secondary, pos: pos2(60.0, 40.0) }));
        e.render_row(&mut s, &mut canvas, ids[0], row(0));
        assert!(!e.selection_drag().is_dragging());
        assert_eq!(s.selection(), ids[0..3].to_vec());
    }

    #[test]
    fn test_render_is_idempotent_for_same_bounds() {
        let mut s = MemoryScene::sample();
        let n = s.find("Player").unwrap();
        let (mut e, _) = engine(DecorConfig::default());
        let mut a = RecordingCanvas::new();
        let mut b = RecordingCanvas::new();
        e.render_row(&mut s, &mut a, n, row(0));
        e.render_row(&mut s, &mut b, n, row(0));
        assert_eq!(a.calls, b.calls);
        assert!(s.journal().iter().all(|m| !m.is_state_change()));
    }
}
