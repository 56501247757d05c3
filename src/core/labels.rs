//! Trailing mini-label, name truncation overlay and severity badges.

use anyhow::{Result, anyhow};
use eframe::egui::{Color32, Rect, pos2, vec2};

use super::canvas::{Align, Canvas, Glyph, TextStyle};
use super::color::tint;
use super::decor_config::{DecorConfig, LabelType};
use super::decorators::{set_layer, set_tag};
use super::host::{DEFAULT_LAYER, DEFAULT_TAG, Host, NodeInfo};
use super::log_index::{LogCorrelationIndex, Severity, SeveritySet};

/// Side of one severity badge.
pub const BADGE_SIZE: f32 = 17.0;
/// Width of the truncation overlay left of the boundary.
pub const ELLIPSIS_WIDTH: f32 = 18.0;
/// Gap between the mini-label and the leftmost slot.
const MINI_LABEL_GAP: f32 = 4.0;

/// Which attribute a mini-label shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiniLabel {
    Tag,
    Layer,
}

/// Attribute the mini-label shows for `node`, or `None` when the chosen
/// attribute(s) are at their default.
pub fn mini_label(label_type: LabelType, node: &NodeInfo) -> Option<MiniLabel> {
    let has_tag = has_tag(node);
    let has_layer = has_layer(node);
    match label_type {
        LabelType::None => None,
        LabelType::Tag => has_tag.then_some(MiniLabel::Tag),
        LabelType::Layer => has_layer.then_some(MiniLabel::Layer),
        LabelType::TagOrLayer if has_tag => Some(MiniLabel::Tag),
        LabelType::TagOrLayer => has_layer.then_some(MiniLabel::Layer),
        LabelType::LayerOrTag if has_layer => Some(MiniLabel::Layer),
        LabelType::LayerOrTag => has_tag.then_some(MiniLabel::Tag),
    }
}

pub fn has_tag(node: &NodeInfo) -> bool {
    node.tag != DEFAULT_TAG
}

pub fn has_layer(node: &NodeInfo) -> bool {
    node.layer_name != DEFAULT_LAYER
}

fn mini_label_text(label: MiniLabel, node: &NodeInfo) -> &str {
    match label {
        MiniLabel::Tag => &node.tag,
        MiniLabel::Layer => &node.layer_name,
    }
}

/// Measured width of the mini-label, 0 when suppressed.
pub fn mini_label_width(canvas: &dyn Canvas, label_type: LabelType, node: &NodeInfo) -> f32 {
    mini_label(label_type, node)
        .map(|label| canvas.measure_text(mini_label_text(label, node), TextStyle::MiniLabel))
        .unwrap_or(0.0)
}

/// Rect of the mini-label whose right edge sits `MINI_LABEL_GAP` left of
/// `slots_left`. The rect is still returned for a suppressed label; the row
/// tooltip ends at its left edge.
pub fn mini_label_rect(slots_left: f32, slot_top: f32, row_height: f32, width: f32) -> Rect {
    let right = slots_left - MINI_LABEL_GAP;
    let left = right - row_height + 15.0 - width;
    Rect::from_min_max(pos2(left, slot_top), pos2(right, slot_top + row_height))
}

/// Draw the mini-label as a choice field; a pick writes back at once.
pub fn draw_mini_label<H: Host + ?Sized>(
    canvas: &mut dyn Canvas,
    host: &mut H,
    label_type: LabelType,
    node: &NodeInfo,
    color: Color32,
    rect: Rect,
) -> Result<()> {
    match mini_label(label_type, node) {
        Some(MiniLabel::Tag) => {
            let tags = host.tags();
            if let Some(picked) = canvas.choice(rect, &node.tag, &tags, TextStyle::MiniLabel, color) {
                let tag = tags
                    .get(picked)
                    .ok_or_else(|| anyhow!("tag choice {picked} out of range ({} tags)", tags.len()))?;
                set_tag(host, node, tag)?;
            }
        }
        Some(MiniLabel::Layer) => {
            let layers = host.layers();
            let names: Vec<String> = layers.iter().map(|(_, n)| n.clone()).collect();
            if let Some(picked) = canvas.choice(rect, &node.layer_name, &names, TextStyle::MiniLabel, color) {
                let (layer, _) = layers
                    .get(picked)
                    .ok_or_else(|| anyhow!("layer choice {picked} out of range ({} layers)", layers.len()))?;
                set_layer(host, node, *layer)?;
            }
        }
        None => {}
    }
    Ok(())
}

/// Horizontal space left for the name once `slots` decorator/badge slots,
/// the mini-label and the offset are reserved.
pub fn available_name_width(row: Rect, slots: usize, mini_width: f32, offset: f32) -> f32 {
    row.width() - slots as f32 * row.height() - mini_width - offset
}

/// Truncation shows when the name needs at least the available width.
pub fn needs_truncation(name_width: f32, available: f32) -> bool {
    name_width >= available
}

/// Inputs of the truncation overlay that depend on host state.
#[derive(Debug, Clone, Copy)]
pub struct Ellipsis {
    pub selected: bool,
    pub playmode_tint: Color32,
    pub color: Color32,
}

/// Check the name against the reserved width and overlay "..." when it
/// runs under the decorators. `slots` counts decorators plus badges.
/// Returns whether the overlay was drawn.
pub fn draw_truncation(
    canvas: &mut dyn Canvas,
    config: &DecorConfig,
    node: &NodeInfo,
    row: Rect,
    slots: usize,
    style: Ellipsis,
) -> bool {
    let name_width = canvas.measure_text(&node.name, TextStyle::RowLabel);
    let mini_width = mini_label_width(canvas, config.label_type, node);
    let available = available_name_width(row, slots, mini_width, config.offset);
    if !needs_truncation(name_width, available) {
        return false;
    }

    let boundary = row.min.x + available;
    let rect = Rect::from_min_max(pos2(boundary - ELLIPSIS_WIDTH, row.min.y + 2.0), pos2(row.max.x, row.max.y));
    let palette = &config.palette;
    canvas.fill_rect(rect, tint(palette.normal, style.playmode_tint));
    let odd = (row.min.y / row.height()) % 2.0 < 1.0;
    if odd && config.color_separator() {
        canvas.fill_rect(rect, tint(palette.sort, style.playmode_tint));
    }
    if style.selected {
        canvas.fill_rect(rect, palette.selected);
    }
    canvas.label(rect, "...", TextStyle::RowLabel, style.color, Align::Left);
    true
}

/// Severities shown for a node: its log entries plus a warning for any
/// broken behaviour reference.
pub fn node_badges(index: &LogCorrelationIndex, node: &NodeInfo) -> SeveritySet {
    let mut set = index.severity(node.id);
    if node.has_broken_behaviour {
        set.insert(Severity::Warning);
    }
    set
}

/// Paint badges after the name, pulled left so they never run under the
/// decorator slots.
pub fn draw_badges(
    canvas: &mut dyn Canvas,
    config: &DecorConfig,
    node: &NodeInfo,
    row: Rect,
    badges: SeveritySet,
    color: Color32,
) {
    if badges.is_empty() {
        return;
    }
    let name_width = canvas.measure_text(&node.name, TextStyle::RowLabel);
    let mini_width = mini_label_width(canvas, config.label_type, node);
    let reserved = (config.draw_order.len() + badges.len()) as f32 * row.height();
    let x = (row.max.x - reserved - mini_width - 5.0 - config.offset).min(row.min.x + name_width);

    let mut rect = Rect::from_min_size(pos2(x, row.min.y), vec2(BADGE_SIZE, BADGE_SIZE));
    for severity in badges.iter() {
        let glyph = match severity {
            Severity::Info => Glyph::Info,
            Severity::Warning => Glyph::Warning,
            Severity::Error => Glyph::Error,
        };
        canvas.glyph(rect, glyph, color);
        rect = rect.translate(vec2(BADGE_SIZE, 0.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::canvas::{Click, DrawCall, RecordingCanvas};
    use crate::core::host::{HideFlags, NodeId, NodeKind};
    use crate::scene::MemoryScene;
    use crate::core::log_index::LogSignal;
    use crate::core::registry::DrawOrder;

    fn node(name: &str, tag: &str, layer: &str) -> NodeInfo {
        NodeInfo {
            id: NodeId(7),
            name: name.into(),
            active_self: true,
            active_in_hierarchy: true,
            is_static: false,
            hide_flags: HideFlags::empty(),
            tag: tag.into(),
            layer: if layer == "Default" { 0 } else { 4 },
            layer_name: layer.into(),
            child_count: 0,
            parent: None,
            kind: NodeKind::Plain,
            has_broken_behaviour: false,
        }
    }

    fn style() -> Ellipsis {
        Ellipsis { selected: false, playmode_tint: Color32::WHITE, color: Color32::WHITE }
    }

    #[test]
    fn test_label_policy_per_type() {
        let enemy = node("n", "Enemy", "Default");
        assert_eq!(mini_label(LabelType::TagOrLayer, &enemy), Some(MiniLabel::Tag));
        assert_eq!(mini_label(LabelType::LayerOrTag, &enemy), Some(MiniLabel::Tag));
        assert_eq!(mini_label(LabelType::Layer, &enemy), None);
        assert_eq!(mini_label(LabelType::None, &enemy), None);

        let water = node("n", "Untagged", "Water");
        assert_eq!(mini_label(LabelType::TagOrLayer, &water), Some(MiniLabel::Layer));
        assert_eq!(mini_label(LabelType::Tag, &water), None);

        let both = node("n", "Enemy", "Water");
        assert_eq!(mini_label(LabelType::LayerOrTag, &both), Some(MiniLabel::Layer));
        assert_eq!(mini_label(LabelType::TagOrLayer, &both), Some(MiniLabel::Tag));

        assert_eq!(mini_label(LabelType::TagOrLayer, &node("n", "Untagged", "Default")), None);
    }

    #[test]
    fn test_truncation_shown_at_equal_width() {
        let config = DecorConfig { draw_order: DrawOrder::new(vec![]), offset: 0.0, ..Default::default() };
        let row = Rect::from_min_max(pos2(0.0, 0.0), pos2(100.0, 16.0));
        let n = node("Player", "Untagged", "Default");

        let mut canvas = RecordingCanvas::new();
        canvas.widths.insert("Player".into(), 100.0);
        assert!(draw_truncation(&mut canvas, &config, &n, row, 0, style()));
        assert_eq!(canvas.labels(), vec!["..."]);

        let mut canvas = RecordingCanvas::new();
        canvas.widths.insert("Player".into(), 99.9);
        assert!(!draw_truncation(&mut canvas, &config, &n, row, 0, style()));
        assert!(canvas.calls.is_empty());
    }

    #[test]
    fn test_truncation_reserves_slots_label_and_offset() {
        let config = DecorConfig { offset: 2.0, ..Default::default() };
        let row = Rect::from_min_max(pos2(0.0, 16.0), pos2(300.0, 32.0));
        let n = node("Boss", "Enemy", "Default");
        let mut canvas = RecordingCanvas::new();
        canvas.widths.insert("Enemy".into(), 30.0);
        // 300 - 8 * 16 - 30 - 2 = 140
        canvas.widths.insert("Boss".into(), 140.0);
        assert!(draw_truncation(&mut canvas, &config, &n, row, 8, style()));

        let DrawCall::Fill { rect, .. } = &canvas.calls[0] else { panic!("expected fill") };
        assert_eq!(rect.min.x, 140.0 - ELLIPSIS_WIDTH);
        assert_eq!(rect.max.x, 300.0);
        assert_eq!(rect.min.y, 18.0);
        // Second row is not banded: one fill plus the label
        assert_eq!(canvas.calls.len(), 2);
    }

    #[test]
    fn test_selected_row_gets_selection_fill() {
        let config = DecorConfig { separators: Default::default(), ..Default::default() };
        let row = Rect::from_min_max(pos2(0.0, 32.0), pos2(50.0, 48.0));
        let n = node("A long name", "Untagged", "Default");
        let mut canvas = RecordingCanvas::new();
        let s = Ellipsis { selected: true, ..style() };
        assert!(draw_truncation(&mut canvas, &config, &n, row, 7, s));
        // Third row is banded
        let fills: Vec<Color32> = canvas
            .calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Fill { color, .. } => Some(*color),
                _ => None,
            })
            .collect();
        assert_eq!(fills, vec![config.palette.normal, config.palette.sort, config.palette.selected]);
    }

    #[test]
    fn test_broken_behaviour_adds_warning_with_empty_log() {
        let index = LogCorrelationIndex::new(LogSignal::new());
        let mut n = node("n", "Untagged", "Default");
        assert!(node_badges(&index, &n).is_empty());
        n.has_broken_behaviour = true;
        assert_eq!(node_badges(&index, &n), SeveritySet::of(&[Severity::Warning]));
    }

    #[test]
    fn test_badges_clamped_left_of_slots() {
        let config = DecorConfig::default();
        let row = Rect::from_min_max(pos2(20.0, 0.0), pos2(200.0, 16.0));
        let n = node("Name", "Untagged", "Default");
        let mut canvas = RecordingCanvas::new();
        canvas.widths.insert("Name".into(), 150.0);
        let badges = SeveritySet::of(&[Severity::Error, Severity::Info]);
        draw_badges(&mut canvas, &config, &n, row, badges, Color32::WHITE);

        // 200 - (7 + 2) * 16 - 0 - 5 - 2 = 49, less than 20 + 150
        let info = canvas.glyphs(Glyph::Info);
        let error = canvas.glyphs(Glyph::Error);
        assert_eq!(info[0].min.x, 49.0);
        assert_eq!(error[0].min.x, 49.0 + BADGE_SIZE);
        assert_eq!(info[0].width(), BADGE_SIZE);
    }

    #[test]
    fn test_mini_label_rect_sits_left_of_slots() {
        let rect = mini_label_rect(100.0, 1.0, 16.0, 30.0);
        assert_eq!(rect.max.x, 96.0);
        assert_eq!(rect.min.x, 96.0 - 1.0 - 30.0);
    }

    #[test]
    fn test_mini_label_out_of_range_choice_is_an_error() {
        let rect = mini_label_rect(100.0, 1.0, 16.0, 30.0);
        for label_type in [LabelType::Tag, LabelType::Layer] {
            let mut scene = MemoryScene::new();
            let mut canvas = RecordingCanvas::new();
            canvas.script(Click::Choice { nth: 0, option: 999 });
            let info = node("Cube", "Player", "Water");

            let err = draw_mini_label(&mut canvas, &mut scene, label_type, &info, Color32::WHITE, rect).unwrap_err();
            assert!(err.to_string().contains("out of range"));
            assert!(scene.journal().is_empty());
        }
    }
}
