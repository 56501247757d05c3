//! Palette and node label colors.

use eframe::egui::Color32;

use super::host::{NodeInfo, NodeKind};

/// Colors used for decorations. Two built-in variants match dark and light
/// editor skins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    /// Alternating-row tint.
    pub sort: Color32,
    pub line: Color32,
    pub background_enabled: Color32,
    pub background_disabled: Color32,
    /// Row background, used under the truncation ellipsis.
    pub normal: Color32,
    pub selected: Color32,
    pub label: LabelColors,
}

/// Node name colors for `{plain, prefab, broken prefab} x {active, inactive}`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelColors {
    pub normal: Color32,
    pub disabled: Color32,
    pub prefab: Color32,
    pub prefab_disabled: Color32,
    pub broken: Color32,
    pub broken_disabled: Color32,
}

impl Palette {
    pub fn dark() -> Self {
        Self {
            sort: Color32::from_rgba_unmultiplied(0, 0, 0, 26),
            line: Color32::from_rgb(30, 30, 30),
            background_enabled: Color32::from_rgb(155, 155, 155),
            background_disabled: Color32::from_rgba_unmultiplied(155, 155, 155, 100),
            normal: Color32::from_rgb(56, 56, 56),
            selected: Color32::from_rgb(62, 95, 150),
            label: LabelColors {
                normal: Color32::from_rgb(210, 210, 210),
                disabled: Color32::from_rgb(120, 120, 120),
                prefab: Color32::from_rgb(124, 162, 238),
                prefab_disabled: Color32::from_rgb(90, 110, 150),
                broken: Color32::from_rgb(226, 110, 110),
                broken_disabled: Color32::from_rgb(150, 90, 90),
            },
        }
    }

    pub fn light() -> Self {
        Self {
            sort: Color32::from_rgba_unmultiplied(255, 255, 255, 51),
            line: Color32::from_rgb(100, 100, 100),
            background_enabled: Color32::from_rgb(65, 65, 65),
            background_disabled: Color32::from_rgba_unmultiplied(65, 65, 65, 120),
            normal: Color32::from_rgb(194, 194, 194),
            selected: Color32::from_rgb(62, 125, 231),
            label: LabelColors {
                normal: Color32::from_rgb(0, 0, 0),
                disabled: Color32::from_rgb(110, 110, 110),
                prefab: Color32::from_rgb(0, 40, 140),
                prefab_disabled: Color32::from_rgb(80, 100, 150),
                broken: Color32::from_rgb(130, 0, 0),
                broken_disabled: Color32::from_rgb(150, 80, 80),
            },
        }
    }

    /// Label color for a node. A missing node resolves to black.
    pub fn node_color(&self, node: Option<&NodeInfo>) -> Color32 {
        let Some(node) = node else {
            return Color32::BLACK;
        };
        let active = node.active_in_hierarchy;
        let l = &self.label;
        match (node.kind, active) {
            (NodeKind::Plain, true) => l.normal,
            (NodeKind::Plain, false) => l.disabled,
            (NodeKind::PrefabInstance, true) => l.prefab,
            (NodeKind::PrefabInstance, false) => l.prefab_disabled,
            (NodeKind::BrokenPrefab, true) => l.broken,
            (NodeKind::BrokenPrefab, false) => l.broken_disabled,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::dark()
    }
}

/// Multiply two colors channel-wise (used for the play mode tint).
pub fn tint(color: Color32, by: Color32) -> Color32 {
    let mul = |a: u8, b: u8| ((a as u16 * b as u16 + 127) / 255) as u8;
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    let [tr, tg, tb, ta] = by.to_srgba_unmultiplied();
    Color32::from_rgba_unmultiplied(mul(r, tr), mul(g, tg), mul(b, tb), mul(a, ta))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::host::{HideFlags, NodeId};

    fn node(kind: NodeKind, active: bool) -> NodeInfo {
        NodeInfo {
            id: NodeId(1),
            name: "n".into(),
            active_self: active,
            active_in_hierarchy: active,
            is_static: false,
            hide_flags: HideFlags::empty(),
            tag: "Untagged".into(),
            layer: 0,
            layer_name: "Default".into(),
            child_count: 0,
            parent: None,
            kind,
            has_broken_behaviour: false,
        }
    }

    #[test]
    fn test_node_color_by_kind_and_activity() {
        let p = Palette::dark();
        assert_eq!(p.node_color(Some(&node(NodeKind::Plain, true))), p.label.normal);
        assert_eq!(p.node_color(Some(&node(NodeKind::Plain, false))), p.label.disabled);
        assert_eq!(p.node_color(Some(&node(NodeKind::PrefabInstance, true))), p.label.prefab);
        assert_eq!(p.node_color(Some(&node(NodeKind::BrokenPrefab, false))), p.label.broken_disabled);
    }

    #[test]
    fn test_missing_node_is_black() {
        assert_eq!(Palette::light().node_color(None), Color32::BLACK);
    }

    #[test]
    fn test_white_tint_is_identity() {
        let c = Color32::from_rgb(56, 56, 56);
        assert_eq!(tint(c, Color32::WHITE), c);
    }
}
