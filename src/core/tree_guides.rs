//! Connector guides linking a row to its ancestors.

use eframe::egui::{Rect, vec2};

use super::canvas::{Canvas, Glyph};
use super::color::Palette;
use super::host::{Hierarchy, NodeInfo};

/// Width of one indentation column.
pub const GUIDE_WIDTH: f32 = 14.0;

/// Draw the guides for `node` in the columns left of `row.min.x`.
///
/// A leaf with a parent gets an end or middle elbow in the nearest column.
/// Each further column going left gets a vertical line when the matching
/// ancestor still has siblings below it.
pub fn draw_tree<H: Hierarchy + ?Sized>(
    canvas: &mut dyn Canvas,
    host: &H,
    palette: &Palette,
    node: &NodeInfo,
    row: Rect,
) {
    let mut column = Rect::from_min_size(row.min - vec2(GUIDE_WIDTH, 0.0), vec2(GUIDE_WIDTH, row.height()));

    if node.child_count == 0 && node.parent.is_some() {
        let glyph = if host.is_last_sibling(node.id) {
            Glyph::TreeEnd
        } else {
            Glyph::TreeMiddle
        };
        canvas.glyph(column, glyph, palette.node_color(Some(node)));
    }

    let mut parent = node.parent.and_then(|p| host.node(p));
    column = column.translate(vec2(-GUIDE_WIDTH, 0.0));
    while column.min.x > 0.0 {
        let Some(current) = parent else { break };
        let Some(grand) = current.parent.and_then(|g| host.node(g)) else {
            break;
        };
        if !host.is_last_sibling(current.id) {
            canvas.glyph(column, Glyph::TreeLine, palette.node_color(Some(&grand)));
        }
        parent = Some(grand);
        column = column.translate(vec2(-GUIDE_WIDTH, 0.0));
    }
}
