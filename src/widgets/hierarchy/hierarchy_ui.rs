use eframe::egui::{self, Color32, Rect, Sense, Stroke, pos2, vec2};

use super::egui_canvas::EguiCanvas;
use crate::core::canvas::{Align, Canvas, TextStyle};
use crate::core::engine::RowDecorationEngine;
use crate::core::host::{Hierarchy, NodeId, SelectionHost};
use crate::core::tree_guides::GUIDE_WIDTH;
use crate::scene::MemoryScene;

pub const ROW_HEIGHT: f32 = 18.0;
/// Left edge of a root row; the column before it holds the foldout arrow.
pub const ROOT_INDENT: f32 = 16.0;

/// Local bounds of the row at `index` for a node at `depth`.
pub fn row_bounds(index: usize, depth: usize, width: f32) -> Rect {
    let top = index as f32 * ROW_HEIGHT;
    let left = ROOT_INDENT + depth as f32 * GUIDE_WIDTH;
    Rect::from_min_max(pos2(left, top), pos2(width.max(left), top + ROW_HEIGHT))
}

/// Render hierarchy window: one row per expanded node, decorated by the engine.
pub fn render(ui: &mut egui::Ui, scene: &mut MemoryScene, engine: &mut RowDecorationEngine) {
    let rows = scene.visible_rows();

    egui::ScrollArea::vertical()
        .id_salt("hierarchy_scroll")
        .auto_shrink([false; 2])
        .show(ui, |ui| {
            let width = ui.available_width();
            let (content, _) = ui.allocate_exact_size(vec2(width, rows.len() as f32 * ROW_HEIGHT), Sense::hover());
            let mut canvas = EguiCanvas::new(ui, content.min);

            for (index, &(id, depth)) in rows.iter().enumerate() {
                let bounds = row_bounds(index, depth, width);
                draw_row(&mut canvas, scene, engine, id, bounds);
                engine.render_row(scene, &mut canvas, id, bounds);
            }

            if let Some(rect) = engine.selection_drag().selection_rect() {
                let rect = canvas.to_screen(rect);
                let stroke = Stroke::new(1.0, Color32::from_rgb(120, 160, 230));
                canvas
                    .ui()
                    .painter()
                    .rect_stroke(rect, 0.0, stroke, egui::StrokeKind::Inside);
            }
        });
}

/// Host part of a row: selection highlight, foldout and name. Handles the
/// left click selection and expand/collapse.
fn draw_row(canvas: &mut EguiCanvas<'_>, scene: &mut MemoryScene, engine: &RowDecorationEngine, id: NodeId, bounds: Rect) {
    let Some(info) = scene.node(id) else {
        return;
    };
    let palette = engine.config().palette;
    let full = Rect::from_min_max(pos2(0.0, bounds.min.y), bounds.max);

    let row_id = egui::Id::new("hierarchy_row").with(id.0);
    let row_screen = canvas.to_screen(full);
    let response = canvas.ui().interact(row_screen, row_id, Sense::click());

    let mut selection = scene.selection();
    if response.clicked() {
        let ctrl = canvas.ui().input(|i| i.modifiers.command);
        if ctrl {
            if let Some(pos) = selection.iter().position(|n| *n == id) {
                selection.remove(pos);
            } else {
                selection.push(id);
            }
        } else {
            selection = vec![id];
        }
        scene.set_selection(&selection);
    }

    if selection.contains(&id) {
        canvas.fill_rect(full, palette.selected);
    }

    if info.child_count > 0 {
        let arrow = Rect::from_min_size(bounds.min - vec2(GUIDE_WIDTH, 0.0), vec2(GUIDE_WIDTH, bounds.height()));
        let arrow_screen = canvas.to_screen(arrow);
        let fold = canvas
            .ui()
            .interact(arrow_screen, row_id.with("fold"), Sense::click());
        let expanded = scene.is_expanded(id);
        let text = if expanded { "⏷" } else { "⏵" };
        canvas.label(arrow, text, TextStyle::RowLabel, palette.label.normal, Align::Center);
        if fold.clicked() {
            scene.toggle_expanded(id);
        }
    }

    let color = palette.node_color(Some(&info));
    canvas.label(bounds, &info.name, TextStyle::RowLabel, color, Align::Left);
}
