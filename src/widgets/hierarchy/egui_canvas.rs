//! [`Canvas`] implementation painting into an egui `Ui`.
//!
//! The engine works in panel-local coordinates (x = 0 is the left edge of the
//! hierarchy content); `origin` maps them to screen space.

use eframe::egui::{self, Color32, FontId, Pos2, Rect, RichText, Sense, Stroke, Vec2, pos2};

use crate::core::canvas::{Align, Canvas, Glyph, InputEvent, Key, Modifiers, PointerButton, TextStyle};
use crate::core::host::IconId;

pub struct EguiCanvas<'a> {
    ui: &'a mut egui::Ui,
    origin: Vec2,
    event: Option<InputEvent>,
    consumed: bool,
    // Widget ids are handed out in call order, stable while the row set is.
    next_id: u64,
}

impl<'a> EguiCanvas<'a> {
    /// Wrap `ui`. `origin` is the screen position of local (0, 0).
    pub fn new(ui: &'a mut egui::Ui, origin: Pos2) -> Self {
        let event = frame_event(ui.ctx(), origin.to_vec2());
        Self {
            ui,
            origin: origin.to_vec2(),
            event,
            consumed: false,
            next_id: 0,
        }
    }

    pub fn ui(&mut self) -> &mut egui::Ui {
        &mut *self.ui
    }

    /// Local rect to screen rect.
    pub fn to_screen(&self, rect: Rect) -> Rect {
        rect.translate(self.origin)
    }

    fn widget_id(&mut self, salt: &str) -> egui::Id {
        self.next_id += 1;
        egui::Id::new("treedeco_row_widget").with(salt).with(self.next_id)
    }

    fn font(&self, style: TextStyle) -> FontId {
        match style {
            TextStyle::RowLabel => egui::TextStyle::Body.resolve(self.ui.style()),
            TextStyle::MiniLabel => egui::TextStyle::Small.resolve(self.ui.style()),
        }
    }

    fn paint_glyph(&self, rect: Rect, glyph: Glyph, tint: Color32) {
        let rect = self.to_screen(rect);
        let painter = self.ui.painter();
        let c = rect.center();
        let r = rect.height().min(rect.width()) * 0.3;
        let stroke = Stroke::new(1.0, tint);
        let text = |s: &str, color: Color32| {
            painter.text(c, egui::Align2::CENTER_CENTER, s, FontId::proportional(rect.height() * 0.7), color);
        };
        match glyph {
            Glyph::ActiveOn => {
                painter.rect_stroke(Rect::from_center_size(c, Vec2::splat(r * 2.0)), 2.0, stroke, egui::StrokeKind::Inside);
                painter.rect_filled(Rect::from_center_size(c, Vec2::splat(r)), 1.0, tint);
            }
            Glyph::ActiveOff => {
                painter.rect_stroke(Rect::from_center_size(c, Vec2::splat(r * 2.0)), 2.0, stroke, egui::StrokeKind::Inside);
            }
            Glyph::StaticOn => text("S", tint),
            Glyph::StaticOff => text("S", tint.gamma_multiply(0.35)),
            Glyph::LockOn => text("🔒", tint),
            Glyph::LockOff => text("🔓", tint.gamma_multiply(0.35)),
            Glyph::TagField => text("#", tint),
            Glyph::LayerField => text("☰", tint),
            Glyph::TreeLine => {
                painter.line_segment([pos2(c.x, rect.min.y), pos2(c.x, rect.max.y)], stroke);
            }
            Glyph::TreeMiddle => {
                painter.line_segment([pos2(c.x, rect.min.y), pos2(c.x, rect.max.y)], stroke);
                painter.line_segment([c, pos2(rect.max.x, c.y)], stroke);
            }
            Glyph::TreeEnd => {
                painter.line_segment([pos2(c.x, rect.min.y), c], stroke);
                painter.line_segment([c, pos2(rect.max.x, c.y)], stroke);
            }
            Glyph::Info => badge(painter, rect, "i", Color32::from_rgb(80, 140, 220)),
            Glyph::Warning => badge(painter, rect, "!", Color32::from_rgb(230, 180, 40)),
            Glyph::Error => badge(painter, rect, "x", Color32::from_rgb(220, 60, 60)),
        }
    }

    fn paint_icon(&self, rect: Rect, icon: IconId) {
        let rect = self.to_screen(rect);
        let hue = (icon.0.wrapping_mul(0x9E37_79B9) % 360) as f32 / 360.0;
        let color: Color32 = egui::ecolor::Hsva::new(hue, 0.55, 0.8, 1.0).into();
        self.ui.painter().rect_filled(rect.shrink(2.0), 3.0, color);
    }
}

fn badge(painter: &egui::Painter, rect: Rect, text: &str, color: Color32) {
    let c = rect.center();
    painter.circle_filled(c, rect.height().min(rect.width()) * 0.42, color);
    painter.text(c, egui::Align2::CENTER_CENTER, text, FontId::proportional(rect.height() * 0.65), Color32::BLACK);
}

fn modifiers(m: egui::Modifiers) -> Modifiers {
    Modifiers { ctrl: m.command, shift: m.shift, alt: m.alt }
}

/// The single input event the engine sees this frame, in local coordinates.
fn frame_event(ctx: &egui::Context, origin: Vec2) -> Option<InputEvent> {
    let typing = ctx.wants_keyboard_input();
    ctx.input(|i| {
        let mods = modifiers(i.modifiers);
        for event in i.events.iter().filter(|_| !typing) {
            if let egui::Event::Key { key: egui::Key::H, pressed: true, repeat: false, .. } = event {
                return Some(InputEvent::KeyDown { key: Key::H, modifiers: mods });
            }
        }
        let pos = i.pointer.interact_pos()? - origin;
        if i.pointer.button_released(egui::PointerButton::Secondary) {
            return Some(InputEvent::PointerUp { button: PointerButton::Secondary, pos });
        }
        if i.pointer.button_down(egui::PointerButton::Secondary) && i.pointer.is_decidedly_dragging() {
            let start = i.pointer.press_origin().map_or(pos, |p| p - origin);
            return Some(InputEvent::PointerDrag { button: PointerButton::Secondary, start, pos, modifiers: mods });
        }
        None
    })
}

impl Canvas for EguiCanvas<'_> {
    fn event(&self) -> Option<InputEvent> {
        if self.consumed { None } else { self.event }
    }

    fn consume_event(&mut self) {
        self.consumed = true;
    }

    fn measure_text(&self, text: &str, style: TextStyle) -> f32 {
        self.ui
            .painter()
            .layout_no_wrap(text.to_owned(), self.font(style), Color32::WHITE)
            .size()
            .x
    }

    fn fill_rect(&mut self, rect: Rect, color: Color32) {
        let rect = self.to_screen(rect);
        self.ui.painter().rect_filled(rect, 0.0, color);
    }

    fn glyph(&mut self, rect: Rect, glyph: Glyph, tint: Color32) {
        self.paint_glyph(rect, glyph, tint);
    }

    fn label(&mut self, rect: Rect, text: &str, style: TextStyle, color: Color32, align: Align) {
        let rect = self.to_screen(rect);
        let (anchor, pos) = match align {
            Align::Left => (egui::Align2::LEFT_CENTER, rect.left_center()),
            Align::Center => (egui::Align2::CENTER_CENTER, rect.center()),
            Align::Right => (egui::Align2::RIGHT_CENTER, rect.right_center()),
        };
        let font = self.font(style);
        let clip = rect.intersect(self.ui.clip_rect());
        self.ui
            .painter()
            .with_clip_rect(clip)
            .text(pos, anchor, text, font, color);
    }

    fn tooltip(&mut self, rect: Rect, text: &str) {
        let id = self.widget_id("tooltip");
        let rect = self.to_screen(rect);
        let _ = self.ui.interact(rect, id, Sense::hover()).on_hover_text(text);
    }

    fn toggle(&mut self, rect: Rect, on: bool, glyphs: (Glyph, Glyph), background: Color32) -> bool {
        let id = self.widget_id("toggle");
        let response = self.ui.interact(self.to_screen(rect), id, Sense::click());
        let glyph = if on { glyphs.0 } else { glyphs.1 };
        self.paint_glyph(rect, glyph, background);
        response.clicked()
    }

    fn button(&mut self, rect: Rect, text: &str, tint: Color32) -> bool {
        let id = self.widget_id("button");
        let screen = self.to_screen(rect);
        let response = self.ui.interact(screen, id, Sense::click());
        let fill = if response.hovered() {
            tint.gamma_multiply(0.25)
        } else {
            Color32::TRANSPARENT
        };
        self.ui.painter().rect_filled(screen.shrink(1.0), 2.0, fill);
        self.ui.painter().text(
            screen.center(),
            egui::Align2::CENTER_CENTER,
            text,
            FontId::proportional(screen.height() * 0.7),
            tint,
        );
        response.clicked()
    }

    fn icon_button(&mut self, rect: Rect, icon: IconId) -> bool {
        let id = self.widget_id("icon");
        let response = self.ui.interact(self.to_screen(rect), id, Sense::click());
        self.paint_icon(rect, icon);
        response.clicked()
    }

    fn choice(&mut self, rect: Rect, current: &str, options: &[String], style: TextStyle, color: Color32) -> Option<usize> {
        let id = self.widget_id("choice");
        let screen = self.to_screen(rect);
        let initial = options.iter().position(|o| o == current);
        let mut picked = initial;
        let font = self.font(style);

        let mut child = self.ui.new_child(
            egui::UiBuilder::new()
                .max_rect(screen)
                .layout(egui::Layout::left_to_right(egui::Align::Center))
                .id_salt(id),
        );
        child.spacing_mut().interact_size.y = screen.height();
        let text = RichText::new(current).font(font).color(color);
        egui::ComboBox::from_id_salt(id)
            .width(screen.width())
            .selected_text(text)
            .show_ui(&mut child, |ui| {
                for (i, option) in options.iter().enumerate() {
                    ui.selectable_value(&mut picked, Some(i), option);
                }
            });

        if picked != initial { picked } else { None }
    }
}
