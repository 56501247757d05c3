use eframe::egui::{self, Color32, RichText};

use crate::core::event_bus::{EventBus, LogMessageEvent};
use crate::core::host::{Hierarchy, NodeId, SelectionHost};
use crate::core::log_index::Severity;
use crate::scene::MemoryScene;

/// One line shown in the console.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleLine {
    pub severity: Severity,
    pub text: String,
    pub node: Option<NodeId>,
}

/// Console input and history
#[derive(Debug, Clone)]
pub struct ConsoleState {
    pub lines: Vec<ConsoleLine>,
    pub input: String,
    pub severity: Severity,
}

impl Default for ConsoleState {
    fn default() -> Self {
        Self {
            lines: Vec::new(),
            input: String::new(),
            severity: Severity::Warning,
        }
    }
}

impl ConsoleState {
    /// Append `text` to the scene log against `node` and announce it.
    pub fn post(&mut self, scene: &mut MemoryScene, bus: &EventBus, severity: Severity, text: &str, node: Option<NodeId>) {
        match node {
            Some(id) => scene.log(id, severity),
            None => scene.log_object(None, severity.mode_bit()),
        }
        self.lines.push(ConsoleLine {
            severity,
            text: text.to_string(),
            node,
        });
        bus.emit(LogMessageEvent { severity });
    }

    /// Drop all lines and the scene log.
    pub fn clear(&mut self, scene: &mut MemoryScene) {
        self.lines.clear();
        scene.clear_logs();
    }
}

fn severity_color(severity: Severity) -> Color32 {
    match severity {
        Severity::Info => Color32::from_rgb(170, 190, 220),
        Severity::Warning => Color32::from_rgb(230, 180, 40),
        Severity::Error => Color32::from_rgb(230, 80, 80),
    }
}

fn severity_name(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "Info",
        Severity::Warning => "Warning",
        Severity::Error => "Error",
    }
}

/// Render console window. Returns true when the log was cleared.
pub fn render(ui: &mut egui::Ui, state: &mut ConsoleState, scene: &mut MemoryScene, bus: &EventBus) -> bool {
    let target = scene.selection().first().copied();
    let mut cleared = false;

    ui.horizontal(|ui| {
        for severity in Severity::ALL {
            ui.radio_value(&mut state.severity, severity, severity_name(severity));
        }
        ui.separator();
        let response = ui.add(
            egui::TextEdit::singleline(&mut state.input)
                .hint_text("Message")
                .desired_width(240.0),
        );
        let submit = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        let label = match target.and_then(|id| scene.node(id)) {
            Some(node) => format!("Post to {}", node.name),
            None => "Post".to_string(),
        };
        if (ui.button(label).clicked() || submit) && !state.input.trim().is_empty() {
            let text = std::mem::take(&mut state.input);
            let severity = state.severity;
            state.post(scene, bus, severity, &text, target);
        }
        ui.separator();
        if ui.button("Clear").on_hover_text("Ctrl+L").clicked() {
            state.clear(scene);
            cleared = true;
        }
    });

    ui.separator();

    egui::ScrollArea::vertical()
        .id_salt("console_scroll")
        .auto_shrink([false; 2])
        .stick_to_bottom(true)
        .show(ui, |ui| {
            for line in &state.lines {
                let owner = line
                    .node
                    .and_then(|id| scene.node(id))
                    .map(|n| n.name)
                    .unwrap_or_else(|| "-".to_string());
                ui.label(
                    RichText::new(format!("[{}] {}: {}", severity_name(line.severity), owner, line.text))
                        .color(severity_color(line.severity))
                        .monospace(),
                );
            }
        });

    cleared
}
