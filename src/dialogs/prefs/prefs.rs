use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use eframe::egui;
use egui_dnd::dnd;
use egui_ltreeview::TreeView;
use log::{info, warn};

use crate::config::{self, PathConfig, PREFS_FILE};
use crate::core::color::Palette;
use crate::core::decor_config::{DecorConfig, LabelType, Separators, StaticMode};
use crate::core::event_bus::{EventBus, PrefsChangedEvent};
use crate::core::registry::{DecoratorKind, DrawOrder};

/// Settings categories
#[derive(Debug, Clone, Copy, PartialEq)]
enum SettingsCategory {
    General,
    Decorators,
    Labels,
    About,
}

impl SettingsCategory {
    fn as_str(&self) -> &'static str {
        match self {
            SettingsCategory::General => "General",
            SettingsCategory::Decorators => "Decorators",
            SettingsCategory::Labels => "Labels",
            SettingsCategory::About => "About",
        }
    }

    fn from_str(s: &str) -> Option<Self> {
        match s {
            "General" => Some(SettingsCategory::General),
            "Decorators" => Some(SettingsCategory::Decorators),
            "Labels" => Some(SettingsCategory::Labels),
            "About" => Some(SettingsCategory::About),
            _ => None,
        }
    }
}

/// Persisted decoration preferences
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct DecorPrefs {
    pub enabled: bool,
    pub offset: f32,
    pub draw_order: DrawOrder,
    pub tree: bool,
    pub warnings: bool,
    pub tooltips: bool,
    pub selection: bool,
    pub trailing: bool,
    pub select_locked: bool,
    pub label_type: LabelType,
    pub separators: Separators,
    pub static_mode: StaticMode,
    pub row_cap: usize,
    pub separator_extent: f32,
    pub light_palette: bool,

    // Internal
    pub selected_settings_category: Option<String>,
}

impl Default for DecorPrefs {
    fn default() -> Self {
        let cfg = DecorConfig::default();
        Self {
            enabled: true,
            offset: cfg.offset,
            draw_order: cfg.draw_order,
            tree: cfg.tree,
            warnings: cfg.warnings,
            tooltips: cfg.tooltips,
            selection: cfg.selection,
            trailing: cfg.trailing,
            select_locked: cfg.select_locked,
            label_type: cfg.label_type,
            separators: cfg.separators,
            static_mode: cfg.static_mode,
            row_cap: cfg.row_cap,
            separator_extent: cfg.separator_extent,
            light_palette: false,
            selected_settings_category: Some("Decorators".to_string()),
        }
    }
}

impl DecorPrefs {
    /// Build the immutable config the engine renders with.
    pub fn snapshot(&self) -> Arc<DecorConfig> {
        self.draw_order.validate();
        Arc::new(DecorConfig {
            offset: self.offset,
            draw_order: self.draw_order.clone(),
            tree: self.tree,
            warnings: self.warnings,
            tooltips: self.tooltips,
            selection: self.selection,
            trailing: self.trailing,
            select_locked: self.select_locked,
            label_type: self.label_type,
            separators: self.separators,
            static_mode: self.static_mode,
            row_cap: self.row_cap,
            separator_extent: self.separator_extent,
            palette: if self.light_palette { Palette::light() } else { Palette::dark() },
        })
    }

    /// Restore every setting except the selected settings page.
    pub fn reset(&mut self) {
        let category = self.selected_settings_category.take();
        *self = Self {
            selected_settings_category: category,
            ..Self::default()
        };
    }

    /// Serialize prefs to a JSON file.
    pub fn to_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("Serialize preferences")?;
        std::fs::write(path, json)
            .with_context(|| format!("Write preferences: {}", path.display()))?;
        Ok(())
    }

    /// Load prefs from a JSON file. Missing fields take their defaults.
    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Read preferences: {}", path.display()))?;
        let prefs = serde_json::from_str(&json)
            .with_context(|| format!("Parse preferences: {}", path.display()))?;
        Ok(prefs)
    }

    /// Load from the config dir, falling back to defaults.
    pub fn load(paths: &PathConfig) -> Self {
        let path = config::config_file(PREFS_FILE, paths);
        if !path.exists() {
            info!("No preferences at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::from_json(&path) {
            Ok(prefs) => {
                info!("Preferences loaded from {}", path.display());
                prefs
            }
            Err(e) => {
                warn!("{:#}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save to the config dir. Failures are logged, never fatal.
    pub fn save(&self, paths: &PathConfig) {
        let path = config::config_file(PREFS_FILE, paths);
        match self.to_json(&path) {
            Ok(()) => info!("Preferences saved to {}", path.display()),
            Err(e) => warn!("{:#}", e),
        }
    }
}

/// Render General settings category
fn render_general_settings(ui: &mut egui::Ui, prefs: &mut DecorPrefs) {
    ui.heading("Engine");
    ui.add_space(8.0);

    ui.checkbox(&mut prefs.enabled, "Enable row decorations (Ctrl+H)");
    ui.checkbox(&mut prefs.tree, "Draw tree guides");
    ui.checkbox(&mut prefs.warnings, "Show log badges");
    ui.checkbox(&mut prefs.tooltips, "Show tooltips");
    ui.checkbox(&mut prefs.selection, "Right-drag selection");
    ui.checkbox(&mut prefs.select_locked, "Allow selecting locked objects");

    ui.add_space(16.0);
    ui.heading("Separators");
    ui.add_space(8.0);

    let mut flag = |ui: &mut egui::Ui, bit: Separators, text: &str| {
        let mut on = prefs.separators.contains(bit);
        if ui.checkbox(&mut on, text).changed() {
            prefs.separators.set(bit, on);
        }
    };
    flag(ui, Separators::COLOR, "Alternating row color");
    flag(ui, Separators::LINE, "Lines");
    flag(ui, Separators::OBJECTS_ONLY, "Only rows with objects");

    ui.add_space(8.0);
    ui.label("Banded rows when the row count is unknown:");
    ui.add(egui::DragValue::new(&mut prefs.row_cap).range(0..=10_000));

    ui.add_space(16.0);
    ui.heading("Appearance");
    ui.add_space(8.0);
    ui.checkbox(&mut prefs.light_palette, "Light palette");
}

/// Render Decorators settings category
fn render_decorator_settings(ui: &mut egui::Ui, prefs: &mut DecorPrefs) {
    ui.heading("Draw Order");
    ui.add_space(4.0);
    ui.label("Rightmost first. Drag to reorder.");
    ui.add_space(8.0);

    // Positions, not kinds: a duplicated kind still needs a distinct drag id.
    let kinds = prefs.draw_order.kinds().to_vec();
    let mut order: Vec<usize> = (0..kinds.len()).collect();
    let mut remove = None;
    dnd(ui, "decorator_draw_order").show_vec(&mut order, |ui, idx, handle, _state| {
        let pos = *idx;
        ui.horizontal(|ui| {
            handle.ui(ui, |ui| {
                ui.label("≡");
            });
            ui.label(kinds[pos].as_str());
            if ui.small_button("x").on_hover_text("Remove").clicked() {
                remove = Some(pos);
            }
        });
    });
    let reordered: Vec<DecoratorKind> = order
        .into_iter()
        .filter(|pos| Some(*pos) != remove)
        .map(|pos| kinds[pos])
        .collect();
    if reordered != kinds {
        prefs.draw_order = DrawOrder::new(reordered);
    }

    let missing = prefs.draw_order.missing();
    if !missing.is_empty() {
        ui.add_space(8.0);
        ui.horizontal_wrapped(|ui| {
            ui.label("Add:");
            for kind in missing {
                if ui.small_button(kind.as_str()).clicked() {
                    prefs.draw_order.add(kind);
                }
            }
        });
    }

    ui.add_space(16.0);
    ui.heading("Layout");
    ui.add_space(8.0);
    ui.label("Right offset:");
    ui.add(
        egui::Slider::new(&mut prefs.offset, 0.0..=64.0)
            .suffix(" px")
            .step_by(1.0),
    );
    ui.checkbox(&mut prefs.trailing, "Show \"...\" on names hidden under decorators");

    ui.add_space(16.0);
    ui.heading("Static");
    ui.add_space(8.0);
    ui.add_enabled_ui(prefs.draw_order.contains(DecoratorKind::Static), |ui| {
        ui.label("Change children flags:");
        egui::ComboBox::from_id_salt("static_mode")
            .selected_text(prefs.static_mode.as_str())
            .show_ui(ui, |ui| {
                for mode in StaticMode::ALL {
                    ui.selectable_value(&mut prefs.static_mode, mode, mode.as_str());
                }
            });
    });
}

/// Render Labels settings category
fn render_label_settings(ui: &mut egui::Ui, prefs: &mut DecorPrefs) {
    ui.heading("Mini Label");
    ui.add_space(8.0);
    for label_type in LabelType::ALL {
        ui.radio_value(&mut prefs.label_type, label_type, label_type.as_str());
    }
}

fn render_about(ui: &mut egui::Ui) {
    ui.heading(format!("treedeco {}", env!("CARGO_PKG_VERSION")));
    ui.add_space(8.0);
    ui.label("Decorates hierarchy rows with toggles, badges and guides.");
    ui.label("Ctrl+H toggles decorations, right-drag selects rows.");
}

/// Render settings window. Returns true when any preference changed; a
/// `PrefsChangedEvent` is emitted in that case.
pub fn render_settings_window(
    ctx: &egui::Context,
    show_settings: &mut bool,
    prefs: &mut DecorPrefs,
    event_bus: &EventBus,
) -> bool {
    let before = prefs.clone();

    let mut selected = prefs
        .selected_settings_category
        .as_ref()
        .and_then(|s| SettingsCategory::from_str(s))
        .unwrap_or(SettingsCategory::Decorators);

    egui::Window::new("Settings")
        .id(egui::Id::new("settings_window"))
        .open(show_settings)
        .default_size([560.0, 420.0])
        .min_size([420.0, 320.0])
        .resizable(true)
        .collapsible(false)
        .show(ctx, |ui| {
            egui::ScrollArea::both()
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.vertical(|ui| {
                            ui.set_width(140.0);
                            ui.add_space(4.0);

                            let tree_id = ui.make_persistent_id("settings_tree_view");
                            let (_response, actions) = TreeView::new(tree_id).show(ui, |builder| {
                                builder.leaf(0, SettingsCategory::General.as_str());
                                builder.leaf(1, SettingsCategory::Decorators.as_str());
                                builder.leaf(2, SettingsCategory::Labels.as_str());
                                builder.leaf(3, SettingsCategory::About.as_str());
                            });

                            for action in actions {
                                if let egui_ltreeview::Action::SetSelected(node_ids) = action
                                    && let Some(&node_id) = node_ids.first()
                                {
                                    selected = match node_id {
                                        0 => SettingsCategory::General,
                                        1 => SettingsCategory::Decorators,
                                        2 => SettingsCategory::Labels,
                                        3 => SettingsCategory::About,
                                        _ => selected,
                                    };
                                }
                            }

                            ui.add_space(16.0);
                            if ui.button("Use Defaults").clicked() {
                                prefs.reset();
                            }
                        });

                        ui.separator();

                        ui.vertical(|ui| {
                            ui.add_space(8.0);
                            match selected {
                                SettingsCategory::General => render_general_settings(ui, prefs),
                                SettingsCategory::Decorators => render_decorator_settings(ui, prefs),
                                SettingsCategory::Labels => render_label_settings(ui, prefs),
                                SettingsCategory::About => render_about(ui),
                            }
                        });
                    });
                });
        });

    prefs.selected_settings_category = Some(selected.as_str().to_string());

    let changed = DecorPrefs {
        selected_settings_category: None,
        ..prefs.clone()
    } != DecorPrefs {
        selected_settings_category: None,
        ..before
    };
    if changed {
        event_bus.emit(PrefsChangedEvent);
        ctx.request_repaint();
    }
    changed
}
