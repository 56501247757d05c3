use treedeco::cli::Args;
use treedeco::config::{self, LOG_FILE, PREFS_FILE, PathConfig};
use treedeco::core::engine::RowDecorationEngine;
use treedeco::core::event_bus::{DecorationsToggledEvent, EventBus, PrefsChangedEvent, downcast_event};
use treedeco::core::host::{IconId, NodeId};
use treedeco::dialogs::prefs::prefs_events::{ClearConsoleEvent, ToggleSettingsEvent};
use treedeco::dialogs::prefs::{DecorPrefs, HotkeyAction, HotkeyHandler, render_settings_window};
use treedeco::scene::{MemoryScene, Mutation, NativeDialogs};
use treedeco::widgets::console::{self, ConsoleState};
use treedeco::widgets::hierarchy;

use clap::Parser;
use eframe::egui;
use log::{debug, error, info};

const PICKER_ICONS: u64 = 8;

/// Main application state
struct TreedecoApp {
    scene: MemoryScene,
    engine: RowDecorationEngine,
    prefs: DecorPrefs,
    path_config: PathConfig,
    /// Global event bus for application-wide events
    event_bus: EventBus,
    /// Hotkey handler for global keyboard shortcuts
    hotkey_handler: HotkeyHandler,
    console: ConsoleState,
    show_settings: bool,
    /// Node whose icon picker is open
    icon_picker: Option<NodeId>,
    status: String,
}

impl TreedecoApp {
    fn new(scene: MemoryScene, prefs: DecorPrefs, path_config: PathConfig) -> Self {
        let event_bus = EventBus::new();
        let mut engine = RowDecorationEngine::new(prefs.snapshot(), event_bus.clone());
        if !prefs.enabled {
            engine.set_enabled(false);
        }
        Self {
            scene,
            engine,
            prefs,
            path_config,
            event_bus,
            hotkey_handler: HotkeyHandler::default(),
            console: ConsoleState::default(),
            show_settings: false,
            icon_picker: None,
            status: String::new(),
        }
    }

    /// Route global hotkeys onto the event bus.
    fn handle_hotkeys(&mut self, ctx: &egui::Context) {
        let action = ctx.input(|i| self.hotkey_handler.handle_input(i));
        match action {
            Some(HotkeyAction::ToggleSettings) => self.event_bus.emit(ToggleSettingsEvent),
            Some(HotkeyAction::ClearConsole) => self.event_bus.emit(ClearConsoleEvent),
            // Resolved by the engine inside the hierarchy rows.
            Some(HotkeyAction::ToggleDecorations) | None => {}
        }
    }

    fn handle_events(&mut self) {
        for event in self.event_bus.poll() {
            if downcast_event::<PrefsChangedEvent>(&event).is_some() {
                debug!("Preferences changed, rebuilding config");
                self.engine.set_config(self.prefs.snapshot());
                if self.prefs.enabled != self.engine.is_enabled() {
                    self.engine.set_enabled(self.prefs.enabled);
                }
            } else if let Some(e) = downcast_event::<DecorationsToggledEvent>(&event) {
                self.prefs.enabled = e.enabled;
                self.status = if e.enabled { "Decorations on" } else { "Decorations off" }.to_string();
            } else if downcast_event::<ToggleSettingsEvent>(&event).is_some() {
                self.show_settings = !self.show_settings;
            } else if downcast_event::<ClearConsoleEvent>(&event).is_some() {
                self.console.clear(&mut self.scene);
                self.engine.log_signal().notify();
            }
        }
    }

    /// React to editor requests the engine made through the scene.
    fn drain_journal(&mut self, ctx: &egui::Context) {
        for mutation in self.scene.journal() {
            match mutation {
                Mutation::IconPicker(id) => self.icon_picker = Some(*id),
                Mutation::RepaintAll => ctx.request_repaint(),
                _ => {}
            }
        }
        self.scene.clear_journal();
    }

    fn render_icon_picker(&mut self, ctx: &egui::Context) {
        let Some(id) = self.icon_picker else {
            return;
        };
        let mut open = true;
        let mut picked = None;
        egui::Window::new("Select Icon")
            .id(egui::Id::new("icon_picker_window"))
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal_wrapped(|ui| {
                    for n in 1..=PICKER_ICONS {
                        if ui.button(format!("Icon {n}")).clicked() {
                            picked = Some(Some(IconId(n)));
                        }
                    }
                    if ui.button("None").clicked() {
                        picked = Some(None);
                    }
                });
            });
        if let Some(icon) = picked {
            self.scene.edit(id, |n| n.icon = icon);
            open = false;
        }
        if !open {
            self.icon_picker = None;
        }
    }
}

impl eframe::App for TreedecoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_hotkeys(ctx);
        self.handle_events();

        if self.engine.idle_tick(&mut self.scene) {
            ctx.request_repaint();
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Settings").on_hover_text("Ctrl+Comma").clicked() {
                    self.event_bus.emit(ToggleSettingsEvent);
                }
                ui.separator();
                let mut enabled = self.engine.is_enabled();
                if ui.checkbox(&mut enabled, "Decorations").on_hover_text("Ctrl+H").changed() {
                    self.engine.set_enabled(enabled);
                }
                ui.separator();
                ui.label(&self.status);
            });
        });

        egui::TopBottomPanel::bottom("console")
            .resizable(true)
            .default_height(140.0)
            .show(ctx, |ui| {
                if console::render(ui, &mut self.console, &mut self.scene, &self.event_bus) {
                    self.engine.log_signal().notify();
                }
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            hierarchy::render(ui, &mut self.scene, &mut self.engine);
        });

        render_settings_window(ctx, &mut self.show_settings, &mut self.prefs, &self.event_bus);
        self.render_icon_picker(ctx);
        self.drain_journal(ctx);

        if self.engine.selection_drag().is_dragging() {
            ctx.request_repaint();
        }
    }

    fn save(&mut self, _storage: &mut dyn eframe::Storage) {
        self.prefs.save(&self.path_config);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments first (needed for log setup)
    let args = Args::parse();

    // Create path configuration from CLI args and environment
    let path_config = PathConfig::from_env_and_cli(args.config_dir.clone());

    if let Err(e) = config::ensure_dirs(&path_config) {
        eprintln!("Warning: Failed to create application directories: {:#}", e);
    }

    // 0 (default) = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ (-vvv) = trace
    let log_level = match args.verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    let log_file = args.log_file.as_ref().map(|path| {
        let path = path
            .clone()
            .unwrap_or_else(|| config::data_file(LOG_FILE, &path_config));
        (std::fs::File::create(&path), path)
    });

    match log_file {
        Some((Ok(file), path)) => {
            env_logger::Builder::new()
                .filter_level(log_level)
                .filter_module("egui", log::LevelFilter::Info) // Suppress egui DEBUG spam
                .format_timestamp_millis()
                .target(env_logger::Target::Pipe(Box::new(file)))
                .init();
            info!("Logging to file: {} (level: {:?})", path.display(), log_level);
        }
        other => {
            if let Some((Err(e), path)) = other {
                eprintln!("Warning: Failed to create log file {}: {}", path.display(), e);
            }
            env_logger::Builder::from_env(
                env_logger::Env::default().default_filter_or(log_level.to_string().to_lowercase()),
            )
            .filter_module("egui", log::LevelFilter::Info)
            .format_timestamp_millis()
            .init();
        }
    }

    info!("treedeco starting...");
    debug!("Command-line args: {:?}", args);
    info!("Config path: {}", config::config_file(PREFS_FILE, &path_config).display());

    let mut scene = match &args.scene {
        Some(path) => MemoryScene::load(path).unwrap_or_else(|e| {
            error!("{:#}, falling back to the sample scene", e);
            MemoryScene::sample()
        }),
        None => {
            info!("No scene provided, using the sample scene");
            MemoryScene::sample()
        }
    };
    scene.set_dialogs(Box::new(NativeDialogs));

    let mut prefs = DecorPrefs::load(&path_config);
    if args.disabled {
        prefs.enabled = false;
    }
    if args.light {
        prefs.light_palette = true;
    }

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!(
                "treedeco v{} • Ctrl+H toggles decorations",
                env!("CARGO_PKG_VERSION")
            ))
            .with_inner_size([520.0, 640.0])
            .with_resizable(true),
        persist_window: true,
        persistence_path: Some(config::config_file("treedeco_window.ron", &path_config)),
        ..Default::default()
    };

    eframe::run_native(
        "treedeco",
        native_options,
        Box::new(move |cc| {
            if prefs.light_palette {
                cc.egui_ctx.set_visuals(egui::Visuals::light());
            }
            Ok(Box::new(TreedecoApp::new(scene, prefs, path_config)))
        }),
    )?;

    Ok(())
}
