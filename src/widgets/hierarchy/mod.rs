//! Hierarchy panel widget
//!
//! Indented node rows drawn by the host, decorated by the row engine

pub mod egui_canvas;
pub mod hierarchy_ui;

pub use egui_canvas::EguiCanvas;
pub use hierarchy_ui::render;
