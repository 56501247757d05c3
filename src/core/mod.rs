//! Core engine modules - host interfaces, decorators, selection, log index
//!
//! These modules form the decoration engine, independent of any UI toolkit
//! beyond egui's geometry types.

pub mod breaker;
pub mod canvas;
pub mod color;
pub mod decor_config;
pub mod decorators;
pub mod engine;
pub mod event_bus;
pub mod host;
pub mod labels;
pub mod log_index;
pub mod registry;
pub mod selection_drag;
pub mod tree_guides;

// Re-exports for convenience
pub use canvas::{Canvas, RecordingCanvas};
pub use color::Palette;
pub use decor_config::{DecorConfig, LabelType, Separators, StaticMode};
pub use engine::RowDecorationEngine;
pub use event_bus::EventBus;
pub use host::{Host, LogSource, NodeId, NodeInfo};
pub use log_index::{LogCorrelationIndex, LogSignal, Severity, SeveritySet};
pub use registry::{DecoratorKind, DrawOrder};
pub use selection_drag::SelectionDragController;
