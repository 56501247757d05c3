//! TREEDECO - hierarchy row decorations library
//!
//! Re-exports all modules for use by binary targets.

// Core engine (host interfaces, decorators, selection, log index)
pub mod core;

// App modules
pub mod cli;
pub mod config;
pub mod dialogs;
pub mod scene;
pub mod widgets;

// Re-export commonly used types from core
pub use core::engine::RowDecorationEngine;
pub use core::event_bus::{BoxedEvent, EventBus, downcast_event};
pub use core::{Canvas, DecorConfig, Host, NodeId, NodeInfo};
pub use scene::MemoryScene;
