//! UI Widgets - hierarchy and console panels
//!
//! Each widget is self-contained and communicates via EventBus

pub mod console;
pub mod hierarchy;
