//! Console panel widget
//!
//! Posts log entries against the selected node and lists them

pub mod console_ui;

pub use console_ui::{ConsoleState, render};
