//! Dialog windows

pub mod prefs;
