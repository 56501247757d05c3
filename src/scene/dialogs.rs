//! Dialog backends for [`MemoryScene`](super::MemoryScene).

use std::collections::VecDeque;
use std::path::PathBuf;

use log::debug;

use crate::core::host::{Choice, DialogHost, HostError};

/// Answers from a prepared script. An empty script behaves like a host
/// without a dialog system.
#[derive(Debug, Default)]
pub struct ScriptedDialogs {
    /// `None` entries make `ask` fail.
    answers: VecDeque<Option<Choice>>,
    save_path: Option<PathBuf>,
    asked: Vec<String>,
}

impl ScriptedDialogs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, choice: Choice) -> Self {
        self.answers.push_back(Some(choice));
        self
    }

    /// Next `ask` returns an error.
    pub fn fail(mut self) -> Self {
        self.answers.push_back(None);
        self
    }

    pub fn save_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.save_path = Some(path.into());
        self
    }
}

impl DialogHost for ScriptedDialogs {
    fn ask(&mut self, title: &str, _message: &str, _options: [&str; 3]) -> Result<Choice, HostError> {
        self.asked.push(title.to_string());
        match self.answers.pop_front() {
            Some(Some(choice)) => Ok(choice),
            Some(None) => Err(HostError::Rejected(format!("dialog '{title}' failed"))),
            None => Err(HostError::Unavailable("dialog")),
        }
    }

    fn prefab_save_path(&mut self, _default_name: &str) -> Option<PathBuf> {
        self.save_path.clone()
    }
}

/// Native message boxes and save panels.
#[derive(Debug, Default)]
pub struct NativeDialogs;

impl DialogHost for NativeDialogs {
    fn ask(&mut self, title: &str, message: &str, options: [&str; 3]) -> Result<Choice, HostError> {
        let [first, second, cancel] = options;
        let result = rfd::MessageDialog::new()
            .set_level(rfd::MessageLevel::Info)
            .set_title(title)
            .set_description(message)
            .set_buttons(rfd::MessageButtons::YesNoCancelCustom(
                first.to_string(),
                second.to_string(),
                cancel.to_string(),
            ))
            .show();
        debug!("Dialog '{}' answered {:?}", title, result);

        Ok(match result {
            rfd::MessageDialogResult::Yes => Choice::First,
            rfd::MessageDialogResult::No => Choice::Second,
            rfd::MessageDialogResult::Custom(label) if label == first => Choice::First,
            rfd::MessageDialogResult::Custom(label) if label == second => Choice::Second,
            _ => Choice::Cancel,
        })
    }

    fn prefab_save_path(&mut self, default_name: &str) -> Option<PathBuf> {
        rfd::FileDialog::new()
            .set_title("Save New Prefab")
            .add_filter("Prefab", &["prefab"])
            .set_file_name(format!("{default_name}.prefab"))
            .save_file()
    }
}
