//! In-memory hierarchy used by the desktop app and the tests.

pub mod dialogs;
pub mod file;
pub mod memory;

pub use dialogs::{NativeDialogs, ScriptedDialogs};
pub use file::{NodeDef, SceneFile};
pub use memory::{MemoryScene, Mutation, SceneNode};
