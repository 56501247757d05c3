//! Host capability interfaces.
//!
//! The engine never owns tree data. Everything it reads or mutates goes
//! through these traits, which the hosting tree view implements. Calls are
//! synchronous and made on the UI thread from inside `render_row`.

use std::path::PathBuf;

use bitflags::bitflags;
use eframe::egui::{Color32, Rect};
use serde::{Deserialize, Serialize};

/// Opaque node identifier handed out by the host tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of an arbitrary host object a log entry may point at
/// (the node itself or one of its components).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

/// Handle to a preview image the host knows how to paint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IconId(pub u64);

/// Prefab relationship of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NodeKind {
    #[default]
    Plain,
    PrefabInstance,
    BrokenPrefab,
}

bitflags! {
    /// Visibility/editability flag set attached to every node.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct HideFlags: u32 {
        const HIDE_IN_HIERARCHY = 1 << 0;
        const HIDE_IN_INSPECTOR = 1 << 1;
        const DONT_SAVE_IN_EDITOR = 1 << 2;
        const NOT_EDITABLE = 1 << 3;
        const DONT_SAVE_IN_BUILD = 1 << 4;
        const DONT_UNLOAD_UNUSED = 1 << 5;
    }
}

/// Snapshot of everything the engine reads about a node for one row.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeInfo {
    pub id: NodeId,
    pub name: String,
    /// Own active flag.
    pub active_self: bool,
    /// Active after parents are taken into account (drives the label color).
    pub active_in_hierarchy: bool,
    pub is_static: bool,
    pub hide_flags: HideFlags,
    pub tag: String,
    pub layer: u32,
    pub layer_name: String,
    pub child_count: usize,
    /// Weak back reference; the engine never follows it for ownership.
    pub parent: Option<NodeId>,
    pub kind: NodeKind,
    /// At least one attached behaviour failed to load.
    pub has_broken_behaviour: bool,
}

impl NodeInfo {
    pub fn locked(&self) -> bool {
        self.hide_flags.contains(HideFlags::NOT_EDITABLE)
    }
}

/// Failures reported by host capabilities.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The node vanished between enumeration and use.
    #[error("node {0} does not exist")]
    NodeMissing(NodeId),

    /// The capability is not available right now (dialog system, log buffer...).
    #[error("host capability unavailable: {0}")]
    Unavailable(&'static str),

    /// The host refused the request.
    #[error("host rejected request: {0}")]
    Rejected(String),
}

/// Name of the tag meaning "untagged".
pub const DEFAULT_TAG: &str = "Untagged";
/// Name of the layer meaning "no layer".
pub const DEFAULT_LAYER: &str = "Default";

/// Read/write access to the tree nodes.
pub trait Hierarchy {
    fn node(&self, id: NodeId) -> Option<NodeInfo>;
    fn children(&self, id: NodeId) -> Vec<NodeId>;

    fn set_active(&mut self, id: NodeId, active: bool) -> Result<(), HostError>;
    fn set_static(&mut self, id: NodeId, is_static: bool) -> Result<(), HostError>;
    fn set_hide_flags(&mut self, id: NodeId, flags: HideFlags) -> Result<(), HostError>;
    fn set_tag(&mut self, id: NodeId, tag: &str) -> Result<(), HostError>;
    fn set_layer(&mut self, id: NodeId, layer: u32) -> Result<(), HostError>;

    /// All tags the host accepts, in display order.
    fn tags(&self) -> Vec<String>;
    /// All named layers as `(index, name)` pairs.
    fn layers(&self) -> Vec<(u32, String)>;

    /// Preview image associated with the node, if any.
    fn preview_icon(&self, id: NodeId) -> Option<IconId>;

    /// Called before any mutation so the host can make it undoable.
    fn record_undo(&mut self, _id: NodeId, _label: &str) {}

    /// The node itself followed by every descendant, depth first.
    fn self_and_descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            let children = self.children(current);
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// True when the node has no parent or is its parent's last child.
    fn is_last_sibling(&self, id: NodeId) -> bool {
        let Some(parent) = self.node(id).and_then(|n| n.parent) else {
            return true;
        };
        self.children(parent).last() == Some(&id)
    }
}

/// The host's active multi-selection.
pub trait SelectionHost {
    fn selection(&self) -> Vec<NodeId>;
    fn set_selection(&mut self, nodes: &[NodeId]);
}

/// Answer to the three-way confirmation dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    First,
    Second,
    Cancel,
}

/// Modal questions the engine may need answered.
pub trait DialogHost {
    /// Three-button confirmation. `options[2]` is always the cancel option.
    fn ask(&mut self, title: &str, message: &str, options: [&str; 3]) -> Result<Choice, HostError>;

    /// Save-file panel for a new prefab asset. `None` means the user cancelled.
    fn prefab_save_path(&mut self, default_name: &str) -> Option<PathBuf>;
}

/// Prefab asset operations.
pub trait PrefabHost {
    /// Push the instance's overrides back to its prefab source. Operates on the
    /// host's active selection.
    fn apply_prefab_changes(&mut self) -> Result<(), HostError>;

    /// Create a new prefab asset from the node and connect the node to it.
    fn create_prefab(&mut self, id: NodeId, path: &std::path::Path) -> Result<(), HostError>;
}

/// Editor-wide services that are not tied to a single node.
pub trait EditorHost {
    /// Repaint every view (lock state changes selection behaviour elsewhere).
    fn repaint_all(&mut self);

    /// Open the external icon picker anchored at `anchor`.
    fn open_icon_picker(&mut self, id: NodeId, anchor: Rect);

    /// Tint multiplied into overlay backgrounds (play mode darkening).
    fn playmode_tint(&self) -> Color32 {
        Color32::WHITE
    }
}

/// Everything `render_row` needs from the host.
pub trait Host: Hierarchy + SelectionHost + DialogHost + PrefabHost + EditorHost {}

impl<T: Hierarchy + SelectionHost + DialogHost + PrefabHost + EditorHost> Host for T {}

/// One entry of the host's log buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Object the message was logged against, if any.
    pub context: Option<ObjectId>,
    /// Raw mode bits as reported by the host.
    pub mode: u32,
}

/// Pull-based access to the host's log buffer.
pub trait LogSource {
    fn snapshot(&mut self) -> Result<Vec<LogEntry>, HostError>;

    /// Node owning `object` (the node itself, or the node a component sits on).
    fn owning_node(&self, object: ObjectId) -> Option<NodeId>;
}
