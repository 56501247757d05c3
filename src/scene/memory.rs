//! In-memory hierarchy implementing every host capability.
//!
//! Backs the desktop demo and the engine tests. Every mutation is appended
//! to a journal so tests can assert exactly what the engine asked for.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use eframe::egui::Rect;
use indexmap::IndexMap;
use log::{debug, info};

use crate::core::host::{
    Choice, DEFAULT_TAG, DialogHost, EditorHost, HideFlags, Hierarchy, HostError, IconId, LogEntry, LogSource, NodeId,
    NodeInfo, NodeKind, ObjectId, PrefabHost, SelectionHost,
};
use crate::core::log_index::Severity;

use super::dialogs::ScriptedDialogs;

/// Stored node state.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub active: bool,
    pub is_static: bool,
    pub hide_flags: HideFlags,
    pub tag: String,
    pub layer: u32,
    pub kind: NodeKind,
    pub broken_behaviour: bool,
    pub icon: Option<IconId>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Every change requested through a capability, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Undo(NodeId),
    Active(NodeId, bool),
    Static(NodeId, bool),
    HideFlags(NodeId, HideFlags),
    Tag(NodeId, String),
    Layer(NodeId, u32),
    ApplyPrefab(Vec<NodeId>),
    CreatePrefab(NodeId, PathBuf),
    RepaintAll,
    IconPicker(NodeId),
}

impl Mutation {
    /// True for entries that change node state (not undo/repaint bookkeeping).
    pub fn is_state_change(&self) -> bool {
        !matches!(self, Mutation::Undo(_) | Mutation::RepaintAll | Mutation::IconPicker(_))
    }
}

pub struct MemoryScene {
    nodes: IndexMap<NodeId, SceneNode>,
    roots: Vec<NodeId>,
    next_id: u64,
    tags: Vec<String>,
    layers: Vec<(u32, String)>,
    selection: Vec<NodeId>,
    collapsed: HashSet<NodeId>,
    dialogs: Box<dyn DialogHost>,
    asks: usize,
    journal: Vec<Mutation>,
    /// Reject every node mutation (simulates a read-only host).
    pub read_only: bool,
    logs: Vec<LogEntry>,
    /// Component object ids and the node they sit on.
    components: HashMap<ObjectId, NodeId>,
    /// Simulates an unreachable log buffer.
    pub log_available: bool,
}

impl std::fmt::Debug for MemoryScene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryScene")
            .field("nodes", &self.nodes.len())
            .field("selection", &self.selection)
            .field("logs", &self.logs.len())
            .finish()
    }
}

impl Default for MemoryScene {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryScene {
    pub fn new() -> Self {
        Self {
            nodes: IndexMap::new(),
            roots: Vec::new(),
            next_id: 1,
            tags: [
                "Untagged",
                "Respawn",
                "Finish",
                "EditorOnly",
                "MainCamera",
                "Player",
                "GameController",
                "Enemy",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            layers: vec![
                (0, "Default".into()),
                (1, "TransparentFX".into()),
                (2, "Ignore Raycast".into()),
                (4, "Water".into()),
                (5, "UI".into()),
            ],
            selection: Vec::new(),
            collapsed: HashSet::new(),
            dialogs: Box::new(ScriptedDialogs::default()),
            asks: 0,
            journal: Vec::new(),
            read_only: false,
            logs: Vec::new(),
            components: HashMap::new(),
            log_available: true,
        }
    }

    /// Replace the dialog backend (scripted in tests, native in the app).
    pub fn set_dialogs(&mut self, dialogs: Box<dyn DialogHost>) {
        self.dialogs = dialogs;
    }

    /// Add a plain, active, untagged node.
    pub fn add(&mut self, name: &str, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            SceneNode {
                name: name.to_string(),
                active: true,
                is_static: false,
                hide_flags: HideFlags::empty(),
                tag: DEFAULT_TAG.to_string(),
                layer: 0,
                kind: NodeKind::Plain,
                broken_behaviour: false,
                icon: None,
                parent,
                children: Vec::new(),
            },
        );
        match parent.and_then(|p| self.nodes.get_mut(&p)) {
            Some(p) => p.children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    /// Direct edit without journaling (scene setup).
    pub fn edit(&mut self, id: NodeId, f: impl FnOnce(&mut SceneNode)) {
        if let Some(node) = self.nodes.get_mut(&id) {
            f(node);
        }
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().find(|(_, n)| n.name == name).map(|(id, _)| *id)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of confirmation dialogs shown so far.
    pub fn asks(&self) -> usize {
        self.asks
    }

    pub fn journal(&self) -> &[Mutation] {
        &self.journal
    }

    pub fn clear_journal(&mut self) {
        self.journal.clear();
    }

    pub fn is_expanded(&self, id: NodeId) -> bool {
        !self.collapsed.contains(&id)
    }

    pub fn toggle_expanded(&mut self, id: NodeId) {
        if !self.collapsed.remove(&id) {
            self.collapsed.insert(id);
        }
    }

    /// Rows currently visible as `(node, depth)`, depth first.
    pub fn visible_rows(&self) -> Vec<(NodeId, usize)> {
        let mut rows = Vec::new();
        let mut stack: Vec<(NodeId, usize)> = self.roots.iter().rev().map(|id| (*id, 0)).collect();
        while let Some((id, depth)) = stack.pop() {
            rows.push((id, depth));
            if let Some(node) = self.nodes.get(&id)
                && self.is_expanded(id)
            {
                stack.extend(node.children.iter().rev().map(|c| (*c, depth + 1)));
            }
        }
        rows
    }

    /// Register a component on `node` and return its object id.
    pub fn add_component(&mut self, node: NodeId) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.components.insert(id, node);
        id
    }

    /// Append a log entry against `node` itself.
    pub fn log(&mut self, node: NodeId, severity: Severity) {
        self.log_object(Some(ObjectId(node.0)), severity.mode_bit());
    }

    /// Append a raw log entry.
    pub fn log_object(&mut self, context: Option<ObjectId>, mode: u32) {
        self.logs.push(LogEntry { context, mode });
    }

    pub fn clear_logs(&mut self) {
        self.logs.clear();
    }

    fn active_in_hierarchy(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(c) = current {
            match self.nodes.get(&c) {
                Some(n) if n.active => current = n.parent,
                _ => return false,
            }
        }
        true
    }

    fn layer_name(&self, layer: u32) -> String {
        self.layers
            .iter()
            .find(|(i, _)| *i == layer)
            .map(|(_, n)| n.clone())
            .unwrap_or_default()
    }

    fn mutate(&mut self, id: NodeId, entry: Mutation, f: impl FnOnce(&mut SceneNode)) -> Result<(), HostError> {
        if self.read_only {
            return Err(HostError::Rejected(format!("scene is read-only ({entry:?})")));
        }
        let node = self.nodes.get_mut(&id).ok_or(HostError::NodeMissing(id))?;
        f(node);
        debug!("Scene mutation: {:?}", entry);
        self.journal.push(entry);
        Ok(())
    }
}

impl Hierarchy for MemoryScene {
    fn node(&self, id: NodeId) -> Option<NodeInfo> {
        let n = self.nodes.get(&id)?;
        Some(NodeInfo {
            id,
            name: n.name.clone(),
            active_self: n.active,
            active_in_hierarchy: self.active_in_hierarchy(id),
            is_static: n.is_static,
            hide_flags: n.hide_flags,
            tag: n.tag.clone(),
            layer: n.layer,
            layer_name: self.layer_name(n.layer),
            child_count: n.children.len(),
            parent: n.parent,
            kind: n.kind,
            has_broken_behaviour: n.broken_behaviour,
        })
    }

    fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes.get(&id).map(|n| n.children.clone()).unwrap_or_default()
    }

    fn set_active(&mut self, id: NodeId, active: bool) -> Result<(), HostError> {
        self.mutate(id, Mutation::Active(id, active), |n| n.active = active)
    }

    fn set_static(&mut self, id: NodeId, is_static: bool) -> Result<(), HostError> {
        self.mutate(id, Mutation::Static(id, is_static), |n| n.is_static = is_static)
    }

    fn set_hide_flags(&mut self, id: NodeId, flags: HideFlags) -> Result<(), HostError> {
        self.mutate(id, Mutation::HideFlags(id, flags), |n| n.hide_flags = flags)
    }

    fn set_tag(&mut self, id: NodeId, tag: &str) -> Result<(), HostError> {
        if !self.tags.iter().any(|t| t == tag) {
            return Err(HostError::Rejected(format!("unknown tag '{tag}'")));
        }
        let owned = tag.to_string();
        self.mutate(id, Mutation::Tag(id, owned.clone()), |n| n.tag = owned)
    }

    fn set_layer(&mut self, id: NodeId, layer: u32) -> Result<(), HostError> {
        self.mutate(id, Mutation::Layer(id, layer), |n| n.layer = layer)
    }

    fn tags(&self) -> Vec<String> {
        self.tags.clone()
    }

    fn layers(&self) -> Vec<(u32, String)> {
        self.layers.clone()
    }

    fn preview_icon(&self, id: NodeId) -> Option<IconId> {
        self.nodes.get(&id).and_then(|n| n.icon)
    }

    fn record_undo(&mut self, id: NodeId, _label: &str) {
        self.journal.push(Mutation::Undo(id));
    }
}

impl SelectionHost for MemoryScene {
    fn selection(&self) -> Vec<NodeId> {
        self.selection.clone()
    }

    fn set_selection(&mut self, nodes: &[NodeId]) {
        self.selection = nodes.iter().copied().filter(|id| self.nodes.contains_key(id)).collect();
    }
}

impl DialogHost for MemoryScene {
    fn ask(&mut self, title: &str, message: &str, options: [&str; 3]) -> Result<Choice, HostError> {
        self.asks += 1;
        self.dialogs.ask(title, message, options)
    }

    fn prefab_save_path(&mut self, default_name: &str) -> Option<PathBuf> {
        self.dialogs.prefab_save_path(default_name)
    }
}

impl PrefabHost for MemoryScene {
    fn apply_prefab_changes(&mut self) -> Result<(), HostError> {
        if self.read_only {
            return Err(HostError::Rejected("scene is read-only".into()));
        }
        info!("Applying prefab changes for {:?}", self.selection);
        self.journal.push(Mutation::ApplyPrefab(self.selection.clone()));
        Ok(())
    }

    fn create_prefab(&mut self, id: NodeId, path: &Path) -> Result<(), HostError> {
        self.mutate(id, Mutation::CreatePrefab(id, path.to_path_buf()), |n| {
            n.kind = NodeKind::PrefabInstance
        })
    }
}

impl EditorHost for MemoryScene {
    fn repaint_all(&mut self) {
        self.journal.push(Mutation::RepaintAll);
    }

    fn open_icon_picker(&mut self, id: NodeId, _anchor: Rect) {
        self.journal.push(Mutation::IconPicker(id));
    }
}

impl LogSource for MemoryScene {
    fn snapshot(&mut self) -> Result<Vec<LogEntry>, HostError> {
        if !self.log_available {
            return Err(HostError::Unavailable("log buffer"));
        }
        Ok(self.logs.clone())
    }

    fn owning_node(&self, object: ObjectId) -> Option<NodeId> {
        let as_node = NodeId(object.0);
        if self.nodes.contains_key(&as_node) {
            return Some(as_node);
        }
        self.components.get(&object).copied()
    }
}
