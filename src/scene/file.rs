//! JSON scene description loaded by the desktop app.
//!
//! ```json
//! { "nodes": [ { "name": "Player", "tag": "Player", "children": [ ... ] } ] }
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::core::host::{DEFAULT_TAG, HideFlags, IconId, NodeId, NodeKind};
use crate::core::log_index::Severity;

use super::memory::MemoryScene;

fn yes() -> bool {
    true
}

fn untagged() -> String {
    DEFAULT_TAG.into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDef {
    pub name: String,
    #[serde(default = "yes")]
    pub active: bool,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default = "untagged")]
    pub tag: String,
    #[serde(default)]
    pub layer: u32,
    #[serde(default)]
    pub kind: NodeKind,
    #[serde(default)]
    pub broken_behaviour: bool,
    #[serde(default)]
    pub icon: Option<u64>,
    /// Log messages attached to the node at load time.
    #[serde(default)]
    pub logs: Vec<Severity>,
    #[serde(default)]
    pub children: Vec<NodeDef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneFile {
    pub nodes: Vec<NodeDef>,
}

impl SceneFile {
    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).with_context(|| format!("Read scene {}", path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("Parse scene {}", path.display()))
    }

    pub fn build(&self) -> MemoryScene {
        let mut scene = MemoryScene::new();
        for def in &self.nodes {
            add_def(&mut scene, def, None);
        }
        scene
    }
}

fn add_def(scene: &mut MemoryScene, def: &NodeDef, parent: Option<NodeId>) {
    let id = scene.add(&def.name, parent);
    scene.edit(id, |n| {
        n.active = def.active;
        n.is_static = def.is_static;
        if def.locked {
            n.hide_flags |= HideFlags::NOT_EDITABLE;
        }
        n.tag = def.tag.clone();
        n.layer = def.layer;
        n.kind = def.kind;
        n.broken_behaviour = def.broken_behaviour;
        n.icon = def.icon.map(IconId);
    });
    for severity in &def.logs {
        scene.log(id, *severity);
    }
    for child in &def.children {
        add_def(scene, child, Some(id));
    }
}

impl MemoryScene {
    /// Load a scene file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let scene = SceneFile::from_json(&path)?.build();
        info!("Loaded scene {} ({} nodes)", path.as_ref().display(), scene.len());
        Ok(scene)
    }

    /// Built-in demo scene.
    pub fn sample() -> Self {
        let mut s = MemoryScene::new();
        let env = s.add("Environment", None);
        s.edit(env, |n| n.is_static = true);
        let ground = s.add("Ground", Some(env));
        s.edit(ground, |n| {
            n.is_static = true;
            n.hide_flags |= HideFlags::NOT_EDITABLE;
        });
        let trees = s.add("Trees", Some(env));
        s.edit(trees, |n| n.is_static = true);
        for i in 0..3 {
            let t = s.add(&format!("Tree_{i:02}"), Some(trees));
            s.edit(t, |n| n.is_static = true);
        }
        let water = s.add("Water", Some(env));
        s.edit(water, |n| n.layer = 4);

        let player = s.add("Player", None);
        s.edit(player, |n| {
            n.tag = "Player".into();
            n.kind = NodeKind::PrefabInstance;
            n.icon = Some(IconId(1));
        });
        let camera = s.add("Main Camera", Some(player));
        s.edit(camera, |n| n.tag = "MainCamera".into());
        let weapon = s.add("Weapon", Some(player));
        let comp = s.add_component(weapon);
        s.log_object(Some(comp), Severity::Warning.mode_bit());

        let enemies = s.add("Enemies", None);
        for i in 0..4 {
            let e = s.add(&format!("Enemy_{i}"), Some(enemies));
            s.edit(e, |n| n.tag = "Enemy".into());
            if i == 2 {
                s.edit(e, |n| n.active = false);
            }
        }
        let boss = s.add("Boss (missing script)", Some(enemies));
        s.edit(boss, |n| {
            n.tag = "Enemy".into();
            n.kind = NodeKind::BrokenPrefab;
            n.broken_behaviour = true;
        });
        s.log(boss, Severity::Error);

        let ui = s.add("Canvas", None);
        s.edit(ui, |n| n.layer = 5);
        let hud = s.add("HUD with a rather long name that will not fit", Some(ui));
        s.edit(hud, |n| n.layer = 5);
        s.log(hud, Severity::Info);
        s
    }
}
