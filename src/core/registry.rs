//! Decorator kinds and the user-ordered draw pipeline.

use log::warn;
use serde::{Deserialize, Serialize};

/// Every decoration a row slot can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecoratorKind {
    Active,
    Static,
    Lock,
    Icon,
    ApplyPrefab,
    Tag,
    Layer,
}

impl DecoratorKind {
    pub const ALL: [DecoratorKind; 7] = [
        DecoratorKind::Active,
        DecoratorKind::Static,
        DecoratorKind::Lock,
        DecoratorKind::Icon,
        DecoratorKind::ApplyPrefab,
        DecoratorKind::Tag,
        DecoratorKind::Layer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DecoratorKind::Active => "Active",
            DecoratorKind::Static => "Static",
            DecoratorKind::Lock => "Lock",
            DecoratorKind::Icon => "Icon",
            DecoratorKind::ApplyPrefab => "Apply Prefab",
            DecoratorKind::Tag => "Tag",
            DecoratorKind::Layer => "Layer",
        }
    }

    /// Hover text shown on the slot when tooltips are enabled.
    pub fn tooltip(&self) -> &'static str {
        match self {
            DecoratorKind::Active => "Enable/Disable",
            DecoratorKind::Static => "Static",
            DecoratorKind::Lock => "Lock/Unlock",
            DecoratorKind::Icon => "Change icon",
            DecoratorKind::ApplyPrefab => "Apply prefab changes",
            DecoratorKind::Tag => "Tag",
            DecoratorKind::Layer => "Layer",
        }
    }
}

/// Ordered decorator pipeline, drawn right to left.
///
/// Duplicates are accepted (they just draw the same slot twice) but the
/// add menu only offers kinds that are not present yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DrawOrder(Vec<DecoratorKind>);

impl Default for DrawOrder {
    fn default() -> Self {
        Self(vec![
            DecoratorKind::Icon,
            DecoratorKind::Active,
            DecoratorKind::Lock,
            DecoratorKind::Static,
            DecoratorKind::ApplyPrefab,
            DecoratorKind::Tag,
            DecoratorKind::Layer,
        ])
    }
}

impl DrawOrder {
    pub fn new(kinds: Vec<DecoratorKind>) -> Self {
        Self(kinds)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn kinds(&self) -> &[DecoratorKind] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, kind: DecoratorKind) -> bool {
        self.0.contains(&kind)
    }

    /// Append `kind` at the far-left end of the pipeline.
    pub fn add(&mut self, kind: DecoratorKind) {
        self.0.push(kind);
    }

    /// Remove the entry at `index`. Returns the removed kind.
    pub fn remove(&mut self, index: usize) -> Option<DecoratorKind> {
        (index < self.0.len()).then(|| self.0.remove(index))
    }

    /// Move the entry at `from` so that it lands before the element that was
    /// at `to` (drag-and-drop insertion semantics; `to == len` moves to the end).
    pub fn reorder(&mut self, from: usize, to: usize) {
        if from >= self.0.len() || to > self.0.len() {
            return;
        }
        let kind = self.0.remove(from);
        let target = if from < to { to - 1 } else { to };
        self.0.insert(target, kind);
    }

    /// Kinds that can still be added.
    pub fn missing(&self) -> Vec<DecoratorKind> {
        DecoratorKind::ALL
            .into_iter()
            .filter(|k| !self.contains(*k))
            .collect()
    }

    /// Kinds listed more than once, in first-seen order.
    pub fn duplicates(&self) -> Vec<DecoratorKind> {
        let mut seen = Vec::new();
        let mut dups = Vec::new();
        for kind in &self.0 {
            if seen.contains(kind) {
                if !dups.contains(kind) {
                    dups.push(*kind);
                }
            } else {
                seen.push(*kind);
            }
        }
        dups
    }

    /// Log configuration problems. Never fails: duplicates are tolerated.
    pub fn validate(&self) -> bool {
        let dups = self.duplicates();
        if !dups.is_empty() {
            warn!("Draw order lists {:?} more than once; those slots will be drawn twice", dups);
        }
        dups.is_empty()
    }
}
