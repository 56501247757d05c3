//! Immutable configuration snapshot consumed by the engine.
//!
//! Built from the persisted preferences whenever they change and handed to
//! the engine as an `Arc`, so a frame never observes a half-edited config.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::color::Palette;
use super::registry::DrawOrder;

/// Which attribute the trailing mini-label shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LabelType {
    None,
    Tag,
    Layer,
    /// Tag if set, otherwise layer.
    #[default]
    TagOrLayer,
    /// Layer if set, otherwise tag.
    LayerOrTag,
}

impl LabelType {
    pub const ALL: [LabelType; 5] = [
        LabelType::None,
        LabelType::Tag,
        LabelType::Layer,
        LabelType::TagOrLayer,
        LabelType::LayerOrTag,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LabelType::None => "None",
            LabelType::Tag => "Tag",
            LabelType::Layer => "Layer",
            LabelType::TagOrLayer => "Tag or Layer",
            LabelType::LayerOrTag => "Layer or Tag",
        }
    }
}

bitflags! {
    /// Separator styles drawn behind rows.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Separators: u32 {
        /// Alternating row tint.
        const COLOR = 1 << 0;
        /// Horizontal and vertical lines.
        const LINE = 1 << 1;
        /// Limit separators to rows that hold a node.
        const OBJECTS_ONLY = 1 << 2;
    }
}

impl Default for Separators {
    fn default() -> Self {
        Separators::all()
    }
}

/// How a static-flag change propagates to children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StaticMode {
    AllDescendants,
    ThisNodeOnly,
    #[default]
    AskUser,
}

impl StaticMode {
    pub const ALL: [StaticMode; 3] = [
        StaticMode::AllDescendants,
        StaticMode::ThisNodeOnly,
        StaticMode::AskUser,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StaticMode::AllDescendants => "All descendants",
            StaticMode::ThisNodeOnly => "This node only",
            StaticMode::AskUser => "Ask",
        }
    }
}

/// Everything the engine needs to lay out and draw a row.
#[derive(Debug, Clone, PartialEq)]
pub struct DecorConfig {
    /// Pixels kept free at the right edge of the row.
    pub offset: f32,
    pub draw_order: DrawOrder,
    pub tree: bool,
    pub warnings: bool,
    pub tooltips: bool,
    pub selection: bool,
    /// Show "..." when the name runs under the decorators.
    pub trailing: bool,
    /// Allow locked nodes to stay selected.
    pub select_locked: bool,
    pub label_type: LabelType,
    pub separators: Separators,
    pub static_mode: StaticMode,
    /// Rows painted by banding/separators when the visible row count is unknown.
    pub row_cap: usize,
    /// Minimum height of vertical slot separators.
    pub separator_extent: f32,
    pub palette: Palette,
}

impl Default for DecorConfig {
    fn default() -> Self {
        Self {
            offset: 2.0,
            draw_order: DrawOrder::default(),
            tree: true,
            warnings: true,
            tooltips: true,
            selection: true,
            trailing: true,
            select_locked: false,
            label_type: LabelType::default(),
            separators: Separators::default(),
            static_mode: StaticMode::default(),
            row_cap: 100,
            separator_extent: 10_000.0,
            palette: Palette::default(),
        }
    }
}

impl DecorConfig {
    pub fn line_separator(&self) -> bool {
        self.separators.contains(Separators::LINE)
    }

    pub fn color_separator(&self) -> bool {
        self.separators.contains(Separators::COLOR)
    }

    pub fn objects_only(&self) -> bool {
        self.separators.contains(Separators::OBJECTS_ONLY)
    }

    /// Number of rows banding and line separators cover from the first
    /// visible row, given the cached height of the previous pass.
    pub fn band_rows(&self, last_top: f32, last_height: f32) -> usize {
        let known = if last_height > 0.0 {
            (last_top / last_height).max(0.0).ceil() as usize
        } else {
            0
        };
        if self.objects_only() {
            known
        } else {
            known.max(self.row_cap)
        }
    }
}
