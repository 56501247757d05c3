//! Per-kind slot handlers.
//!
//! Each handler draws its widget into one square slot and, when the user
//! interacts with it this frame, requests the matching host mutation.
//! Mutations are preceded by `record_undo` on every node they touch.

use anyhow::{Context, Result, anyhow};
use eframe::egui::{Color32, Rect, vec2};
use log::{debug, info, warn};

use super::canvas::{Canvas, Glyph, TextStyle};
use super::decor_config::{DecorConfig, StaticMode};
use super::host::{Choice, HideFlags, Host, NodeInfo, NodeKind};
use super::registry::DecoratorKind;

/// Undo label attached to every mutation.
pub const UNDO_LABEL: &str = "treedeco";

/// Per-row values shared by all slot handlers.
#[derive(Debug, Clone, Copy)]
pub struct RowContext<'a> {
    pub config: &'a DecorConfig,
    pub node: &'a NodeInfo,
    /// Label color of the node.
    pub color: Color32,
}

/// Draw `kind` into `slot` and apply any interaction.
pub fn draw_decorator<H: Host + ?Sized>(
    kind: DecoratorKind,
    canvas: &mut dyn Canvas,
    host: &mut H,
    ctx: &RowContext<'_>,
    slot: Rect,
) -> Result<()> {
    match kind {
        DecoratorKind::Active => draw_active(canvas, host, ctx, slot)?,
        DecoratorKind::Static => draw_static(canvas, host, ctx, slot)?,
        DecoratorKind::Lock => draw_lock(canvas, host, ctx, slot)?,
        DecoratorKind::Icon => draw_icon(canvas, host, ctx, slot),
        DecoratorKind::ApplyPrefab => draw_apply_prefab(canvas, host, ctx, slot)?,
        DecoratorKind::Tag => draw_tag(canvas, host, ctx, slot)?,
        DecoratorKind::Layer => draw_layer(canvas, host, ctx, slot)?,
    }
    if ctx.config.tooltips {
        canvas.tooltip(slot, kind.tooltip());
    }
    Ok(())
}

/// Toggle background: enabled color when `lit`, disabled otherwise.
fn state_background(config: &DecorConfig, lit: bool) -> Color32 {
    if lit {
        config.palette.background_enabled
    } else {
        config.palette.background_disabled
    }
}

fn draw_active<H: Host + ?Sized>(canvas: &mut dyn Canvas, host: &mut H, ctx: &RowContext<'_>, slot: Rect) -> Result<()> {
    let node = ctx.node;
    let background = state_background(ctx.config, node.active_self);
    if canvas.toggle(slot, node.active_self, (Glyph::ActiveOn, Glyph::ActiveOff), background) {
        host.record_undo(node.id, UNDO_LABEL);
        host.set_active(node.id, !node.active_self)
            .with_context(|| format!("toggle active on {}", node.id))?;
    }
    Ok(())
}

fn draw_static<H: Host + ?Sized>(canvas: &mut dyn Canvas, host: &mut H, ctx: &RowContext<'_>, slot: Rect) -> Result<()> {
    let node = ctx.node;
    // Static nodes dim the toggle.
    let background = state_background(ctx.config, !node.is_static);
    if canvas.toggle(slot, node.is_static, (Glyph::StaticOn, Glyph::StaticOff), background) {
        change_static(host, ctx.config.static_mode, node)?;
    }
    Ok(())
}

/// Resolve the change scope and flip the static flag. `None` from the
/// scope resolution means the user cancelled.
pub fn change_static<H: Host + ?Sized>(host: &mut H, mode: StaticMode, node: &NodeInfo) -> Result<()> {
    let Some(scope) = resolve_static_scope(host, mode, node) else {
        debug!("Static change on {} cancelled", node.id);
        return Ok(());
    };

    let value = !node.is_static;
    let targets = match scope {
        StaticMode::AllDescendants => host.self_and_descendants(node.id),
        _ => vec![node.id],
    };
    for id in &targets {
        host.record_undo(*id, UNDO_LABEL);
    }
    for id in targets {
        host.set_static(id, value).with_context(|| format!("set static on {id}"))?;
    }
    Ok(())
}

/// Leaves always change alone; `AskUser` defers to the host dialog. A
/// failed dialog is treated like a cancel.
fn resolve_static_scope<H: Host + ?Sized>(host: &mut H, mode: StaticMode, node: &NodeInfo) -> Option<StaticMode> {
    if node.child_count == 0 {
        return Some(StaticMode::ThisNodeOnly);
    }
    if mode != StaticMode::AskUser {
        return Some(mode);
    }

    let verb = if node.is_static { "disable" } else { "enable" };
    let message = format!("Do you want to {verb} the static flags for all children as well?");
    match host.ask(
        "Change static flags",
        &message,
        ["Yes, change children", "No, this object only", "Cancel"],
    ) {
        Ok(Choice::First) => Some(StaticMode::AllDescendants),
        Ok(Choice::Second) => Some(StaticMode::ThisNodeOnly),
        Ok(Choice::Cancel) => None,
        Err(e) => {
            warn!("Static change on {} aborted: {}", node.id, e);
            None
        }
    }
}

fn draw_lock<H: Host + ?Sized>(canvas: &mut dyn Canvas, host: &mut H, ctx: &RowContext<'_>, slot: Rect) -> Result<()> {
    let node = ctx.node;
    let background = state_background(ctx.config, node.locked());
    if canvas.toggle(slot, node.locked(), (Glyph::LockOn, Glyph::LockOff), background) {
        host.record_undo(node.id, UNDO_LABEL);
        host.set_hide_flags(node.id, node.hide_flags ^ HideFlags::NOT_EDITABLE)
            .with_context(|| format!("toggle lock on {}", node.id))?;
        host.repaint_all();
    }
    Ok(())
}

fn draw_icon<H: Host + ?Sized>(canvas: &mut dyn Canvas, host: &mut H, ctx: &RowContext<'_>, slot: Rect) {
    let Some(icon) = host.preview_icon(ctx.node.id) else {
        return;
    };
    let rect = Rect::from_min_max(slot.min + vec2(1.0, 1.0), slot.max);
    if canvas.icon_button(rect, icon) {
        host.open_icon_picker(ctx.node.id, rect);
    }
}

fn draw_apply_prefab<H: Host + ?Sized>(
    canvas: &mut dyn Canvas,
    host: &mut H,
    ctx: &RowContext<'_>,
    slot: Rect,
) -> Result<()> {
    let node = ctx.node;
    let instance = node.kind == NodeKind::PrefabInstance;
    let palette = &ctx.config.palette;
    let tint = if instance { palette.background_enabled } else { palette.background_disabled };
    if !canvas.button(slot, "A", tint) {
        return Ok(());
    }

    if instance {
        // The host applies to its selection; make it ours for the call only.
        let saved = host.selection();
        host.set_selection(&[node.id]);
        let applied = host.apply_prefab_changes();
        host.set_selection(&saved);
        applied.with_context(|| format!("apply prefab changes of {}", node.id))?;
        info!("Applied prefab changes of '{}'", node.name);
    } else {
        match host.prefab_save_path("newPrefab") {
            Some(path) => {
                host.record_undo(node.id, UNDO_LABEL);
                host.create_prefab(node.id, &path)
                    .with_context(|| format!("create prefab {}", path.display()))?;
                info!("Created prefab {} from '{}'", path.display(), node.name);
            }
            None => debug!("Prefab creation for {} cancelled", node.id),
        }
    }
    Ok(())
}

fn draw_tag<H: Host + ?Sized>(canvas: &mut dyn Canvas, host: &mut H, ctx: &RowContext<'_>, slot: Rect) -> Result<()> {
    canvas.glyph(slot, Glyph::TagField, ctx.color);
    let tags = host.tags();
    if let Some(picked) = canvas.choice(slot, "", &tags, TextStyle::MiniLabel, ctx.color) {
        let tag = tags
            .get(picked)
            .ok_or_else(|| anyhow!("tag choice {picked} out of range ({} tags)", tags.len()))?;
        set_tag(host, ctx.node, tag)?;
    }
    Ok(())
}

fn draw_layer<H: Host + ?Sized>(canvas: &mut dyn Canvas, host: &mut H, ctx: &RowContext<'_>, slot: Rect) -> Result<()> {
    canvas.glyph(slot, Glyph::LayerField, ctx.color);
    let layers = host.layers();
    let names: Vec<String> = layers.iter().map(|(_, name)| name.clone()).collect();
    if let Some(picked) = canvas.choice(slot, "", &names, TextStyle::MiniLabel, ctx.color) {
        let (layer, _) = layers
            .get(picked)
            .ok_or_else(|| anyhow!("layer choice {picked} out of range ({} layers)", layers.len()))?;
        set_layer(host, ctx.node, *layer)?;
    }
    Ok(())
}

/// Write a tag picked in a slot or the mini-label.
pub(crate) fn set_tag<H: Host + ?Sized>(host: &mut H, node: &NodeInfo, tag: &str) -> Result<()> {
    if node.tag == tag {
        return Ok(());
    }
    host.record_undo(node.id, UNDO_LABEL);
    host.set_tag(node.id, tag).with_context(|| format!("set tag '{tag}' on {}", node.id))
}

/// Write a layer picked in a slot or the mini-label.
pub(crate) fn set_layer<H: Host + ?Sized>(host: &mut H, node: &NodeInfo, layer: u32) -> Result<()> {
    if node.layer == layer {
        return Ok(());
    }
    host.record_undo(node.id, UNDO_LABEL);
    host.set_layer(node.id, layer).with_context(|| format!("set layer {layer} on {}", node.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::canvas::{Click, DrawCall, RecordingCanvas};
    use crate::core::host::{Hierarchy, IconId, NodeId, SelectionHost};
    use crate::scene::{MemoryScene, Mutation, ScriptedDialogs};
    use eframe::egui::pos2;

    fn slot() -> Rect {
        Rect::from_min_max(pos2(200.0, 1.0), pos2(216.0, 17.0))
    }

    /// parent -> (child -> grandchild), leaf
    fn scene() -> (MemoryScene, NodeId, NodeId) {
        let mut s = MemoryScene::new();
        let parent = s.add("parent", None);
        let child = s.add("child", Some(parent));
        s.add("grandchild", Some(child));
        let leaf = s.add("leaf", None);
        (s, parent, leaf)
    }

    fn click(scene: &mut MemoryScene, kind: DecoratorKind, id: NodeId, mode: StaticMode, c: Click) -> RecordingCanvas {
        let config = DecorConfig { static_mode: mode, ..Default::default() };
        let node = scene.node(id).unwrap();
        let ctx = RowContext { config: &config, node: &node, color: Color32::WHITE };
        let mut canvas = RecordingCanvas::new();
        canvas.script(c);
        draw_decorator(kind, &mut canvas, scene, &ctx, slot()).unwrap();
        canvas
    }

    fn state_changes(scene: &MemoryScene) -> Vec<Mutation> {
        scene.journal().iter().filter(|m| m.is_state_change()).cloned().collect()
    }

    #[test]
    fn test_active_toggle_flips_only_the_node() {
        let (mut s, parent, _) = scene();
        click(&mut s, DecoratorKind::Active, parent, StaticMode::AskUser, Click::Toggle(0));
        assert_eq!(state_changes(&s), vec![Mutation::Active(parent, false)]);
        assert_eq!(s.journal()[0], Mutation::Undo(parent));
    }

    #[test]
    fn test_static_on_leaf_never_asks() {
        for mode in StaticMode::ALL {
            let (mut s, _, leaf) = scene();
            click(&mut s, DecoratorKind::Static, leaf, mode, Click::Toggle(0));
            assert_eq!(s.asks(), 0);
            assert_eq!(state_changes(&s), vec![Mutation::Static(leaf, true)]);
        }
    }

    #[test]
    fn test_static_ask_cancel_mutates_nothing() {
        let (mut s, parent, _) = scene();
        s.set_dialogs(Box::new(ScriptedDialogs::new().answer(Choice::Cancel)));
        click(&mut s, DecoratorKind::Static, parent, StaticMode::AskUser, Click::Toggle(0));
        assert_eq!(s.asks(), 1);
        assert!(s.journal().is_empty());
    }

    #[test]
    fn test_static_ask_failure_mutates_nothing() {
        let (mut s, parent, _) = scene();
        s.set_dialogs(Box::new(ScriptedDialogs::new().fail()));
        click(&mut s, DecoratorKind::Static, parent, StaticMode::AskUser, Click::Toggle(0));
        assert!(s.journal().is_empty());
    }

    #[test]
    fn test_static_ask_children_cascades() {
        let (mut s, parent, _) = scene();
        s.set_dialogs(Box::new(ScriptedDialogs::new().answer(Choice::First)));
        click(&mut s, DecoratorKind::Static, parent, StaticMode::AskUser, Click::Toggle(0));
        assert_eq!(state_changes(&s).len(), 3);
        for id in s.self_and_descendants(parent) {
            assert!(s.node(id).unwrap().is_static);
        }

        let (mut s, parent, _) = scene();
        s.set_dialogs(Box::new(ScriptedDialogs::new().answer(Choice::Second)));
        click(&mut s, DecoratorKind::Static, parent, StaticMode::AskUser, Click::Toggle(0));
        assert_eq!(state_changes(&s), vec![Mutation::Static(parent, true)]);
    }

    #[test]
    fn test_static_fixed_mode_skips_dialog() {
        let (mut s, parent, _) = scene();
        click(&mut s, DecoratorKind::Static, parent, StaticMode::AllDescendants, Click::Toggle(0));
        assert_eq!(s.asks(), 0);
        assert_eq!(state_changes(&s).len(), 3);
    }

    #[test]
    fn test_lock_flips_single_bit_and_repaints() {
        let (mut s, parent, _) = scene();
        s.edit(parent, |n| n.hide_flags = HideFlags::HIDE_IN_INSPECTOR);
        click(&mut s, DecoratorKind::Lock, parent, StaticMode::AskUser, Click::Toggle(0));
        let flags = s.node(parent).unwrap().hide_flags;
        assert_eq!(flags, HideFlags::HIDE_IN_INSPECTOR | HideFlags::NOT_EDITABLE);
        assert_eq!(s.journal().last(), Some(&Mutation::RepaintAll));
    }

    #[test]
    fn test_icon_absent_draws_nothing() {
        let (mut s, _, leaf) = scene();
        let canvas = click(&mut s, DecoratorKind::Icon, leaf, StaticMode::AskUser, Click::Button(0));
        // Only the slot tooltip
        assert!(canvas.calls.iter().all(|c| matches!(c, DrawCall::Tooltip { .. })));
        assert!(s.journal().is_empty());
    }

    #[test]
    fn test_icon_click_opens_picker_with_inset_rect() {
        let (mut s, _, leaf) = scene();
        s.edit(leaf, |n| n.icon = Some(IconId(3)));
        let canvas = click(&mut s, DecoratorKind::Icon, leaf, StaticMode::AskUser, Click::Button(0));
        assert_eq!(s.journal(), &[Mutation::IconPicker(leaf)]);
        let rect = canvas.calls[0].rect();
        assert_eq!(rect.min, slot().min + vec2(1.0, 1.0));
        assert_eq!(rect.max, slot().max);
    }

    #[test]
    fn test_apply_prefab_restores_selection() {
        let (mut s, parent, leaf) = scene();
        s.edit(parent, |n| n.kind = NodeKind::PrefabInstance);
        s.set_selection(&[leaf]);
        let canvas = click(&mut s, DecoratorKind::ApplyPrefab, parent, StaticMode::AskUser, Click::Button(0));
        assert_eq!(s.journal(), &[Mutation::ApplyPrefab(vec![parent])]);
        assert_eq!(s.selection(), vec![leaf]);
        let palette = DecorConfig::default().palette;
        assert!(canvas.calls.contains(&DrawCall::Button { rect: slot(), text: "A".into(), tint: palette.background_enabled }));
    }

    #[test]
    fn test_new_prefab_cancelled_save_does_nothing() {
        let (mut s, _, leaf) = scene();
        click(&mut s, DecoratorKind::ApplyPrefab, leaf, StaticMode::AskUser, Click::Button(0));
        assert!(s.journal().is_empty());

        s.set_dialogs(Box::new(ScriptedDialogs::new().save_path("assets/leaf.prefab")));
        click(&mut s, DecoratorKind::ApplyPrefab, leaf, StaticMode::AskUser, Click::Button(0));
        assert_eq!(state_changes(&s), vec![Mutation::CreatePrefab(leaf, "assets/leaf.prefab".into())]);
        assert_eq!(s.node(leaf).unwrap().kind, NodeKind::PrefabInstance);
    }

    #[test]
    fn test_tag_and_layer_pick_writes_immediately() {
        let (mut s, _, leaf) = scene();
        let enemy = s.tags().iter().position(|t| t == "Enemy").unwrap();
        click(&mut s, DecoratorKind::Tag, leaf, StaticMode::AskUser, Click::Choice { nth: 0, option: enemy });
        assert_eq!(s.node(leaf).unwrap().tag, "Enemy");

        let water = s.layers().iter().position(|(_, n)| n == "Water").unwrap();
        click(&mut s, DecoratorKind::Layer, leaf, StaticMode::AskUser, Click::Choice { nth: 0, option: water });
        assert_eq!(s.node(leaf).unwrap().layer, 4);
        assert_eq!(s.node(leaf).unwrap().layer_name, "Water");
    }

    #[test]
    fn test_rejected_mutation_is_an_error() {
        let (mut s, parent, _) = scene();
        s.read_only = true;
        let config = DecorConfig::default();
        let node = s.node(parent).unwrap();
        let ctx = RowContext { config: &config, node: &node, color: Color32::WHITE };
        let mut canvas = RecordingCanvas::new();
        canvas.script(Click::Toggle(0));
        assert!(draw_decorator(DecoratorKind::Active, &mut canvas, &mut s, &ctx, slot()).is_err());
    }

    fn toggle_background(s: &mut MemoryScene, kind: DecoratorKind, id: NodeId) -> Color32 {
        let config = DecorConfig::default();
        let node = s.node(id).unwrap();
        let ctx = RowContext { config: &config, node: &node, color: Color32::WHITE };
        let mut canvas = RecordingCanvas::new();
        draw_decorator(kind, &mut canvas, s, &ctx, slot()).unwrap();
        canvas
            .calls
            .iter()
            .find_map(|c| match c {
                DrawCall::Toggle { background, .. } => Some(*background),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_toggle_background_follows_node_state() {
        let palette = DecorConfig::default().palette;
        let (mut s, parent, leaf) = scene();
        s.edit(leaf, |n| {
            n.active = false;
            n.is_static = true;
            n.hide_flags |= HideFlags::NOT_EDITABLE;
        });

        assert_eq!(toggle_background(&mut s, DecoratorKind::Active, parent), palette.background_enabled);
        assert_eq!(toggle_background(&mut s, DecoratorKind::Active, leaf), palette.background_disabled);

        assert_eq!(toggle_background(&mut s, DecoratorKind::Static, parent), palette.background_enabled);
        assert_eq!(toggle_background(&mut s, DecoratorKind::Static, leaf), palette.background_disabled);

        assert_eq!(toggle_background(&mut s, DecoratorKind::Lock, parent), palette.background_disabled);
        assert_eq!(toggle_background(&mut s, DecoratorKind::Lock, leaf), palette.background_enabled);
    }

    #[test]
    fn test_out_of_range_choice_is_an_error() {
        for kind in [DecoratorKind::Tag, DecoratorKind::Layer] {
            let (mut s, _, leaf) = scene();
            let config = DecorConfig::default();
            let node = s.node(leaf).unwrap();
            let ctx = RowContext { config: &config, node: &node, color: Color32::WHITE };
            let mut canvas = RecordingCanvas::new();
            canvas.script(Click::Choice { nth: 0, option: 999 });

            let err = draw_decorator(kind, &mut canvas, &mut s, &ctx, slot()).unwrap_err();
            assert!(err.to_string().contains("out of range"));
            assert!(s.journal().is_empty());
        }
    }
}
