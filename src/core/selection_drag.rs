//! Secondary-button drag selection.
//!
//! `Idle -> Dragging` when a secondary-button drag reaches the first visible
//! row of a frame; every later move recomputes the normalized rectangle and
//! publishes the accumulated selection; release returns to `Idle` and leaves
//! the accumulated selection in place. Membership is recomputed row by row as
//! the host streams rows, so no spatial index is needed.

use eframe::egui::{Pos2, Rect};
use indexmap::IndexSet;
use log::debug;

use super::canvas::{InputEvent, PointerButton};
use super::host::{NodeId, SelectionHost};

/// Strict overlap test: rects that only touch do not overlap.
pub fn overlaps(a: Rect, b: Rect) -> bool {
    a.min.x < b.max.x && a.max.x > b.min.x && a.min.y < b.max.y && a.max.y > b.min.y
}

/// State kept while a drag gesture is active.
#[derive(Debug, Clone)]
pub struct DragSession {
    start: Pos2,
    rect: Rect,
    accumulated: IndexSet<NodeId>,
    /// Host selection when the drag began.
    pre_drag: IndexSet<NodeId>,
    /// Modifier held on the latest move: keep the pre-drag selection.
    additive: bool,
}

impl DragSession {
    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn accumulated(&self) -> &IndexSet<NodeId> {
        &self.accumulated
    }
}

#[derive(Debug, Clone, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

#[derive(Debug, Default)]
pub struct SelectionDragController {
    state: DragState,
}

impl SelectionDragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    pub fn selection_rect(&self) -> Option<Rect> {
        match &self.state {
            DragState::Dragging(s) => Some(s.rect),
            DragState::Idle => None,
        }
    }

    /// Drop any active gesture without touching the host selection.
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }

    /// Feed the frame's input event. Only secondary-button events on the
    /// first visible row are considered. Returns true if the event was used.
    pub fn handle_event<S: SelectionHost + ?Sized>(
        &mut self,
        event: Option<InputEvent>,
        first_visible: bool,
        host: &mut S,
    ) -> bool {
        if !first_visible {
            return false;
        }
        match event {
            Some(InputEvent::PointerDrag { button: PointerButton::Secondary, start, pos, modifiers }) => {
                if let DragState::Idle = self.state {
                    debug!("Drag selection started at {:?}", start);
                    self.state = DragState::Dragging(DragSession {
                        start,
                        rect: Rect::NOTHING,
                        accumulated: IndexSet::new(),
                        pre_drag: host.selection().into_iter().collect(),
                        additive: false,
                    });
                }
                if let DragState::Dragging(session) = &mut self.state {
                    session.rect = Rect::from_two_pos(session.start, pos);
                    session.additive = modifiers.ctrl;
                    if session.additive {
                        let pre = session.pre_drag.clone();
                        session.accumulated.extend(pre);
                    }
                    publish(session, host);
                }
                true
            }
            Some(InputEvent::PointerUp { button: PointerButton::Secondary, .. }) => {
                if let DragState::Dragging(session) = &self.state {
                    debug!("Drag selection finished with {} nodes", session.accumulated.len());
                    self.state = DragState::Idle;
                    return true;
                }
                false
            }
            _ => false,
        }
    }

    /// Per-row membership update while dragging. `row` is the full row
    /// bounds; the test uses its whole width from x = 0.
    pub fn test_row<S: SelectionHost + ?Sized>(&mut self, node: NodeId, row: Rect, host: &mut S) {
        let DragState::Dragging(session) = &mut self.state else {
            return;
        };
        let mut row = row;
        row.min.x = 0.0;

        let should = overlaps(session.rect, row) || (session.additive && session.pre_drag.contains(&node));
        let selected = session.accumulated.contains(&node);
        if selected && !should {
            session.accumulated.shift_remove(&node);
            publish(session, host);
        } else if !selected && should {
            session.accumulated.insert(node);
            publish(session, host);
        }
    }
}

fn publish<S: SelectionHost + ?Sized>(session: &DragSession, host: &mut S) {
    let nodes: Vec<NodeId> = session.accumulated.iter().copied().collect();
    host.set_selection(&nodes);
}
