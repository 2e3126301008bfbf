//! Interaction tracker: per-object drag state machine.
//!
//! Each object is either Idle or Dragging. A gesture runs
//! `start → drag_move* → stop` and produces exactly one `Drag` message, on
//! `stop`, carrying the total displacement since `start`.
//!
//! State lives in a side table keyed by identity name rather than on the
//! primitives, because the render surface is rebuilt on every frame.
//! `attach` re-applies live offsets to the freshly built primitives.

use kurbo::Vec2;
use ld_core::id::ObjectId;
use ld_core::protocol::OutboundMessage;
use ld_render::surface::RenderSurface;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Idle,
    Dragging,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragSession {
    /// Translation of the primitive when the gesture started.
    baseline: Vec2,
    /// Sum of all moves since start.
    offset: Vec2,
}

impl DragSession {
    fn live_translate(&self) -> Vec2 {
        self.baseline + self.offset
    }
}

/// Tracks drag gestures. Objects without an entry are Idle.
#[derive(Debug, Clone)]
pub struct InteractionTracker {
    sessions: HashMap<ObjectId, DragSession>,
    /// Opacity of an object while it is being dragged.
    drag_opacity: f64,
}

impl Default for InteractionTracker {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl InteractionTracker {
    pub fn new(drag_opacity: f64) -> Self {
        Self {
            sessions: HashMap::new(),
            drag_opacity,
        }
    }

    pub fn state(&self, id: ObjectId) -> DragState {
        if self.sessions.contains_key(&id) {
            DragState::Dragging
        } else {
            DragState::Idle
        }
    }

    pub fn is_dragging(&self) -> bool {
        !self.sessions.is_empty()
    }

    /// Cumulative offset of a gesture in progress.
    pub fn live_offset(&self, id: ObjectId) -> Option<Vec2> {
        self.sessions.get(&id).map(|s| s.offset)
    }

    /// Begin a gesture on `id`. Restarting an ongoing gesture resets its
    /// offset to zero.
    pub fn start(&mut self, id: ObjectId, surface: &mut RenderSurface) {
        let baseline = surface.get(id).map(|p| p.translate).unwrap_or_default();
        let session = DragSession {
            baseline,
            offset: Vec2::ZERO,
        };
        self.sessions.insert(id, session);
        self.apply(id, session, surface);
        log::trace!("drag start {id:?}");
    }

    /// Accumulate a move of `(dx, dy)` since the previous move. Ignored for
    /// objects that are not being dragged.
    pub fn drag_move(&mut self, id: ObjectId, dx: f64, dy: f64, surface: &mut RenderSurface) {
        let Some(session) = self.sessions.get_mut(&id) else {
            return;
        };
        session.offset += Vec2::new(dx, dy);
        let session = *session;
        self.apply(id, session, surface);
    }

    /// End the gesture on `id` and return its single `Drag` message.
    /// Returns `None` if `id` was not being dragged.
    pub fn stop(&mut self, id: ObjectId, surface: &mut RenderSurface) -> Option<OutboundMessage> {
        let session = self.sessions.remove(&id)?;
        if let Some(prim) = surface.get_mut(id) {
            prim.translate = session.live_translate();
            prim.opacity = 1.0;
        }
        log::debug!(
            "drag {id:?} finished at ({}, {})",
            session.offset.x,
            session.offset.y
        );
        Some(OutboundMessage::Drag {
            name: id.as_str().to_string(),
            xm: session.offset.x,
            ym: session.offset.y,
        })
    }

    /// Re-apply every live drag to a freshly rebuilt surface.
    pub fn attach(&self, surface: &mut RenderSurface) {
        for (id, session) in &self.sessions {
            if let Some(prim) = surface.get_mut(*id) {
                prim.translate = session.live_translate();
                prim.opacity = self.drag_opacity;
            }
        }
    }

    /// Forget gestures whose object is no longer on the surface.
    pub fn retain(&mut self, surface: &RenderSurface) {
        self.sessions.retain(|id, _| {
            let alive = surface.get(*id).is_some();
            if !alive {
                log::debug!("dropping drag on vanished object {id:?}");
            }
            alive
        });
    }

    fn apply(&self, id: ObjectId, session: DragSession, surface: &mut RenderSurface) {
        if let Some(prim) = surface.get_mut(id) {
            prim.translate = session.live_translate();
            prim.opacity = self.drag_opacity;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;
    use ld_render::surface::{Primitive, PrimitiveKind};
    use pretty_assertions::assert_eq;

    fn surface_with(name: &str) -> RenderSurface {
        let mut surface = RenderSurface::default();
        surface.push(Primitive::new(
            ObjectId::intern(name),
            name,
            PrimitiveKind::Dot {
                center: Point::new(400.0, 350.0),
                radius: 4.0,
            },
        ));
        surface
    }

    #[test]
    fn one_drag_message_per_gesture() {
        let p1 = ObjectId::intern("p1");
        let mut surface = surface_with("p1");
        let mut tracker = InteractionTracker::default();

        tracker.start(p1, &mut surface);
        assert_eq!(tracker.state(p1), DragState::Dragging);
        tracker.drag_move(p1, 3.0, 4.0, &mut surface);
        tracker.drag_move(p1, 2.0, -1.0, &mut surface);

        let msg = tracker.stop(p1, &mut surface);
        assert_eq!(
            msg,
            Some(OutboundMessage::Drag {
                name: "p1".into(),
                xm: 5.0,
                ym: 3.0
            })
        );
        assert_eq!(tracker.state(p1), DragState::Idle);
        assert_eq!(tracker.stop(p1, &mut surface), None);
    }

    #[test]
    fn dragging_fades_and_release_restores() {
        let p1 = ObjectId::intern("p1");
        let mut surface = surface_with("p1");
        let mut tracker = InteractionTracker::new(0.25);

        tracker.start(p1, &mut surface);
        tracker.drag_move(p1, 10.0, 0.0, &mut surface);
        let prim = surface.get(p1).unwrap();
        assert_eq!(prim.opacity, 0.25);
        assert_eq!(prim.translate, Vec2::new(10.0, 0.0));

        tracker.stop(p1, &mut surface);
        let prim = surface.get(p1).unwrap();
        assert_eq!(prim.opacity, 1.0);
        assert_eq!(prim.translate, Vec2::new(10.0, 0.0));
    }

    #[test]
    fn restart_resets_offset() {
        let p1 = ObjectId::intern("p1");
        let mut surface = surface_with("p1");
        let mut tracker = InteractionTracker::default();

        tracker.start(p1, &mut surface);
        tracker.drag_move(p1, 7.0, 7.0, &mut surface);
        tracker.stop(p1, &mut surface);

        tracker.start(p1, &mut surface);
        assert_eq!(tracker.live_offset(p1), Some(Vec2::ZERO));
        tracker.drag_move(p1, 1.0, 1.0, &mut surface);
        let Some(OutboundMessage::Drag { xm, ym, .. }) = tracker.stop(p1, &mut surface) else {
            panic!("expected a drag message");
        };
        assert_eq!((xm, ym), (1.0, 1.0));
    }

    #[test]
    fn moves_without_start_are_ignored() {
        let p1 = ObjectId::intern("p1");
        let mut surface = surface_with("p1");
        let mut tracker = InteractionTracker::default();
        tracker.drag_move(p1, 5.0, 5.0, &mut surface);
        assert_eq!(surface.get(p1).unwrap().translate, Vec2::ZERO);
        assert!(!tracker.is_dragging());
    }

    #[test]
    fn live_offset_survives_a_redraw() {
        let p1 = ObjectId::intern("p1");
        let mut surface = surface_with("p1");
        let mut tracker = InteractionTracker::new(0.5);

        tracker.start(p1, &mut surface);
        tracker.drag_move(p1, -4.0, 6.0, &mut surface);

        // A new frame arrives mid-gesture.
        let mut rebuilt = surface_with("p1");
        tracker.attach(&mut rebuilt);
        let prim = rebuilt.get(p1).unwrap();
        assert_eq!(prim.translate, Vec2::new(-4.0, 6.0));
        assert_eq!(prim.opacity, 0.5);
    }

    #[test]
    fn retain_drops_vanished_objects() {
        let p1 = ObjectId::intern("p1");
        let mut surface = surface_with("p1");
        let mut tracker = InteractionTracker::default();
        tracker.start(p1, &mut surface);

        tracker.retain(&surface_with("other"));
        assert_eq!(tracker.state(p1), DragState::Idle);
    }
}
