//! Live session engine: the client side of one connection to the layout
//! process.
//!
//! The session owns everything that outlives a single frame: the frame
//! scheduler, the interaction tracker, the command panel and the current
//! render surface. The host feeds it transport events (`on_open`,
//! `handle_message`, `on_close`) and pointer events (`handle_input`), and
//! flushes `drain_outbound` into its socket. All calls run to completion on
//! one thread.

use crate::commands::CommandPanel;
use crate::input::InputEvent;
use crate::scheduler::FrameScheduler;
use crate::tracker::InteractionTracker;
use kurbo::Point;
use ld_core::config::ClientConfig;
use ld_core::geometry::Viewport;
use ld_core::id::ObjectId;
use ld_core::model::Scene;
use ld_core::protocol::{CodecError, Command, OutboundMessage, decode_frame, encode_message};
use ld_render::hit::hit_test;
use ld_render::scene::{RenderReport, TextMeasurer, render_scene};
use ld_render::surface::RenderSurface;
use std::collections::VecDeque;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A message was queued while the connection is not open.
    #[error("not connected to {endpoint}")]
    NotConnected { endpoint: String },
    #[error(transparent)]
    Codec(#[from] CodecError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

/// What `handle_message` did with a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    Rendered(RenderReport),
    /// Dropped by the scheduler.
    Dropped,
}

/// Pointer currently pressed on an object.
#[derive(Debug, Clone, Copy)]
struct Grab {
    id: ObjectId,
    last: Point,
}

pub struct LiveSession {
    config: ClientConfig,
    viewport: Viewport,
    state: ConnectionState,
    scheduler: FrameScheduler,
    tracker: InteractionTracker,
    panel: CommandPanel,
    surface: RenderSurface,
    /// Scene of the most recent rendered frame.
    scene: Scene,
    outbox: VecDeque<String>,
    /// Set once label extents have been sent back in an `Update`.
    extents_reported: bool,
    grab: Option<Grab>,
}

impl LiveSession {
    pub fn new(config: ClientConfig, viewport: Viewport) -> Self {
        Self {
            scheduler: FrameScheduler::from_config(&config),
            tracker: InteractionTracker::new(config.drag_opacity),
            panel: CommandPanel::new(),
            surface: RenderSurface::new(viewport),
            scene: Scene::new(),
            outbox: VecDeque::new(),
            extents_reported: false,
            grab: None,
            state: ConnectionState::Connecting,
            viewport,
            config,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn on_open(&mut self) {
        log::debug!("connected to {}", self.config.endpoint);
        self.state = ConnectionState::Open;
    }

    pub fn on_close(&mut self) {
        log::debug!("connection to {} closed", self.config.endpoint);
        self.state = ConnectionState::Closed;
    }

    pub fn surface(&self) -> &RenderSurface {
        &self.surface
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn tracker(&self) -> &InteractionTracker {
        &self.tracker
    }

    pub fn panel(&self) -> &CommandPanel {
        &self.panel
    }

    /// Takes effect on the next rendered frame.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Decode one inbound frame and, if the scheduler admits it, redraw the
    /// surface from it.
    ///
    /// # Errors
    /// A frame that fails to decode is rejected whole and leaves the surface
    /// as it was.
    pub fn handle_message(
        &mut self,
        text: &str,
        now_ms: f64,
        measurer: &dyn TextMeasurer,
    ) -> Result<FrameOutcome, SessionError> {
        let frame = decode_frame(text)?;
        if !self.scheduler.admit(&frame, now_ms) {
            return Ok(FrameOutcome::Dropped);
        }

        let mut scene = frame.into_scene();
        let report = render_scene(
            &mut self.surface,
            &scene,
            self.viewport,
            &self.config,
            measurer,
        );
        self.tracker.retain(&self.surface);
        self.tracker.attach(&mut self.surface);
        if let Some(grab) = self.grab
            && self.tracker.live_offset(grab.id).is_none()
        {
            self.grab = None;
        }

        if !self.extents_reported && self.state == ConnectionState::Open {
            for label in &report.labels {
                scene.record_label_extent(&label.key, label.size.width, label.size.height);
            }
            self.send(OutboundMessage::Update {
                objs: scene.clone(),
            })?;
            self.extents_reported = true;
        }

        self.scene = scene;
        Ok(FrameOutcome::Rendered(report))
    }

    /// Route a pointer event to the tracker. Releasing a dragged object
    /// queues its `Drag` message.
    ///
    /// # Errors
    /// `SessionError::NotConnected` if a gesture ends while disconnected; the
    /// gesture is still finished locally.
    pub fn handle_input(&mut self, event: InputEvent) -> Result<(), SessionError> {
        let (x, y) = event.position();
        let pos = Point::new(x, y);

        match event {
            InputEvent::PointerDown { .. } => {
                // The release of an earlier gesture never arrived (e.g. it
                // happened outside the canvas): finish it where it was.
                let unfinished = self
                    .grab
                    .take()
                    .and_then(|grab| self.tracker.stop(grab.id, &mut self.surface));
                if let Some(id) = hit_test(&self.surface, x, y) {
                    self.tracker.start(id, &mut self.surface);
                    self.grab = Some(Grab { id, last: pos });
                }
                match unfinished {
                    Some(message) => self.send(message),
                    None => Ok(()),
                }
            }
            InputEvent::PointerMove { .. } => {
                if let Some(grab) = self.grab.as_mut() {
                    let delta = pos - grab.last;
                    grab.last = pos;
                    self.tracker
                        .drag_move(grab.id, delta.x, delta.y, &mut self.surface);
                }
                Ok(())
            }
            InputEvent::PointerUp { .. } => {
                let Some(grab) = self.grab.take() else {
                    return Ok(());
                };
                let delta = pos - grab.last;
                if delta.x != 0.0 || delta.y != 0.0 {
                    self.tracker
                        .drag_move(grab.id, delta.x, delta.y, &mut self.surface);
                }
                match self.tracker.stop(grab.id, &mut self.surface) {
                    Some(message) => self.send(message),
                    None => Ok(()),
                }
            }
        }
    }

    /// Press a control button.
    ///
    /// # Errors
    /// `SessionError::NotConnected` while the connection is not open; the
    /// autostep toggle does not flip in that case.
    pub fn press(&mut self, command: Command) -> Result<(), SessionError> {
        self.ensure_open()?;
        let message = self.panel.press(command);
        self.send(message)
    }

    /// Take every queued wire message, oldest first.
    pub fn drain_outbound(&mut self) -> Vec<String> {
        self.outbox.drain(..).collect()
    }

    fn send(&mut self, message: OutboundMessage) -> Result<(), SessionError> {
        self.ensure_open()?;
        let text = encode_message(&message)?;
        log::trace!("queue {text}");
        self.outbox.push_back(text);
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        if self.state == ConnectionState::Open {
            Ok(())
        } else {
            log::warn!(
                "refusing to send: connection to {} is {:?}",
                self.config.endpoint,
                self.state
            );
            Err(SessionError::NotConnected {
                endpoint: self.config.endpoint.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ld_render::scene::EstimatedMetrics;

    fn session() -> LiveSession {
        LiveSession::new(ClientConfig::default(), Viewport::default())
    }

    #[test]
    fn starts_connecting_with_default_endpoint() {
        let s = session();
        assert_eq!(s.state(), ConnectionState::Connecting);
        assert_eq!(s.endpoint(), "ws://localhost:9160/");
    }

    #[test]
    fn press_requires_open_connection() {
        let mut s = session();
        let err = s.press(Command::Autostep).unwrap_err();
        assert!(matches!(err, SessionError::NotConnected { .. }));
        assert!(!s.panel().autostep());

        s.on_open();
        s.press(Command::Autostep).unwrap();
        assert!(s.panel().autostep());
        assert_eq!(
            s.drain_outbound(),
            vec![r#"{"tag":"Cmd","contents":{"command":"autostep"}}"#.to_string()]
        );
    }

    #[test]
    fn malformed_frame_leaves_surface_alone() {
        let mut s = session();
        s.on_open();
        s.handle_message(
            r#"{"p": {"tag": "P", "contents": {"xp": 0, "yp": 0, "namep": "p"}}}"#,
            0.0,
            &EstimatedMetrics::default(),
        )
        .unwrap();
        let err = s
            .handle_message("{not json", 100.0, &EstimatedMetrics::default())
            .unwrap_err();
        assert!(matches!(err, SessionError::Codec(CodecError::Malformed(_))));
        assert_eq!(s.surface().len(), 1);
    }
}
