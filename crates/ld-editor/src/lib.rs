//! Client engine for the live diagram: pointer input, drag tracking, frame
//! scheduling, control commands and the session that ties them to a
//! connection.

pub mod commands;
pub mod input;
pub mod scheduler;
pub mod session;
pub mod tracker;

pub use commands::CommandPanel;
pub use input::InputEvent;
pub use scheduler::FrameScheduler;
pub use session::{ConnectionState, FrameOutcome, LiveSession, SessionError};
pub use tracker::{DragState, InteractionTracker};
