pub mod config;
pub mod geometry;
pub mod id;
pub mod model;
pub mod protocol;

pub use config::ClientConfig;
pub use geometry::{ArrowGeometry, Origin, Viewport, arrow_geometry, path_from_points, to_screen};
pub use id::ObjectId;
pub use model::*;
pub use protocol::{
    CodecError, Command, FrameMessage, OutboundMessage, decode_frame, decode_message,
    encode_message,
};

// Re-export kurbo so downstream crates build geometry with the same types.
pub use kurbo;
