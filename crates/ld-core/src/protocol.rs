//! Wire protocol between the client and the layout process.
//!
//! Inbound: a `FrameMessage`, either a bare scene (an intermediate frame of
//! an animation) or `{"flag": "final", "objs": scene}`.
//! Outbound: `{"tag": ..., "contents": ...}` for `Drag`, `Cmd` and `Update`.

use crate::model::{Scene, describe};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error returned when decoding a message from the wire.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The text is not JSON, or not the JSON shape of the message.
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
    /// The scene payload is not a JSON object.
    #[error("expected a scene object, found {found}")]
    NotAScene { found: &'static str },
    /// A scene entry is not a `{tag, contents}` object.
    #[error("object `{name}`: expected a shape record, found {found}")]
    NotARecord { name: String, found: &'static str },
    /// A scene entry has no string `tag`.
    #[error("object `{name}`: missing string field `tag`")]
    MissingTag { name: String },
    /// A known tag whose contents are missing a field or carry a mistyped one.
    #[error("object `{name}` ({tag}): {source}")]
    InvalidShape {
        name: String,
        tag: String,
        #[source]
        source: serde_json::Error,
    },
    /// A curve needs at least two points.
    #[error("object `{name}`: curve has {count} point(s), at least 2 required")]
    TooFewPoints { name: String, count: usize },
}

/// An inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameMessage {
    /// The authoritative last frame of an animation. Always rendered.
    Final(Scene),
    /// An intermediate frame; may be dropped by the scheduler.
    Intermediate(Scene),
}

impl FrameMessage {
    pub fn is_final(&self) -> bool {
        matches!(self, FrameMessage::Final(_))
    }

    pub fn scene(&self) -> &Scene {
        match self {
            FrameMessage::Final(scene) | FrameMessage::Intermediate(scene) => scene,
        }
    }

    pub fn into_scene(self) -> Scene {
        match self {
            FrameMessage::Final(scene) | FrameMessage::Intermediate(scene) => scene,
        }
    }
}

/// Decode one inbound text message.
///
/// # Errors
/// Returns [`CodecError::Malformed`] for text that is not JSON, and the
/// scene-level variants for structurally invalid scenes.
pub fn decode_frame(text: &str) -> Result<FrameMessage, CodecError> {
    let value: Value = serde_json::from_str(text)?;

    if value.get("flag").and_then(Value::as_str) == Some("final") {
        let objs = match value {
            Value::Object(mut map) => map.remove("objs").unwrap_or(Value::Null),
            other => other,
        };
        return Ok(FrameMessage::Final(Scene::from_value(objs)?));
    }

    match &value {
        Value::Object(_) => Ok(FrameMessage::Intermediate(Scene::from_value(value)?)),
        other => Err(CodecError::NotAScene {
            found: describe(other),
        }),
    }
}

/// Commands bound to the control buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    /// Ask the layout process for a fresh random initial state.
    Resample,
    /// Run one optimization step.
    Step,
    /// Toggle continuous stepping.
    Autostep,
}

/// A message the client sends to the layout process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tag", content = "contents")]
pub enum OutboundMessage {
    /// Total displacement of a finished drag gesture, in screen pixels.
    Drag { name: String, xm: f64, ym: f64 },
    Cmd { command: Command },
    /// The scene echoed back once with measured label extents.
    Update { objs: Scene },
}

/// Serialize an outbound message to its wire text.
///
/// # Errors
/// Only fails if a scene carries non-string map keys, which the model
/// cannot construct.
pub fn encode_message(message: &OutboundMessage) -> Result<String, CodecError> {
    Ok(serde_json::to_string(message)?)
}

/// Parse outbound wire text back into a message.
///
/// # Errors
/// Returns [`CodecError::Malformed`] for anything that is not one of the
/// three outbound shapes.
pub fn decode_message(text: &str) -> Result<OutboundMessage, CodecError> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn bare_scene_is_intermediate() {
        let frame = decode_frame(r#"{"p": {"tag": "P", "contents": {"xp": 1, "yp": 2, "namep": "p"}}}"#).unwrap();
        assert!(!frame.is_final());
        assert_eq!(frame.scene().len(), 1);
    }

    #[test]
    fn flagged_scene_is_final() {
        let frame = decode_frame(
            r#"{"flag": "final", "objs": {"p": {"tag": "P", "contents": {"xp": 1, "yp": 2, "namep": "p"}}}}"#,
        )
        .unwrap();
        assert!(frame.is_final());
        assert!(frame.scene().get("p").is_some());
    }

    #[test]
    fn final_without_objs_is_rejected() {
        let err = decode_frame(r#"{"flag": "final"}"#).unwrap_err();
        assert!(matches!(err, CodecError::NotAScene { found: "null" }));
    }

    #[test]
    fn non_json_is_malformed() {
        let err = decode_frame("{not json").unwrap_err();
        assert!(matches!(err, CodecError::Malformed(_)));
    }

    #[test]
    fn array_payload_is_not_a_scene() {
        let err = decode_frame("[1, 2]").unwrap_err();
        assert!(matches!(err, CodecError::NotAScene { found: "an array" }));
    }

    #[test]
    fn empty_scene_is_valid() {
        let frame = decode_frame("{}").unwrap();
        assert!(frame.scene().is_empty());
    }

    #[test]
    fn drag_wire_shape() {
        let text = encode_message(&OutboundMessage::Drag {
            name: "p1".into(),
            xm: 5.0,
            ym: 3.0,
        })
        .unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value, json!({"tag": "Drag", "contents": {"name": "p1", "xm": 5.0, "ym": 3.0}}));
    }

    #[test]
    fn cmd_wire_shape() {
        for (command, word) in [
            (Command::Resample, "resample"),
            (Command::Step, "step"),
            (Command::Autostep, "autostep"),
        ] {
            let text = encode_message(&OutboundMessage::Cmd { command }).unwrap();
            let value: Value = serde_json::from_str(&text).unwrap();
            assert_eq!(value, json!({"tag": "Cmd", "contents": {"command": word}}));
        }
    }

    #[test]
    fn decode_message_reads_back_cmd() {
        let msg = decode_message(r#"{"tag": "Cmd", "contents": {"command": "step"}}"#).unwrap();
        assert_eq!(msg, OutboundMessage::Cmd { command: Command::Step });
    }

    #[test]
    fn decode_message_rejects_unknown_tag() {
        assert!(decode_message(r#"{"tag": "Zoom", "contents": {}}"#).is_err());
    }
}
