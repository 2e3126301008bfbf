//! WASM bridge for the live diagram client.
//!
//! Compiled via `wasm-pack build --target web`. The page owns the WebSocket
//! and the `<canvas>`; it forwards socket and pointer events into
//! `LiveCanvas` and sends whatever `drain_outbound` returns.

mod render2d;

use ld_core::config::ClientConfig;
use ld_core::geometry::Viewport;
use ld_core::protocol::Command;
use ld_editor::input::InputEvent;
use ld_editor::session::{ConnectionState, FrameOutcome, LiveSession};
use ld_render::svg::render_svg;
use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;

/// The main WASM-facing client controller.
///
/// Holds the live session. All interaction from the page JS goes through
/// this struct.
#[wasm_bindgen]
pub struct LiveCanvas {
    session: LiveSession,
}

#[wasm_bindgen]
impl LiveCanvas {
    /// Create a client with default settings for a canvas of the given size.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64) -> Self {
        console_error_panic_hook_setup();
        Self {
            session: LiveSession::new(ClientConfig::default(), Viewport { width, height }),
        }
    }

    /// Create a client from a JSON settings object. Missing keys keep their
    /// defaults.
    pub fn with_config(width: f64, height: f64, config_json: &str) -> Result<LiveCanvas, JsValue> {
        console_error_panic_hook_setup();
        let config = ClientConfig::from_json(config_json).map_err(to_js)?;
        Ok(Self {
            session: LiveSession::new(config, Viewport { width, height }),
        })
    }

    /// WebSocket URL to connect to.
    pub fn endpoint(&self) -> String {
        self.session.endpoint().to_string()
    }

    pub fn on_open(&mut self) {
        self.session.on_open();
    }

    pub fn on_close(&mut self) {
        self.session.on_close();
    }

    pub fn is_open(&self) -> bool {
        self.session.state() == ConnectionState::Open
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.session.set_viewport(Viewport { width, height });
    }

    /// Handle one inbound socket message. Returns `true` if the surface was
    /// redrawn and the canvas should be repainted.
    pub fn handle_message(
        &mut self,
        text: &str,
        now_ms: f64,
        ctx: &CanvasRenderingContext2d,
    ) -> Result<bool, JsValue> {
        let measurer = render2d::CanvasMeasurer { ctx };
        let outcome = self
            .session
            .handle_message(text, now_ms, &measurer)
            .map_err(to_js)?;
        Ok(matches!(outcome, FrameOutcome::Rendered(_)))
    }

    /// Paint the current surface.
    pub fn render(&self, ctx: &CanvasRenderingContext2d) {
        render2d::render_surface(ctx, self.session.surface());
    }

    /// Export the current surface as an SVG document.
    pub fn to_svg(&self) -> String {
        render_svg(self.session.surface())
    }

    /// Handle pointer down. Returns `true` if a drag started.
    pub fn handle_pointer_down(&mut self, x: f64, y: f64) -> Result<bool, JsValue> {
        self.session
            .handle_input(InputEvent::from_pointer_down(x, y))
            .map_err(to_js)?;
        Ok(self.session.tracker().is_dragging())
    }

    /// Handle pointer move. Returns `true` if a drag is in progress and the
    /// canvas should be repainted.
    pub fn handle_pointer_move(&mut self, x: f64, y: f64) -> Result<bool, JsValue> {
        self.session
            .handle_input(InputEvent::from_pointer_move(x, y))
            .map_err(to_js)?;
        Ok(self.session.tracker().is_dragging())
    }

    /// Handle pointer up. Ending a drag queues its `Drag` message.
    pub fn handle_pointer_up(&mut self, x: f64, y: f64) -> Result<(), JsValue> {
        self.session
            .handle_input(InputEvent::from_pointer_up(x, y))
            .map_err(to_js)
    }

    /// Press a control button: `"resample"`, `"step"` or `"autostep"`.
    pub fn press(&mut self, command: &str) -> Result<(), JsValue> {
        let command = parse_command(command).map_err(|e| JsValue::from_str(&e))?;
        self.session.press(command).map_err(to_js)
    }

    /// Caption for the autostep button.
    pub fn autostep_caption(&self) -> String {
        self.session.panel().autostep_caption().to_string()
    }

    /// Take every queued outbound message (wire text), oldest first.
    pub fn drain_outbound(&mut self) -> js_sys::Array {
        self.session
            .drain_outbound()
            .into_iter()
            .map(JsValue::from)
            .collect()
    }
}

fn parse_command(name: &str) -> Result<Command, String> {
    serde_json::from_value(serde_json::Value::String(name.to_string()))
        .map_err(|_| format!("unknown command `{name}`"))
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Live Diagram WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_button_names() {
        assert_eq!(parse_command("resample"), Ok(Command::Resample));
        assert_eq!(parse_command("step"), Ok(Command::Step));
        assert_eq!(parse_command("autostep"), Ok(Command::Autostep));
        assert_eq!(
            parse_command("jump"),
            Err("unknown command `jump`".to_string())
        );
    }
}
