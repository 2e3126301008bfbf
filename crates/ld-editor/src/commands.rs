//! Control panel commands: resample, step, and the autostep toggle.

use ld_core::protocol::{Command, OutboundMessage};

/// Button state for the three control commands.
#[derive(Debug, Clone, Default)]
pub struct CommandPanel {
    autostep: bool,
}

impl CommandPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Press a button: returns the message to send. Pressing autostep flips
    /// the toggle.
    pub fn press(&mut self, command: Command) -> OutboundMessage {
        if command == Command::Autostep {
            self.autostep = !self.autostep;
            log::debug!("autostep {}", if self.autostep { "on" } else { "off" });
        }
        OutboundMessage::Cmd { command }
    }

    pub fn autostep(&self) -> bool {
        self.autostep
    }

    /// Caption of the autostep button for the current toggle state.
    pub fn autostep_caption(&self) -> &'static str {
        if self.autostep {
            "Disable Autostep"
        } else {
            "Enable Autostep"
        }
    }
}
