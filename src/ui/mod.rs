//! Terminal and JSON rendering for the CLI

pub mod error;
pub mod json;
pub mod terminal;
pub mod text;
pub mod theme;
pub mod views;

use terminal::TerminalCapabilities;

/// Rendering context shared by every command
#[derive(Debug, Clone, Copy)]
pub struct UiContext {
    pub json: bool,
    pub caps: TerminalCapabilities,
}

impl UiContext {
    pub fn new(json: bool) -> Self {
        Self {
            json,
            caps: TerminalCapabilities::detect(),
        }
    }

    pub fn color(&self) -> bool {
        !self.json && self.caps.supports_color
    }

    pub fn unicode(&self) -> bool {
        self.caps.supports_unicode
    }
}
