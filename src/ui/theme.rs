use crossterm::style::Color;

/// Semantic colours. Nothing else in the UI picks a colour directly.
pub mod colors {
    use super::Color;

    pub const SUCCESS: Color = Color::Green;
    pub const ERROR: Color = Color::Red;
    pub const WARNING: Color = Color::Yellow;
    pub const INFO: Color = Color::Cyan;
    pub const DIM: Color = Color::DarkGrey;
}

pub mod icons {
    pub const SUCCESS: &str = "✓";
    pub const ERROR: &str = "✗";
    pub const WARNING: &str = "⚠";
    pub const PENDING: &str = "○";
    pub const ARROW: &str = "↳";
}

pub mod icons_ascii {
    pub const SUCCESS: &str = "[OK]";
    pub const ERROR: &str = "[FAIL]";
    pub const WARNING: &str = "[WARN]";
    pub const PENDING: &str = "[ ]";
    pub const ARROW: &str = "->";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Success,
    Error,
    Warning,
    Pending,
    Arrow,
}

impl Icon {
    pub fn as_str(self, unicode: bool) -> &'static str {
        match (self, unicode) {
            (Icon::Success, true) => icons::SUCCESS,
            (Icon::Error, true) => icons::ERROR,
            (Icon::Warning, true) => icons::WARNING,
            (Icon::Pending, true) => icons::PENDING,
            (Icon::Arrow, true) => icons::ARROW,
            (Icon::Success, false) => icons_ascii::SUCCESS,
            (Icon::Error, false) => icons_ascii::ERROR,
            (Icon::Warning, false) => icons_ascii::WARNING,
            (Icon::Pending, false) => icons_ascii::PENDING,
            (Icon::Arrow, false) => icons_ascii::ARROW,
        }
    }
}
