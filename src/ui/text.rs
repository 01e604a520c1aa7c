//! Styled text that degrades to plain strings

use crossterm::style::{Color, Stylize};

use crate::ui::theme::{colors, Icon};

/// A piece of text with an optional theme colour
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColoredText {
    text: String,
    color: Option<Color>,
    bold: bool,
}

impl ColoredText {
    fn new(text: impl Into<String>, color: Option<Color>) -> Self {
        Self {
            text: text.into(),
            color,
            bold: false,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, None)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(text, Some(colors::SUCCESS))
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(text, Some(colors::ERROR))
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(text, Some(colors::WARNING))
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(text, Some(colors::INFO))
    }

    pub fn dim(text: impl Into<String>) -> Self {
        Self::new(text, Some(colors::DIM))
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// ANSI-styled when `color` is set, the bare text otherwise
    pub fn render(&self, color: bool) -> String {
        if !color || (self.color.is_none() && !self.bold) {
            return self.text.clone();
        }
        let mut styled = self.text.as_str().stylize();
        if let Some(fg) = self.color {
            styled = styled.with(fg);
        }
        if self.bold {
            styled = styled.bold();
        }
        styled.to_string()
    }
}

/// `icon text`, both in the icon's colour
pub fn status_line(icon: Icon, text: &str, color: bool, unicode: bool) -> String {
    let line = format!("{} {}", icon.as_str(unicode), text);
    let styled = match icon {
        Icon::Success => ColoredText::success(line),
        Icon::Error => ColoredText::error(line),
        Icon::Warning => ColoredText::warning(line),
        Icon::Pending | Icon::Arrow => ColoredText::plain(line),
    };
    styled.render(color)
}
