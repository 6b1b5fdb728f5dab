//! Colored terminal output

use owo_colors::{OwoColorize, Style, colors::css};

/// Extension trait for colorizing output
///
/// Colors are only applied when stdout supports them.
pub trait Colorize {
    /// Color as success (green)
    fn success(&self) -> String;
    /// Color as warning (amber)
    fn warning(&self) -> String;
    /// Color as info (blue)
    fn info(&self) -> String;
    /// Dim the text
    fn dim(&self) -> String;
}

impl<T: AsRef<str> + ?Sized> Colorize for T {
    fn success(&self) -> String {
        paint(self.as_ref(), Style::new().fg::<css::Green>())
    }

    fn warning(&self) -> String {
        paint(self.as_ref(), Style::new().fg::<css::Orange>())
    }

    fn info(&self) -> String {
        paint(self.as_ref(), Style::new().fg::<css::LightBlue>())
    }

    fn dim(&self) -> String {
        paint(self.as_ref(), Style::new().dimmed())
    }
}

fn paint(text: &str, style: Style) -> String {
    if supports_color::on(supports_color::Stream::Stdout).is_some() {
        text.style(style).to_string()
    } else {
        text.to_string()
    }
}
