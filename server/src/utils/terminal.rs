//! ANSI styling for startup output

/// Foreground colors used by the banner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Cyan,
    Green,
    Yellow,
    Gray,
}

impl Color {
    const fn code(&self) -> &'static str {
        match self {
            Color::Cyan => "36",
            Color::Green => "32",
            Color::Yellow => "33",
            Color::Gray => "90",
        }
    }
}

const RESET: &str = "\x1b[0m";

pub fn paint(text: &str, color: Color) -> String {
    format!("\x1b[{}m{}{}", color.code(), text, RESET)
}

pub fn bold(text: &str) -> String {
    format!("\x1b[1m{}{}", text, RESET)
}

/// Cyan URL, wrapped in an OSC 8 hyperlink when stdout supports it
pub fn terminal_link(url: &str) -> String {
    let text = paint(url, Color::Cyan);
    if supports_hyperlinks::on(supports_hyperlinks::Stream::Stdout) {
        format!("\x1b]8;;{}\x07{}\x1b]8;;\x07", url, text)
    } else {
        text
    }
}
