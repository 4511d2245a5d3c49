use ratatui::style::{Color, Modifier, Style};

/// Color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    pub highlight: Color,
    pub dim: Color,
    pub green: Color,
    pub selection_bg: Color,
    pub placeholder: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background: Color::Rgb(0x0C, 0x00, 0x1B),
            text: Color::Rgb(0xB0, 0xAA, 0xFF),
            text_bright: Color::Rgb(0xFF, 0xFF, 0xFF),
            highlight: Color::Rgb(0xFB, 0x41, 0x96),
            dim: Color::Rgb(0x7D, 0x78, 0xBF),
            green: Color::Rgb(0x44, 0xFF, 0x88),
            selection_bg: Color::Rgb(0x3D, 0x14, 0x38),
            placeholder: Color::Rgb(0x44, 0xDD, 0xFF),
        }
    }
}

impl Theme {
    pub fn base(&self) -> Style {
        Style::default().fg(self.text).bg(self.background)
    }

    /// Style for an item's text
    pub fn item_style(&self, checked: bool, under_cursor: bool) -> Style {
        let mut style = if checked {
            Style::default()
                .fg(self.dim)
                .add_modifier(Modifier::CROSSED_OUT)
        } else {
            Style::default().fg(self.text)
        };
        if under_cursor {
            style = style.bg(self.selection_bg).fg(self.text_bright);
        } else {
            style = style.bg(self.background);
        }
        style
    }

    pub fn checkbox_style(&self, checked: bool) -> Style {
        let fg = if checked { self.green } else { self.text };
        Style::default().fg(fg)
    }
}
