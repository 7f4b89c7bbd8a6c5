use ratatui::style::Color;

use crate::model::config::UiConfig;
use crate::model::task::Priority;

/// Parsed color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    /// Title bar background and selection marker
    pub highlight: Color,
    pub dim: Color,
    pub completed: Color,
    pub pending: Color,
    pub priority_high: Color,
    pub priority_medium: Color,
    pub priority_low: Color,
    pub success: Color,
    pub error: Color,
    pub info: Color,
    pub warning: Color,
    pub selection_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background: Color::Reset,
            text: Color::Rgb(0xDD, 0xDD, 0xDD),
            text_bright: Color::Rgb(0xFA, 0xFA, 0xFA),
            highlight: Color::Rgb(0x7D, 0x56, 0xF4),
            dim: Color::Rgb(0x62, 0x62, 0x62),
            completed: Color::Rgb(0x75, 0x75, 0x75),
            pending: Color::Rgb(0x04, 0xB5, 0x75),
            priority_high: Color::Rgb(0xFF, 0x6B, 0x6B),
            priority_medium: Color::Rgb(0xFF, 0xD9, 0x3D),
            priority_low: Color::Rgb(0x6B, 0xCF, 0x7F),
            success: Color::Rgb(0x04, 0xB5, 0x75),
            error: Color::Rgb(0xFF, 0x6B, 0x6B),
            info: Color::Rgb(0x4A, 0x90, 0xE2),
            warning: Color::Rgb(0xF5, 0xA6, 0x23),
            selection_bg: Color::Rgb(0x2A, 0x1F, 0x4D),
        }
    }
}

/// Parse a hex color string like "#FF4444" into an RGB Color
fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

impl Theme {
    /// Defaults with `[ui.colors]` overrides applied. Unknown slots and
    /// malformed values are ignored.
    pub fn from_config(ui: &UiConfig) -> Self {
        let mut theme = Theme::default();
        for (key, value) in &ui.colors {
            let Some(color) = parse_hex_color(value) else {
                tracing::warn!(slot = %key, %value, "ignoring malformed color");
                continue;
            };
            match key.as_str() {
                "background" => theme.background = color,
                "text" => theme.text = color,
                "text_bright" => theme.text_bright = color,
                "highlight" => theme.highlight = color,
                "dim" => theme.dim = color,
                "completed" => theme.completed = color,
                "pending" => theme.pending = color,
                "priority_high" => theme.priority_high = color,
                "priority_medium" => theme.priority_medium = color,
                "priority_low" => theme.priority_low = color,
                "success" => theme.success = color,
                "error" => theme.error = color,
                "info" => theme.info = color,
                "warning" => theme.warning = color,
                "selection_bg" => theme.selection_bg = color,
                _ => {}
            }
        }
        theme
    }

    pub fn priority_color(&self, priority: Priority) -> Color {
        match priority {
            Priority::High => self.priority_high,
            Priority::Medium => self.priority_medium,
            Priority::Low => self.priority_low,
        }
    }
}
