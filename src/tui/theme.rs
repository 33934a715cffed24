use std::collections::HashMap;

use ratatui::style::Color;

use crate::model::UiConfig;

/// Parsed color theme for the TUI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    pub dim: Color,
    /// Running subtask
    pub highlight: Color,
    pub card_bg: Color,
    pub header_bg: Color,
    /// Revealed behind a left swipe
    pub delete_bg: Color,
    /// Revealed behind a right swipe
    pub toggle_bg: Color,
    pub placeholder: Color,
    pub proxy_bg: Color,
    pub popup_border: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Theme {
            background: Color::Rgb(0x0C, 0x00, 0x1B),
            text: Color::Rgb(0xB0, 0xAA, 0xFF),
            text_bright: Color::Rgb(0xFF, 0xFF, 0xFF),
            dim: Color::Rgb(0x7D, 0x78, 0xBF),
            highlight: Color::Rgb(0xFB, 0x41, 0x96),
            card_bg: Color::Rgb(0x1A, 0x0C, 0x2E),
            header_bg: Color::Rgb(0x26, 0x14, 0x40),
            delete_bg: Color::Rgb(0xFF, 0x44, 0x44),
            toggle_bg: Color::Rgb(0x44, 0xFF, 0x88),
            placeholder: Color::Rgb(0x3D, 0x14, 0x38),
            proxy_bg: Color::Rgb(0x3D, 0x14, 0x38),
            popup_border: Color::Rgb(0xFB, 0x41, 0x96),
        }
    }

    pub fn light() -> Self {
        Theme {
            background: Color::Rgb(0xF7, 0xF5, 0xFF),
            text: Color::Rgb(0x33, 0x2E, 0x5C),
            text_bright: Color::Rgb(0x00, 0x00, 0x00),
            dim: Color::Rgb(0x8A, 0x85, 0xB0),
            highlight: Color::Rgb(0xC2, 0x18, 0x5B),
            card_bg: Color::Rgb(0xFF, 0xFF, 0xFF),
            header_bg: Color::Rgb(0xE8, 0xE3, 0xFA),
            delete_bg: Color::Rgb(0xE5, 0x39, 0x35),
            toggle_bg: Color::Rgb(0x43, 0xA0, 0x47),
            placeholder: Color::Rgb(0xDD, 0xD6, 0xF3),
            proxy_bg: Color::Rgb(0xEE, 0xE8, 0xFF),
            popup_border: Color::Rgb(0xC2, 0x18, 0x5B),
        }
    }

    /// Create the dark or light theme from UI config, applying that mode's
    /// color overrides
    pub fn from_config(ui: &UiConfig, dark: bool) -> Self {
        let (mut theme, overrides) = if dark {
            (Theme::dark(), &ui.colors)
        } else {
            (Theme::light(), &ui.light_colors)
        };
        theme.apply_overrides(overrides);
        theme
    }

    fn apply_overrides(&mut self, overrides: &HashMap<String, String>) {
        for (key, value) in overrides {
            let Some(color) = parse_hex_color(value) else {
                continue;
            };
            match key.as_str() {
                "background" => self.background = color,
                "text" => self.text = color,
                "text_bright" => self.text_bright = color,
                "dim" => self.dim = color,
                "highlight" => self.highlight = color,
                "card_bg" => self.card_bg = color,
                "header_bg" => self.header_bg = color,
                "delete_bg" => self.delete_bg = color,
                "toggle_bg" => self.toggle_bg = color,
                "placeholder" => self.placeholder = color,
                "proxy_bg" => self.proxy_bg = color,
                "popup_border" => self.popup_border = color,
                _ => {}
            }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(
            parse_hex_color("#FF4444"),
            Some(Color::Rgb(0xFF, 0x44, 0x44))
        );
        assert_eq!(parse_hex_color("FF4444"), None); // missing #
        assert_eq!(parse_hex_color("#FF44"), None); // too short
        assert_eq!(parse_hex_color("#ZZZZZZ"), None);
    }

    #[test]
    fn test_mode_selects_base_theme() {
        let ui = UiConfig::default();
        assert_eq!(Theme::from_config(&ui, true), Theme::dark());
        assert_eq!(Theme::from_config(&ui, false), Theme::light());
    }

    #[test]
    fn test_overrides_apply_per_mode() {
        let mut ui = UiConfig::default();
        ui.colors.insert("background".into(), "#000000".into());
        ui.light_colors.insert("highlight".into(), "#112233".into());
        ui.light_colors.insert("bogus".into(), "#112233".into());

        let dark = Theme::from_config(&ui, true);
        assert_eq!(dark.background, Color::Rgb(0, 0, 0));
        assert_eq!(dark.highlight, Theme::dark().highlight);

        let light = Theme::from_config(&ui, false);
        assert_eq!(light.highlight, Color::Rgb(0x11, 0x22, 0x33));
        assert_eq!(light.background, Theme::light().background);
    }

    #[test]
    fn test_bad_override_is_ignored() {
        let mut ui = UiConfig::default();
        ui.colors.insert("text".into(), "red".into());
        assert_eq!(Theme::from_config(&ui, true).text, Theme::dark().text);
    }
}
