//! Colors and per-shape display style
use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb`, `#rgb` or one of the basic color names.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Some(hex) = text.strip_prefix('#') {
            return Self::from_hex(hex);
        }
        let named = match text.to_ascii_lowercase().as_str() {
            "black" => Color::BLACK,
            "white" => Color::WHITE,
            "red" => Color::rgb(255, 0, 0),
            "green" => Color::rgb(0, 128, 0),
            "blue" => Color::rgb(0, 0, 255),
            "yellow" => Color::rgb(255, 255, 0),
            "gray" | "grey" => Color::rgb(128, 128, 128),
            "orange" => Color::rgb(255, 165, 0),
            "cyan" => Color::rgb(0, 255, 255),
            "magenta" => Color::rgb(255, 0, 255),
            _ => return None,
        };
        Some(named)
    }

    fn from_hex(hex: &str) -> Option<Self> {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        match hex.len() {
            6 => Some(Self::rgb(
                u8::from_str_radix(&hex[0..2], 16).ok()?,
                u8::from_str_radix(&hex[2..4], 16).ok()?,
                u8::from_str_radix(&hex[4..6], 16).ok()?,
            )),
            3 => {
                let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).map(|v| v * 17);
                Some(Self::rgb(nibble(0).ok()?, nibble(1).ok()?, nibble(2).ok()?))
            }
            _ => None,
        }
    }

    /// Canonical lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Multiply every channel by `factor`, saturating at 0 and 255.
    pub fn scaled(self, factor: f32) -> Self {
        let channel = |c: u8| (c as f32 * factor).clamp(0.0, 255.0) as u8;
        Self::rgb(channel(self.r), channel(self.g), channel(self.b))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::parse(&value).ok_or_else(|| format!("unrecognised color `{value}`"))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// How a shape is drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    pub line_color: Color,
    /// Faces fall back to `line_color` when unset.
    pub fill_color: Option<Color>,
    pub line_width: f32,
    pub visible: bool,
}

impl Style {
    pub fn face_color(&self) -> Color {
        self.fill_color.unwrap_or(self.line_color)
    }
}

impl Default for Style {
    fn default() -> Self {
        Self {
            line_color: Color::BLACK,
            fill_color: Some(Color::WHITE),
            line_width: 1.0,
            visible: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_and_names() {
        assert_eq!(Color::parse("#ff8800"), Some(Color::rgb(255, 136, 0)));
        assert_eq!(Color::parse("#F80"), Some(Color::rgb(255, 136, 0)));
        assert_eq!(Color::parse("Black"), Some(Color::BLACK));
        assert_eq!(Color::parse("#12345"), None);
        assert_eq!(Color::parse("chartreuse"), None);
    }

    #[test]
    fn test_hex_is_canonical() {
        let color = Color::parse("#ABCDEF").unwrap();
        assert_eq!(color.to_hex(), "#abcdef");
        assert_eq!(Color::parse(&color.to_hex()), Some(color));
    }

    #[test]
    fn test_scaled_saturates() {
        assert_eq!(Color::rgb(200, 100, 0).scaled(0.5), Color::rgb(100, 50, 0));
        assert_eq!(Color::rgb(200, 100, 0).scaled(2.0), Color::rgb(255, 200, 0));
    }

    #[test]
    fn test_face_color_falls_back_to_line_color() {
        let style = Style {
            fill_color: None,
            line_color: Color::rgb(1, 2, 3),
            ..Style::default()
        };
        assert_eq!(style.face_color(), Color::rgb(1, 2, 3));
    }
}
