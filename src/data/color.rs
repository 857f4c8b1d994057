//! Colours.
//!
//! Colour fields store a [`Color`]; scripts see it as a `Color` value.
//! Text forms accepted by [`parse_color`]:
//! - `rgb(r, g, b)` and `rgba(r, g, b, a)` with components 0-255,
//! - `#rrggbb` and `#rrggbbaa`.

use serde::{Deserialize, Serialize};

/// An 8-bit RGBA colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Opaque colour.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Colour with alpha.
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Is this colour fully opaque?
    #[must_use]
    pub const fn is_opaque(self) -> bool {
        self.a == 255
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::rgb(0, 0, 0)
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_opaque() {
            write!(f, "rgb({},{},{})", self.r, self.g, self.b)
        } else {
            write!(f, "rgba({},{},{},{})", self.r, self.g, self.b, self.a)
        }
    }
}

/// Parse a colour from its textual form. Returns `None` for anything else.
///
/// ```
/// use rust_cardsmith::data::color::{parse_color, Color};
///
/// assert_eq!(parse_color("rgb(255, 0, 0)"), Some(Color::rgb(255, 0, 0)));
/// assert_eq!(parse_color("#00ff0080"), Some(Color::rgba(0, 255, 0, 128)));
/// assert_eq!(parse_color("red"), None);
/// ```
#[must_use]
pub fn parse_color(text: &str) -> Option<Color> {
    let text = text.trim();
    if let Some(hex) = text.strip_prefix('#') {
        return parse_hex(hex);
    }
    let (body, with_alpha) = if let Some(rest) = text.strip_prefix("rgba(") {
        (rest.strip_suffix(')')?, true)
    } else if let Some(rest) = text.strip_prefix("rgb(") {
        (rest.strip_suffix(')')?, false)
    } else {
        return None;
    };

    let parts: Vec<u8> = body
        .split(',')
        .map(|p| p.trim().parse::<u8>().ok())
        .collect::<Option<_>>()?;
    match (parts.as_slice(), with_alpha) {
        ([r, g, b], false) => Some(Color::rgb(*r, *g, *b)),
        ([r, g, b, a], true) => Some(Color::rgba(*r, *g, *b, *a)),
        _ => None,
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.is_ascii() {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Color::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}
