//! Deterministic character colors.
//!
//! A character's color depends only on its name and on the known-name list
//! for the story, so the roster editor and the timeline renderer always
//! agree without sharing state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Lowercase `#rrggbb` form.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Display styling for one character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterColor {
    /// CSS declaration for a translucent chip background.
    pub background_style: String,
    /// CSS declaration for the chip text.
    pub text_style: String,
    /// CSS declaration for the chip border.
    pub border_style: String,
    pub raw_color: Rgb,
}

impl CharacterColor {
    fn from_rgb(rgb: Rgb) -> Self {
        Self {
            background_style: format!(
                "background-color: rgba({}, {}, {}, 0.15)",
                rgb.r, rgb.g, rgb.b
            ),
            text_style: format!("color: {}", rgb.to_hex()),
            border_style: format!("border-color: {}", rgb.to_hex()),
            raw_color: rgb,
        }
    }
}

lazy_static::lazy_static! {
    /// Character palette, chosen to stay legible on a light background.
    pub static ref PALETTE: Vec<Rgb> = vec![
        Rgb::new(0x7c, 0x3a, 0xed), // violet
        Rgb::new(0x25, 0x63, 0xeb), // blue
        Rgb::new(0x05, 0x96, 0x69), // emerald
        Rgb::new(0xd9, 0x77, 0x06), // amber
        Rgb::new(0xdc, 0x26, 0x26), // red
        Rgb::new(0xdb, 0x27, 0x77), // pink
        Rgb::new(0x08, 0x91, 0xb2), // cyan
        Rgb::new(0x65, 0xa3, 0x0d), // lime
        Rgb::new(0x4f, 0x46, 0xe5), // indigo
        Rgb::new(0xea, 0x58, 0x0c), // orange
        Rgb::new(0x0d, 0x94, 0x88), // teal
        Rgb::new(0xc0, 0x26, 0xd3), // fuchsia
    ];
}

/// Pick the color for `name` given every known name in the story.
///
/// The palette slot is the position of the first equal name in
/// `all_known_names`. Names missing from the list hash into the palette
/// instead, so they still get a stable color.
pub fn color_for<S: AsRef<str>>(name: &str, all_known_names: &[S]) -> CharacterColor {
    let slot = all_known_names
        .iter()
        .position(|n| n.as_ref() == name)
        .unwrap_or_else(|| fnv1a(name) as usize);
    CharacterColor::from_rgb(PALETTE[slot % PALETTE.len()])
}

/// 64-bit FNV-1a over the UTF-8 bytes of `s`.
fn fnv1a(s: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    s.bytes()
        .fold(OFFSET, |hash, byte| (hash ^ byte as u64).wrapping_mul(PRIME))
}
