//! 16-bit cell color encoding.
//!
//! Colors are stored in cells as a single `u16`:
//!
//! - `0`: default (inherit the terminal's own color);
//! - `1..=256`: palette index plus one;
//! - `257..`: truecolor, packed as 5-6-5 RGB offset by 257.
//!
//! The 5-6-5 packing drops the low bits of each channel; decoding expands
//! them back by bit replication, so `#000000` and `#ffffff` round-trip
//! exactly and everything else lands within the quantization step. The
//! brightest sliver of the 5-6-5 cube does not fit above the offset in 16
//! bits; those codes saturate into the top slot, which decodes as full
//! white.

/// Encoded default color.
pub const COLOR_DEFAULT: u16 = 0;

/// First encoded palette value (palette index 0).
pub const PALETTE_BASE: u16 = 1;

/// First encoded truecolor value (5-6-5 code 0).
pub const RGB_BASE: u16 = 257;

/// A cell color as seen by the host API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// Inherit the terminal's default foreground/background.
    #[default]
    Default,
    /// One of the 256 palette entries.
    Indexed(u8),
    /// 24-bit color; stored quantized to 5-6-5.
    Rgb(u8, u8, u8),
}

impl Color {
    /// Parse a `#RRGGBB` hex string.
    ///
    /// Anything that is not exactly `#` followed by six hex digits decodes
    /// to [`Color::Default`]. This function never fails.
    #[must_use]
    pub fn parse(s: &str) -> Color {
        let Some(digits) = s.strip_prefix('#') else {
            return Color::Default;
        };
        if digits.len() != 6 {
            return Color::Default;
        }
        let mut rgb = [0u8; 3];
        match hex::decode_to_slice(digits, &mut rgb) {
            Ok(()) => Color::Rgb(rgb[0], rgb[1], rgb[2]),
            Err(_) => Color::Default,
        }
    }

    /// Encoded `u16` form of this color.
    #[must_use]
    pub fn encode(self) -> u16 {
        encode_color(self)
    }
}

/// Encode a color into its 16-bit cell representation.
#[must_use]
pub fn encode_color(color: Color) -> u16 {
    match color {
        Color::Default => COLOR_DEFAULT,
        Color::Indexed(p) => PALETTE_BASE + u16::from(p),
        Color::Rgb(r, g, b) => {
            let code = (u32::from(r >> 3) << 11) | (u32::from(g >> 2) << 5) | u32::from(b >> 3);
            u16::try_from(u32::from(RGB_BASE) + code).unwrap_or(u16::MAX)
        }
    }
}

/// Decode a 16-bit cell color back to its host form.
#[must_use]
pub fn decode_color(value: u16) -> Color {
    match value {
        COLOR_DEFAULT => Color::Default,
        #[allow(clippy::cast_possible_truncation)]
        1..=256 => Color::Indexed((value - PALETTE_BASE) as u8),
        // The saturated slot covers the 5-6-5 codes that do not fit above
        // the offset; they are all within a hair of white.
        u16::MAX => Color::Rgb(255, 255, 255),
        _ => {
            let code = value - RGB_BASE;
            let r5 = (code >> 11) & 0x1F;
            let g6 = (code >> 5) & 0x3F;
            let b5 = code & 0x1F;
            #[allow(clippy::cast_possible_truncation)]
            Color::Rgb(
                ((r5 << 3) | (r5 >> 2)) as u8,
                ((g6 << 2) | (g6 >> 4)) as u8,
                ((b5 << 3) | (b5 >> 2)) as u8,
            )
        }
    }
}
