//! The packed cell type.

use bitflags::bitflags;

use crate::color::{Color, decode_color, encode_color};

bitflags! {
    /// Per-cell text attributes, one bit each.
    ///
    /// The bit positions are fixed: they are the attribute byte stored in
    /// the packed cell and the index into the emitter's attribute lookup
    /// table. Bits 6 and 7 are reserved.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CellAttrs: u8 {
        const BOLD = 0b0000_0001;
        const DIM = 0b0000_0010;
        const ITALIC = 0b0000_0100;
        const UNDERLINE = 0b0000_1000;
        const REVERSE = 0b0001_0000;
        const STRIKETHROUGH = 0b0010_0000;
    }
}

/// The style a cell is drawn with: attribute byte plus encoded colors.
///
/// Two cells on the same row belong to the same run exactly when their
/// styles compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Style {
    pub attrs: CellAttrs,
    pub fg: Color,
    pub bg: Color,
}

impl Style {
    #[must_use]
    pub const fn new(attrs: CellAttrs, fg: Color, bg: Color) -> Style {
        Style { attrs, fg, bg }
    }
}

/// One screen cell, packed into two 32-bit words.
///
/// Word layout:
///
/// ```text
/// hi: [attr byte: 8][reserved: 3][codepoint: 21]
/// lo: [fg: 16][bg: 16]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    hi: u32,
    lo: u32,
}

const CODEPOINT_MASK: u32 = 0x001F_FFFF;

impl Cell {
    /// The empty cell: a space with no attributes over default colors.
    /// It is the identity for "nothing rendered here".
    pub const EMPTY: Cell = Cell {
        hi: ' ' as u32,
        lo: 0,
    };

    /// Pack a character and style into a cell.
    #[must_use]
    pub fn pack(ch: char, attrs: CellAttrs, fg: Color, bg: Color) -> Cell {
        Cell {
            hi: (u32::from(attrs.bits()) << 24) | (ch as u32 & CODEPOINT_MASK),
            lo: (u32::from(encode_color(fg)) << 16) | u32::from(encode_color(bg)),
        }
    }

    /// Pack a character with a [`Style`].
    #[must_use]
    pub fn styled(ch: char, style: Style) -> Cell {
        Cell::pack(ch, style.attrs, style.fg, style.bg)
    }

    /// The cell's character. Falls back to a space if the stored
    /// codepoint is not a valid scalar (possible only via [`Cell::from_words`]).
    #[must_use]
    pub fn ch(self) -> char {
        char::from_u32(self.hi & CODEPOINT_MASK).unwrap_or(' ')
    }

    /// The cell's attribute set.
    #[must_use]
    pub fn attrs(self) -> CellAttrs {
        #[allow(clippy::cast_possible_truncation)]
        CellAttrs::from_bits_truncate((self.hi >> 24) as u8)
    }

    /// The foreground color.
    #[must_use]
    pub fn fg(self) -> Color {
        decode_color(self.fg_raw())
    }

    /// The background color.
    #[must_use]
    pub fn bg(self) -> Color {
        decode_color(self.bg_raw())
    }

    /// The encoded foreground color word.
    #[must_use]
    pub fn fg_raw(self) -> u16 {
        #[allow(clippy::cast_possible_truncation)]
        {
            (self.lo >> 16) as u16
        }
    }

    /// The encoded background color word.
    #[must_use]
    pub fn bg_raw(self) -> u16 {
        #[allow(clippy::cast_possible_truncation)]
        {
            (self.lo & 0xFFFF) as u16
        }
    }

    /// The `(attr, fg, bg)` triple as a single comparable key.
    #[must_use]
    pub fn style_key(self) -> u64 {
        (u64::from(self.hi >> 24) << 32) | u64::from(self.lo)
    }

    /// Reconstruct a cell from its raw words.
    #[must_use]
    pub const fn from_words(hi: u32, lo: u32) -> Cell {
        Cell { hi, lo }
    }

    /// The raw words, `(hi, lo)`.
    #[must_use]
    pub const fn words(self) -> (u32, u32) {
        (self.hi, self.lo)
    }
}

impl Default for Cell {
    fn default() -> Cell {
        Cell::EMPTY
    }
}

/// Reset `buf[lo..hi]` to the empty cell.
///
/// The range is clamped to the buffer; out-of-range and inverted ranges
/// are no-ops.
pub fn clear_range(buf: &mut [Cell], lo: usize, hi: usize) {
    let hi = hi.min(buf.len());
    if lo >= hi {
        return;
    }
    buf[lo..hi].fill(Cell::EMPTY);
}
