//! Attribute sequences and the full SGR builder.

use std::sync::LazyLock;

use ttycell::{CellAttrs, Color};

use crate::color::push_color_params;

// SGR codes for each attribute bit, in bit order.
const ATTR_CODES: [(CellAttrs, &str); 6] = [
    (CellAttrs::BOLD, "1"),
    (CellAttrs::DIM, "2"),
    (CellAttrs::ITALIC, "3"),
    (CellAttrs::UNDERLINE, "4"),
    (CellAttrs::REVERSE, "7"),
    (CellAttrs::STRIKETHROUGH, "9"),
];

fn push_attr_params(out: &mut String, attrs: CellAttrs) {
    // Leading 0 so the sequence fully replaces whatever was set before.
    out.push('0');
    for (flag, code) in ATTR_CODES {
        if attrs.contains(flag) {
            out.push(';');
            out.push_str(code);
        }
    }
}

static ATTR_LUT: LazyLock<[String; 256]> = LazyLock::new(|| {
    std::array::from_fn(|bits| {
        #[allow(clippy::cast_possible_truncation)]
        let attrs = CellAttrs::from_bits_truncate(bits as u8);
        let mut s = String::from("\x1b[");
        push_attr_params(&mut s, attrs);
        s.push('m');
        s
    })
});

/// The precomputed `ESC [ 0 ; <codes…> m` sequence for an attribute set.
///
/// Note the leading `0`: applying an attribute sequence also resets
/// colors, so callers that keep non-default colors must re-assert them.
#[must_use]
pub fn attr_sequence(attrs: CellAttrs) -> &'static str {
    &ATTR_LUT[attrs.bits() as usize]
}

/// Build the single `ESC [ … m` sequence that selects the full style:
/// reset, attribute codes, then foreground and background parameters.
///
/// With no attributes and default colors this is exactly `ESC [ 0 m`.
#[must_use]
pub fn build_sgr(attrs: CellAttrs, fg: Color, bg: Color) -> String {
    let mut out = String::from("\x1b[");
    push_attr_params(&mut out, attrs);
    if fg != Color::Default {
        out.push(';');
        push_color_params(&mut out, fg, false);
    }
    if bg != Color::Default {
        out.push(';');
        push_color_params(&mut out, bg, true);
    }
    out.push('m');
    out
}
