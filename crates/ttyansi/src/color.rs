//! SGR color sequences.

use ttycell::{Color, decode_color};

/// Append the SGR parameter digits for `color` to `out` (`38;5;n`,
/// `48;2;r;g;b`, ...). Returns `false` without touching `out` for the
/// default color, which has no standalone parameter form here; resets are
/// the renderer's business.
pub fn push_color_params(out: &mut String, color: Color, bg: bool) -> bool {
    let mut itoa_buf = itoa::Buffer::new();
    match color {
        Color::Default => false,
        Color::Indexed(i) => {
            out.push_str(if bg { "48;5;" } else { "38;5;" });
            out.push_str(itoa_buf.format(i));
            true
        }
        Color::Rgb(r, g, b) => {
            out.push_str(if bg { "48;2;" } else { "38;2;" });
            out.push_str(itoa_buf.format(r));
            out.push(';');
            out.push_str(itoa_buf.format(g));
            out.push(';');
            out.push_str(itoa_buf.format(b));
            true
        }
    }
}

/// The complete `ESC [ … m` sequence selecting `color`, or the empty
/// string for the default color.
#[must_use]
pub fn color_sequence(color: Color, bg: bool) -> String {
    let mut out = String::new();
    if push_color_params(&mut out, color, bg) {
        out.insert_str(0, "\x1b[");
        out.push('m');
    }
    out
}

/// [`color_sequence`] over the 16-bit encoded form.
#[must_use]
pub fn raw_color_sequence(raw: u16, bg: bool) -> String {
    color_sequence(decode_color(raw), bg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_foreground() {
        assert_eq!(color_sequence(Color::Indexed(42), false), "\x1b[38;5;42m");
    }

    #[test]
    fn palette_background() {
        assert_eq!(color_sequence(Color::Indexed(0), true), "\x1b[48;5;0m");
    }

    #[test]
    fn truecolor_foreground() {
        assert_eq!(
            color_sequence(Color::Rgb(255, 128, 0), false),
            "\x1b[38;2;255;128;0m"
        );
    }

    #[test]
    fn truecolor_background() {
        assert_eq!(
            color_sequence(Color::Rgb(0, 0, 0), true),
            "\x1b[48;2;0;0;0m"
        );
    }

    #[test]
    fn default_emits_nothing() {
        assert_eq!(color_sequence(Color::Default, false), "");
        assert_eq!(color_sequence(Color::Default, true), "");
    }

    #[test]
    fn raw_form_goes_through_the_codec() {
        assert_eq!(raw_color_sequence(0, false), "");
        assert_eq!(raw_color_sequence(1, false), "\x1b[38;5;0m");
        assert_eq!(raw_color_sequence(256, true), "\x1b[48;5;255m");
    }
}
