//! `ESC <byte>` decoding: the Alt prefix.
//!
//! A byte arriving directly after ESC (and not opening a CSI/SS3/OSC/DCS
//! sequence) is that key with Alt held. The quirks layer may claim the
//! byte first for terminals that use `ESC b`/`ESC f` as word motions.

use crate::c0;
use crate::event::{KeyCode, KeyModifiers};
use crate::quirks::{self, QuirkProfile};

/// Decode the byte following a bare ESC. Returns `None` for bytes with no
/// keyboard meaning (the caller drops the pair).
#[must_use]
pub(crate) fn decode(
    byte: u8,
    quirks: bool,
    profile: QuirkProfile,
) -> Option<(KeyCode, KeyModifiers)> {
    if quirks && let Some(hit) = quirks::esc_letter_override(profile, byte) {
        return Some(hit);
    }

    let (code, mods) = match byte {
        c if c < 0x20 || c == 0x7F => c0::decode(c)?,
        c if c.is_ascii() => {
            let ch = c as char;
            let mods = if ch.is_ascii_uppercase() {
                KeyModifiers::SHIFT
            } else {
                KeyModifiers::NONE
            };
            (KeyCode::Char(ch), mods)
        }
        _ => return None,
    };
    Some((code, mods | KeyModifiers::ALT))
}
