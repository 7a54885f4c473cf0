//! C0 control byte decoding (0x00-0x1F and 0x7F).
//!
//! Most of these are Ctrl+letter chords; a handful are dedicated keys.

use crate::event::{KeyCode, KeyModifiers};

/// Decode a C0 control byte to a key. Total over the C0 range; bytes with
/// no keyboard meaning fall back to their Ctrl-chord reading.
#[must_use]
pub(crate) fn decode(byte: u8) -> Option<(KeyCode, KeyModifiers)> {
    match byte {
        b'\t' => Some((KeyCode::Tab, KeyModifiers::NONE)),
        b'\r' | b'\n' => Some((KeyCode::Enter, KeyModifiers::NONE)),
        0x7F => Some((KeyCode::Backspace, KeyModifiers::NONE)),
        0x00 => Some((KeyCode::Char(' '), KeyModifiers::CONTROL)),
        c @ 0x01..=0x1A => {
            // Ctrl+A through Ctrl+Z.
            let ch = (c - 0x01 + b'a') as char;
            Some((KeyCode::Char(ch), KeyModifiers::CONTROL))
        }
        0x1B => Some((KeyCode::Escape, KeyModifiers::NONE)),
        c @ 0x1C..=0x1F => {
            // Ctrl+\ Ctrl+] Ctrl+^ Ctrl+_ report as Ctrl+4..Ctrl+7.
            let ch = (c - 0x1C + b'4') as char;
            Some((KeyCode::Char(ch), KeyModifiers::CONTROL))
        }
        _ => None,
    }
}
