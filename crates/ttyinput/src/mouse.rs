//! Mouse report decoding: SGR (`CSI < b;x;y M|m`), X10 (`CSI M` plus three
//! offset bytes) and the RXVT numeric form (`CSI b;x;y M`).
//!
//! All three share one button-byte layout: the low two bits select the
//! button, bit 5 flags motion, bit 6 flags the wheel, and bits 2-4 carry
//! shift/alt/ctrl. Coordinates are kept 1-based as the terminal sent them.

use crate::event::{KeyModifiers, MouseButton, MouseEvent, MouseKind};

/// Decode one mouse report.
///
/// `release` is true for the SGR `m` final (and for X10's button code 3).
/// `last_button` is the decoder's press latch: it distinguishes drag from
/// hover motion and fills in the button on releases that do not name one.
pub(crate) fn decode_report(
    cb: u8,
    x: u16,
    y: u16,
    release: bool,
    last_button: &mut Option<MouseButton>,
) -> Option<MouseEvent> {
    let modifiers = decode_modifiers(cb);

    // Wheel reports: bit 6 set, low bits select the direction.
    if cb & 0x40 != 0 {
        let button = match cb & 0x03 {
            0 => MouseButton::WheelUp,
            1 => MouseButton::WheelDown,
            2 => MouseButton::WheelLeft,
            _ => MouseButton::WheelRight,
        };
        return Some(MouseEvent {
            kind: MouseKind::Scroll,
            button: Some(button),
            x,
            y,
            modifiers,
            raw: Vec::new(),
        });
    }

    let button = match cb & 0x03 {
        0 => Some(MouseButton::Left),
        1 => Some(MouseButton::Middle),
        2 => Some(MouseButton::Right),
        _ => None,
    };
    let motion = cb & 0x20 != 0;

    let (kind, button) = if release || (button.is_none() && !motion) {
        // X10 encodes release as button code 3 without the motion bit.
        let released = button.or(*last_button);
        *last_button = None;
        (MouseKind::Up, released)
    } else if motion {
        match *last_button {
            Some(held) => (MouseKind::Drag, Some(held)),
            None => (MouseKind::Move, None),
        }
    } else {
        *last_button = button;
        (MouseKind::Down, button)
    };

    Some(MouseEvent {
        kind,
        button,
        x,
        y,
        modifiers,
        raw: Vec::new(),
    })
}

fn decode_modifiers(cb: u8) -> KeyModifiers {
    let mut modifiers = KeyModifiers::NONE;
    if cb & 0x04 != 0 {
        modifiers |= KeyModifiers::SHIFT;
    }
    if cb & 0x08 != 0 {
        modifiers |= KeyModifiers::ALT;
    }
    if cb & 0x10 != 0 {
        modifiers |= KeyModifiers::CONTROL;
    }
    modifiers
}

/// Decode the three X10 payload bytes (each offset by 32).
pub(crate) fn decode_x10(
    bytes: &[u8; 3],
    last_button: &mut Option<MouseButton>,
) -> Option<MouseEvent> {
    let cb = bytes[0].checked_sub(32)?;
    let x = u16::from(bytes[1].checked_sub(32)?);
    let y = u16::from(bytes[2].checked_sub(32)?);
    decode_report(cb, x, y, false, last_button)
}
