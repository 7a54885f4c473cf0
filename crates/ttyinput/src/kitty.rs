//! Kitty keyboard protocol (`CSI unicode ; modifiers : event_type u`).
//!
//! Parameter tails may be omitted: modifiers default to 1 (none) and the
//! event type to 1 (press). Modifier and lock keys arrive as scalars in
//! the protocol's private ranges and update the physical-modifier shadow.

use crate::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crate::quirks::{self, QuirkProfile};

// Arrow keys are sometimes reported as the legacy escape bytes packed
// into one scalar ("ESC [ A" and friends).
const PACKED_UP: u32 = 0x1B_5B41;
const PACKED_DOWN: u32 = 0x1B_5B42;
const PACKED_RIGHT: u32 = 0x1B_5B43;
const PACKED_LEFT: u32 = 0x1B_5B44;

/// Map a protocol scalar to a key code.
fn translate_scalar(codepoint: u32, quirks: bool, profile: QuirkProfile) -> Option<KeyCode> {
    if quirks && let Some(remapped) = quirks::remap_modifier_scalar(profile, codepoint) {
        return Some(remapped);
    }

    let code = match codepoint {
        13 => KeyCode::Enter,
        27 => KeyCode::Escape,
        9 => KeyCode::Tab,
        127 => KeyCode::Backspace,
        PACKED_UP => KeyCode::Up,
        PACKED_DOWN => KeyCode::Down,
        PACKED_RIGHT => KeyCode::Right,
        PACKED_LEFT => KeyCode::Left,
        // Lock keys.
        57358 => KeyCode::CapsLock,
        57359 => KeyCode::ScrollLock,
        57360 => KeyCode::NumLock,
        // Modifier keys, left then right. Super/hyper collapse onto Meta;
        // the event model tracks four modifiers.
        57441 | 57447 => KeyCode::Shift,
        57442 | 57448 => KeyCode::Control,
        57443 | 57449 => KeyCode::Alt,
        57444 | 57445 | 57446 | 57450 | 57451 | 57452 => KeyCode::Meta,
        cp if cp >= 32 => KeyCode::Char(char::from_u32(cp)?),
        _ => return None,
    };
    Some(code)
}

pub(crate) fn translate_event_type(value: u32) -> KeyEventKind {
    match value {
        2 => KeyEventKind::Repeat,
        3 => KeyEventKind::Release,
        _ => KeyEventKind::Press,
    }
}

/// Decode a `u`-terminated key report.
///
/// `params` is the sequence's parameter list, sub-parameters included.
/// Returns the event plus whether it was a modifier key going down or up
/// (for the caller's shadow bookkeeping).
pub(crate) fn decode(
    codepoint: u32,
    modifier_param: Option<u32>,
    event_type_param: Option<u32>,
    quirks: bool,
    profile: QuirkProfile,
) -> Option<KeyEvent> {
    let code = translate_scalar(codepoint, quirks, profile)?;

    let mut modifiers = KeyModifiers::from_param(modifier_param.unwrap_or(1));
    let kind = translate_event_type(event_type_param.unwrap_or(1));

    // A modifier key never reports itself as held; the event is the state
    // change.
    modifiers &= !code.self_modifier();

    Some(KeyEvent {
        code,
        modifiers,
        kind: Some(kind),
        repeat: kind == KeyEventKind::Repeat,
        raw: Vec::new(),
    })
}
