//! CSI sequence dispatch.
//!
//! The state machine hands a finished sequence here; this module decides
//! what it meant. Unrecognized sequences produce [`CsiAction::Ignore`] and
//! are logged at debug level by the caller.

use smallvec::SmallVec;

use crate::event::{
    InputEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton,
};
use crate::kitty;
use crate::mouse;
use crate::parser::DecoderOptions;

pub(crate) const MAX_PARAMS: usize = 16;
pub(crate) const MAX_SUBPARAMS: usize = 4;
pub(crate) const PARAM_MAX: u32 = 0x00FF_FFFF;

/// One parameter with its colon-separated sub-parameters.
pub(crate) type Param = SmallVec<[u32; MAX_SUBPARAMS]>;

/// A finished CSI sequence, borrowed from the machine.
pub(crate) struct CsiSeq<'a> {
    pub leader: Option<u8>,
    pub params: &'a [Param],
    pub intermediates: &'a [u8],
    pub final_byte: u8,
}

impl CsiSeq<'_> {
    pub(crate) fn param(&self, i: usize) -> Option<u32> {
        self.params.get(i).and_then(|p| p.first().copied())
    }

    pub(crate) fn part(&self, i: usize, j: usize) -> Option<u32> {
        self.params.get(i).and_then(|p| p.get(j).copied())
    }
}

/// What the machine should do with a dispatched sequence.
pub(crate) enum CsiAction {
    Event(InputEvent),
    /// `CSI 200 ~`: start capturing bracketed-paste content.
    PasteStart,
    /// `CSI M` with no parameters: three X10 payload bytes follow.
    X10Start,
    /// Recognized-but-uninteresting or malformed; drop silently.
    Ignore,
}

#[allow(clippy::cast_possible_truncation)]
fn to_u16(v: u32) -> u16 {
    v.min(u32::from(u16::MAX)) as u16
}

/// Modifier mask and event type from the conventional positions: second
/// parameter carries `mask[:kind]`, with a bare third parameter as the
/// legacy spot for the kind.
fn modifiers_and_kind(
    seq: &CsiSeq<'_>,
    opts: &DecoderOptions,
) -> (KeyModifiers, Option<KeyEventKind>, bool) {
    let modifiers = KeyModifiers::from_param(seq.param(1).unwrap_or(1));
    let kind_code = seq.part(1, 1).or_else(|| seq.param(2));
    let kind = match kind_code {
        Some(code) => Some(kitty::translate_event_type(code)),
        None if opts.kitty_keyboard => Some(KeyEventKind::Press),
        None => None,
    };
    let repeat = kind == Some(KeyEventKind::Repeat);
    (modifiers, kind, repeat)
}

fn key_event(
    code: KeyCode,
    seq: &CsiSeq<'_>,
    opts: &DecoderOptions,
) -> CsiAction {
    let (modifiers, kind, repeat) = modifiers_and_kind(seq, opts);
    CsiAction::Event(InputEvent::Key(KeyEvent {
        code,
        modifiers,
        kind,
        repeat,
        raw: Vec::new(),
    }))
}

/// `CSI number [; modifier [; kind]] ~` special keys.
#[allow(clippy::cast_possible_truncation)]
fn special_key(first: u32) -> Option<KeyCode> {
    let code = match first {
        1 | 7 => KeyCode::Home,
        2 => KeyCode::Insert,
        3 => KeyCode::Delete,
        4 | 8 => KeyCode::End,
        5 => KeyCode::PageUp,
        6 => KeyCode::PageDown,
        v @ 11..=15 => KeyCode::F((v - 10) as u8),
        v @ 17..=21 => KeyCode::F((v - 11) as u8),
        v @ 23..=26 => KeyCode::F((v - 12) as u8),
        v @ 28..=29 => KeyCode::F((v - 15) as u8),
        v @ 31..=34 => KeyCode::F((v - 17) as u8),
        _ => return None,
    };
    Some(code)
}

pub(crate) fn dispatch(
    seq: &CsiSeq<'_>,
    opts: &DecoderOptions,
    last_button: &mut Option<MouseButton>,
) -> CsiAction {
    // SGR mouse and the Kitty pop report share the '<' leader.
    if seq.leader == Some(b'<') {
        if seq.final_byte == b'M' || seq.final_byte == b'm' {
            let Some(cb) = seq.param(0) else {
                return CsiAction::Ignore;
            };
            #[allow(clippy::cast_possible_truncation)]
            let cb = cb.min(255) as u8;
            let x = to_u16(seq.param(1).unwrap_or(1));
            let y = to_u16(seq.param(2).unwrap_or(1));
            return match mouse::decode_report(cb, x, y, seq.final_byte == b'm', last_button) {
                Some(ev) => CsiAction::Event(InputEvent::Mouse(ev)),
                None => CsiAction::Ignore,
            };
        }
        return CsiAction::Ignore;
    }

    // '?' and '>' lead terminal reports and protocol negotiation, none of
    // which surface as host events.
    if seq.leader.is_some() || !seq.intermediates.is_empty() {
        return CsiAction::Ignore;
    }

    match seq.final_byte {
        b'~' => match seq.param(0) {
            Some(200) => CsiAction::PasteStart,
            Some(201) => CsiAction::Ignore,
            Some(first) => match special_key(first) {
                Some(code) => key_event(code, seq, opts),
                None => CsiAction::Ignore,
            },
            None => CsiAction::Ignore,
        },
        b'u' => {
            let Some(codepoint) = seq.part(0, 0) else {
                return CsiAction::Ignore;
            };
            let modifier_param = seq.param(1);
            let event_type = seq.part(1, 1).or_else(|| seq.param(2));
            match kitty::decode(codepoint, modifier_param, event_type, opts.quirks, opts.profile) {
                Some(ev) => CsiAction::Event(InputEvent::Key(ev)),
                None => CsiAction::Ignore,
            }
        }
        b'A' => key_event(KeyCode::Up, seq, opts),
        b'B' => key_event(KeyCode::Down, seq, opts),
        b'C' => key_event(KeyCode::Right, seq, opts),
        b'D' => key_event(KeyCode::Left, seq, opts),
        b'H' => key_event(KeyCode::Home, seq, opts),
        b'F' => key_event(KeyCode::End, seq, opts),
        b'P' => key_event(KeyCode::F(1), seq, opts),
        b'Q' => key_event(KeyCode::F(2), seq, opts),
        b'S' => key_event(KeyCode::F(4), seq, opts),
        b'Z' => {
            let (mut modifiers, kind, repeat) = modifiers_and_kind(seq, opts);
            modifiers |= KeyModifiers::SHIFT;
            CsiAction::Event(InputEvent::Key(KeyEvent {
                code: KeyCode::Tab,
                modifiers,
                kind,
                repeat,
                raw: Vec::new(),
            }))
        }
        b'I' => CsiAction::Event(InputEvent::Focus { gained: true }),
        b'O' => CsiAction::Event(InputEvent::Focus { gained: false }),
        b'R' => CsiAction::Event(InputEvent::CursorReport {
            row: to_u16(seq.param(0).unwrap_or(1)),
            col: to_u16(seq.param(1).unwrap_or(1)),
        }),
        b'M' => {
            if seq.params.is_empty() {
                // X10: the coordinates are raw bytes after the final.
                CsiAction::X10Start
            } else {
                // RXVT numeric form, button offset by 32.
                let Some(cb) = seq.param(0).and_then(|v| v.checked_sub(32)) else {
                    return CsiAction::Ignore;
                };
                #[allow(clippy::cast_possible_truncation)]
                let cb = cb.min(255) as u8;
                let x = to_u16(seq.param(1).unwrap_or(1));
                let y = to_u16(seq.param(2).unwrap_or(1));
                match mouse::decode_report(cb, x, y, false, last_button) {
                    Some(ev) => CsiAction::Event(InputEvent::Mouse(ev)),
                    None => CsiAction::Ignore,
                }
            }
        }
        _ => CsiAction::Ignore,
    }
}
