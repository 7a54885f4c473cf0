//! The byte-driven decoder state machine.
//!
//! Bytes go in one at a time through [`Decoder::feed`]; typed events come
//! out of an internal queue via [`Decoder::next`]. The machine is total:
//! malformed sequences reset it silently (with a debug log) and never
//! lose bytes from subsequent valid input. Feeding a byte never allocates
//! beyond the bounded sequence buffers in steady state.

use std::collections::VecDeque;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use smallvec::{SmallVec, smallvec};
use tracing::debug;

use crate::csi::{self, CsiAction, CsiSeq, MAX_PARAMS, MAX_SUBPARAMS, PARAM_MAX, Param};
use crate::event::{InputEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton};
use crate::quirks::{self, ModifierShadow, QuirkProfile};
use crate::{c0, esc, mouse};

/// Cap on the per-sequence raw byte capture.
const RAW_CAP: usize = 256;

/// Cap on an OSC payload; larger payloads are abandoned.
const OSC_CAP: usize = 10_000;

/// Decoder construction options, normally produced by the capability
/// layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecoderOptions {
    /// The Kitty keyboard protocol is active: plain printable bytes are
    /// suppressed (the CSI-u report delivers the keystroke) and event
    /// kinds are reported.
    pub kitty_keyboard: bool,
    /// Apply the per-terminal quirk table and the physical-modifier
    /// shadow.
    pub quirks: bool,
    /// Which quirk table to apply.
    pub profile: QuirkProfile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ground,
    Escape,
    Csi,
    CsiParam,
    CsiIntermediate,
    Ss3,
    Osc,
    Dcs,
    Paste,
    /// Collecting the three X10 mouse payload bytes.
    X10Mouse,
}

/// CSI parameter accumulator with the entry and sub-parameter caps.
#[derive(Debug, Default)]
struct ParamBuf {
    list: SmallVec<[Param; MAX_PARAMS]>,
    /// Set once a cap is hit; digits are swallowed until the caps allow
    /// again.
    dropping: bool,
}

impl ParamBuf {
    fn clear(&mut self) {
        self.list.clear();
        self.dropping = false;
    }

    fn ensure_param(&mut self) {
        if self.list.is_empty() {
            self.list.push(smallvec![0]);
        }
    }

    fn digit(&mut self, d: u32) {
        if self.dropping {
            return;
        }
        self.ensure_param();
        if let Some(part) = self.list.last_mut().and_then(|p| p.last_mut()) {
            *part = part.saturating_mul(10).saturating_add(d).min(PARAM_MAX);
        }
    }

    fn next_param(&mut self) {
        self.dropping = false;
        self.ensure_param();
        if self.list.len() < MAX_PARAMS {
            self.list.push(smallvec![0]);
        } else {
            self.dropping = true;
        }
    }

    fn next_part(&mut self) {
        if self.dropping {
            return;
        }
        self.ensure_param();
        if let Some(param) = self.list.last_mut() {
            if param.len() < MAX_SUBPARAMS {
                param.push(0);
            } else {
                self.dropping = true;
            }
        }
    }
}

/// The input decoder.
#[derive(Debug)]
pub struct Decoder {
    opts: DecoderOptions,
    state: State,
    queue: VecDeque<InputEvent>,

    /// Raw bytes of the sequence being parsed, most recent [`RAW_CAP`].
    raw: Vec<u8>,

    params: ParamBuf,
    leader: Option<u8>,
    intermediates: SmallVec<[u8; 4]>,

    osc: Vec<u8>,
    osc_esc: bool,
    osc_overflow: bool,

    dcs_esc: bool,

    paste: Vec<u8>,

    utf8: [u8; 4],
    utf8_len: usize,
    utf8_need: usize,

    x10: SmallVec<[u8; 3]>,

    last_button: Option<MouseButton>,
    shadow: ModifierShadow,
}

impl Decoder {
    #[must_use]
    pub fn new(opts: DecoderOptions) -> Decoder {
        Decoder {
            opts,
            state: State::Ground,
            queue: VecDeque::new(),
            raw: Vec::new(),
            params: ParamBuf::default(),
            leader: None,
            intermediates: SmallVec::new(),
            osc: Vec::new(),
            osc_esc: false,
            osc_overflow: false,
            dcs_esc: false,
            paste: Vec::new(),
            utf8: [0; 4],
            utf8_len: 0,
            utf8_need: 0,
            x10: SmallVec::new(),
            last_button: None,
            shadow: ModifierShadow::default(),
        }
    }

    /// Decode a complete buffer with a throwaway decoder and collect the
    /// events, resolving a trailing lone ESC.
    #[must_use]
    pub fn decode_buffer(input: &[u8], opts: DecoderOptions) -> Vec<InputEvent> {
        let mut decoder = Decoder::new(opts);
        decoder.feed(input);
        decoder.idle();
        let mut events = Vec::with_capacity(decoder.pending());
        while let Some(event) = decoder.next() {
            events.push(event);
        }
        events
    }

    /// Consume a chunk of input. Zero or more events may be enqueued;
    /// partial sequences stay buffered for the next chunk.
    pub fn feed(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.push_byte(b);
        }
    }

    /// Pop the oldest decoded event.
    pub fn next(&mut self) -> Option<InputEvent> {
        self.queue.pop_front()
    }

    /// Whether any decoded events are waiting.
    #[must_use]
    pub fn has_events(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Number of decoded events waiting.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Drop all decoded events. Partial sequence state is kept; a
    /// cancelled read must not corrupt the byte stream.
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Enqueue a resize event on behalf of the host's SIGWINCH handler,
    /// keeping event ordering in one place.
    pub fn enqueue_resize(&mut self, rows: u16, cols: u16) {
        self.queue.push_back(InputEvent::Resize { rows, cols });
    }

    /// Resolve a pending escape when input has gone quiet: a lone ESC
    /// becomes the Escape key. Other partial sequences stay buffered.
    /// Returns true if an event was emitted.
    pub fn idle(&mut self) -> bool {
        if self.state == State::Escape {
            self.state = State::Ground;
            self.raw.clear();
            self.emit_key(KeyEvent {
                code: KeyCode::Escape,
                modifiers: KeyModifiers::NONE,
                kind: None,
                repeat: false,
                raw: vec![0x1B],
            });
            return true;
        }
        false
    }

    // ─── byte pump ──────────────────────────────────────────────────────

    fn push_byte(&mut self, b: u8) {
        if self.state != State::Ground {
            self.capture_raw(b);
        }
        match self.state {
            State::Ground => self.ground_byte(b),
            State::Escape => self.escape_byte(b),
            State::Csi | State::CsiParam | State::CsiIntermediate => self.csi_byte(b),
            State::Ss3 => self.ss3_byte(b),
            State::Osc => self.osc_byte(b),
            State::Dcs => self.dcs_byte(b),
            State::Paste => self.paste_byte(b),
            State::X10Mouse => self.x10_byte(b),
        }
    }

    fn capture_raw(&mut self, b: u8) {
        if self.raw.len() >= RAW_CAP {
            self.raw.remove(0);
        }
        self.raw.push(b);
    }

    fn reset_seq(&mut self) {
        self.state = State::Ground;
        self.raw.clear();
        self.params.clear();
        self.leader = None;
        self.intermediates.clear();
        self.osc.clear();
        self.osc_esc = false;
        self.osc_overflow = false;
        self.dcs_esc = false;
        self.x10.clear();
    }

    fn enter_escape(&mut self) {
        self.reset_seq();
        self.state = State::Escape;
        self.raw.push(0x1B);
    }

    // ─── ground ─────────────────────────────────────────────────────────

    fn ground_byte(&mut self, b: u8) {
        if self.utf8_need > 0 {
            if b & 0xC0 == 0x80 {
                self.utf8[self.utf8_len] = b;
                self.utf8_len += 1;
                if self.utf8_len == self.utf8_need {
                    let len = self.utf8_len;
                    let bytes = self.utf8;
                    self.utf8_need = 0;
                    self.utf8_len = 0;
                    if let Ok(s) = std::str::from_utf8(&bytes[..len])
                        && let Some(ch) = s.chars().next()
                    {
                        self.emit_char(ch, &bytes[..len]);
                    }
                }
                return;
            }
            // Broken continuation: drop the partial scalar, reprocess the
            // byte on its own.
            debug!(byte = b, "dropping incomplete utf-8 sequence");
            self.utf8_need = 0;
            self.utf8_len = 0;
        }

        match b {
            0x1B => self.enter_escape(),
            0x00..=0x1F | 0x7F => self.emit_control(b),
            0x20..=0x7E => self.emit_char(b as char, &[b]),
            _ => {
                let need = match b {
                    0xC0..=0xDF => 2,
                    0xE0..=0xEF => 3,
                    0xF0..=0xF7 => 4,
                    _ => {
                        debug!(byte = b, "dropping invalid utf-8 start byte");
                        return;
                    }
                };
                self.utf8[0] = b;
                self.utf8_len = 1;
                self.utf8_need = need;
            }
        }
    }

    fn emit_control(&mut self, b: u8) {
        if self.opts.quirks
            && let Some((code, modifiers)) = quirks::control_override(self.opts.profile, b)
        {
            self.emit_key(KeyEvent {
                code,
                modifiers,
                kind: None,
                repeat: false,
                raw: vec![b],
            });
            return;
        }
        match c0::decode(b) {
            Some((code, modifiers)) => self.emit_key(KeyEvent {
                code,
                modifiers,
                kind: None,
                repeat: false,
                raw: vec![b],
            }),
            None => debug!(byte = b, "unmapped control byte"),
        }
    }

    fn emit_char(&mut self, ch: char, raw: &[u8]) {
        // With the Kitty protocol active every keystroke arrives as a
        // CSI-u report; the plain byte would double it.
        if self.opts.kitty_keyboard {
            return;
        }
        self.emit_key(KeyEvent {
            code: KeyCode::Char(ch),
            modifiers: KeyModifiers::NONE,
            kind: None,
            repeat: false,
            raw: raw.to_vec(),
        });
    }

    // ─── escape ─────────────────────────────────────────────────────────

    fn escape_byte(&mut self, b: u8) {
        match b {
            b'[' => {
                self.state = State::Csi;
                self.params.clear();
                self.leader = None;
                self.intermediates.clear();
            }
            b'O' => self.state = State::Ss3,
            b']' => {
                self.state = State::Osc;
                self.osc.clear();
                self.osc_esc = false;
                self.osc_overflow = false;
            }
            b'P' => {
                self.state = State::Dcs;
                self.dcs_esc = false;
            }
            0x1B => {
                // ESC ESC: the first one was the Escape key.
                self.emit_key(KeyEvent {
                    code: KeyCode::Escape,
                    modifiers: KeyModifiers::NONE,
                    kind: None,
                    repeat: false,
                    raw: vec![0x1B],
                });
                self.raw.clear();
                self.raw.push(0x1B);
            }
            _ => {
                let raw = std::mem::take(&mut self.raw);
                self.state = State::Ground;
                match esc::decode(b, self.opts.quirks, self.opts.profile) {
                    Some((code, modifiers)) => self.emit_key(KeyEvent {
                        code,
                        modifiers,
                        kind: None,
                        repeat: false,
                        raw,
                    }),
                    None => debug!(byte = b, "unrecognized escape pair"),
                }
            }
        }
    }

    // ─── csi ────────────────────────────────────────────────────────────

    fn csi_byte(&mut self, b: u8) {
        match b {
            b'0'..=b'9' if self.state != State::CsiIntermediate => {
                self.params.digit(u32::from(b - b'0'));
                self.state = State::CsiParam;
            }
            b';' if self.state != State::CsiIntermediate => {
                self.params.next_param();
                self.state = State::CsiParam;
            }
            b':' if self.state != State::CsiIntermediate => {
                self.params.next_part();
                self.state = State::CsiParam;
            }
            b'<' | b'=' | b'>' | b'?' if self.state == State::Csi && self.leader.is_none() => {
                self.leader = Some(b);
            }
            0x20..=0x2F => {
                if self.intermediates.len() < self.intermediates.capacity() {
                    self.intermediates.push(b);
                }
                self.state = State::CsiIntermediate;
            }
            0x40..=0x7E => self.dispatch_csi(b),
            0x1B => self.enter_escape(),
            _ => {
                debug!(byte = b, "malformed csi byte, resetting");
                self.reset_seq();
            }
        }
    }

    fn dispatch_csi(&mut self, final_byte: u8) {
        let seq = CsiSeq {
            leader: self.leader,
            params: &self.params.list,
            intermediates: &self.intermediates,
            final_byte,
        };
        let action = csi::dispatch(&seq, &self.opts, &mut self.last_button);
        let raw = std::mem::take(&mut self.raw);
        match action {
            CsiAction::Event(event) => {
                self.reset_seq();
                self.emit_with_raw(event, raw);
            }
            CsiAction::PasteStart => {
                self.reset_seq();
                self.paste.clear();
                self.state = State::Paste;
            }
            CsiAction::X10Start => {
                self.reset_seq();
                self.x10.clear();
                self.state = State::X10Mouse;
            }
            CsiAction::Ignore => {
                debug!(final_byte, "dropping unrecognized csi sequence");
                self.reset_seq();
            }
        }
    }

    // ─── ss3 ────────────────────────────────────────────────────────────

    fn ss3_byte(&mut self, b: u8) {
        let raw = std::mem::take(&mut self.raw);
        self.reset_seq();
        let code = match b {
            b'A' => Some(KeyCode::Up),
            b'B' => Some(KeyCode::Down),
            b'C' => Some(KeyCode::Right),
            b'D' => Some(KeyCode::Left),
            b'H' => Some(KeyCode::Home),
            b'F' => Some(KeyCode::End),
            b'P' => Some(KeyCode::F(1)),
            b'Q' => Some(KeyCode::F(2)),
            b'R' => Some(KeyCode::F(3)),
            b'S' => Some(KeyCode::F(4)),
            // Application-mode keypad.
            b'M' => Some(KeyCode::Enter),
            b'j' => Some(KeyCode::Char('*')),
            b'k' => Some(KeyCode::Char('+')),
            b'm' => Some(KeyCode::Char('-')),
            b'n' => Some(KeyCode::Char('.')),
            b'o' => Some(KeyCode::Char('/')),
            v @ b'p'..=b'y' => Some(KeyCode::Char((v - b'p' + b'0') as char)),
            _ => None,
        };
        match code {
            Some(code) => self.emit_key(KeyEvent {
                code,
                modifiers: KeyModifiers::NONE,
                kind: None,
                repeat: false,
                raw,
            }),
            None => debug!(byte = b, "unrecognized ss3 sequence"),
        }
    }

    // ─── osc ────────────────────────────────────────────────────────────

    fn osc_byte(&mut self, b: u8) {
        if self.osc_esc {
            self.osc_esc = false;
            if b == b'\\' {
                self.finish_osc();
                return;
            }
            // The ESC belonged to the payload after all; both bytes do.
            self.push_osc(0x1B);
        }
        match b {
            0x07 => self.finish_osc(),
            0x1B => self.osc_esc = true,
            _ => self.push_osc(b),
        }
    }

    fn push_osc(&mut self, b: u8) {
        if self.osc_overflow {
            return;
        }
        if self.osc.len() >= OSC_CAP {
            debug!("osc payload over cap, abandoning");
            self.osc.clear();
            self.osc_overflow = true;
            return;
        }
        self.osc.push(b);
    }

    fn finish_osc(&mut self) {
        let payload = std::mem::take(&mut self.osc);
        let overflow = self.osc_overflow;
        self.reset_seq();
        if overflow {
            return;
        }
        if let Some(event) = parse_osc(&payload) {
            self.queue.push_back(event);
        }
    }

    // ─── dcs ────────────────────────────────────────────────────────────

    fn dcs_byte(&mut self, b: u8) {
        // Device control strings are consumed and dropped; nothing in the
        // event vocabulary comes in over DCS.
        if self.dcs_esc && b == b'\\' {
            self.reset_seq();
            return;
        }
        self.dcs_esc = b == 0x1B;
    }

    // ─── paste ──────────────────────────────────────────────────────────

    fn paste_byte(&mut self, b: u8) {
        const TERMINATOR: &[u8] = b"\x1b[201~";
        self.paste.push(b);
        if self.paste.ends_with(TERMINATOR) {
            let content_len = self.paste.len() - TERMINATOR.len();
            let content = String::from_utf8_lossy(&self.paste[..content_len]).into_owned();
            self.paste.clear();
            self.reset_seq();
            self.queue.push_back(InputEvent::Paste(content));
        }
    }

    // ─── x10 mouse ──────────────────────────────────────────────────────

    fn x10_byte(&mut self, b: u8) {
        self.x10.push(b);
        if self.x10.len() == 3 {
            let bytes = [self.x10[0], self.x10[1], self.x10[2]];
            let raw = std::mem::take(&mut self.raw);
            self.reset_seq();
            match mouse::decode_x10(&bytes, &mut self.last_button) {
                Some(ev) => self.emit_with_raw(InputEvent::Mouse(ev), raw),
                None => debug!("malformed x10 mouse payload"),
            }
        }
    }

    // ─── emission ───────────────────────────────────────────────────────

    fn emit_key(&mut self, event: KeyEvent) {
        self.emit_with_raw(InputEvent::Key(event), Vec::new());
    }

    fn emit_with_raw(&mut self, mut event: InputEvent, raw: Vec<u8>) {
        match &mut event {
            InputEvent::Key(key) => {
                if !raw.is_empty() {
                    key.raw = raw;
                }
                if key.code.is_modifier()
                    && let Some(kind) = key.kind
                {
                    self.shadow
                        .record(key.code.self_modifier(), kind != KeyEventKind::Release);
                }
                if self.opts.quirks {
                    key.modifiers = self.shadow.filter(key.modifiers);
                }
            }
            InputEvent::Mouse(mouse) => {
                if !raw.is_empty() {
                    mouse.raw = raw;
                }
                if self.opts.quirks {
                    mouse.modifiers = self.shadow.filter(mouse.modifiers);
                }
            }
            _ => {}
        }
        self.queue.push_back(event);
    }
}

/// Parse a finished OSC payload. Only OSC 52 with the clipboard selection
/// produces an event.
fn parse_osc(payload: &[u8]) -> Option<InputEvent> {
    let mut parts = payload.splitn(3, |&b| b == b';');
    let number = atoi_simd::parse::<u32>(parts.next()?).ok()?;
    if number != 52 {
        return None;
    }
    let selection = parts.next()?;
    if !selection.contains(&b'c') {
        return None;
    }
    let data = parts.next()?;
    let decoded = BASE64.decode(data).ok()?;
    Some(InputEvent::Clipboard(
        String::from_utf8_lossy(&decoded).into_owned(),
    ))
}
