//! Typed input events.
//!
//! Everything the decoder produces is one of these. Key and mouse events
//! carry the raw bytes they were decoded from, so a host can log or echo
//! sequences it does not act on.

use std::fmt::{self, Display};

use bitflags::bitflags;

bitflags! {
    /// Pressed key modifiers.
    ///
    /// The bit positions match the wire encoding used by modified CSI
    /// sequences and the Kitty keyboard protocol: the modifier parameter
    /// is `1 + bits`.
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(transparent))]
    #[derive(Debug, PartialOrd, PartialEq, Eq, Clone, Copy, Hash, Default)]
    pub struct KeyModifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT = 0b0000_0010;
        const CONTROL = 0b0000_0100;
        const META = 0b0000_1000;
        const NONE = 0b0000_0000;
    }
}

impl KeyModifiers {
    /// Decode a wire modifier parameter (`1 + bits`; `0` and `1` both mean
    /// "none").
    #[must_use]
    pub fn from_param(param: u32) -> KeyModifiers {
        let bits = param.saturating_sub(1);
        #[allow(clippy::cast_possible_truncation)]
        KeyModifiers::from_bits_truncate((bits & 0x0F) as u8)
    }
}

/// A named key or a single character.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A character key, reported as the Unicode scalar it produced.
    Char(char),
    Enter,
    Tab,
    Escape,
    Backspace,
    Delete,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
    /// A function key, `F(1)` through `F(12)` and beyond where terminals
    /// report them.
    F(u8),
    Shift,
    Control,
    Alt,
    Meta,
    CapsLock,
    NumLock,
    ScrollLock,
}

impl KeyCode {
    /// Whether this is a modifier or lock key.
    #[must_use]
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            KeyCode::Shift
                | KeyCode::Control
                | KeyCode::Alt
                | KeyCode::Meta
                | KeyCode::CapsLock
                | KeyCode::NumLock
                | KeyCode::ScrollLock
        )
    }

    /// The modifier bit a modifier key contributes to events, if any.
    #[must_use]
    pub fn self_modifier(self) -> KeyModifiers {
        match self {
            KeyCode::Shift => KeyModifiers::SHIFT,
            KeyCode::Control => KeyModifiers::CONTROL,
            KeyCode::Alt => KeyModifiers::ALT,
            KeyCode::Meta => KeyModifiers::META,
            _ => KeyModifiers::NONE,
        }
    }
}

impl Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyCode::Char(c) => write!(f, "{c}"),
            KeyCode::F(n) => write!(f, "F{n}"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// Whether a key was pressed, auto-repeated, or released.
///
/// Only reported when the Kitty keyboard protocol delivers event types;
/// legacy input has no release notion.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEventKind {
    Press,
    Repeat,
    Release,
}

/// A keyboard event.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
    /// Present only when Kitty event-type reporting is active.
    pub kind: Option<KeyEventKind>,
    /// True for auto-repeat events.
    pub repeat: bool,
    /// The bytes this event was decoded from.
    pub raw: Vec<u8>,
}

impl KeyEvent {
    #[must_use]
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: None,
            repeat: false,
            raw: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_release(&self) -> bool {
        self.kind == Some(KeyEventKind::Release)
    }

    #[must_use]
    pub fn is_press(&self) -> bool {
        !self.is_release()
    }
}

/// A mouse button, including wheel directions.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    WheelUp,
    WheelDown,
    WheelLeft,
    WheelRight,
}

/// What the mouse did.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseKind {
    Down,
    Up,
    Drag,
    Move,
    Scroll,
}

/// A mouse event. Coordinates are 1-based, as reported by the terminal.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MouseEvent {
    pub kind: MouseKind,
    /// `None` for motion without a held button.
    pub button: Option<MouseButton>,
    pub x: u16,
    pub y: u16,
    pub modifiers: KeyModifiers,
    /// The bytes this event was decoded from.
    pub raw: Vec<u8>,
}

/// Any event the decoder (or the host's resize hook) can produce.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// Bracketed-paste content, decoded as UTF-8 (lossily).
    Paste(String),
    /// Terminal focus changed.
    Focus { gained: bool },
    /// OSC 52 clipboard content.
    Clipboard(String),
    /// New terminal dimensions. Produced by the host on SIGWINCH, not by
    /// byte input.
    Resize { rows: u16, cols: u16 },
    /// Cursor-position report (`CSI row ; col R`), 1-based.
    CursorReport { row: u16, col: u16 },
}
