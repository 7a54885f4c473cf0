#![warn(clippy::pedantic)]

//! Byte-level terminal input decoding.
//!
//! [`Decoder::feed`] consumes raw bytes from the terminal (interleaved
//! UTF-8 text, C0 controls, CSI/SS3/OSC/DCS sequences, mouse reports,
//! bracketed paste and Kitty keyboard reports) and queues typed
//! [`InputEvent`]s for the host to pop with [`Decoder::next`].

mod c0;
mod csi;
mod esc;
pub mod event;
mod kitty;
mod mouse;
pub mod parser;
mod quirks;

pub use event::{
    InputEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseKind,
};
pub use parser::{Decoder, DecoderOptions};
pub use quirks::QuirkProfile;
