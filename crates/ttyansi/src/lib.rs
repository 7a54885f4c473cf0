#![warn(clippy::pedantic)]

//! ANSI escape-sequence emission.
//!
//! Pure functions (plus one precomputed table) that turn attribute bytes,
//! colors and cursor motions into escape text, and named constants for
//! every mode toggle the runtime writes. Nothing here tracks state; the
//! diff renderer decides *when* to emit, this crate only knows *what* the
//! bytes are.

pub mod attr;
pub mod color;
pub mod cursor;
mod macros;
pub mod seq;

pub use attr::{attr_sequence, build_sgr};
pub use color::{color_sequence, raw_color_sequence};
pub use cursor::{move_down, move_left, move_right, move_to, move_up};
pub use seq::*;
