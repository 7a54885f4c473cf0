#![warn(clippy::pedantic)]

//! Packed screen cells and the 16-bit color codec.
//!
//! A [`Cell`] is two 32-bit words: the first carries the Unicode scalar and
//! the attribute byte, the second carries the encoded foreground and
//! background colors. Packing and unpacking are total; there is no invalid
//! `Cell`.

pub mod cell;
pub mod color;

pub use cell::{Cell, CellAttrs, Style, clear_range};
pub use color::{COLOR_DEFAULT, Color, PALETTE_BASE, RGB_BASE, decode_color, encode_color};
