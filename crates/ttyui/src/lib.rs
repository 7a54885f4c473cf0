#![warn(clippy::pedantic)]

//! Low-level terminal UI runtime.
//!
//! Three coupled subsystems behind one façade:
//!
//! - [`Grid`]: a double-buffered screen of packed [`Cell`]s whose
//!   [`Grid::compute_diff`] emits the minimal escape stream for a frame;
//! - [`Decoder`]: a byte state machine turning raw terminal input into
//!   typed [`InputEvent`]s (keys, mouse, paste, focus, clipboard, resize);
//! - [`Capabilities`] and [`TerminalController`]: terminal detection, the
//!   feature support matrix, and the enable/disable protocol around them.
//!
//! The host owns the actual byte source and sink (and raw-mode handling);
//! this crate only produces and consumes bytes.

pub use ttyansi::{attr_sequence, build_sgr, color_sequence, move_to, seq};
pub use ttycaps::{
    Capabilities, CapabilityCache, CapabilityError, Env, Feature, FeatureSpec, KittyFlags,
    MouseOptions, SessionConfig, Support, TerminalController, TerminalKind, clear_cache,
    detect_cached, shared_cache,
};
pub use ttycell::{Cell, CellAttrs, Color, Style, clear_range};
pub use ttygrid::Grid;
pub use ttyinput::{
    Decoder, DecoderOptions, InputEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
    MouseButton, MouseEvent, MouseKind, QuirkProfile,
};

use tracing_subscriber::EnvFilter;

/// Install a stderr subscriber for the runtime's internal `tracing`
/// output, filtered by the `TTYUI_DEBUG` environment variable (standard
/// `RUST_LOG` syntax). Does nothing if a subscriber is already set.
pub fn init_debug_logging() {
    let filter = EnvFilter::try_from_env("TTYUI_DEBUG").unwrap_or_else(|_| EnvFilter::new("off"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
