#![warn(clippy::pedantic)]

//! Terminal capability detection and feature control.
//!
//! Runs once at startup (and on explicit reconfigure): sniff the
//! environment for the terminal's identity, seed the feature support
//! matrix, optionally probe for the Kitty keyboard protocol, then write
//! the enable sequences for the features the host asked for. On shutdown
//! the disable sequences go out in reverse order.

pub mod caps;
pub mod controller;
pub mod env;
pub mod probe;

pub use caps::{
    Capabilities, CapabilityCache, Feature, Support, TerminalKind, clear_cache, detect_cached,
    shared_cache,
};
pub use controller::{
    CapabilityError, FeatureSpec, KittyFlags, MouseOptions, SessionConfig, TerminalController,
};
pub use env::Env;
pub use probe::{DEFAULT_PROBE_TIMEOUT, ProbeTransport, probe_kitty_keyboard};
