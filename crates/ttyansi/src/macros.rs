/// Concatenate string literals while prepending an ANSI control sequence
/// introducer (`"\x1b["`).
#[macro_export]
macro_rules! csi {
    ($( $l:expr ),*) => { concat!("\x1B[", $( $l ),*) };
}

/// Concatenate string literals while prepending an xterm Operating System
/// Command (OSC) introducer (`"\x1b]"`) and appending a BEL (`"\x07"`).
#[macro_export]
macro_rules! osc {
    ($( $l:expr ),*) => { concat!("\x1B]", $( $l ),*, "\x07") };
}
