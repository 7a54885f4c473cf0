//! Named output sequences.
//!
//! Every mode toggle the runtime writes, as string constants, plus the
//! couple of parameterized forms (Kitty push, OSC 52). Disable constants
//! exist for every enable so the controller can unwind in reverse order.

use std::fmt::Write;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::csi;

/// Reset all SGR attributes (SGR 0).
pub const RESET_ATTRS: &str = csi!("0m");

/// Reset the background to the terminal default (SGR 49).
pub const RESET_BG: &str = csi!("49m");

/// Hide the cursor (DECTCEM reset).
pub const HIDE_CURSOR: &str = csi!("?25l");

/// Show the cursor (DECTCEM set).
pub const SHOW_CURSOR: &str = csi!("?25h");

/// Clear the entire screen (ED 2).
pub const CLEAR_SCREEN: &str = csi!("2J");

/// Begin synchronized update (DEC 2026).
pub const BEGIN_SYNC: &str = csi!("?2026h");

/// End synchronized update.
pub const END_SYNC: &str = csi!("?2026l");

/// Enter the alternate screen buffer (DEC 1049).
pub const ENTER_ALT_SCREEN: &str = csi!("?1049h");

/// Leave the alternate screen buffer.
pub const LEAVE_ALT_SCREEN: &str = csi!("?1049l");

/// Normal mouse tracking: press and release reports (DEC 1000).
pub const ENABLE_MOUSE_TRACKING: &str = csi!("?1000h");
pub const DISABLE_MOUSE_TRACKING: &str = csi!("?1000l");

/// Button-event tracking: motion while a button is held (DEC 1002).
pub const ENABLE_MOUSE_BUTTONS: &str = csi!("?1002h");
pub const DISABLE_MOUSE_BUTTONS: &str = csi!("?1002l");

/// Any-event tracking: all motion reports (DEC 1003).
pub const ENABLE_MOUSE_ALL: &str = csi!("?1003h");
pub const DISABLE_MOUSE_ALL: &str = csi!("?1003l");

/// SGR mouse coordinates (DEC 1006).
pub const ENABLE_SGR_MOUSE: &str = csi!("?1006h");
pub const DISABLE_SGR_MOUSE: &str = csi!("?1006l");

/// Bracketed paste mode (DEC 2004).
pub const ENABLE_BRACKETED_PASTE: &str = csi!("?2004h");
pub const DISABLE_BRACKETED_PASTE: &str = csi!("?2004l");

/// Focus in/out reporting (DEC 1004).
pub const ENABLE_FOCUS_EVENTS: &str = csi!("?1004h");
pub const DISABLE_FOCUS_EVENTS: &str = csi!("?1004l");

/// Pop one level of Kitty keyboard enhancement flags.
pub const KITTY_POP: &str = csi!("<u");

/// Enable line wrapping (DECAWM).
pub const ENABLE_LINE_WRAP: &str = csi!("?7h");
pub const DISABLE_LINE_WRAP: &str = csi!("?7l");

/// Push Kitty keyboard enhancement flags: `ESC [ > flags u`.
#[must_use]
pub fn kitty_push(flags: u8) -> String {
    let mut s = String::with_capacity(8);
    let _ = write!(s, "\x1b[>{flags}u");
    s
}

/// Scroll the screen up `n` lines (SU).
#[must_use]
pub fn scroll_up(n: u16) -> String {
    let mut s = String::with_capacity(8);
    let _ = write!(s, "\x1b[{n}S");
    s
}

/// Scroll the screen down `n` lines (SD).
#[must_use]
pub fn scroll_down(n: u16) -> String {
    let mut s = String::with_capacity(8);
    let _ = write!(s, "\x1b[{n}T");
    s
}

/// OSC 52 clipboard write: `ESC ] 52 ; c ; <base64> BEL`.
#[must_use]
pub fn osc52_copy(text: &str) -> String {
    let mut s = String::from("\x1b]52;c;");
    s.push_str(&BASE64.encode(text.as_bytes()));
    s.push('\x07');
    s
}
