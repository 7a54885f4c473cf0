//! Per-terminal decoding quirks.
//!
//! Most terminals speak the protocols straight; a few need their input
//! rewritten. The table here is keyed by a coarse terminal profile chosen
//! by the capability layer. Modern terminals (Kitty, Ghostty) must pass
//! through unmodified.

use crate::event::{KeyCode, KeyModifiers};

/// Coarse terminal family for quirk selection.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuirkProfile {
    /// A terminal that implements the protocols correctly; nothing is
    /// rewritten even when quirks are enabled.
    #[default]
    Modern,
    /// iTerm2: macOS Option/Cmd conventions leak into C0 bytes and
    /// modifier scalars.
    Iterm,
    /// Conservative default for unidentified terminals: word-motion
    /// escapes are folded, everything else passes through.
    Legacy,
}

/// Control bytes that decode to key+modifier pairs instead of their plain
/// C0 meaning on some terminals.
#[must_use]
pub(crate) fn control_override(profile: QuirkProfile, byte: u8) -> Option<(KeyCode, KeyModifiers)> {
    match (profile, byte) {
        // iTerm sends these for Cmd+Backspace / Cmd+Arrow with the
        // default key bindings.
        (QuirkProfile::Iterm, 0x15) => Some((KeyCode::Backspace, KeyModifiers::META)),
        (QuirkProfile::Iterm, 0x01) => Some((KeyCode::Left, KeyModifiers::META)),
        (QuirkProfile::Iterm, 0x05) => Some((KeyCode::Right, KeyModifiers::META)),
        _ => None,
    }
}

/// `ESC b` / `ESC f` are readline word motions; on anything that is not a
/// modern protocol terminal they mean Option+Arrow.
#[must_use]
pub(crate) fn esc_letter_override(
    profile: QuirkProfile,
    byte: u8,
) -> Option<(KeyCode, KeyModifiers)> {
    if profile == QuirkProfile::Modern {
        return None;
    }
    match byte {
        b'b' => Some((KeyCode::Left, KeyModifiers::ALT)),
        b'f' => Some((KeyCode::Right, KeyModifiers::ALT)),
        _ => None,
    }
}

/// Remap deviant Kitty modifier-key scalars onto the intended keys.
///
/// Returns `None` when the standard assignment applies.
#[must_use]
pub(crate) fn remap_modifier_scalar(profile: QuirkProfile, codepoint: u32) -> Option<KeyCode> {
    match (profile, codepoint) {
        // iTerm reports the Cmd key with the hyper scalars.
        (QuirkProfile::Iterm, 57445 | 57451) => Some(KeyCode::Meta),
        _ => None,
    }
}

/// Shadow of the physically held modifier keys, fed by Kitty modifier-key
/// press/release events.
///
/// A modifier is filtered out of an event only once the shadow has
/// actually *seen* that key released; unknown keys are left alone, so the
/// shadow is inert on terminals that never report modifier keys.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ModifierShadow {
    known: KeyModifiers,
    down: KeyModifiers,
}

impl ModifierShadow {
    pub(crate) fn record(&mut self, modifier: KeyModifiers, is_down: bool) {
        self.known |= modifier;
        if is_down {
            self.down |= modifier;
        } else {
            self.down &= !modifier;
        }
    }

    /// Drop modifiers the shadow knows to be released.
    #[must_use]
    pub(crate) fn filter(&self, modifiers: KeyModifiers) -> KeyModifiers {
        modifiers & !(self.known & !self.down)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modern_profile_never_rewrites() {
        assert_eq!(control_override(QuirkProfile::Modern, 0x15), None);
        assert_eq!(esc_letter_override(QuirkProfile::Modern, b'b'), None);
        assert_eq!(remap_modifier_scalar(QuirkProfile::Modern, 57445), None);
    }

    #[test]
    fn iterm_control_bytes() {
        assert_eq!(
            control_override(QuirkProfile::Iterm, 0x15),
            Some((KeyCode::Backspace, KeyModifiers::META))
        );
        assert_eq!(
            control_override(QuirkProfile::Iterm, 0x01),
            Some((KeyCode::Left, KeyModifiers::META))
        );
        assert_eq!(
            control_override(QuirkProfile::Iterm, 0x05),
            Some((KeyCode::Right, KeyModifiers::META))
        );
        assert_eq!(control_override(QuirkProfile::Iterm, 0x02), None);
    }

    #[test]
    fn legacy_word_motion_escapes() {
        assert_eq!(
            esc_letter_override(QuirkProfile::Legacy, b'b'),
            Some((KeyCode::Left, KeyModifiers::ALT))
        );
        assert_eq!(
            esc_letter_override(QuirkProfile::Legacy, b'f'),
            Some((KeyCode::Right, KeyModifiers::ALT))
        );
        assert_eq!(esc_letter_override(QuirkProfile::Legacy, b'g'), None);
    }

    #[test]
    fn shadow_filters_only_seen_releases() {
        let mut shadow = ModifierShadow::default();
        // Nothing known: everything passes.
        assert_eq!(
            shadow.filter(KeyModifiers::CONTROL | KeyModifiers::SHIFT),
            KeyModifiers::CONTROL | KeyModifiers::SHIFT
        );

        shadow.record(KeyModifiers::CONTROL, true);
        assert_eq!(shadow.filter(KeyModifiers::CONTROL), KeyModifiers::CONTROL);

        shadow.record(KeyModifiers::CONTROL, false);
        assert_eq!(shadow.filter(KeyModifiers::CONTROL), KeyModifiers::NONE);
        // Shift was never observed; it still passes.
        assert_eq!(
            shadow.filter(KeyModifiers::SHIFT | KeyModifiers::CONTROL),
            KeyModifiers::SHIFT
        );
    }
}
