//! Feature enablement and teardown.
//!
//! The controller is the sole writer of enable/disable sequences. It
//! applies a [`SessionConfig`] against the detected capabilities, records
//! what it turned on, and unwinds in reverse order on [`reset`]
//! (idempotently, so signal-triggered cleanup can call it again).
//!
//! [`reset`]: TerminalController::reset

use std::io::{self, Write};

use bitflags::bitflags;
use thiserror::Error;
use tracing::{debug, warn};

use ttyansi::seq;
use ttyinput::DecoderOptions;

use crate::caps::{Capabilities, Feature, Support, TerminalKind};

bitflags! {
    /// Kitty keyboard progressive-enhancement flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct KittyFlags: u8 {
        const DISAMBIGUATE_ESCAPES = 0b0000_0001;
        const REPORT_EVENT_TYPES = 0b0000_0010;
        const REPORT_ALTERNATE_KEYS = 0b0000_0100;
        const REPORT_ALL_KEYS_AS_ESCAPE_CODES = 0b0000_1000;
        const REPORT_ASSOCIATED_TEXT = 0b0001_0000;
    }
}

impl Default for KittyFlags {
    fn default() -> KittyFlags {
        KittyFlags::DISAMBIGUATE_ESCAPES
            | KittyFlags::REPORT_EVENT_TYPES
            | KittyFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
    }
}

/// One feature's request: whether to enable it, whether failure to do so
/// is fatal, and any feature-specific options.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureSpec<O = ()> {
    pub enabled: bool,
    pub required: bool,
    pub options: O,
}

impl<O: Default> FeatureSpec<O> {
    /// Enabled, not required.
    #[must_use]
    pub fn on() -> FeatureSpec<O> {
        FeatureSpec {
            enabled: true,
            required: false,
            options: O::default(),
        }
    }

    /// Enabled and required: unsupported terminals fail initialization.
    #[must_use]
    pub fn required() -> FeatureSpec<O> {
        FeatureSpec {
            enabled: true,
            required: true,
            options: O::default(),
        }
    }
}

/// Mouse tracking options.
#[derive(Debug, Clone, Copy)]
pub struct MouseOptions {
    /// Report all motion, not just button events. Needs full support;
    /// partially supported terminals stay at button tracking.
    pub any_motion: bool,
    /// Use SGR coordinates.
    pub sgr: bool,
}

impl Default for MouseOptions {
    fn default() -> MouseOptions {
        MouseOptions {
            any_motion: false,
            sgr: true,
        }
    }
}

/// The host's feature configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionConfig {
    pub mouse: FeatureSpec<MouseOptions>,
    pub kitty_keyboard: FeatureSpec<KittyFlags>,
    pub bracketed_paste: FeatureSpec,
    pub focus_events: FeatureSpec,
    pub clipboard: FeatureSpec,
}

/// The only error the runtime surfaces at initialization.
#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("required feature \"{feature}\" is not supported on {terminal}")]
    Unsupported {
        feature: Feature,
        terminal: TerminalKind,
    },
    #[error("failed to write terminal control sequence")]
    Io(#[from] io::Error),
}

/// Owns the byte sink for mode changes and tracks what is enabled.
#[derive(Debug)]
pub struct TerminalController<W: Write> {
    sink: W,
    caps: Capabilities,
    active: Vec<Feature>,
}

impl<W: Write> TerminalController<W> {
    pub fn new(sink: W, caps: Capabilities) -> TerminalController<W> {
        TerminalController {
            sink,
            caps,
            active: Vec::new(),
        }
    }

    #[must_use]
    pub fn caps(&self) -> &Capabilities {
        &self.caps
    }

    /// Features currently enabled, in enablement order.
    #[must_use]
    pub fn active(&self) -> &[Feature] {
        &self.active
    }

    /// Apply a session configuration: write the enable sequence for every
    /// requested feature the terminal supports.
    ///
    /// # Errors
    ///
    /// [`CapabilityError::Unsupported`] when a `required` feature has no
    /// support on the detected terminal; [`CapabilityError::Io`] when the
    /// sink fails.
    pub fn apply(&mut self, config: &SessionConfig) -> Result<(), CapabilityError> {
        if config.mouse.enabled
            && let Some(support) = self.check(Feature::MouseTracking, config.mouse.required)?
        {
            self.sink.write_all(seq::ENABLE_MOUSE_TRACKING.as_bytes())?;
            self.sink.write_all(seq::ENABLE_MOUSE_BUTTONS.as_bytes())?;
            if config.mouse.options.any_motion && support == Support::Full {
                self.sink.write_all(seq::ENABLE_MOUSE_ALL.as_bytes())?;
            }
            if config.mouse.options.sgr {
                self.sink.write_all(seq::ENABLE_SGR_MOUSE.as_bytes())?;
            }
            self.active.push(Feature::MouseTracking);
        }

        if config.kitty_keyboard.enabled
            && self
                .check(Feature::KittyKeyboard, config.kitty_keyboard.required)?
                .is_some()
        {
            let flags = config.kitty_keyboard.options.bits();
            self.sink.write_all(seq::kitty_push(flags).as_bytes())?;
            self.active.push(Feature::KittyKeyboard);
        }

        if config.bracketed_paste.enabled
            && self
                .check(Feature::BracketedPaste, config.bracketed_paste.required)?
                .is_some()
        {
            self.sink.write_all(seq::ENABLE_BRACKETED_PASTE.as_bytes())?;
            self.active.push(Feature::BracketedPaste);
        }

        if config.focus_events.enabled
            && self
                .check(Feature::FocusEvents, config.focus_events.required)?
                .is_some()
        {
            self.sink.write_all(seq::ENABLE_FOCUS_EVENTS.as_bytes())?;
            self.active.push(Feature::FocusEvents);
        }

        // The clipboard has no enable sequence; the capability only gates
        // the OSC 52 helper.
        if config.clipboard.enabled
            && self
                .check(Feature::Clipboard, config.clipboard.required)?
                .is_some()
        {
            self.active.push(Feature::Clipboard);
        }

        self.sink.flush()?;
        Ok(())
    }

    /// Support level if the feature is usable, `None` if it should be
    /// skipped, an error if it was required.
    fn check(
        &self,
        feature: Feature,
        required: bool,
    ) -> Result<Option<Support>, CapabilityError> {
        match self.caps.support(feature) {
            Support::None if required => Err(CapabilityError::Unsupported {
                feature,
                terminal: self.caps.kind,
            }),
            Support::None => {
                debug!(%feature, terminal = %self.caps.kind, "skipping unsupported feature");
                Ok(None)
            }
            support => Ok(Some(support)),
        }
    }

    /// Disable everything [`apply`](Self::apply) enabled, in reverse
    /// order. Idempotent and safe to call from cleanup paths: sink errors
    /// are logged and the remaining disables still go out.
    pub fn reset(&mut self) {
        for feature in std::mem::take(&mut self.active).into_iter().rev() {
            let sequences: &[&str] = match feature {
                Feature::MouseTracking => &[
                    seq::DISABLE_SGR_MOUSE,
                    seq::DISABLE_MOUSE_ALL,
                    seq::DISABLE_MOUSE_BUTTONS,
                    seq::DISABLE_MOUSE_TRACKING,
                ],
                Feature::KittyKeyboard => &[seq::KITTY_POP],
                Feature::BracketedPaste => &[seq::DISABLE_BRACKETED_PASTE],
                Feature::FocusEvents => &[seq::DISABLE_FOCUS_EVENTS],
                Feature::Clipboard => &[],
            };
            for s in sequences {
                if let Err(err) = self.sink.write_all(s.as_bytes()) {
                    warn!(%feature, %err, "failed to write disable sequence");
                }
            }
        }
        if let Err(err) = self.sink.flush() {
            warn!(%err, "failed to flush disable sequences");
        }
    }

    /// Decoder configuration matching what is currently enabled.
    #[must_use]
    pub fn decoder_options(&self) -> DecoderOptions {
        DecoderOptions {
            kitty_keyboard: self.active.contains(&Feature::KittyKeyboard),
            quirks: true,
            profile: self.caps.quirk_profile(),
        }
    }

    /// Give the sink back (for hosts that own stdout elsewhere).
    pub fn into_inner(self) -> W {
        self.sink
    }
}
