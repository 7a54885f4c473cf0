//! Terminal identity, the feature support matrix, and the process-wide
//! capability cache.

use std::fmt::{self, Display};
use std::sync::Mutex;
use std::time::Duration;

use tracing::debug;

use crate::env::Env;
use crate::probe::{ProbeTransport, probe_kitty_keyboard};

/// Which terminal we believe we are talking to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalKind {
    Kitty,
    Ghostty,
    Iterm,
    Tmux,
    Ssh,
    Unknown,
}

impl Display for TerminalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TerminalKind::Kitty => "kitty",
            TerminalKind::Ghostty => "ghostty",
            TerminalKind::Iterm => "iTerm",
            TerminalKind::Tmux => "tmux",
            TerminalKind::Ssh => "ssh",
            TerminalKind::Unknown => "unknown terminal",
        };
        f.write_str(name)
    }
}

/// Features the controller can enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    MouseTracking,
    KittyKeyboard,
    BracketedPaste,
    FocusEvents,
    Clipboard,
}

impl Feature {
    pub const ALL: [Feature; 5] = [
        Feature::MouseTracking,
        Feature::KittyKeyboard,
        Feature::BracketedPaste,
        Feature::FocusEvents,
        Feature::Clipboard,
    ];

    fn index(self) -> usize {
        match self {
            Feature::MouseTracking => 0,
            Feature::KittyKeyboard => 1,
            Feature::BracketedPaste => 2,
            Feature::FocusEvents => 3,
            Feature::Clipboard => 4,
        }
    }
}

impl Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Feature::MouseTracking => "mouse tracking",
            Feature::KittyKeyboard => "kitty keyboard",
            Feature::BracketedPaste => "bracketed paste",
            Feature::FocusEvents => "focus events",
            Feature::Clipboard => "clipboard",
        };
        f.write_str(name)
    }
}

/// How well a feature works on the detected terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Support {
    None,
    Partial,
    Full,
}

/// Support level per feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureMatrix([Support; 5]);

impl FeatureMatrix {
    #[must_use]
    pub fn support(&self, feature: Feature) -> Support {
        self.0[feature.index()]
    }

    fn set(&mut self, feature: Feature, support: Support) {
        self.0[feature.index()] = support;
    }

    fn cap(&mut self, feature: Feature, ceiling: Support) {
        let idx = feature.index();
        self.0[idx] = self.0[idx].min(ceiling);
    }
}

/// Seed support matrix per terminal, before SSH/tmux downgrades.
fn seed_matrix(kind: TerminalKind) -> FeatureMatrix {
    use Support::{Full, None, Partial};
    // Order: mouse, kitty keyboard, bracketed paste, focus, clipboard.
    FeatureMatrix(match kind {
        TerminalKind::Kitty | TerminalKind::Ghostty => [Full, Full, Full, Full, Full],
        TerminalKind::Iterm => [Partial, None, Full, Full, Full],
        TerminalKind::Tmux => [Partial, None, Full, None, Partial],
        TerminalKind::Ssh => [Partial, None, Partial, None, None],
        TerminalKind::Unknown => [None, None, None, None, None],
    })
}

/// The detected terminal and what it can do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    pub kind: TerminalKind,
    pub version: Option<String>,
    pub features: FeatureMatrix,
    pub is_ssh: bool,
    pub is_tmux: bool,
}

impl Capabilities {
    /// Detect the terminal from the environment and seed the matrix.
    ///
    /// Identity priority: `TERM_PROGRAM`, then `TERM` substrings, then
    /// the tmux marker, then the SSH marker, then unknown.
    #[must_use]
    pub fn detect(env: &Env) -> Capabilities {
        let kind = detect_kind(env);
        let mut features = seed_matrix(kind);

        // Running through SSH caps what the outer terminal can deliver,
        // whatever it is.
        if env.ssh {
            features.cap(Feature::Clipboard, Support::Partial);
            features.set(Feature::FocusEvents, Support::None);
        }
        // Tmux swallows the kitty protocol and focus reports.
        if env.tmux || kind == TerminalKind::Tmux {
            features.set(Feature::KittyKeyboard, Support::None);
            features.set(Feature::FocusEvents, Support::None);
        }

        debug!(%kind, ssh = env.ssh, tmux = env.tmux, "detected terminal");
        Capabilities {
            kind,
            version: env.term_program_version.clone(),
            features,
            is_ssh: env.ssh,
            is_tmux: env.tmux,
        }
    }

    #[must_use]
    pub fn support(&self, feature: Feature) -> Support {
        self.features.support(feature)
    }

    /// Probe an unidentified terminal for the Kitty keyboard protocol and
    /// upgrade the matrix on success. No-op for identified terminals; the
    /// static matrix is authoritative there.
    pub fn probe_kitty<T: ProbeTransport>(&mut self, transport: &mut T, timeout: Duration) -> bool {
        if self.kind != TerminalKind::Unknown {
            return false;
        }
        let supported = probe_kitty_keyboard(transport, timeout);
        if supported {
            debug!("kitty keyboard probe succeeded");
            self.features.set(Feature::KittyKeyboard, Support::Full);
        }
        supported
    }

    /// The quirk profile the decoder should run with.
    #[must_use]
    pub fn quirk_profile(&self) -> ttyinput::QuirkProfile {
        match self.kind {
            TerminalKind::Kitty | TerminalKind::Ghostty => ttyinput::QuirkProfile::Modern,
            TerminalKind::Iterm => ttyinput::QuirkProfile::Iterm,
            _ => ttyinput::QuirkProfile::Legacy,
        }
    }
}

fn detect_kind(env: &Env) -> TerminalKind {
    if let Some(program) = &env.term_program {
        let program = program.to_ascii_lowercase();
        if program.contains("kitty") {
            return TerminalKind::Kitty;
        }
        if program.contains("ghostty") {
            return TerminalKind::Ghostty;
        }
        if program.contains("iterm") {
            return TerminalKind::Iterm;
        }
        if program.contains("tmux") {
            return TerminalKind::Tmux;
        }
    }
    if let Some(term) = &env.term {
        let term = term.to_ascii_lowercase();
        if term.contains("kitty") {
            return TerminalKind::Kitty;
        }
        if term.contains("ghostty") {
            return TerminalKind::Ghostty;
        }
        if term.contains("tmux") {
            return TerminalKind::Tmux;
        }
    }
    if env.tmux {
        return TerminalKind::Tmux;
    }
    if env.ssh {
        return TerminalKind::Ssh;
    }
    TerminalKind::Unknown
}

/// A capability slot with explicit invalidation.
///
/// The terminal is a process-global resource, so hosts normally share one
/// of these (see [`shared_cache`]); tests construct their own.
#[derive(Debug)]
pub struct CapabilityCache {
    slot: Mutex<Option<Capabilities>>,
}

impl CapabilityCache {
    #[must_use]
    pub const fn new() -> CapabilityCache {
        CapabilityCache {
            slot: Mutex::new(None),
        }
    }

    /// The cached record, detecting it on first use.
    pub fn get_or_detect(&self, env: &Env) -> Capabilities {
        let mut slot = self.slot.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        slot.get_or_insert_with(|| Capabilities::detect(env)).clone()
    }

    /// Drop the cached record so the next read re-detects.
    pub fn clear(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        *slot = None;
    }
}

impl Default for CapabilityCache {
    fn default() -> CapabilityCache {
        CapabilityCache::new()
    }
}

static SHARED: CapabilityCache = CapabilityCache::new();

/// The process-wide capability cache.
#[must_use]
pub fn shared_cache() -> &'static CapabilityCache {
    &SHARED
}

/// Detect (or reuse) the process-wide capability record from the real
/// environment.
#[must_use]
pub fn detect_cached() -> Capabilities {
    SHARED.get_or_detect(&Env::from_process())
}

/// Invalidate the process-wide capability cache. Intended for tests and
/// explicit reconfiguration.
pub fn clear_cache() {
    SHARED.clear();
}
