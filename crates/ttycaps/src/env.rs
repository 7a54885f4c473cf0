//! The slice of the process environment the detector reads.

/// Environment fields consumed by capability detection. Constructed from
/// the real process environment with [`Env::from_process`], or literally
/// in tests.
#[derive(Debug, Clone, Default)]
pub struct Env {
    pub term: Option<String>,
    pub term_program: Option<String>,
    pub term_program_version: Option<String>,
    /// `SSH_CONNECTION` is set.
    pub ssh: bool,
    /// `TMUX` is set.
    pub tmux: bool,
}

impl Env {
    /// Snapshot the real process environment.
    #[must_use]
    pub fn from_process() -> Env {
        Env {
            term: std::env::var("TERM").ok(),
            term_program: std::env::var("TERM_PROGRAM").ok(),
            term_program_version: std::env::var("TERM_PROGRAM_VERSION").ok(),
            ssh: std::env::var_os("SSH_CONNECTION").is_some_and(|v| !v.is_empty()),
            tmux: std::env::var_os("TMUX").is_some_and(|v| !v.is_empty()),
        }
    }
}
