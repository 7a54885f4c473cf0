//! The one synchronous probe: Kitty keyboard support.
//!
//! Writes `CSI ? u` and waits briefly for the `CSI ? <flags> u` report.
//! Requires temporarily raw stdin, which is the host's problem; this
//! module only speaks bytes over a transport.

use std::io;
use std::time::{Duration, Instant};

use tracing::debug;

/// Default deadline for a probe round trip.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(200);

/// Byte transport for probes. Implemented over raw stdin/stdout by hosts,
/// and by in-memory fakes in tests.
pub trait ProbeTransport {
    /// Write bytes to the terminal.
    ///
    /// # Errors
    ///
    /// Propagates sink errors; a failed send aborts the probe.
    fn send(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// The next input byte, or `None` once `deadline` has passed with
    /// nothing arriving.
    ///
    /// # Errors
    ///
    /// Propagates source errors; a failed read aborts the probe.
    fn recv_deadline(&mut self, deadline: Instant) -> io::Result<Option<u8>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchState {
    Esc,
    Bracket,
    Question,
    Digits { seen_digit: bool },
}

/// Ask the terminal whether it speaks the Kitty keyboard protocol.
///
/// Anything other than a well-formed `ESC [ ? <digits> [; <digits>…] u`
/// report inside the deadline is a negative answer.
pub fn probe_kitty_keyboard<T: ProbeTransport>(transport: &mut T, timeout: Duration) -> bool {
    if let Err(err) = transport.send(b"\x1b[?u") {
        debug!(%err, "kitty probe send failed");
        return false;
    }

    let deadline = Instant::now() + timeout;
    let mut state = MatchState::Esc;
    loop {
        let byte = match transport.recv_deadline(deadline) {
            Ok(Some(b)) => b,
            Ok(None) => {
                debug!("kitty probe timed out");
                return false;
            }
            Err(err) => {
                debug!(%err, "kitty probe read failed");
                return false;
            }
        };
        state = match (state, byte) {
            (MatchState::Esc, 0x1B) => MatchState::Bracket,
            (MatchState::Bracket, b'[') => MatchState::Question,
            (MatchState::Question, b'?') => MatchState::Digits { seen_digit: false },
            (MatchState::Digits { .. }, b'0'..=b'9') => MatchState::Digits { seen_digit: true },
            (MatchState::Digits { seen_digit: true }, b';') => {
                MatchState::Digits { seen_digit: false }
            }
            (MatchState::Digits { seen_digit: true }, b'u') => return true,
            _ => {
                debug!(byte, "unexpected byte in kitty probe response");
                return false;
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeTransport {
        response: Vec<u8>,
        pos: usize,
        sent: Vec<u8>,
    }

    impl FakeTransport {
        fn new(response: &[u8]) -> FakeTransport {
            FakeTransport {
                response: response.to_vec(),
                pos: 0,
                sent: Vec::new(),
            }
        }
    }

    impl ProbeTransport for FakeTransport {
        fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
            self.sent.extend_from_slice(bytes);
            Ok(())
        }

        fn recv_deadline(&mut self, _deadline: Instant) -> io::Result<Option<u8>> {
            if self.pos < self.response.len() {
                let b = self.response[self.pos];
                self.pos += 1;
                Ok(Some(b))
            } else {
                Ok(None)
            }
        }
    }

    #[test]
    fn sends_the_query() {
        let mut t = FakeTransport::new(b"");
        probe_kitty_keyboard(&mut t, DEFAULT_PROBE_TIMEOUT);
        assert_eq!(t.sent, b"\x1b[?u");
    }

    #[test]
    fn accepts_flag_report() {
        let mut t = FakeTransport::new(b"\x1b[?1u");
        assert!(probe_kitty_keyboard(&mut t, DEFAULT_PROBE_TIMEOUT));
    }

    #[test]
    fn accepts_multi_parameter_report() {
        let mut t = FakeTransport::new(b"\x1b[?31;2u");
        assert!(probe_kitty_keyboard(&mut t, DEFAULT_PROBE_TIMEOUT));
    }

    #[test]
    fn rejects_silence() {
        let mut t = FakeTransport::new(b"");
        assert!(!probe_kitty_keyboard(&mut t, DEFAULT_PROBE_TIMEOUT));
    }

    #[test]
    fn rejects_garbage() {
        let mut t = FakeTransport::new(b"hello");
        assert!(!probe_kitty_keyboard(&mut t, DEFAULT_PROBE_TIMEOUT));
    }

    #[test]
    fn rejects_bare_query_echo() {
        // `CSI ? u` with no digits is the query, not a report.
        let mut t = FakeTransport::new(b"\x1b[?u");
        assert!(!probe_kitty_keyboard(&mut t, DEFAULT_PROBE_TIMEOUT));
    }
}
