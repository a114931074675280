//! The control core's model of one remote on/off power relay.
//!
//! A [`Relay`] wraps the plug's network identity and the last state this
//! controller believes to be true. The remote is the source of truth: both
//! [`probe`](Relay::probe) and [`command`](Relay::command) record the state
//! the plug *reports*, never the state that was requested — a command that
//! is accepted but answered with a different state is reflected faithfully.
//!
//! ## Flag lifecycle
//!
//! - `enabled` starts false and is set at most once, by the first
//!   successful discovery probe. A relay that never answers stays disabled
//!   for the process lifetime and is excluded from control and display.
//! - `error` tracks only post-discovery command/query failures: set on a
//!   failed [`command`](Relay::command), cleared by the next success.
//!   Probe failures are reported to the caller instead — discovery has its
//!   own fatal-halt handling.

use log::{debug, warn};

use crate::app::ports::RelayTransport;
use crate::error::RelayError;

/// One remote plug and the controller's view of it.
#[derive(Debug)]
pub struct Relay {
    /// Display name ("left"/"right").
    pub name: &'static str,
    /// Plug host address (IP or hostname), opaque to the core.
    pub addr: heapless::String<48>,
    /// Last state the remote reported (`is_on`).
    pub commanded_state: bool,
    /// True once discovery succeeded; never cleared.
    pub enabled: bool,
    /// True iff the most recent post-discovery interaction failed.
    pub error: bool,
}

impl Relay {
    pub fn new(name: &'static str, addr: heapless::String<48>) -> Self {
        Self {
            name,
            addr,
            commanded_state: false,
            enabled: false,
            error: false,
        }
    }

    /// Discovery query: asks the plug for its current state.
    ///
    /// On success the relay becomes enabled and mirrors the reported state.
    /// On failure `enabled` is left as-is and `error` is *not* raised; the
    /// caller decides whether an undiscovered relay is fatal.
    pub fn probe(&mut self, transport: &mut impl RelayTransport) -> Result<bool, RelayError> {
        let reported = transport.query(&self.addr)?;
        self.enabled = true;
        self.error = false;
        self.commanded_state = reported;
        debug!("relay {}: discovered, reports {}", self.name, on_off(reported));
        Ok(reported)
    }

    /// Send an on/off request and record the state the plug reports back.
    ///
    /// On failure the error flag is raised and `commanded_state` is left
    /// unchanged — the last known state is assumed to hold until a later
    /// call confirms otherwise.
    pub fn command(
        &mut self,
        transport: &mut impl RelayTransport,
        desired: bool,
    ) -> Result<bool, RelayError> {
        debug!("relay {}: turning {}", self.name, on_off(desired));
        match transport.set(&self.addr, desired) {
            Ok(reported) => {
                self.error = false;
                self.commanded_state = reported;
                if reported != desired {
                    warn!(
                        "relay {}: requested {} but plug reports {}",
                        self.name,
                        on_off(desired),
                        on_off(reported)
                    );
                }
                Ok(reported)
            }
            Err(e) => {
                self.error = true;
                warn!("relay {}: command failed: {e}", self.name);
                Err(e)
            }
        }
    }

    /// Display string for the relay's state: `"on"`, `"off"`, or `"--"`
    /// when the relay was never discovered.
    pub fn state_text(&self) -> &'static str {
        if !self.enabled {
            "--"
        } else {
            on_off(self.commanded_state)
        }
    }
}

fn on_off(on: bool) -> &'static str {
    if on {
        "on"
    } else {
        "off"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scriptable transport: pops one pre-programmed reply per call.
    struct ScriptTransport {
        replies: Vec<Result<bool, RelayError>>,
    }

    impl ScriptTransport {
        fn new(mut replies: Vec<Result<bool, RelayError>>) -> Self {
            replies.reverse();
            Self { replies }
        }
    }

    impl RelayTransport for ScriptTransport {
        fn query(&mut self, _addr: &str) -> Result<bool, RelayError> {
            self.replies.pop().expect("unexpected query")
        }
        fn set(&mut self, _addr: &str, _on: bool) -> Result<bool, RelayError> {
            self.replies.pop().expect("unexpected set")
        }
    }

    fn relay() -> Relay {
        let mut addr = heapless::String::new();
        addr.push_str("10.0.0.2").unwrap();
        Relay::new("left", addr)
    }

    #[test]
    fn new_relay_is_disabled_and_clean() {
        let r = relay();
        assert!(!r.enabled);
        assert!(!r.error);
        assert!(!r.commanded_state);
        assert_eq!(r.state_text(), "--");
    }

    #[test]
    fn probe_success_enables_and_mirrors_state() {
        let mut r = relay();
        let mut t = ScriptTransport::new(vec![Ok(true)]);
        assert_eq!(r.probe(&mut t), Ok(true));
        assert!(r.enabled);
        assert!(!r.error);
        assert!(r.commanded_state);
        assert_eq!(r.state_text(), "on");
    }

    #[test]
    fn probe_failure_leaves_relay_disabled_without_error_flag() {
        let mut r = relay();
        let mut t = ScriptTransport::new(vec![Err(RelayError::Timeout)]);
        assert_eq!(r.probe(&mut t), Err(RelayError::Timeout));
        assert!(!r.enabled);
        assert!(!r.error, "discovery failures are not runtime faults");
    }

    #[test]
    fn command_records_reported_state_not_request() {
        let mut r = relay();
        let mut t = ScriptTransport::new(vec![Ok(true), Ok(false)]);
        r.probe(&mut t).unwrap();

        // Ask for on, plug claims off — the claim wins.
        assert_eq!(r.command(&mut t, true), Ok(false));
        assert!(!r.commanded_state);
        assert!(!r.error);
    }

    #[test]
    fn command_failure_sets_error_and_keeps_last_state() {
        let mut r = relay();
        let mut t = ScriptTransport::new(vec![Ok(true), Err(RelayError::Connect)]);
        r.probe(&mut t).unwrap();
        assert!(r.commanded_state);

        assert!(r.command(&mut t, false).is_err());
        assert!(r.error);
        assert!(r.commanded_state, "last known state holds pending confirmation");
    }

    #[test]
    fn next_success_clears_error_flag() {
        let mut r = relay();
        let mut t = ScriptTransport::new(vec![Ok(false), Err(RelayError::Timeout), Ok(true)]);
        r.probe(&mut t).unwrap();
        let _ = r.command(&mut t, true);
        assert!(r.error);

        assert_eq!(r.command(&mut t, true), Ok(true));
        assert!(!r.error);
        assert!(r.commanded_state);
    }
}
