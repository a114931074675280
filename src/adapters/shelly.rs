//! Shelly smart-plug relay transport.
//!
//! The plugs expose a plain HTTP API on the local network:
//!
//! * `GET http://<addr>/relay/0` — report state
//! * `GET http://<addr>/relay/0?turn=on` / `?turn=off` — switch
//!
//! Every reply is a JSON object whose `ison` field carries the state the
//! relay actually settled in. The request/URL building and reply parsing
//! are plain functions so they stay testable on the host; only the HTTP
//! client itself is ESP-IDF specific.

use serde::Deserialize;

use crate::app::ports::RelayTransport;
use crate::error::RelayError;

/// Longest URL we will build: scheme + 48-byte address + path + query.
pub type RelayUrl = heapless::String<80>;

#[derive(Deserialize)]
struct RelayReply {
    ison: bool,
}

/// `http://<addr>/relay/0`
pub fn query_url(addr: &str) -> Result<RelayUrl, RelayError> {
    let mut url = RelayUrl::new();
    url.push_str("http://").map_err(|_| RelayError::BadResponse)?;
    url.push_str(addr).map_err(|_| RelayError::BadResponse)?;
    url.push_str("/relay/0").map_err(|_| RelayError::BadResponse)?;
    Ok(url)
}

/// `http://<addr>/relay/0?turn=on|off`
pub fn set_url(addr: &str, on: bool) -> Result<RelayUrl, RelayError> {
    let mut url = query_url(addr)?;
    url.push_str(if on { "?turn=on" } else { "?turn=off" })
        .map_err(|_| RelayError::BadResponse)?;
    Ok(url)
}

/// Extract the reported state from a reply body.
pub fn parse_ison(body: &[u8]) -> Result<bool, RelayError> {
    let reply: RelayReply =
        serde_json::from_slice(body).map_err(|_| RelayError::BadResponse)?;
    Ok(reply.ison)
}

/// HTTP-backed transport used by the firmware build.
#[cfg(target_os = "espidf")]
pub struct ShellyTransport {
    timeout_ms: u64,
}

#[cfg(target_os = "espidf")]
impl ShellyTransport {
    pub fn new(timeout_ms: u64) -> Self {
        Self { timeout_ms }
    }

    fn get(&mut self, url: &str) -> Result<bool, RelayError> {
        use embedded_svc::http::client::Client;
        use embedded_svc::http::Status as _;
        use embedded_svc::io::Read as _;
        use esp_idf_svc::http::client::{Configuration, EspHttpConnection};

        let conf = Configuration {
            timeout: Some(core::time::Duration::from_millis(self.timeout_ms)),
            ..Default::default()
        };
        let conn = EspHttpConnection::new(&conf).map_err(|_| RelayError::Connect)?;
        let mut client = Client::wrap(conn);

        let request = client.get(url).map_err(|_| RelayError::Connect)?;
        let mut response = request.submit().map_err(|_| RelayError::Timeout)?;

        let status = response.status();
        if status != 200 {
            return Err(RelayError::BadStatus(status));
        }

        // Shelly replies are tiny; a fixed buffer is plenty.
        let mut body = [0u8; 512];
        let mut read = 0;
        loop {
            let n = response
                .read(&mut body[read..])
                .map_err(|_| RelayError::BadResponse)?;
            if n == 0 {
                break;
            }
            read += n;
            if read == body.len() {
                break;
            }
        }
        parse_ison(&body[..read])
    }
}

#[cfg(target_os = "espidf")]
impl RelayTransport for ShellyTransport {
    fn query(&mut self, addr: &str) -> Result<bool, RelayError> {
        let url = query_url(addr)?;
        self.get(&url)
    }

    fn set(&mut self, addr: &str, on: bool) -> Result<bool, RelayError> {
        let url = set_url(addr, on)?;
        self.get(&url)
    }
}

/// Host stand-in. There is no network to talk to, so every call fails the
/// same way an unplugged relay would.
#[cfg(not(target_os = "espidf"))]
pub struct ShellyTransport;

#[cfg(not(target_os = "espidf"))]
impl ShellyTransport {
    pub fn new(_timeout_ms: u64) -> Self {
        Self
    }
}

#[cfg(not(target_os = "espidf"))]
impl RelayTransport for ShellyTransport {
    fn query(&mut self, _addr: &str) -> Result<bool, RelayError> {
        Err(RelayError::Connect)
    }

    fn set(&mut self, _addr: &str, _on: bool) -> Result<bool, RelayError> {
        Err(RelayError::Connect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_query_url() {
        let url = query_url("192.168.1.40").unwrap();
        assert_eq!(url.as_str(), "http://192.168.1.40/relay/0");
    }

    #[test]
    fn builds_set_urls() {
        let on = set_url("192.168.1.40", true).unwrap();
        let off = set_url("192.168.1.40", false).unwrap();
        assert_eq!(on.as_str(), "http://192.168.1.40/relay/0?turn=on");
        assert_eq!(off.as_str(), "http://192.168.1.40/relay/0?turn=off");
    }

    #[test]
    fn parses_reported_state() {
        let body = br#"{"ison":true,"has_timer":false,"source":"http"}"#;
        assert_eq!(parse_ison(body), Ok(true));
        let body = br#"{"ison":false}"#;
        assert_eq!(parse_ison(body), Ok(false));
    }

    #[test]
    fn rejects_malformed_reply() {
        assert_eq!(parse_ison(b"<html>busy</html>"), Err(RelayError::BadResponse));
        assert_eq!(parse_ison(br#"{"power":12.5}"#), Err(RelayError::BadResponse));
    }

    #[test]
    fn rejects_oversized_address() {
        let addr = "x".repeat(100);
        assert!(query_url(&addr).is_err());
    }
}
