//! Read-only HTTP status front end.
//!
//! Two endpoints, both GET, both served straight from the shared
//! [`StatusSnapshot`]:
//!
//! * `/` — a small HTML page for a browser on the LAN
//! * `/temp` — the snapshot as flat JSON
//!
//! The handlers never touch the control core; they only read the snapshot
//! the loop publishes once per poll, so a slow client can never stall
//! regulation. Rendering is split out into plain functions so it can be
//! unit-tested on the host.

use crate::app::events::StatusSnapshot;

/// HTML status page body.
pub fn render_index(snap: &StatusSnapshot) -> String {
    let alarm = if snap.alarm { "RINGING" } else { "quiet" };
    format!(
        concat!(
            "<!DOCTYPE html><html><head><meta charset=\"utf-8\">",
            "<meta http-equiv=\"refresh\" content=\"5\">",
            "<title>heatkeeper</title></head><body>",
            "<h1>heatkeeper</h1>",
            "<p>left: {} &deg;C (relay {})</p>",
            "<p>right: {} &deg;C (relay {})</p>",
            "<p>alarm: {}</p>",
            "</body></html>"
        ),
        snap.temp1, snap.relay1, snap.temp2, snap.relay2, alarm
    )
}

/// `/temp` JSON body.
pub fn render_json(snap: &StatusSnapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string(snap)
}

#[cfg(target_os = "espidf")]
mod hw {
    use std::sync::{Arc, Mutex};

    use embedded_svc::http::Method;
    use embedded_svc::io::Write;
    use esp_idf_svc::http::server::{Configuration, EspHttpServer};

    use super::{render_index, render_json};
    use crate::app::events::StatusSnapshot;
    use crate::error::{Error, Result};

    /// Start the status server. The returned server must stay alive for the
    /// lifetime of the program; dropping it unregisters the handlers.
    pub fn start(snapshot: Arc<Mutex<StatusSnapshot>>) -> Result<EspHttpServer<'static>> {
        let cfg = Configuration {
            stack_size: 8 * 1024,
            ..Default::default()
        };
        let mut server = EspHttpServer::new(&cfg).map_err(|_| Error::Init("http server"))?;

        {
            let snapshot = snapshot.clone();
            server
                .fn_handler("/", Method::Get, move |req| -> anyhow::Result<()> {
                    let snap = snapshot
                        .lock()
                        .map_err(|_| anyhow::anyhow!("snapshot poisoned"))?
                        .clone();
                    let body = render_index(&snap);
                    let headers = [("Content-Type", "text/html; charset=utf-8")];
                    let mut resp = req.into_response(200, Some("OK"), &headers)?;
                    resp.write_all(body.as_bytes())?;
                    Ok(())
                })
                .map_err(|_| Error::Init("http handler /"))?;
        }

        {
            server
                .fn_handler("/temp", Method::Get, move |req| -> anyhow::Result<()> {
                    let snap = snapshot
                        .lock()
                        .map_err(|_| anyhow::anyhow!("snapshot poisoned"))?
                        .clone();
                    let body = render_json(&snap)?;
                    let headers = [("Content-Type", "application/json")];
                    let mut resp = req.into_response(200, Some("OK"), &headers)?;
                    resp.write_all(body.as_bytes())?;
                    Ok(())
                })
                .map_err(|_| Error::Init("http handler /temp"))?;
        }

        Ok(server)
    }
}

#[cfg(target_os = "espidf")]
pub use hw::start;

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> StatusSnapshot {
        let mut snap = StatusSnapshot::default();
        snap.temp1.push_str("87.5").unwrap();
        snap.temp2.push_str("--").unwrap();
        snap.relay1.push_str("on").unwrap();
        snap.relay2.push_str("--").unwrap();
        snap
    }

    #[test]
    fn index_shows_readings_and_relay_states() {
        let html = render_index(&snapshot());
        assert!(html.contains("87.5"));
        assert!(html.contains("relay on"));
        assert!(html.contains("relay --"));
        assert!(html.contains("alarm: quiet"));
    }

    #[test]
    fn index_flags_ringing_alarm() {
        let mut snap = snapshot();
        snap.alarm = true;
        assert!(render_index(&snap).contains("RINGING"));
    }

    #[test]
    fn json_is_the_snapshot_verbatim() {
        let json = render_json(&snapshot()).unwrap();
        assert!(json.contains("\"temp1\":\"87.5\""));
        assert!(json.contains("\"relay2\":\"--\""));
        assert!(json.contains("\"alarm\":false"));
    }
}
