//! Monotonic uptime source.
//!
//! On ESP-IDF: the 64-bit microsecond timer (`esp_timer_get_time`).
//! On host/test: `std::time::Instant` anchored at construction.

pub struct Uptime {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Uptime {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Milliseconds since boot (host: since construction).
    pub fn now_ms(&self) -> u64 {
        #[cfg(target_os = "espidf")]
        {
            (unsafe { esp_idf_sys::esp_timer_get_time() } / 1000) as u64
        }
        #[cfg(not(target_os = "espidf"))]
        {
            self.start.elapsed().as_millis() as u64
        }
    }
}
