//! `EventSink` adapter that routes application events to the serial log.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { enabled_channels } => {
                info!("service started with {enabled_channels} channel(s)");
            }
            AppEvent::RelayDiscovered { channel, is_on } => {
                info!("relay {channel} discovered (reports {})", if *is_on { "on" } else { "off" });
            }
            AppEvent::RelayUnavailable { channel } => {
                warn!("relay {channel} unavailable, channel disabled");
            }
            AppEvent::TargetReached { channel } => {
                info!("channel {channel} reached target temperature");
            }
            AppEvent::RelayFault { channel, error } => {
                warn!("relay {channel} fault: {error}");
            }
            AppEvent::AlarmRaised => warn!("alarm raised"),
            AppEvent::AlarmCleared => info!("alarm cleared"),
        }
    }
}
