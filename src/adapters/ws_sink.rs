//! WebSocket broadcast sink.
//!
//! Forwards the input-facing [`DeviceEvent`]s to every connected client
//! through the outbound channel in [`crate::events`].  The network task
//! owns the sockets; this side never blocks.

use log::debug;

use crate::app::events::DeviceEvent;
use crate::app::ports::EventSink;
use crate::events::{BROADCAST, publish_remote};

#[derive(Debug, Default)]
pub struct RemoteBroadcastSink {
    dropped: u32,
}

impl RemoteBroadcastSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Broadcasts lost to a full outbound queue.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

impl EventSink for RemoteBroadcastSink {
    fn emit(&mut self, event: &DeviceEvent) {
        let Some(json) = event.to_broadcast_json() else {
            return;
        };
        if !publish_remote(BROADCAST, &json) {
            self.dropped = self.dropped.saturating_add(1);
            debug!("WS: outbound queue full, broadcast dropped");
        }
    }
}
