//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured device events to the
//! ESP-IDF logger (UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::DeviceEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`DeviceEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &DeviceEvent) {
        match event {
            DeviceEvent::Started { index } => info!("START | slot={}", index),
            DeviceEvent::EncoderRotate {
                index,
                timestamp_ms,
            } => info!("ENC   | rotate slot={} t={}ms", index, timestamp_ms),
            DeviceEvent::EncoderPress {
                index,
                timestamp_ms,
            } => info!("ENC   | press slot={} t={}ms", index, timestamp_ms),
            DeviceEvent::MiniatureShown { index, .. } => info!("TFT   | miniature slot={}", index),
            DeviceEvent::ModeSelected { mode } => info!("MENU  | mode={}", mode),
            DeviceEvent::OptionSelected { mode, option } => info!("MENU  | {} > {}", mode, option),
            DeviceEvent::SleepEntered => info!("POWER | sleep"),
            DeviceEvent::Woke => info!("POWER | wake"),
            DeviceEvent::PoweringOff => info!("POWER | off"),
            DeviceEvent::SaveFailed(e) => warn!("NVS   | save failed: {}", e),
            DeviceEvent::TagRead(outcome) => info!("NFC   | {:?}", outcome),
        }
    }
}
