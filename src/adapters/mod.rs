//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements                   | Connects to                |
//! |-------------|------------------------------|----------------------------|
//! | `hardware`  | DisplayPort, LedStripPort,   | TFT, SK6812 strip, PCNT,   |
//! |             | InputPort, NfcPort, Clock,   | button GPIOs, PN532        |
//! |             | PowerPort                    |                            |
//! | `log_sink`  | EventSink                    | Serial log output          |
//! | `nvs`       | StoragePort, SettingsStore   | NVS / in-memory store      |
//! | `power`     | PowerPort                    | Deep sleep, GPIO hold      |
//! | `time`      | Clock                        | ESP32 system timer         |
//! | `ws_sink`   | EventSink                    | WebSocket outbound channel |

pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod power;
pub mod time;
pub mod ws_sink;
