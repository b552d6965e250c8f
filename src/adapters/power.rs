//! Power-off adapter.
//!
//! "Power off" on this board is deep sleep with no wake source: the radio
//! is stopped, the backlight pin is latched low so the panel stays dark
//! through sleep, and the chip halts until the reset button or a power
//! cycle.

use log::info;

use crate::app::ports::PowerPort;

#[derive(Debug, Default)]
pub struct PowerAdapter {
    #[cfg(not(target_os = "espidf"))]
    off_requests: u32,
}

impl PowerAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host builds only record the request.
    #[cfg(not(target_os = "espidf"))]
    pub fn off_requests(&self) -> u32 {
        self.off_requests
    }
}

impl PowerPort for PowerAdapter {
    #[cfg(target_os = "espidf")]
    fn power_off(&mut self) {
        use esp_idf_svc::sys::*;

        let backlight = crate::pins::TFT_BACKLIGHT_GPIO;
        info!("Power: entering deep sleep, no wake source");
        // SAFETY: called once from the main task; nothing touches the
        // radio or the backlight pin afterwards.
        unsafe {
            // Best effort: the radio may never have been started.
            let _ = esp_wifi_stop();
            gpio_set_level(backlight, 0);
            gpio_hold_en(backlight);
            gpio_deep_sleep_hold_en();
            esp_sleep_disable_wakeup_source(esp_sleep_source_t_ESP_SLEEP_WAKEUP_ALL);
            esp_deep_sleep_start();
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn power_off(&mut self) {
        self.off_requests += 1;
        info!("Power: off requested (simulation)");
    }
}
