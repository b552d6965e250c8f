//! NVS (Non-Volatile Storage) adapters.
//!
//! [`NvsAdapter`] implements [`StoragePort`] over the ESP-IDF NVS
//! partition (or an in-memory map on the host).  [`NvsSettingsStore`]
//! layers [`SettingsStore`] on top of any `StoragePort`, one key per
//! field so a single change rewrites one small entry.
//!
//! - Values are postcard-encoded.
//! - A missing or undecodable key falls back to that field's default.
//! - Unchanged values are not rewritten (flash wear).
//! - Atomic writes: ESP-IDF NVS commits are atomic per `nvs_commit()`.

use log::{debug, info, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::app::ports::{ConfigError, SettingsStore, StorageError, StoragePort};
use crate::config::{DeviceSettings, SETTINGS_VERSION};

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

/// Namespace holding every settings key.
pub const SETTINGS_NAMESPACE: &str = "vitrine";

/// Largest encoded value (AP passphrase: 1 length byte + 64).
const MAX_VALUE_SIZE: usize = 80;

/// Persisted key names.  NVS keys are limited to 15 characters.
pub mod keys {
    pub const VERSION: &str = "ver";
    pub const SLEEP_MIN: &str = "sleepMin";
    pub const BACKLIGHT: &str = "blPct";
    pub const LED: &str = "ledPct";
    pub const STANDBY: &str = "sbPct";
    pub const LAST_MINI: &str = "lastMini";
    pub const LAST_MODE: &str = "lastMode";
    pub const AMBIENT_ALL: &str = "ambAll";
    pub const RANDOM_MAX: &str = "ambRMax";
    pub const RANDOM_DENSITY: &str = "ambRDen";
    pub const RANDOM_FRAME_MS: &str = "ambRFms";
    pub const RANDOM_STEP: &str = "ambRStep";
    pub const STA_ENABLED: &str = "staEn";
    pub const STA_SSID: &str = "staSsid";
    pub const STA_PASS: &str = "staPass";
    pub const AP_SSID: &str = "apSsid";
    pub const AP_PASS: &str = "apPass";
}

// ───────────────────────────────────────────────────────────────
// NvsAdapter
// ───────────────────────────────────────────────────────────────

pub struct NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    store: HashMap<String, Vec<u8>>,
}

impl NvsAdapter {
    /// Initialise NVS flash.
    ///
    /// Returns `Err(StorageError::IoError)` if flash initialisation fails
    /// unrecoverably. On first boot or after a version mismatch the NVS
    /// partition is erased and re-initialised automatically.
    pub fn new() -> Result<Self, StorageError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
            // single main-task context before any concurrent NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK {
                    return Err(StorageError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK {
                    return Err(StorageError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(StorageError::IoError);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            store: HashMap::new(),
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{}::{}", namespace, key)
    }

    /// NUL-terminated copy of a namespace or key name.
    #[cfg(target_os = "espidf")]
    fn c_name(name: &str) -> [u8; 16] {
        let mut buf = [0u8; 16];
        let bytes = name.as_bytes();
        let len = bytes.len().min(15);
        buf[..len].copy_from_slice(&bytes[..len]);
        buf
    }

    /// Open an NVS namespace, execute a closure with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(namespace: &str, write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let ns_buf = Self::c_name(namespace);
        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        let ret = unsafe { nvs_open(ns_buf.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }

        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }
}

impl StoragePort for NvsAdapter {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            match self.store.get(&Self::composite_key(namespace, key)) {
                Some(data) => {
                    let len = data.len().min(buf.len());
                    buf[..len].copy_from_slice(&data[..len]);
                    Ok(len)
                }
                None => Err(StorageError::NotFound),
            }
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(namespace, false, |handle| {
                let key_buf = Self::c_name(key);
                let mut size = buf.len();
                let ret = unsafe {
                    nvs_get_blob(
                        handle,
                        key_buf.as_ptr() as *const _,
                        buf.as_mut_ptr() as *mut _,
                        &mut size,
                    )
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(size)
            });
            match result {
                Ok(size) => Ok(size),
                Err(e) if e == ESP_ERR_NVS_NOT_FOUND => Err(StorageError::NotFound),
                Err(_) => Err(StorageError::IoError),
            }
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            self.store
                .insert(Self::composite_key(namespace, key), data.to_vec());
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(namespace, true, |handle| {
                let key_buf = Self::c_name(key);
                let ret = unsafe {
                    nvs_set_blob(
                        handle,
                        key_buf.as_ptr() as *const _,
                        data.as_ptr() as *const _,
                        data.len(),
                    )
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(())
            });
            result.map_err(|e| {
                if e == ESP_ERR_NVS_NOT_ENOUGH_SPACE {
                    StorageError::Full
                } else {
                    StorageError::IoError
                }
            })
        }
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            self.store.remove(&Self::composite_key(namespace, key));
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(namespace, true, |handle| {
                let key_buf = Self::c_name(key);
                let ret = unsafe { nvs_erase_key(handle, key_buf.as_ptr() as *const _) };
                if ret != ESP_OK && ret != ESP_ERR_NVS_NOT_FOUND {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(())
            });
            result.map_err(|_| StorageError::IoError)
        }
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        #[cfg(not(target_os = "espidf"))]
        {
            self.store.contains_key(&Self::composite_key(namespace, key))
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(namespace, false, |handle| {
                let key_buf = Self::c_name(key);
                let ret = unsafe { nvs_find_key(handle, key_buf.as_ptr() as *const _, core::ptr::null_mut()) };
                Ok(ret == ESP_OK)
            });
            result.unwrap_or(false)
        }
    }

    fn erase_namespace(&mut self, namespace: &str) -> Result<(), StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let prefix = format!("{}::", namespace);
            self.store.retain(|k, _| !k.starts_with(&prefix));
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(namespace, true, |handle| {
                let ret = unsafe { nvs_erase_all(handle) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(())
            });
            result.map_err(|_| StorageError::IoError)
        }
    }
}

impl Default for NvsAdapter {
    fn default() -> Self {
        // Last-resort fallback: a store that persists nothing this session.
        Self::new().unwrap_or(Self {
            #[cfg(not(target_os = "espidf"))]
            store: HashMap::new(),
        })
    }
}

// ───────────────────────────────────────────────────────────────
// NvsSettingsStore
// ───────────────────────────────────────────────────────────────

/// [`SettingsStore`] over a key-value [`StoragePort`].
pub struct NvsSettingsStore<S> {
    storage: S,
}

impl<S: StoragePort> NvsSettingsStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut buf = [0u8; MAX_VALUE_SIZE];
        match self.storage.read(SETTINGS_NAMESPACE, key, &mut buf) {
            Ok(n) => match postcard::from_bytes(&buf[..n]) {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!("NVS: '{}' undecodable, using default", key);
                    None
                }
            },
            Err(StorageError::NotFound) => None,
            Err(e) => {
                warn!("NVS: read '{}' failed ({})", key, e);
                None
            }
        }
    }

    fn put<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), ConfigError> {
        let mut buf = [0u8; MAX_VALUE_SIZE];
        let bytes = postcard::to_slice(value, &mut buf).map_err(|_| ConfigError::Encode)?;

        let mut existing = [0u8; MAX_VALUE_SIZE];
        if let Ok(n) = self.storage.read(SETTINGS_NAMESPACE, key, &mut existing)
            && existing[..n] == *bytes
        {
            return Ok(());
        }

        debug!("NVS: write '{}' ({} bytes)", key, bytes.len());
        self.storage.write(SETTINGS_NAMESPACE, key, bytes)?;
        Ok(())
    }
}

impl<S: StoragePort> SettingsStore for NvsSettingsStore<S> {
    fn load(&mut self) -> Result<DeviceSettings, ConfigError> {
        let d = DeviceSettings::default();

        if let Some(v) = self.get::<u8>(keys::VERSION)
            && v != SETTINGS_VERSION
        {
            warn!("NVS: settings version {} (expected {})", v, SETTINGS_VERSION);
        }

        let settings = DeviceSettings {
            sleep_timeout_min: self.get(keys::SLEEP_MIN).unwrap_or(d.sleep_timeout_min),
            backlight_pct: self.get(keys::BACKLIGHT).unwrap_or(d.backlight_pct),
            led_brightness_pct: self.get(keys::LED).unwrap_or(d.led_brightness_pct),
            standby_brightness_pct: self.get(keys::STANDBY).unwrap_or(d.standby_brightness_pct),
            last_miniature_index: self.get(keys::LAST_MINI).unwrap_or(d.last_miniature_index),
            last_main_mode: self.get(keys::LAST_MODE).unwrap_or(d.last_main_mode),
            ambient_all_pct: self.get(keys::AMBIENT_ALL).unwrap_or(d.ambient_all_pct),
            ambient_random_max_pct: self.get(keys::RANDOM_MAX).unwrap_or(d.ambient_random_max_pct),
            ambient_random_density: self
                .get::<u8>(keys::RANDOM_DENSITY)
                .filter(|v| *v > 0)
                .unwrap_or(d.ambient_random_density),
            ambient_random_frame_ms: self
                .get::<u16>(keys::RANDOM_FRAME_MS)
                .filter(|v| *v > 0)
                .unwrap_or(d.ambient_random_frame_ms),
            ambient_random_step: self
                .get::<u8>(keys::RANDOM_STEP)
                .filter(|v| *v > 0)
                .unwrap_or(d.ambient_random_step),
            sta_enabled: self.get(keys::STA_ENABLED).unwrap_or(d.sta_enabled),
            sta_ssid: self.get(keys::STA_SSID).unwrap_or(d.sta_ssid),
            sta_pass: self.get(keys::STA_PASS).unwrap_or(d.sta_pass),
            ap_ssid: self.get(keys::AP_SSID).unwrap_or(d.ap_ssid),
            ap_pass: self.get(keys::AP_PASS).unwrap_or(d.ap_pass),
        };
        info!("NvsSettingsStore: settings loaded");
        Ok(settings.sanitized())
    }

    /// Every key is attempted even after a failure; the first error is
    /// returned.
    fn save(&mut self, s: &DeviceSettings) -> Result<(), ConfigError> {
        let results = [
            self.put(keys::VERSION, &SETTINGS_VERSION),
            self.put(keys::SLEEP_MIN, &s.sleep_timeout_min),
            self.put(keys::BACKLIGHT, &s.backlight_pct),
            self.put(keys::LED, &s.led_brightness_pct),
            self.put(keys::STANDBY, &s.standby_brightness_pct),
            self.put(keys::LAST_MINI, &s.last_miniature_index),
            self.put(keys::LAST_MODE, &s.last_main_mode),
            self.put(keys::AMBIENT_ALL, &s.ambient_all_pct),
            self.put(keys::RANDOM_MAX, &s.ambient_random_max_pct),
            self.put(keys::RANDOM_DENSITY, &s.ambient_random_density),
            self.put(keys::RANDOM_FRAME_MS, &s.ambient_random_frame_ms),
            self.put(keys::RANDOM_STEP, &s.ambient_random_step),
            self.put(keys::STA_ENABLED, &s.sta_enabled),
            self.put(keys::STA_SSID, &s.sta_ssid),
            self.put(keys::STA_PASS, &s.sta_pass),
            self.put(keys::AP_SSID, &s.ap_ssid),
            self.put(keys::AP_PASS, &s.ap_pass),
        ];
        match results.into_iter().find_map(Result::err) {
            Some(e) => {
                warn!("NvsSettingsStore: save incomplete ({})", e);
                Err(e)
            }
            None => Ok(()),
        }
    }

    fn reset(&mut self) -> Result<(), ConfigError> {
        self.storage.erase_namespace(SETTINGS_NAMESPACE)?;
        info!("NvsSettingsStore: namespace erased");
        Ok(())
    }
}
