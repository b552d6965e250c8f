//! Application core, pure domain logic with zero direct I/O.
//!
//! This module holds the showcase rules: menu navigation, the mode
//! registry, sleep and power handling, settings persistence and the
//! remote command surface.  All interaction with hardware happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod commands;
pub mod events;
pub mod menu;
pub mod modes;
pub mod ports;
pub mod service;
