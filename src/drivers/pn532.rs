//! PN532 NFC front-end over I2C.
//!
//! Implements just enough of the PN532 host protocol to find an ISO14443A
//! tag and read NTAG pages:
//!
//! | Command              | Code | Use                          |
//! |----------------------|------|------------------------------|
//! | GetFirmwareVersion   | 0x02 | presence check at boot       |
//! | SAMConfiguration     | 0x14 | normal mode, no IRQ          |
//! | InListPassiveTarget  | 0x4A | UID of one 106 kbps A target |
//! | InDataExchange       | 0x40 | NTAG READ (0x30), 4 pages    |
//!
//! ## Frame layout
//!
//! ```text
//! 00 00 FF LEN LCS TFI CMD DATA.. DCS 00
//!              │    │
//!              │    └ D4 host→PN532, D5 PN532→host
//!              └ LEN + LCS == 0 (mod 256)
//! ```
//!
//! Every I2C read from the PN532 starts with a status byte; bit 0 set
//! means a frame is ready.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use heapless::Vec;
use log::{info, warn};

use super::nfc::{PAGE_SIZE, TagTransport};
use crate::app::ports::{NfcError, TagUid};

pub const PN532_I2C_ADDR: u8 = 0x24;

const HOST_TO_PN532: u8 = 0xD4;
const PN532_TO_HOST: u8 = 0xD5;

const CMD_GET_FIRMWARE_VERSION: u8 = 0x02;
const CMD_SAM_CONFIGURATION: u8 = 0x14;
const CMD_IN_LIST_PASSIVE_TARGET: u8 = 0x4A;
const CMD_IN_DATA_EXCHANGE: u8 = 0x40;

const NTAG_READ: u8 = 0x30;

const ACK_FRAME: [u8; 6] = [0x00, 0x00, 0xFF, 0x00, 0xFF, 0x00];

/// Status polls before a command is abandoned (1 ms apart).
const READY_POLLS: u32 = 100;
/// Shorter wait while scanning for a tag, so the caller's loop stays live.
const SCAN_POLLS: u32 = 30;

const MAX_FRAME: usize = 64;

/// Build a host→PN532 information frame.
pub fn encode_frame(cmd: u8, params: &[u8]) -> Vec<u8, MAX_FRAME> {
    let mut frame = Vec::new();
    let len = (params.len() + 2) as u8;
    let mut sum = HOST_TO_PN532.wrapping_add(cmd);
    for p in params {
        sum = sum.wrapping_add(*p);
    }
    let head = [0x00, 0x00, 0xFF, len, (!len).wrapping_add(1), HOST_TO_PN532, cmd];
    // Callers never pass more than a handful of parameter bytes.
    let _ = frame.extend_from_slice(&head);
    let _ = frame.extend_from_slice(params);
    let _ = frame.push((!sum).wrapping_add(1));
    let _ = frame.push(0x00);
    frame
}

/// Validate a PN532→host frame (status byte already stripped) and return
/// the data following the response code.
pub fn decode_frame(cmd: u8, buf: &[u8]) -> Result<&[u8], NfcError> {
    if buf.len() < 7 || buf[..3] != [0x00, 0x00, 0xFF] {
        return Err(NfcError::ReadFailed);
    }
    let len = usize::from(buf[3]);
    if buf[3].wrapping_add(buf[4]) != 0 || len < 2 || buf.len() < 5 + len + 1 {
        return Err(NfcError::ReadFailed);
    }
    let body = &buf[5..5 + len];
    let dcs = buf[5 + len];
    let sum = body.iter().fold(dcs, |acc, b| acc.wrapping_add(*b));
    if sum != 0 || body[0] != PN532_TO_HOST || body[1] != cmd.wrapping_add(1) {
        return Err(NfcError::ReadFailed);
    }
    Ok(&body[2..])
}

pub struct Pn532<I, D> {
    i2c: I,
    delay: D,
}

impl<I: I2c, D: DelayNs> Pn532<I, D> {
    pub fn new(i2c: I, delay: D) -> Self {
        Self { i2c, delay }
    }

    /// Check the chip answers and put the SAM in normal mode.
    pub fn begin(&mut self) -> Result<u32, NfcError> {
        let mut resp = [0u8; 4];
        let n = self.command(CMD_GET_FIRMWARE_VERSION, &[], &mut resp, READY_POLLS)?;
        if n < 4 {
            return Err(NfcError::NotReady);
        }
        let version = u32::from_be_bytes(resp);
        info!("PN532: firmware IC=0x{:02X} v{}.{}", resp[0], resp[1], resp[2]);

        let mut ignored = [0u8; 1];
        self.command(CMD_SAM_CONFIGURATION, &[0x01, 0x14, 0x01], &mut ignored, READY_POLLS)?;
        Ok(version)
    }

    pub fn release(self) -> (I, D) {
        (self.i2c, self.delay)
    }

    /// Send `cmd`, wait for the ACK, then wait for and decode the response
    /// into `out`.  Returns the number of data bytes copied.
    fn command(&mut self, cmd: u8, params: &[u8], out: &mut [u8], polls: u32) -> Result<usize, NfcError> {
        let frame = encode_frame(cmd, params);
        self.i2c
            .write(PN532_I2C_ADDR, &frame)
            .map_err(|_| NfcError::NotReady)?;

        self.wait_ready(polls)?;
        let mut ack = [0u8; 7];
        self.i2c
            .read(PN532_I2C_ADDR, &mut ack)
            .map_err(|_| NfcError::ReadFailed)?;
        if ack[1..] != ACK_FRAME {
            return Err(NfcError::ReadFailed);
        }

        self.wait_ready(polls)?;
        let mut buf = [0u8; MAX_FRAME];
        self.i2c
            .read(PN532_I2C_ADDR, &mut buf)
            .map_err(|_| NfcError::ReadFailed)?;
        let data = decode_frame(cmd, &buf[1..])?;
        let n = data.len().min(out.len());
        out[..n].copy_from_slice(&data[..n]);
        Ok(n)
    }

    fn wait_ready(&mut self, polls: u32) -> Result<(), NfcError> {
        let mut status = [0u8; 1];
        for _ in 0..polls {
            if self.i2c.read(PN532_I2C_ADDR, &mut status).is_ok() && status[0] & 0x01 == 0x01 {
                return Ok(());
            }
            self.delay.delay_ms(1);
        }
        Err(NfcError::NoTag)
    }
}

impl<I: I2c, D: DelayNs> TagTransport for Pn532<I, D> {
    fn read_passive_uid(&mut self) -> Option<TagUid> {
        let mut resp = [0u8; 20];
        let n = self
            .command(CMD_IN_LIST_PASSIVE_TARGET, &[0x01, 0x00], &mut resp, SCAN_POLLS)
            .ok()?;
        // NbTg, Tg, SENS_RES(2), SEL_RES, NFCIDLength, NFCID...
        if n < 6 || resp[0] != 1 {
            return None;
        }
        let uid_len = usize::from(resp[5]);
        if n < 6 + uid_len {
            return None;
        }
        TagUid::from_slice(&resp[6..6 + uid_len]).ok()
    }

    fn read_page(&mut self, page: u8) -> Result<[u8; PAGE_SIZE], NfcError> {
        // READ returns 16 bytes (four pages); only the first is used.
        let mut resp = [0u8; 17];
        let n = self.command(CMD_IN_DATA_EXCHANGE, &[0x01, NTAG_READ, page], &mut resp, READY_POLLS)?;
        if n < 1 + PAGE_SIZE || resp[0] != 0x00 {
            warn!("PN532: READ page {} status 0x{:02X}", page, resp[0]);
            return Err(NfcError::ReadFailed);
        }
        let mut out = [0u8; PAGE_SIZE];
        out.copy_from_slice(&resp[1..=PAGE_SIZE]);
        Ok(out)
    }
}
