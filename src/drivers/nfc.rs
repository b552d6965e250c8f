//! NTAG2xx record reader.
//!
//! Miniature tags carry a small JSON object written as plain text into the
//! NTAG user pages.  The reader pulls pages 4..42, keeps printable bytes and
//! decodes whatever lies between the first `{` and the last `}`.  Framing
//! bytes (NDEF TLV headers, terminator `0xFE`) simply drop out of the
//! filter, so no NDEF parsing is needed.
//!
//! ```text
//! page  4 │ 03 2A D1 01 │  TLV + record header (non-printable, dropped)
//! page  5 │ 26 54 02 65 │  "&T" + lang "en" ...
//! page  6 │ 6E 7B 22 6E │  "n{"n"        ◀── first '{'
//!   ...   │             │
//! page 12 │ 22 7D FE 00 │  '"}'  0xFE    ◀── last '}'
//! ```

use log::{info, warn};
use serde_json::Value;

use crate::app::ports::{MiniatureRecord, NfcError, NfcPort, TagUid};

/// First user-memory page.
pub const FIRST_PAGE: u8 = 4;
/// One past the last page read.
pub const END_PAGE: u8 = 42;
pub const PAGE_SIZE: usize = 4;

/// Low-level tag access, implemented by the PN532 driver and test fakes.
pub trait TagTransport {
    /// Look for one ISO14443A target.  `None` when the field is empty.
    fn read_passive_uid(&mut self) -> Option<TagUid>;

    /// Read one 4-byte NTAG page.
    fn read_page(&mut self, page: u8) -> Result<[u8; PAGE_SIZE], NfcError>;
}

/// Keep the bytes a tag writer could have typed.
pub fn is_payload_byte(b: u8) -> bool {
    b > 0x1F && b != 0xFE
}

/// Decode the JSON block embedded in raw tag memory.
///
/// Missing or non-string fields read as `"Unknown"`.
pub fn extract_record(raw: &[u8]) -> Result<MiniatureRecord, NfcError> {
    let text: Vec<u8> = raw.iter().copied().filter(|b| is_payload_byte(*b)).collect();

    let start = text.iter().position(|b| *b == b'{');
    let end = text.iter().rposition(|b| *b == b'}');
    let (Some(start), Some(end)) = (start, end) else {
        return Err(NfcError::NoPayload);
    };
    if end <= start {
        return Err(NfcError::NoPayload);
    }

    let doc: Value = serde_json::from_slice(&text[start..=end]).map_err(|_| NfcError::Parse)?;
    let field = |key: &str| {
        doc.get(key)
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_owned()
    };
    Ok(MiniatureRecord {
        name: field("name"),
        team: field("team"),
        design_by: field("designBy"),
        painted: field("painted"),
    })
}

/// [`NfcPort`] over any [`TagTransport`].
pub struct NtagReader<T> {
    transport: Option<T>,
}

impl<T: TagTransport> NtagReader<T> {
    /// Reader backed by an initialised transport.
    pub fn new(transport: T) -> Self {
        Self {
            transport: Some(transport),
        }
    }

    /// Reader whose hardware failed to come up.  Every read reports
    /// [`NfcError::NotReady`] or no tag.
    pub fn unavailable() -> Self {
        Self { transport: None }
    }

    pub fn transport_mut(&mut self) -> Option<&mut T> {
        self.transport.as_mut()
    }

    fn read_user_memory(transport: &mut T) -> Result<Vec<u8>, NfcError> {
        let mut raw = Vec::with_capacity(usize::from(END_PAGE - FIRST_PAGE) * PAGE_SIZE);
        for page in FIRST_PAGE..END_PAGE {
            match transport.read_page(page) {
                Ok(bytes) => raw.extend_from_slice(&bytes),
                Err(e) => {
                    warn!("NFC: page {} read failed", page);
                    return Err(e);
                }
            }
        }
        Ok(raw)
    }
}

impl<T: TagTransport> NfcPort for NtagReader<T> {
    fn is_ready(&self) -> bool {
        self.transport.is_some()
    }

    fn read_tag_uid(&mut self) -> Option<TagUid> {
        self.transport.as_mut()?.read_passive_uid()
    }

    fn read_tag_context(&mut self, uid: &TagUid) -> Result<MiniatureRecord, NfcError> {
        let transport = self.transport.as_mut().ok_or(NfcError::NotReady)?;
        let raw = Self::read_user_memory(transport)?;
        let record = extract_record(&raw);
        match &record {
            Ok(r) => info!("NFC: tag {:02X?} -> {}", uid.as_slice(), r.name),
            Err(e) => warn!("NFC: tag {:02X?} unreadable: {}", uid.as_slice(), e),
        }
        record
    }
}
