// SPDX-License-Identifier: MIT
//! Employee database (LLAD) on-disk format
//!
//! Defines the fixed binary layout of the header and employee records.
//! All integers are stored big-endian (network order); in-memory values are
//! always host order. Conversion happens only here.

use std::borrow::Cow;
use std::fmt;

use bytes::{Buf, BufMut, Bytes};

/// Format magic: "LLAD"
pub const DB_MAGIC: u32 = 0x4c4c_4144;

/// The single format version currently understood
pub const DB_VERSION: u16 = 1;

/// Header size in bytes
pub const HEADER_SIZE: usize = 12;

/// Width of the name slot (NUL-padded)
pub const NAME_LEN: usize = 256;

/// Width of the address slot (NUL-padded)
pub const ADDRESS_LEN: usize = 256;

/// Employee record size in bytes
pub const EMPLOYEE_SIZE: usize = NAME_LEN + ADDRESS_LEN + 4;

/// Most employees a single file can describe (`count` is a u16)
pub const MAX_EMPLOYEES: usize = u16::MAX as usize;

/// Codec errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("{what} must be {expected} bytes, got {actual}")]
    ShortBuffer {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Database file header (12 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbHeader {
    /// Magic number, `DB_MAGIC` for valid files
    pub magic: u32,

    /// Format version
    pub version: u16,

    /// Number of employee records following the header
    pub count: u16,

    /// Total file size as last written. Advisory only.
    pub filesize: u32,
}

impl DbHeader {
    /// Decode a header from the start of `bytes`
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FormatError> {
        if bytes.len() < HEADER_SIZE {
            return Err(FormatError::ShortBuffer {
                what: "Header",
                expected: HEADER_SIZE,
                actual: bytes.len(),
            });
        }

        let mut buf = &bytes[..HEADER_SIZE];
        Ok(Self {
            magic: buf.get_u32(),
            version: buf.get_u16(),
            count: buf.get_u16(),
            filesize: buf.get_u32(),
        })
    }

    /// Append the encoded header to `buffer`
    #[inline]
    pub fn write_to_buffer<B: BufMut>(&self, buffer: &mut B) {
        buffer.put_u32(self.magic);
        buffer.put_u16(self.version);
        buffer.put_u16(self.count);
        buffer.put_u32(self.filesize);
    }

    /// Encode into a fixed-size array
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        self.write_to_buffer(&mut &mut bytes[..]);
        bytes
    }
}

/// A fixed-width text slot as stored on disk.
///
/// Slots read from a file keep their exact bytes, including non-UTF-8 data
/// and anything after the first NUL, so a rewrite reproduces them verbatim.
/// The logical text is everything before the first NUL.
#[derive(Debug, Clone, Default)]
pub struct TextField {
    raw: Bytes,
}

impl TextField {
    /// Text for a `width`-byte slot, truncated to leave room for the NUL
    pub fn from_text(text: &str, width: usize) -> Self {
        Self {
            raw: Bytes::copy_from_slice(truncate_text(text, width).as_bytes()),
        }
    }

    /// Wrap a slot exactly as read from disk
    pub fn from_slot(raw: Bytes) -> Self {
        Self { raw }
    }

    /// Content bytes up to the first NUL
    pub fn as_bytes(&self) -> &[u8] {
        let end = self.raw.iter().position(|&b| b == 0).unwrap_or(self.raw.len());
        &self.raw[..end]
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.as_bytes())
    }

    fn write_to_buffer<B: BufMut>(&self, buffer: &mut B, width: usize) {
        let stored = &self.raw[..self.raw.len().min(width)];
        buffer.put_slice(stored);
        buffer.put_bytes(0, width - stored.len());
    }

    fn padded(&self) -> &[u8] {
        let end = self.raw.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        &self.raw[..end]
    }
}

// Trailing NUL padding is not significant
impl PartialEq for TextField {
    fn eq(&self, other: &Self) -> bool {
        self.padded() == other.padded()
    }
}

impl Eq for TextField {}

impl PartialEq<str> for TextField {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for TextField {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<String> for TextField {
    fn eq(&self, other: &String) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl fmt::Display for TextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.to_string_lossy())
    }
}

/// A single employee record
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Employee {
    pub name: TextField,
    pub address: TextField,
    pub hours: u32,
}

impl Employee {
    /// Build a record, truncating text fields to what their slots can hold
    pub fn new(name: &str, address: &str, hours: u32) -> Self {
        Self {
            name: TextField::from_text(name, NAME_LEN),
            address: TextField::from_text(address, ADDRESS_LEN),
            hours,
        }
    }

    /// Decode a record from the start of `bytes`
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FormatError> {
        if bytes.len() < EMPLOYEE_SIZE {
            return Err(FormatError::ShortBuffer {
                what: "Employee record",
                expected: EMPLOYEE_SIZE,
                actual: bytes.len(),
            });
        }

        let mut buf = &bytes[..EMPLOYEE_SIZE];
        let name = TextField::from_slot(buf.copy_to_bytes(NAME_LEN));
        let address = TextField::from_slot(buf.copy_to_bytes(ADDRESS_LEN));
        let hours = buf.get_u32();

        Ok(Self {
            name,
            address,
            hours,
        })
    }

    /// Append the encoded record to `buffer`
    #[inline]
    pub fn write_to_buffer<B: BufMut>(&self, buffer: &mut B) {
        self.name.write_to_buffer(buffer, NAME_LEN);
        self.address.write_to_buffer(buffer, ADDRESS_LEN);
        buffer.put_u32(self.hours);
    }

    /// Encode into a freshly allocated buffer of `EMPLOYEE_SIZE` bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(EMPLOYEE_SIZE);
        self.write_to_buffer(&mut bytes);
        bytes
    }
}

pub fn encode_header(header: &DbHeader) -> [u8; HEADER_SIZE] {
    header.to_bytes()
}

pub fn decode_header(bytes: &[u8]) -> Result<DbHeader, FormatError> {
    DbHeader::from_bytes(bytes)
}

pub fn encode_record(employee: &Employee) -> Vec<u8> {
    employee.to_bytes()
}

pub fn decode_record(bytes: &[u8]) -> Result<Employee, FormatError> {
    Employee::from_bytes(bytes)
}

/// File length implied by a record count
#[inline]
pub fn file_size_for(count: usize) -> u64 {
    HEADER_SIZE as u64 + (count as u64) * EMPLOYEE_SIZE as u64
}

/// Longest prefix of `text` that fits a `width`-byte slot.
///
/// One byte is always kept for the terminating NUL, and the cut never splits
/// a UTF-8 character.
pub fn truncate_text(text: &str, width: usize) -> &str {
    let mut end = text.len().min(width.saturating_sub(1));
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
