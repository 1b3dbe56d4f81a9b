// SPDX-License-Identifier: MIT
//! Header creation and validation

use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use crate::format::{
    decode_header, file_size_for, DbHeader, DB_MAGIC, DB_VERSION, HEADER_SIZE,
};
use crate::store::FileStore;

/// Header for a freshly created, empty database
pub fn make_new_header() -> DbHeader {
    DbHeader {
        magic: DB_MAGIC,
        version: DB_VERSION,
        count: 0,
        filesize: HEADER_SIZE as u32,
    }
}

/// Check magic and version. Magic is checked first so a foreign file is
/// always reported as corrupt, whatever its version bytes hold.
pub fn validate(header: &DbHeader) -> DbResult<()> {
    if header.magic != DB_MAGIC {
        return Err(DbError::CorruptHeader {
            found: header.magic,
            expected: DB_MAGIC,
        });
    }

    if header.version != DB_VERSION {
        return Err(DbError::UnsupportedVersion {
            found: header.version,
            expected: DB_VERSION,
        });
    }

    Ok(())
}

/// Read the header block from offset 0 and validate it.
///
/// Leaves the store positioned at the first record.
pub fn load_and_validate(store: &mut FileStore) -> DbResult<DbHeader> {
    store.rewind()?;
    let bytes = store.read_exact(HEADER_SIZE)?;
    let header = decode_header(&bytes)?;
    validate(&header)?;

    let expected = file_size_for(header.count as usize);
    if u64::from(header.filesize) != expected {
        warn!(
            "Header filesize {} disagrees with count {} (expected {}); using count",
            header.filesize, header.count, expected
        );
    }

    debug!(
        "Validated header: version={}, count={}",
        header.version, header.count
    );
    Ok(header)
}
