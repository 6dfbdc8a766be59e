//! Packfile enumeration and trailer reads.
//!
//! Every packfile ends with a SHA-1 over its own content. Reading that trailer
//! is enough to tell whether pack storage changed, without inflating anything.

use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::storage::error::{StorageError, StorageResult};

/// Length of the checksum stored at the end of every packfile.
pub const PACK_TRAILER_LEN: usize = 20;

/// Lists `pack-<hash>.pack` files in a pack directory, sorted by file name.
///
/// A missing directory means no packs.
pub fn list_packfiles(pack_dir: &Path) -> StorageResult<Vec<PathBuf>> {
    let entries = match fs::read_dir(pack_dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(StorageError::Io(err)),
    };

    let mut packs = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }

        let name = entry.file_name();
        if is_pack_file(&name) {
            packs.push(entry.path());
        }
    }

    // read_dir order is filesystem-dependent
    packs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(packs)
}

/// Reads the trailing checksum of one packfile.
pub fn read_trailer(path: &Path) -> StorageResult<[u8; PACK_TRAILER_LEN]> {
    let mut file = File::open(path)?;

    let len = file.metadata()?.len();
    if len < PACK_TRAILER_LEN as u64 {
        return Err(StorageError::CorruptedData {
            path: path.to_path_buf(),
            reason: format!("packfile is {} bytes, shorter than its trailer", len),
        });
    }

    file.seek(SeekFrom::End(-(PACK_TRAILER_LEN as i64)))?;

    let mut checksum = [0u8; PACK_TRAILER_LEN];
    file.read_exact(&mut checksum)?;
    Ok(checksum)
}

/// Concatenated trailers of `packs`, in order.
pub fn concat_trailers(packs: &[PathBuf]) -> StorageResult<Vec<u8>> {
    let mut result = Vec::with_capacity(packs.len() * PACK_TRAILER_LEN);
    for pack in packs {
        result.extend_from_slice(&read_trailer(pack)?);
    }

    Ok(result)
}

/// Returns true for `pack-<hex>.pack`, with a SHA-1 or SHA-256 hex name.
fn is_pack_file(name: &OsStr) -> bool {
    let Some(name) = name.to_str() else {
        return false;
    };
    let Some(hash) = name.strip_prefix("pack-").and_then(|rest| rest.strip_suffix(".pack")) else {
        return false;
    };
    matches!(hash.len(), 40 | 64) && hash.bytes().all(|b| b.is_ascii_hexdigit())
}
