//! Reading inputs and publishing outputs
//!
//! Outputs are built in a temporary file next to the destination and
//! renamed into place only once complete, so a failed run never leaves a
//! partial file behind.

use serde::Serialize;
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};

pub fn read_json(path: &Path) -> Result<Value> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| Error::json(path, e))
}

/// Fail early if `path` exists and overwriting was not requested
pub fn check_destination(path: &Path, force: bool) -> Result<()> {
    if !force && path.exists() {
        return Err(Error::DestinationExists(path.to_path_buf()));
    }
    Ok(())
}

/// Create an empty temporary file in the destination's directory
pub fn staging_file(target: &Path) -> Result<NamedTempFile> {
    let dir = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    tempfile::Builder::new()
        .prefix(".starfield-db-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| Error::io(dir, e))
}

/// Move a finished staging file onto `target`
pub fn publish(staged: NamedTempFile, target: &Path, force: bool) -> Result<()> {
    let result = if force {
        staged.persist(target)
    } else {
        staged.persist_noclobber(target)
    };

    // On failure the PersistError owns the temp file and deletes it on drop
    result.map_err(|e| match e.error.kind() {
        ErrorKind::AlreadyExists => Error::DestinationExists(target.to_path_buf()),
        _ => Error::io(target, e.error),
    })?;
    Ok(())
}

/// Serialize `value` as pretty JSON and atomically publish it at `target`
pub fn write_json_atomic<T: Serialize>(target: &Path, value: &T, force: bool) -> Result<()> {
    let staged = staging_file(target)?;
    {
        let mut writer = BufWriter::new(staged.as_file());
        serde_json::to_writer_pretty(&mut writer, value).map_err(|e| Error::json(target, e))?;
        writer.write_all(b"\n").map_err(|e| Error::io(target, e))?;
        writer.flush().map_err(|e| Error::io(target, e))?;
    }
    publish(staged, target, force)
}
