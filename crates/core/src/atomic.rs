//! Crash-safe file replacement.
//!
//! Payloads are written to a sibling `.scratch` file, flushed, then renamed
//! over the target. Readers of the target therefore see either the previous
//! complete content or the new complete content.

use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::error::{DatabaseError, Result};

/// Extension used for in-flight writes.
pub const SCRATCH_EXTENSION: &str = "scratch";

/// Scratch path colocated with `path`: same directory and stem, `.scratch` extension.
pub fn scratch_path(path: &Path) -> PathBuf {
    path.with_extension(SCRATCH_EXTENSION)
}

/// Atomically replace `path` with `bytes`.
///
/// A failed rename is not retried and the scratch file stays on disk.
pub fn write(path: &Path, bytes: &[u8]) -> Result<()> {
    let scratch = scratch_path(path);

    let mut file =
        File::create(&scratch).map_err(|err| DatabaseError::io("create", &scratch, err))?;
    file.write_all(bytes)
        .map_err(|err| DatabaseError::io("write", &scratch, err))?;
    file.sync_all()
        .map_err(|err| DatabaseError::io("sync", &scratch, err))?;
    drop(file);

    fs::rename(&scratch, path).map_err(|err| DatabaseError::io("rename", &scratch, err))?;
    debug!("wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn scratch_sits_next_to_target() {
        let target = Path::new("/data/0000000000000abc.game");
        assert_eq!(
            scratch_path(target),
            PathBuf::from("/data/0000000000000abc.scratch")
        );
        assert_eq!(
            scratch_path(Path::new("/data/players.json")),
            PathBuf::from("/data/players.scratch")
        );
    }

    #[test]
    fn write_creates_and_replaces() -> Result<()> {
        let dir = tempdir()?;
        let target = dir.path().join("players.json");

        write(&target, b"first")?;
        assert_eq!(fs::read(&target)?, b"first");

        write(&target, b"second, longer payload")?;
        assert_eq!(fs::read(&target)?, b"second, longer payload");
        assert!(!scratch_path(&target).exists());
        Ok(())
    }

    #[test]
    fn failed_rename_keeps_scratch_file() -> Result<()> {
        let dir = tempdir()?;
        // A non-empty directory at the target path makes the rename fail.
        let target = dir.path().join("blocked.game");
        fs::create_dir(&target)?;
        fs::write(target.join("child"), b"x")?;

        let err = write(&target, b"payload").unwrap_err();
        assert!(matches!(err, DatabaseError::Io { action: "rename", .. }));
        assert_eq!(fs::read(scratch_path(&target))?, b"payload");
        Ok(())
    }
}
