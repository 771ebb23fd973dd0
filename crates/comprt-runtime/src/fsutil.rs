//! Small filesystem helpers.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

use comprt_common::error::{ComprtError, Result};

/// Copies `src` to `dest`, which must not already exist.
///
/// The destination is created executable (mode 0o755) since the copied
/// file is a configuration script run inside the compartment. File
/// attributes are not preserved.
///
/// # Errors
///
/// Returns [`ComprtError::Io`] if `src` cannot be read, or if `dest`
/// already exists or cannot be written.
pub fn copy_new(src: &Path, dest: &Path) -> Result<()> {
    let mut reader = File::open(src).map_err(|source| ComprtError::Io {
        path: src.to_path_buf(),
        source,
    })?;
    let mut writer = OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o755)
        .open(dest)
        .map_err(|source| ComprtError::Io {
            path: dest.to_path_buf(),
            source,
        })?;
    let _ = io::copy(&mut reader, &mut writer).map_err(|source| ComprtError::Io {
        path: dest.to_path_buf(),
        source,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    #[test]
    fn copies_content_and_marks_executable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let src = dir.path().join("script");
        let dest = dir.path().join("copy");
        std::fs::write(&src, "#!/bin/sh\ntrue\n").expect("write src");

        copy_new(&src, &dest).expect("copy");
        assert_eq!(std::fs::read(&dest).expect("read"), b"#!/bin/sh\ntrue\n");
        let mode = std::fs::metadata(&dest).expect("stat").permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn never_overwrites_an_existing_destination() {
        let dir = tempfile::tempdir().expect("tempdir");
        let src = dir.path().join("script");
        let dest = dir.path().join("copy");
        std::fs::write(&src, "new").expect("write src");
        std::fs::write(&dest, "old").expect("write dest");

        let err = copy_new(&src, &dest).expect_err("existing dest must be refused");
        match err {
            ComprtError::Io { source, .. } => {
                assert_eq!(source.kind(), io::ErrorKind::AlreadyExists);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(std::fs::read(&dest).expect("read"), b"old");
    }
}
