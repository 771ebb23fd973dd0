//! Resolving and running external tools.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use comprt_common::error::{ComprtError, Result};

/// Resolves `name` on the current `PATH`.
///
/// Lookup happens in whatever root the process currently has, so a tool
/// needed inside a compartment must be resolved after entering it.
///
/// # Errors
///
/// Returns [`ComprtError::NotFound`] if the binary is not on `PATH`.
pub fn find_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| ComprtError::NotFound {
        kind: "required binary",
        id: name.to_string(),
    })
}

/// Runs a prepared command to completion.
///
/// Stdio is inherited from this process unless `quiet`, in which case
/// the child's output is discarded.
///
/// # Errors
///
/// Returns [`ComprtError::Io`] if the child could not be spawned, or
/// [`ComprtError::CommandFailed`] if it exited unsuccessfully.
pub fn run_checked(cmd: &mut Command, quiet: bool) -> Result<()> {
    if quiet {
        let _ = cmd.stdout(Stdio::null()).stderr(Stdio::null());
    }
    let program = cmd.get_program().to_string_lossy().into_owned();
    tracing::debug!(%program, "running external tool");

    let status = cmd.status().map_err(|source| ComprtError::Io {
        path: PathBuf::from(&program),
        source,
    })?;
    if status.success() {
        Ok(())
    } else {
        Err(ComprtError::CommandFailed { program, status })
    }
}
