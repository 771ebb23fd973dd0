//! Unified error types for the comprt workspace.
//!
//! All crates in the workspace report failures through [`ComprtError`].
//! Mount and root-swap variants carry the raw [`nix::errno::Errno`] so
//! callers can distinguish transient conditions (a busy mount point) from
//! fatal ones.

use std::path::PathBuf;
use std::process::ExitStatus;

use nix::errno::Errno;
use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum ComprtError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value or flag combination is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// A required resource was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Type of the missing resource.
        kind: &'static str,
        /// Identifier of the missing resource.
        id: String,
    },

    /// The compartment target directory does not exist.
    #[error("target is not an existing directory: {path}")]
    TargetNotFound {
        /// Path that was expected to be a directory.
        path: PathBuf,
    },

    /// Another chroot session is already open in this process.
    ///
    /// The process root is global state, so at most one session may be
    /// open at a time.
    #[error("a chroot session is already active in this process")]
    SessionActive,

    /// The effective user is not root.
    #[error("must be run as root")]
    NotRoot,

    /// A bind mount into the compartment failed.
    #[error("failed to bind {device}: {source}")]
    Mount {
        /// Device path that could not be bound.
        device: PathBuf,
        /// Errno reported by mount(2).
        source: Errno,
    },

    /// A mount could not be released, even after retrying.
    #[error("failed to unmount {device}: {source}")]
    Unmount {
        /// Device path that could not be released.
        device: PathBuf,
        /// Errno reported by umount2(2) on the final attempt.
        source: Errno,
    },

    /// Changing the process root or working directory failed.
    #[error("root swap failed during {step}: {source}")]
    RootSwap {
        /// The operation that failed (`chroot`, `chdir`, `fchdir`).
        step: &'static str,
        /// Errno reported by the failing call.
        source: Errno,
    },

    /// A line matched a field lookup but is missing the requested field.
    #[error("matched line in {path} has too few fields")]
    FieldCount {
        /// File being searched.
        path: PathBuf,
    },

    /// A spawned program exited unsuccessfully.
    #[error("{program} failed: {status}")]
    CommandFailed {
        /// Program that was executed.
        program: String,
        /// Exit status reported by the child.
        status: ExitStatus,
    },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, ComprtError>;
