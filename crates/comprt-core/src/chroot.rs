//! Entering and leaving a compartment via chroot.
//!
//! The process root and working directory are process-global and have no
//! built-in undo, so a session captures everything needed to reverse the
//! swap before committing it: the caller's working directory, an open
//! file handle on the pre-swap root, and the record of mounts bound for
//! the session. [`ChrootSession::exit`] consumes the session, making the
//! one-shot release contract a move-semantics guarantee.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use comprt_common::constants::CHROOT_DEVICES;
use comprt_common::error::{ComprtError, Result};
use nix::unistd;

use crate::mount::MountTable;

/// Whether a session is currently open in this process.
///
/// chroot(2) has no concept of nesting, so a second concurrent session
/// would corrupt the first one's unwind path.
static SESSION_OPEN: AtomicBool = AtomicBool::new(false);

/// An open chroot session.
///
/// Created by [`ChrootSession::enter`]; the process runs inside the
/// target root until [`ChrootSession::exit`] restores the captured state.
/// Dropping a session without calling `exit` triggers a best-effort
/// restore that logs failures instead of reporting them; always prefer
/// the explicit exit.
#[derive(Debug)]
pub struct ChrootSession {
    return_dir: PathBuf,
    old_root: File,
    mounts: MountTable,
    restored: bool,
}

impl ChrootSession {
    /// Enters `target` as the new process root.
    ///
    /// Binds the canonical pseudo-filesystem set into the target, then
    /// chroots into it and moves to its root. A failure at any point
    /// unwinds every mount already bound, so a failed entry leaves the
    /// mount table exactly as it was found.
    ///
    /// # Errors
    ///
    /// Returns [`ComprtError::TargetNotFound`] if `target` is not an
    /// existing directory, [`ComprtError::SessionActive`] if this process
    /// already has an open session, or the underlying mount or root-swap
    /// error otherwise.
    pub fn enter(target: &Path) -> Result<Self> {
        if !target.is_dir() {
            return Err(ComprtError::TargetNotFound {
                path: target.to_path_buf(),
            });
        }
        if SESSION_OPEN
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ComprtError::SessionActive);
        }

        match Self::enter_locked(target) {
            Ok(session) => Ok(session),
            Err(err) => {
                SESSION_OPEN.store(false, Ordering::SeqCst);
                Err(err)
            }
        }
    }

    /// Entry steps that run while the session flag is held.
    fn enter_locked(target: &Path) -> Result<Self> {
        let return_dir = std::env::current_dir().map_err(|source| ComprtError::Io {
            path: PathBuf::from("."),
            source,
        })?;
        let old_root = File::open("/").map_err(|source| ComprtError::Io {
            path: PathBuf::from("/"),
            source,
        })?;

        let mut mounts = MountTable::new(target);
        if let Err(bind_err) = mounts.bind_all(&CHROOT_DEVICES) {
            rollback_mounts(&mut mounts);
            return Err(bind_err);
        }

        if let Err(swap_err) = swap_root(target, &old_root) {
            rollback_mounts(&mut mounts);
            return Err(swap_err);
        }

        tracing::info!(target = %target.display(), "entered chroot");
        Ok(Self {
            return_dir,
            old_root,
            mounts,
            restored: false,
        })
    }

    /// Leaves the chroot, restoring the captured root and working
    /// directory, then releasing the session's mounts.
    ///
    /// Restoring the root takes priority over a clean unmount: once the
    /// root and working directory are back, an unmount failure is
    /// reported but cannot undo the restoration.
    ///
    /// # Errors
    ///
    /// Returns [`ComprtError::RootSwap`] if the root or working directory
    /// could not be restored, or [`ComprtError::Unmount`] if a mount
    /// could not be released after the bounded retries.
    pub fn exit(mut self) -> Result<()> {
        self.restored = true;
        SESSION_OPEN.store(false, Ordering::SeqCst);

        unistd::fchdir(&self.old_root).map_err(|source| ComprtError::RootSwap {
            step: "fchdir",
            source,
        })?;
        unistd::chroot(".").map_err(|source| ComprtError::RootSwap {
            step: "chroot",
            source,
        })?;
        unistd::chdir(&self.return_dir).map_err(|source| ComprtError::RootSwap {
            step: "chdir",
            source,
        })?;
        tracing::info!("left chroot");

        self.mounts.unbind_all()
    }
}

impl Drop for ChrootSession {
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        tracing::warn!("chroot session dropped without exit, restoring root");
        if let Err(err) = unistd::fchdir(&self.old_root) {
            tracing::error!(%err, "could not move back to the previous root");
        } else if let Err(err) = unistd::chroot(".") {
            tracing::error!(%err, "could not restore the previous root");
        } else if let Err(err) = unistd::chdir(&self.return_dir) {
            tracing::error!(%err, "could not restore the working directory");
        } else if let Err(err) = self.mounts.unbind_all() {
            tracing::error!(%err, "could not release session mounts");
        }
        SESSION_OPEN.store(false, Ordering::SeqCst);
    }
}

/// Commits the root swap: chroot into `target`, then move to its root.
///
/// If the chroot succeeds but the directory change fails, the process
/// climbs back out through `old_root` before the error is returned, so
/// the caller's unwind always runs against the original mount table.
fn swap_root(target: &Path, old_root: &File) -> Result<()> {
    unistd::chroot(target).map_err(|source| ComprtError::RootSwap {
        step: "chroot",
        source,
    })?;
    if let Err(source) = unistd::chdir("/") {
        if let Err(err) = unistd::fchdir(old_root).and_then(|()| unistd::chroot(".")) {
            tracing::error!(%err, "could not climb back out of the half-entered chroot");
        }
        return Err(ComprtError::RootSwap {
            step: "chdir",
            source,
        });
    }
    Ok(())
}

/// Unwinds the mounts of a failed entry; the entry error is what the
/// caller sees, so a rollback failure is only logged.
fn rollback_mounts(mounts: &mut MountTable) {
    if let Err(err) = mounts.unbind_all() {
        tracing::error!(%err, "rollback left a mount behind");
    }
}
