//! Bind mounts for compartment pseudo-filesystems.
//!
//! A chroot is only usable once the kernel's pseudo-filesystems are
//! visible inside it. [`MountTable`] binds an ordered set of device paths
//! into a target tree and releases them in reverse order, absorbing the
//! transient `EBUSY` a bind mount can report right after processes inside
//! the chroot have finished.

use std::fs::DirBuilder;
use std::os::unix::fs::DirBuilderExt;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use comprt_common::error::{ComprtError, Result};
use nix::errno::Errno;
use nix::mount::{MntFlags, MsFlags, mount, umount2};

/// Delays applied while retrying a busy unmount.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Wait before the single in-place retry of a busy unmount.
    pub busy_retry: Duration,
    /// Wait before the final attempt on a deferred unmount.
    pub backlog_retry: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            busy_retry: Duration::from_secs(1),
            backlog_retry: Duration::from_secs(2),
        }
    }
}

/// How the first unmount pass ended for one device.
#[derive(Debug, PartialEq, Eq)]
enum FirstPass {
    /// The mount was released, or the path was never a mount point.
    Clean,
    /// Still held after the in-place retry; queued for the second pass.
    Deferred,
}

/// Ordered record of pseudo-filesystems bound into one target tree.
///
/// The record grows as [`MountTable::bind_all`] progresses and is drained
/// in reverse mount order by [`MountTable::unbind_all`], so a partially
/// failed bind can always be rolled back exactly.
#[derive(Debug)]
pub struct MountTable {
    target: PathBuf,
    bound: Vec<PathBuf>,
    policy: RetryPolicy,
}

impl MountTable {
    /// Creates an empty mount record for `target`.
    #[must_use]
    pub fn new(target: &Path) -> Self {
        Self::with_policy(target, RetryPolicy::default())
    }

    /// Creates an empty mount record with a custom retry policy.
    #[must_use]
    pub fn with_policy(target: &Path, policy: RetryPolicy) -> Self {
        Self {
            target: target.to_path_buf(),
            bound: Vec::new(),
            policy,
        }
    }

    /// Devices currently bound, in mount order.
    #[must_use]
    pub fn bound(&self) -> &[PathBuf] {
        &self.bound
    }

    /// Bind-mounts each device, in order, onto its mirror path under the
    /// target. Missing mount point directories are created; pre-existing
    /// ones are left untouched.
    ///
    /// Stops at the first failure. The record then holds exactly the
    /// devices bound before the failure, so [`MountTable::unbind_all`]
    /// rolls back precisely what was done.
    ///
    /// # Errors
    ///
    /// Returns [`ComprtError::Io`] if a mount point directory cannot be
    /// created, or [`ComprtError::Mount`] naming the device whose
    /// mount(2) call failed.
    pub fn bind_all(&mut self, devices: &[&str]) -> Result<()> {
        for &device in devices {
            let mount_point = self.mount_point(device);
            ensure_mount_point(&mount_point, device)?;
            tracing::debug!(device, mount_point = %mount_point.display(), "bind mounting");
            mount(
                Some(Path::new(device)),
                &mount_point,
                None::<&str>,
                MsFlags::MS_BIND,
                None::<&str>,
            )
            .map_err(|source| ComprtError::Mount {
                device: PathBuf::from(device),
                source,
            })?;
            self.bound.push(PathBuf::from(device));
        }
        Ok(())
    }

    /// Releases every bound device, last-mounted first.
    ///
    /// Each device gets one attempt; a busy mount is retried once in
    /// place after a short delay. A device that still will not release is
    /// deferred, and after all others have been processed it gets a final
    /// attempt after a longer delay. Paths that turn out not to be mount
    /// points are treated as already clean. Devices already unmounted are
    /// skipped without error, so calling this twice is harmless.
    ///
    /// # Errors
    ///
    /// Returns [`ComprtError::Unmount`] naming the first device that
    /// could not be released.
    pub fn unbind_all(&mut self) -> Result<()> {
        let mut backlog: Vec<PathBuf> = Vec::new();
        while let Some(device) = self.bound.pop() {
            if self.release_device(&device)? == FirstPass::Deferred {
                backlog.push(device);
            }
        }

        for device in backlog {
            let mount_point = self.mount_point(&device);
            thread::sleep(self.policy.backlog_retry);
            match umount2(&mount_point, MntFlags::empty()) {
                Ok(()) => tracing::debug!(device = %device.display(), "released after deferral"),
                Err(Errno::EINVAL) => {
                    tracing::debug!(device = %device.display(), "not a mount point");
                }
                Err(source) => {
                    return Err(ComprtError::Unmount {
                        device: device.clone(),
                        source,
                    });
                }
            }
        }
        Ok(())
    }

    /// First unmount pass for one device: attempt, short-delay retry on
    /// `EBUSY`, deferral on a second failure.
    fn release_device(&self, device: &Path) -> Result<FirstPass> {
        let mount_point = self.mount_point(device);
        match umount2(&mount_point, MntFlags::empty()) {
            Ok(()) => Ok(FirstPass::Clean),
            Err(Errno::EINVAL) => {
                tracing::debug!(device = %device.display(), "not a mount point");
                Ok(FirstPass::Clean)
            }
            Err(Errno::EBUSY) => {
                tracing::warn!(device = %device.display(), "mount point busy, retrying");
                thread::sleep(self.policy.busy_retry);
                match umount2(&mount_point, MntFlags::empty()) {
                    Ok(()) => Ok(FirstPass::Clean),
                    Err(source) => {
                        tracing::warn!(
                            device = %device.display(),
                            %source,
                            "still held, deferring to final pass"
                        );
                        Ok(FirstPass::Deferred)
                    }
                }
            }
            Err(source) => Err(ComprtError::Unmount {
                device: device.to_path_buf(),
                source,
            }),
        }
    }

    /// Mirror path of `device` under the target tree.
    fn mount_point(&self, device: impl AsRef<Path>) -> PathBuf {
        let relative = device
            .as_ref()
            .strip_prefix("/")
            .map_or_else(|_| device.as_ref().to_path_buf(), Path::to_path_buf);
        self.target.join(relative)
    }
}

/// Creates the mount point directory if it does not exist, with the mode
/// the device conventionally carries (`/sys` and `/proc` are read-only
/// for everyone; device trees are writable by root).
fn ensure_mount_point(mount_point: &Path, device: &str) -> Result<()> {
    if mount_point.exists() {
        return Ok(());
    }
    let mode = mount_point_mode(device);
    DirBuilder::new()
        .mode(mode)
        .create(mount_point)
        .map_err(|source| ComprtError::Io {
            path: mount_point.to_path_buf(),
            source,
        })
}

/// Permission bits for a freshly created mount point.
fn mount_point_mode(device: &str) -> u32 {
    match device {
        "/sys" | "/proc" => 0o555,
        _ => 0o755,
    }
}
