//! System-wide constants and default paths.

use std::path::PathBuf;
use std::sync::OnceLock;

/// Pseudo-filesystems bound into a compartment before entering it.
///
/// Order matters: `/dev/pts` lives under `/dev`, so it must be bound
/// after it and released before it.
pub const CHROOT_DEVICES: [&str; 4] = ["/sys", "/proc", "/dev", "/dev/pts"];

/// Name of the configuration script executed inside a new compartment.
pub const COMPRT_CONFIG_FILE: &str = "comprtconfig";

/// Name of the optional package-includes file read during provisioning.
pub const COMPRT_INCLUDE_FILE: &str = "comprtinc";

/// Name of the shared configuration repository.
pub const CONFIGS_REPO_NAME: &str = "comprtconfigs";

/// URL of the shared configuration repository.
pub const CONFIGS_REPO_URL: &str = "https://github.com/comprt/comprtconfigs";

/// Uid (and gid) of the default compartment login user.
///
/// Derived from Debian's uid/gid class policy: dynamically allocated
/// system users end at 999, so 1224 is safely in the user range.
pub const DEFAULT_LOGIN_UID: libc::uid_t = 1224;

/// Login name given to the default compartment user.
pub const DEFAULT_LOGIN_NAME: &str = "comprt";

/// Default Debian package mirror.
pub const DEBIAN_MIRROR: &str = "http://ftp.us.debian.org/debian/";

/// Default Ubuntu package mirror.
pub const UBUNTU_MIRROR: &str = "http://archive.ubuntu.com/ubuntu/";

/// Application name used in CLI output and log messages.
pub const APP_NAME: &str = "comprt";

/// Default base directory for comprt data on Linux with root access.
pub const SYSTEM_DATA_DIR: &str = "/var/lib/comprt";

/// Returns the default package mirror for a distribution codename, if
/// one is known.
#[must_use]
pub fn default_mirror(codename: &str) -> Option<&'static str> {
    match codename {
        "buster" => Some(DEBIAN_MIRROR),
        "focal" | "hirsute" => Some(UBUNTU_MIRROR),
        _ => None,
    }
}

/// Returns the data directory, preferring `$HOME/.comprt` for non-root
/// environments, falling back to `/var/lib/comprt`.
fn resolve_data_dir() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        let user_dir = PathBuf::from(home).join(".comprt");
        if std::fs::create_dir_all(&user_dir).is_ok() {
            return user_dir;
        }
    }
    PathBuf::from(SYSTEM_DATA_DIR)
}

static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Returns the resolved data directory for this session.
pub fn data_dir() -> &'static PathBuf {
    DATA_DIR.get_or_init(resolve_data_dir)
}

/// Returns the default on-disk location of the configuration repository.
pub fn configs_repo_dir() -> PathBuf {
    data_dir().join(CONFIGS_REPO_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codenames_resolve_to_mirrors() {
        assert_eq!(default_mirror("buster"), Some(DEBIAN_MIRROR));
        assert_eq!(default_mirror("focal"), Some(UBUNTU_MIRROR));
        assert_eq!(default_mirror("hirsute"), Some(UBUNTU_MIRROR));
    }

    #[test]
    fn unknown_codename_has_no_mirror() {
        assert_eq!(default_mirror("warty"), None);
    }

    #[test]
    fn device_order_nests_dev_pts_under_dev() {
        let dev = CHROOT_DEVICES.iter().position(|d| *d == "/dev");
        let pts = CHROOT_DEVICES.iter().position(|d| *d == "/dev/pts");
        assert!(dev < pts, "/dev must be bound before /dev/pts");
    }
}
