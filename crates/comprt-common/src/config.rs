//! Configuration model for compartment provisioning.

use std::path::PathBuf;

/// Everything needed to provision one compartment.
///
/// Assembled by the CLI from flags and positional arguments; consumed by
/// the runtime crate.
#[derive(Debug, Clone)]
pub struct ProvisionConfig {
    /// Distribution codename handed to the bootstrap tool (e.g. `buster`).
    pub codename: String,
    /// Directory that becomes the compartment root. Must already exist.
    pub target: PathBuf,
    /// Package mirror URL.
    pub mirror: String,
    /// Path to the configuration script copied into the compartment.
    pub config_path: PathBuf,
    /// Path to the optional package-includes file.
    pub includes_path: PathBuf,
    /// Crypt(3)-hashed password for the default user, if one is to be set.
    pub crypt_password: String,
    /// Extra flags passed through to the bootstrap tool verbatim.
    pub passthrough_flags: Vec<String>,
    /// Whether to create the default login user and group.
    ///
    /// Disabled when an alias configuration is used, since aliases manage
    /// their own users.
    pub create_default_user: bool,
    /// Suppress child process output.
    pub quiet: bool,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            codename: String::new(),
            target: PathBuf::new(),
            mirror: String::new(),
            config_path: PathBuf::from(".").join(crate::constants::COMPRT_CONFIG_FILE),
            includes_path: PathBuf::from(".").join(crate::constants::COMPRT_INCLUDE_FILE),
            crypt_password: String::new(),
            passthrough_flags: Vec::new(),
            create_default_user: true,
            quiet: false,
        }
    }
}
