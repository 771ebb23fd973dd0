//! End-to-end compartment provisioning.
//!
//! `create` flow: copy the configuration script into the target, run
//! debootstrap to populate it, then enter the chroot to run the script
//! and (unless an alias manages its own users) create the default login
//! user. The chroot session is exited on every path, success or not.

use std::path::Path;
use std::process::Command;

use comprt_common::config::ProvisionConfig;
use comprt_common::constants::{COMPRT_CONFIG_FILE, DEFAULT_LOGIN_NAME, DEFAULT_LOGIN_UID};
use comprt_common::error::Result;
use comprt_core::chroot::ChrootSession;

use crate::{bootstrap, exec, fsutil};

/// Provisions one compartment from scratch.
///
/// # Errors
///
/// Returns the first error from script copying, debootstrap, the chroot
/// session, the configuration script, or user creation. An error after
/// the chroot was entered is reported only after the session has been
/// exited (an exit failure on that path is logged, not returned, so the
/// original cause is preserved).
pub fn provision(config: &ProvisionConfig) -> Result<()> {
    fsutil::copy_new(&config.config_path, &config.target.join(COMPRT_CONFIG_FILE))?;
    bootstrap::run_debootstrap(config)?;
    configure(config)
}

/// Runs the in-compartment half of provisioning.
fn configure(config: &ProvisionConfig) -> Result<()> {
    let session = ChrootSession::enter(&config.target)?;
    let outcome = run_config_script(config).and_then(|()| {
        if config.create_default_user {
            create_default_user(config)
        } else {
            Ok(())
        }
    });

    match outcome {
        Ok(()) => session.exit(),
        Err(err) => {
            if let Err(exit_err) = session.exit() {
                tracing::error!(%exit_err, "could not leave the compartment cleanly");
            }
            Err(err)
        }
    }
}

/// Runs the copied configuration script at the compartment root.
///
/// Must be called inside the chroot window: the shell is resolved from
/// the compartment's own `PATH`.
fn run_config_script(config: &ProvisionConfig) -> Result<()> {
    let sh = exec::find_tool("sh")?;
    let script = Path::new("/").join(COMPRT_CONFIG_FILE);
    tracing::info!(script = %script.display(), "running configuration script");
    exec::run_checked(Command::new(sh).arg(script), config.quiet)
}

/// Creates the default login group and user inside the compartment.
fn create_default_user(config: &ProvisionConfig) -> Result<()> {
    let uid = DEFAULT_LOGIN_UID.to_string();

    let groupadd = exec::find_tool("groupadd")?;
    exec::run_checked(
        Command::new(groupadd)
            .args(["--gid", &uid])
            .arg(DEFAULT_LOGIN_NAME),
        config.quiet,
    )?;

    let useradd = exec::find_tool("useradd")?;
    exec::run_checked(
        Command::new(useradd)
            .args(["--create-home", "--home-dir", "/home/comprt"])
            .args(["--uid", &uid, "--gid", &uid])
            .args(["--shell", "/bin/bash"])
            .arg(DEFAULT_LOGIN_NAME)
            .args(["--password", &config.crypt_password]),
        config.quiet,
    )
}
