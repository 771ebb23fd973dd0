//! Interactive login sessions inside a compartment.

use std::path::Path;
use std::process::Command;

use comprt_common::constants::DEFAULT_LOGIN_UID;
use comprt_common::error::{ComprtError, Result};
use comprt_core::chroot::ChrootSession;
use comprt_core::locate::locate_field;
use regex::Regex;

use crate::exec;

/// Passwd field holding the login name.
const LOGIN_NAME_FIELD: usize = 0;
/// Passwd field holding the uid.
const UID_FIELD: usize = 2;

/// Resolves the default login name from a compartment's passwd file.
///
/// Looks outside the chroot, so it can run before the session opens.
///
/// # Errors
///
/// Returns [`ComprtError::Io`] if the passwd file cannot be read, or
/// [`ComprtError::Config`] if a lookup pattern fails to compile.
pub fn resolve_login(target: &Path) -> Result<Option<String>> {
    let field_sep = lookup_pattern(":")?;
    let uid_pattern = lookup_pattern(&format!("^{DEFAULT_LOGIN_UID}$"))?;
    locate_field(
        &target.join("etc/passwd"),
        &field_sep,
        UID_FIELD,
        LOGIN_NAME_FIELD,
        &uid_pattern,
    )
}

/// Opens an interactive login shell for the default user inside the
/// compartment at `target`, blocking until the shell exits.
///
/// # Errors
///
/// Returns [`ComprtError::NotFound`] if the compartment has no user
/// with the default uid or lacks `bash`/`su`, any chroot session error,
/// or [`ComprtError::CommandFailed`] if the shell exits unsuccessfully.
pub fn interactive(target: &Path) -> Result<()> {
    let login = resolve_login(target)?.ok_or_else(|| ComprtError::NotFound {
        kind: "login name for uid",
        id: DEFAULT_LOGIN_UID.to_string(),
    })?;

    let session = ChrootSession::enter(target)?;
    let outcome = spawn_login_shell(&login);

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

/// Spawns `su` with a bash login shell, inheriting this process's stdio.
///
/// Must be called inside the chroot window: both binaries are resolved
/// from the compartment's own `PATH`.
fn spawn_login_shell(login: &str) -> Result<()> {
    let bash = exec::find_tool("bash")?;
    let su = exec::find_tool("su")?;
    tracing::info!(login, "opening interactive session");
    exec::run_checked(
        Command::new(su)
            .arg("--shell")
            .arg(bash)
            .arg("--login")
            .arg(login),
        false,
    )
}

fn lookup_pattern(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|err| ComprtError::Config {
        message: format!("invalid lookup pattern {pattern:?}: {err}"),
    })
}
