//! `comprt chroot` — Open an interactive shell inside a compartment.

use std::path::PathBuf;

use clap::Args;

/// Arguments for the `chroot` command.
#[derive(Args, Debug)]
pub struct ChrootArgs {
    /// Compartment root directory to enter.
    pub target: PathBuf,
}

/// Executes the `chroot` command.
///
/// Resolves the default compartment user, enters the target, and hands
/// the terminal to a login shell until it exits.
///
/// # Errors
///
/// Returns an error if the compartment has no default user, if the
/// chroot session cannot be opened or closed, or if the shell fails.
pub fn execute(args: ChrootArgs) -> anyhow::Result<()> {
    comprt_runtime::shell::interactive(&args.target)?;
    Ok(())
}
