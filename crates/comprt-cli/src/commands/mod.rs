//! CLI command definitions and dispatch.

pub mod chroot;
pub mod create;

use clap::{Parser, Subcommand};

/// comprt — manages Debian compartments populated by debootstrap.
#[derive(Parser, Debug)]
#[command(name = "comprt", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a compartment: bootstrap, configure, add the default user.
    Create(create::CreateArgs),
    /// Open an interactive shell inside an existing compartment.
    Chroot(chroot::ChrootArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Create(args) => create::execute(args),
        Command::Chroot(args) => chroot::execute(args),
    }
}
