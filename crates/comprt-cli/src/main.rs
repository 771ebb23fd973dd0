//! # comprt — compartment CLI
//!
//! Creates debootstrap-populated Debian compartments and opens
//! interactive chroot sessions inside them.

mod commands;

use clap::Parser;

use crate::commands::Cli;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
        )
        .init();

    let cli = Cli::parse();

    // Bind mounts and chroot need CAP_SYS_ADMIN/CAP_SYS_CHROOT.
    if !nix::unistd::Uid::effective().is_root() {
        return Err(comprt_common::error::ComprtError::NotRoot.into());
    }

    commands::execute(cli)
}
