//! Fetching the shared configuration repository.
//!
//! Alias configurations live in a git repository cloned into the program
//! data directory. The system `git` binary does the fetching; this
//! module only decides between clone and update and derives the
//! per-alias file paths.

use std::path::PathBuf;
use std::process::Command;

use comprt_common::constants::{
    COMPRT_CONFIG_FILE, COMPRT_INCLUDE_FILE, CONFIGS_REPO_URL, configs_repo_dir,
};
use comprt_common::error::Result;

use crate::exec;

/// Per-alias configuration file locations inside the fetched repository.
#[derive(Debug, Clone)]
pub struct AliasPaths {
    /// Configuration script for the alias.
    pub config_path: PathBuf,
    /// Package-includes file for the alias.
    pub includes_path: PathBuf,
}

/// Ensures the configuration repository is present and current, then
/// returns the file paths for `alias`.
///
/// The repository is cloned on first use and updated afterwards; an
/// update failure is logged and tolerated since a stale copy is still
/// usable. When `preprocess_env` is non-empty the alias directory is
/// preprocessed with `make`, with those variables in its environment.
///
/// # Errors
///
/// Returns [`comprt_common::error::ComprtError::NotFound`] if `git` (or
/// `make`, when preprocessing) is not installed, or
/// [`comprt_common::error::ComprtError::CommandFailed`] if the clone or
/// the preprocessing fails.
pub fn fetch_alias_config(alias: &str, preprocess_env: &[(String, String)]) -> Result<AliasPaths> {
    let repo_dir = configs_repo_dir();
    let git = exec::find_tool("git")?;

    if repo_dir.is_dir() {
        tracing::debug!(repo = %repo_dir.display(), "updating configuration repository");
        if let Err(err) = exec::run_checked(
            Command::new(&git)
                .arg("-C")
                .arg(&repo_dir)
                .args(["pull", "origin"]),
            true,
        ) {
            tracing::warn!(%err, "could not update configuration repository, using local copy");
        }
    } else {
        tracing::info!(repo = %repo_dir.display(), "cloning configuration repository");
        exec::run_checked(
            Command::new(&git)
                .arg("clone")
                .arg(CONFIGS_REPO_URL)
                .arg(&repo_dir),
            true,
        )?;
    }

    if !preprocess_env.is_empty() {
        let make = exec::find_tool("make")?;
        exec::run_checked(
            Command::new(make)
                .arg("PREPROCESS_ALIASES=1")
                .arg(alias)
                .current_dir(&repo_dir)
                .envs(preprocess_env.iter().map(|(k, v)| (k.clone(), v.clone()))),
            true,
        )?;
    }

    Ok(AliasPaths {
        config_path: repo_dir.join(alias).join(COMPRT_CONFIG_FILE),
        includes_path: repo_dir.join(alias).join(COMPRT_INCLUDE_FILE),
    })
}
