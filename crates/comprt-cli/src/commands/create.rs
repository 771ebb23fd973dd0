//! `comprt create` — Create a Debian compartment.

use std::path::PathBuf;

use clap::Args;
use comprt_common::config::ProvisionConfig;
use comprt_common::constants;
use comprt_common::error::ComprtError;
use regex::Regex;

/// Arguments for the `create` command.
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Distribution codename to bootstrap (e.g. buster).
    pub codename: String,

    /// Existing directory that becomes the compartment root.
    pub target: PathBuf,

    /// Package mirror; resolved from the codename when omitted.
    pub mirror: Option<String>,

    /// Use a named configuration from the shared repository.
    #[arg(short, long, conflicts_with_all = ["crypt_password", "config_path"])]
    pub alias: Option<String>,

    /// Preprocess the alias files with these variables set (NAME=VALUE).
    #[arg(
        short = 'e',
        long = "alias-envvar",
        value_name = "NAME=VALUE",
        requires = "alias"
    )]
    pub alias_envvar: Vec<String>,

    /// Pass the remaining flags through to debootstrap verbatim.
    #[arg(long, value_name = "FLAG", allow_hyphen_values = true, num_args = 1..)]
    pub passthrough: Vec<String>,

    /// Quiet (no child process output).
    #[arg(short, long)]
    pub quiet: bool,

    /// Alternative path to the compartment includes file.
    #[arg(short = 'i', long, value_name = "PATH")]
    pub includes_path: Option<PathBuf>,

    /// Alternative path to the compartment config script.
    #[arg(short = 'c', long, value_name = "PATH")]
    pub config_path: Option<PathBuf>,

    /// Crypt(3) password hash for the default compartment user.
    #[arg(short = 'p', long, value_name = "HASH")]
    pub crypt_password: Option<String>,
}

/// Executes the `create` command.
///
/// # Errors
///
/// Returns an error if the target does not exist, no mirror can be
/// determined, an env var override is malformed, or provisioning fails.
pub fn execute(args: CreateArgs) -> anyhow::Result<()> {
    if !args.target.is_dir() {
        return Err(ComprtError::TargetNotFound { path: args.target }.into());
    }

    let mirror = match args.mirror {
        Some(mirror) => mirror,
        None => constants::default_mirror(&args.codename)
            .ok_or_else(|| ComprtError::Config {
                message: format!("no default mirror known for codename {:?}", args.codename),
            })?
            .to_string(),
    };
    let env_overrides = parse_env_overrides(&args.alias_envvar)?;

    tracing::info!(codename = %args.codename, target = %args.target.display(), "creating compartment");

    let mut config = ProvisionConfig {
        codename: args.codename,
        target: args.target,
        mirror,
        crypt_password: args.crypt_password.unwrap_or_default(),
        passthrough_flags: args.passthrough,
        quiet: args.quiet,
        ..ProvisionConfig::default()
    };
    if let Some(path) = args.config_path {
        config.config_path = path;
    }
    if let Some(path) = args.includes_path {
        config.includes_path = path;
    }
    if let Some(alias) = &args.alias {
        let paths = comprt_runtime::repo::fetch_alias_config(alias, &env_overrides)?;
        config.config_path = paths.config_path;
        config.includes_path = paths.includes_path;
        // Alias configurations manage their own users.
        config.create_default_user = false;
    }

    comprt_runtime::provision::provision(&config)?;
    Ok(())
}

/// Splits `NAME=VALUE` override strings, rejecting malformed ones.
fn parse_env_overrides(pairs: &[String]) -> Result<Vec<(String, String)>, ComprtError> {
    let format = Regex::new(r"^(?P<name>[A-Za-z_]\w*)=(?P<value>.+)$").map_err(|err| {
        ComprtError::Config {
            message: format!("invalid env var pattern: {err}"),
        }
    })?;

    pairs
        .iter()
        .map(|pair| {
            let captures = format.captures(pair).ok_or_else(|| ComprtError::Config {
                message: format!("{pair:?} is not a properly formatted env var"),
            })?;
            Ok((captures["name"].to_string(), captures["value"].to_string()))
        })
        .collect()
}
