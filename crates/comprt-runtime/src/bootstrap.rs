//! Debootstrap argument assembly and invocation.

use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::Command;

use comprt_common::config::ProvisionConfig;
use comprt_common::error::{ComprtError, Result};

use crate::exec;

/// Reads the optional package-includes file.
///
/// The file is one package name per line. A missing file simply means no
/// extra packages; only a read failure on an existing file is an error.
///
/// # Errors
///
/// Returns [`ComprtError::Io`] if an existing file cannot be read.
pub fn read_include_packages(path: &Path) -> Result<Vec<String>> {
    let Ok(file) = std::fs::File::open(path) else {
        return Ok(Vec::new());
    };

    let mut packages = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|source| ComprtError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        packages.push(line);
    }
    Ok(packages)
}

/// Assembles the debootstrap argument list for one provisioning run:
/// the include list (when present), any passthrough flags verbatim, then
/// the positional `CODENAME TARGET MIRROR` triple.
///
/// # Errors
///
/// Returns [`ComprtError::Io`] if the includes file exists but cannot
/// be read.
pub fn debootstrap_args(config: &ProvisionConfig) -> Result<Vec<String>> {
    let mut args = Vec::new();

    let includes = read_include_packages(&config.includes_path)?;
    if !includes.is_empty() {
        args.push(format!("--include={}", includes.join(",")));
    }
    args.extend(config.passthrough_flags.iter().cloned());
    args.push(config.codename.clone());
    args.push(config.target.display().to_string());
    args.push(config.mirror.clone());

    Ok(args)
}

/// Populates the target tree by running debootstrap.
///
/// # Errors
///
/// Returns [`ComprtError::NotFound`] if debootstrap is not installed,
/// or [`ComprtError::CommandFailed`] if it exits unsuccessfully.
pub fn run_debootstrap(config: &ProvisionConfig) -> Result<()> {
    let debootstrap = exec::find_tool("debootstrap")?;
    let args = debootstrap_args(config)?;
    tracing::info!(
        codename = config.codename,
        target = %config.target.display(),
        "bootstrapping compartment"
    );
    exec::run_checked(Command::new(debootstrap).args(args), config.quiet)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use std::path::PathBuf;

    use super::*;

    fn config_with(dir: &Path) -> ProvisionConfig {
        ProvisionConfig {
            codename: "buster".into(),
            target: PathBuf::from("/srv/compartment"),
            mirror: "http://ftp.us.debian.org/debian/".into(),
            includes_path: dir.join("comprtinc"),
            ..ProvisionConfig::default()
        }
    }

    #[test]
    fn missing_includes_file_contributes_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let args = debootstrap_args(&config_with(dir.path())).expect("args");
        assert_eq!(
            args,
            [
                "buster",
                "/srv/compartment",
                "http://ftp.us.debian.org/debian/"
            ]
        );
    }

    #[test]
    fn includes_file_becomes_a_single_include_flag() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("comprtinc"), "autoconf\ngit\nwget\n").expect("write");

        let args = debootstrap_args(&config_with(dir.path())).expect("args");
        assert_eq!(args[0], "--include=autoconf,git,wget");
        assert_eq!(&args[1..], ["buster", "/srv/compartment", "http://ftp.us.debian.org/debian/"]);
    }

    #[test]
    fn passthrough_flags_precede_the_positional_triple() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = config_with(dir.path());
        config.passthrough_flags = vec!["--variant=minbase".into(), "--no-check-gpg".into()];

        let args = debootstrap_args(&config).expect("args");
        assert_eq!(
            args,
            [
                "--variant=minbase",
                "--no-check-gpg",
                "buster",
                "/srv/compartment",
                "http://ftp.us.debian.org/debian/"
            ]
        );
    }

    #[test]
    fn read_include_packages_preserves_line_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("comprtinc");
        std::fs::write(&path, "zlib1g\nautoconf\n").expect("write");

        let packages = read_include_packages(&path).expect("read");
        assert_eq!(packages, ["zlib1g", "autoconf"]);
    }
}
