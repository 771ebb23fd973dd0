//! Integration tests for the runtime crate's pure pieces.
//!
//! Provisioning itself needs debootstrap, network access, and root, so
//! it is exercised manually; everything that can run against fixture
//! trees is covered here.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use comprt_runtime::shell::resolve_login;

fn fixture_compartment(passwd: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::create_dir(dir.path().join("etc")).expect("mkdir etc");
    std::fs::write(dir.path().join("etc/passwd"), passwd).expect("write passwd");
    dir
}

#[test]
fn default_login_resolves_by_uid() {
    let dir = fixture_compartment(
        "root:x:0:0:root:/root:/bin/bash\n\
         daemon:x:1:1:daemon:/usr/sbin:/usr/sbin/nologin\n\
         comprt:x:1224:1224::/home/comprt:/bin/bash\n",
    );

    let login = resolve_login(dir.path()).expect("lookup");
    assert_eq!(login.as_deref(), Some("comprt"));
}

#[test]
fn renamed_default_user_is_still_found() {
    // The login name is whatever the passwd row says; only the uid is fixed.
    let dir = fixture_compartment("builder:x:1224:1224::/home/builder:/bin/sh\n");

    let login = resolve_login(dir.path()).expect("lookup");
    assert_eq!(login.as_deref(), Some("builder"));
}

#[test]
fn compartment_without_default_user_yields_none() {
    let dir = fixture_compartment("root:x:0:0:root:/root:/bin/bash\n");

    let login = resolve_login(dir.path()).expect("lookup");
    assert_eq!(login, None);
}

#[test]
fn uid_match_is_exact_not_a_substring() {
    // 12240 and 11224 must not satisfy a lookup for 1224.
    let dir = fixture_compartment(
        "near:x:12240:12240::/home/near:/bin/bash\n\
         nearer:x:11224:11224::/home/nearer:/bin/bash\n",
    );

    let login = resolve_login(dir.path()).expect("lookup");
    assert_eq!(login, None);
}

#[test]
fn missing_passwd_file_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    assert!(resolve_login(dir.path()).is_err());
}

#[test]
fn missing_passwd_entry_fails_interactive_before_any_mutation() {
    let dir = fixture_compartment("root:x:0:0:root:/root:/bin/bash\n");

    let err = comprt_runtime::shell::interactive(dir.path()).expect_err("no default user");
    assert!(
        matches!(
            err,
            comprt_common::error::ComprtError::NotFound { kind: "login name for uid", .. }
        ),
        "unexpected error: {err}"
    );
    assert!(
        !dir.path().join("proc").exists(),
        "a failed lookup must not have touched the target tree"
    );
}
