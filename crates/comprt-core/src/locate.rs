//! Line-oriented field lookup in column-formatted files.
//!
//! Files like `/etc/passwd` and `/etc/os-release` are rows of fields
//! separated by a known pattern. [`locate_field`] finds the first row
//! whose field at one index matches a pattern and returns the field at
//! another index, without the caller having to parse the whole file.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use comprt_common::error::{ComprtError, Result};
use regex::Regex;

/// Searches `path` row by row for the first line whose field at
/// `match_index` matches `pattern`, returning that line's field at
/// `return_index`. Field indexes start at 0.
///
/// Lines with too few fields to test `match_index` are skipped. A missing
/// match is not an error: the caller receives `None` and decides whether
/// that is fatal.
///
/// # Errors
///
/// Returns [`ComprtError::Io`] if the file cannot be opened or read, or
/// [`ComprtError::FieldCount`] if the matching line has no field at
/// `return_index`.
pub fn locate_field(
    path: &Path,
    field_sep: &Regex,
    match_index: usize,
    return_index: usize,
    pattern: &Regex,
) -> Result<Option<String>> {
    let file = File::open(path).map_err(|source| ComprtError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    for line in BufReader::new(file).lines() {
        let line = line.map_err(|source| ComprtError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let fields: Vec<&str> = field_sep.split(&line).collect();
        if fields.len() <= match_index {
            continue;
        }
        if pattern.is_match(fields[match_index]) {
            let value = fields.get(return_index).ok_or_else(|| ComprtError::FieldCount {
                path: path.to_path_buf(),
            })?;
            return Ok(Some((*value).to_string()));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use std::io::Write;

    use super::*;

    fn passwd_fixture() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "alice:x:1000:1000:Alice:/home/alice:/bin/bash").expect("write");
        writeln!(file, "bob:x:1224:1224:Bob:/home/bob:/bin/bash").expect("write");
        writeln!(file, "carol:x:1001:1001:Carol:/home/carol:/bin/zsh").expect("write");
        file
    }

    #[test]
    fn returns_login_name_for_matching_uid() {
        let file = passwd_fixture();
        let sep = Regex::new(":").unwrap();
        let uid = Regex::new("^1224$").unwrap();

        let name = locate_field(file.path(), &sep, 2, 0, &uid).expect("lookup");
        assert_eq!(name.as_deref(), Some("bob"));
    }

    #[test]
    fn missing_uid_is_not_an_error() {
        let file = passwd_fixture();
        let sep = Regex::new(":").unwrap();
        let uid = Regex::new("^9999$").unwrap();

        let name = locate_field(file.path(), &sep, 2, 0, &uid).expect("lookup");
        assert_eq!(name, None);
    }

    #[test]
    fn first_matching_line_wins() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "first:1").expect("write");
        writeln!(file, "second:1").expect("write");

        let sep = Regex::new(":").unwrap();
        let one = Regex::new("^1$").unwrap();
        let value = locate_field(file.path(), &sep, 1, 0, &one).expect("lookup");
        assert_eq!(value.as_deref(), Some("first"));
    }

    #[test]
    fn short_lines_are_skipped() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "short").expect("write");
        writeln!(file, "bob:x:1224").expect("write");

        let sep = Regex::new(":").unwrap();
        let uid = Regex::new("^1224$").unwrap();
        let name = locate_field(file.path(), &sep, 2, 0, &uid).expect("lookup");
        assert_eq!(name.as_deref(), Some("bob"));
    }

    #[test]
    fn matching_line_without_return_field_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "bob:x:1224").expect("write");

        let sep = Regex::new(":").unwrap();
        let uid = Regex::new("^1224$").unwrap();
        let err = locate_field(file.path(), &sep, 2, 6, &uid).expect_err("out of range");
        assert!(matches!(err, ComprtError::FieldCount { .. }));
    }

    #[test]
    fn whitespace_separator_locates_fstab_style_fields() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "/dev/sda1   /      ext4 defaults 0 1").expect("write");
        writeln!(file, "/dev/sda2   /home  ext4 defaults 0 2").expect("write");

        let sep = Regex::new(r"\s+").unwrap();
        let root = Regex::new(r"^/$").unwrap();
        let value = locate_field(file.path(), &sep, 1, 1, &root).expect("lookup");
        assert_eq!(value.as_deref(), Some("/"));
    }

    #[test]
    fn missing_file_reports_io_error() {
        let sep = Regex::new(":").unwrap();
        let any = Regex::new(".").unwrap();
        let err = locate_field(Path::new("/nonexistent/passwd"), &sep, 0, 0, &any)
            .expect_err("missing file");
        assert!(matches!(err, ComprtError::Io { .. }));
    }
}
