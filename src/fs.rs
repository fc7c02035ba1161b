// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! File-system read interface used by the configuration readers and the
//! hook-file schema enumeration

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Blocking, read-only view of the file system
pub trait FileSystem {
    /// Read a whole file as UTF-8 text
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Check whether a file or directory exists
    fn exists(&self, path: &Path) -> bool;

    /// List the names of the directories directly below `path`.
    /// A missing directory yields an empty list.
    fn list_dirs(&self, path: &Path) -> io::Result<Vec<String>>;
}

/// [`FileSystem`] backed by `std::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FileSystem for LocalFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn list_dirs(&self, path: &Path) -> io::Result<Vec<String>> {
        if !path.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Search upward from `start` toward `root` for a file called `name`.
///
/// The search never leaves `root`; if `start` is not below `root` only
/// `root` itself is checked.
pub fn find_upward(fs: &dyn FileSystem, root: &Path, start: &Path, name: &str) -> Option<PathBuf> {
    let mut current = if start.starts_with(root) { start } else { root };

    loop {
        let candidate = current.join(name);
        if fs.exists(&candidate) {
            return Some(candidate);
        }
        if current == root {
            return None;
        }
        current = current.parent()?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_list_dirs_skips_files() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("beta")).unwrap();
        fs::create_dir(dir.path().join("alpha")).unwrap();
        fs::write(dir.path().join("file.sql"), "").unwrap();

        let names = LocalFs.list_dirs(dir.path()).unwrap();
        assert_eq!(names, vec!["alpha".to_string(), "beta".to_string()]);
    }

    #[test]
    fn test_list_dirs_missing_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(LocalFs.list_dirs(&dir.path().join("nope")).unwrap().is_empty());
    }

    #[test]
    fn test_find_upward_stops_at_root() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("repo");
        let nested = root.join("db").join("sales").join("tables");
        fs::create_dir_all(&nested).unwrap();
        fs::write(root.join("build.env"), "PROJECT=x\n").unwrap();
        fs::write(dir.path().join("apply.env"), "DB_TNS=outside\n").unwrap();

        assert_eq!(
            find_upward(&LocalFs, &root, &nested, "build.env"),
            Some(root.join("build.env"))
        );
        assert_eq!(find_upward(&LocalFs, &root, &nested, "apply.env"), None);
    }

    #[test]
    fn test_find_upward_prefers_nearest() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let nested = root.join("db");
        fs::create_dir_all(&nested).unwrap();
        fs::write(root.join("apply.env"), "").unwrap();
        fs::write(nested.join("apply.env"), "").unwrap();

        assert_eq!(
            find_upward(&LocalFs, root, &nested, "apply.env"),
            Some(nested.join("apply.env"))
        );
    }
}
