use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{PmError, PmResult};

/// Read-only view of pacman's local (installed) package database.
///
/// Every installed package owns a `<dbpath>/local/<name>-<pkgver>-<pkgrel>/`
/// directory whose `desc` file carries a `%NAME%` section.
#[derive(Debug, Clone)]
pub struct LocalDb {
    local: PathBuf,
}

impl LocalDb {
    pub fn new(dbpath: impl AsRef<Path>) -> Self {
        Self {
            local: dbpath.as_ref().join("local"),
        }
    }

    /// Names of all installed packages, sorted.
    pub fn installed(&self) -> PmResult<Vec<String>> {
        self.scan(|_| true)
    }

    /// Installed package names containing `pattern`.
    ///
    /// The database is read again on every call, since an install earlier in
    /// a run may pull in a package named later in the list. Only entries whose
    /// directory name contains `pattern` have their `desc` read, because the
    /// directory name always starts with the package name.
    pub fn search(&self, pattern: &str) -> PmResult<Vec<String>> {
        Ok(self
            .scan(|dir_name| dir_name.contains(pattern))?
            .into_iter()
            .filter(|name| name.contains(pattern))
            .collect())
    }

    fn scan(&self, keep_dir: impl Fn(&str) -> bool) -> PmResult<Vec<String>> {
        let read_err = |e| PmError::ReadLocalDb {
            path: self.local.clone(),
            source: e,
        };

        let mut res = vec![];

        for entry in fs::read_dir(&self.local).map_err(read_err)? {
            let entry = entry.map_err(read_err)?;
            if !entry.file_type().map_err(read_err)?.is_dir() {
                continue;
            }

            let dir_name = entry.file_name().to_string_lossy().to_string();
            if !keep_dir(&dir_name) {
                continue;
            }

            let name = match fs::read_to_string(entry.path().join("desc")) {
                Ok(desc) => desc_name(&desc),
                Err(e) => {
                    debug!("Failed to read desc of {dir_name}: {e}");
                    None
                }
            };

            if let Some(name) = name.or_else(|| name_from_dir(&dir_name)) {
                res.push(name);
            }
        }

        res.sort_unstable();

        Ok(res)
    }
}

/// Value of the `%NAME%` section of a `desc` file
fn desc_name(desc: &str) -> Option<String> {
    let mut lines = desc.lines();

    lines.by_ref().find(|line| line.trim() == "%NAME%")?;

    lines
        .next()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(|line| line.to_string())
}

/// `<name>-<pkgver>-<pkgrel>` -> `<name>`
fn name_from_dir(dir_name: &str) -> Option<String> {
    let mut split = dir_name.rsplitn(3, '-');
    let _pkgrel = split.next()?;
    let _pkgver = split.next()?;

    split
        .next()
        .filter(|name| !name.is_empty())
        .map(|name| name.to_string())
}
