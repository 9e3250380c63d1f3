use std::{
    path::Path,
    process::Command,
    sync::atomic::{AtomicI32, Ordering},
};

use tracing::debug;

use crate::{localdb::LocalDb, PmError, PmResult};

/// PID of the running pacman child, `-1` when there is none.
pub static SUBPROCESS: AtomicI32 = AtomicI32::new(-1);

/// What the reconciler needs from a package manager.
pub trait PackageOperations {
    /// Installed package names matching `name`
    fn search(&self, name: &str) -> PmResult<Vec<String>>;
    fn install(&mut self, name: &str) -> PmResult<()>;
    fn remove(&mut self, name: &str) -> PmResult<()>;
}

pub struct Pacman {
    bin: String,
    db: LocalDb,
}

impl Pacman {
    pub fn new(bin: impl Into<String>, dbpath: impl AsRef<Path>) -> Self {
        Self {
            bin: bin.into(),
            db: LocalDb::new(dbpath),
        }
    }

    fn run(&self, args: &[&str], pkg: &str) -> PmResult<()> {
        let cmd = format!("{} {} {pkg}", self.bin, args.join(" "));
        debug!("Running `{cmd}'");

        let mut child = Command::new(&self.bin)
            .args(args)
            .arg(pkg)
            .spawn()
            .map_err(|e| PmError::SpawnPacman {
                cmd: cmd.clone(),
                source: e,
            })?;

        SUBPROCESS.store(child.id() as i32, Ordering::Relaxed);
        let status = child.wait();
        SUBPROCESS.store(-1, Ordering::Relaxed);

        let status = status.map_err(|e| PmError::SpawnPacman {
            cmd: cmd.clone(),
            source: e,
        })?;

        if !status.success() {
            return Err(PmError::PacmanFailed {
                cmd,
                code: status.code().unwrap_or(1),
            });
        }

        Ok(())
    }
}

impl PackageOperations for Pacman {
    fn search(&self, name: &str) -> PmResult<Vec<String>> {
        self.db.search(name)
    }

    fn install(&mut self, name: &str) -> PmResult<()> {
        self.run(&["-S", "--noconfirm"], name)
    }

    fn remove(&mut self, name: &str) -> PmResult<()> {
        // -dd: ignore dependency checks
        self.run(&["-Rdd", "--noconfirm"], name)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_missing_binary() {
        let dir = tempfile::tempdir().unwrap();
        let mut pacman = Pacman::new(dir.path().join("no-such-pacman").to_string_lossy(), dir.path());

        let err = pacman.install("vim").unwrap_err();
        assert!(matches!(err, PmError::SpawnPacman { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit() {
        let dir = tempfile::tempdir().unwrap();
        let mut pacman = Pacman::new("false", dir.path());

        let err = pacman.remove("nano").unwrap_err();
        assert!(matches!(
            err,
            PmError::PacmanFailed { ref cmd, code: 1 } if cmd == "false -Rdd --noconfirm nano"
        ));
    }
}
