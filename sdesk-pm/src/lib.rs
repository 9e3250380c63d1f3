use std::{io, path::PathBuf};

pub mod directive;
pub mod localdb;
pub mod lock;
pub mod pacman;
pub mod reconcile;
pub mod update;

pub use directive::Directive;
pub use localdb::LocalDb;
pub use lock::{LockWaiter, WaitOutcome};
pub use pacman::{PackageOperations, Pacman, SUBPROCESS};
pub use reconcile::{Action, ReconcileReport, Reconciler};
pub use update::Updater;

pub const DEFAULT_LOCK_FILE: &str = "/var/lib/pacman/db.lck";
pub const DEFAULT_DIRECTIVES: &str = "/SDesk/BasePackages";
pub const DEFAULT_DBPATH: &str = "/var/lib/pacman";
pub const DEFAULT_PACMAN: &str = "pacman";
/// Twenty minutes
pub const DEFAULT_TIMEOUT_SECS: u64 = 1200;

#[derive(Debug, thiserror::Error)]
pub enum PmError {
    #[error("Timeout exceeded {0}s while waiting for pacman to finish")]
    LockTimeout(u64),
    #[error("Failed to read base package list {}", .path.display())]
    ReadDirectives {
        path: PathBuf,
        source: io::Error,
    },
    #[error("Failed to read pacman local database {}", .path.display())]
    ReadLocalDb {
        path: PathBuf,
        source: io::Error,
    },
    #[error("Failed to execute `{cmd}'")]
    SpawnPacman { cmd: String, source: io::Error },
    #[error("`{cmd}' returned an error: {code}")]
    PacmanFailed { cmd: String, code: i32 },
}

pub type PmResult<T> = Result<T, PmError>;
