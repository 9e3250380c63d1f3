use std::{path::Path, thread, time::Duration};

use bon::Builder;
use tracing::info;

use crate::{
    directive::read_directives,
    lock::{LockWaiter, WaitOutcome},
    pacman::PackageOperations,
    reconcile::{ReconcileReport, Reconciler},
    PmError, PmResult, DEFAULT_TIMEOUT_SECS,
};

/// Wait for the pacman lock, then reconcile the base package list.
#[derive(Builder)]
pub struct Updater<'a> {
    lock_file: &'a Path,
    directives: &'a Path,
    #[builder(default = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,
    #[builder(default)]
    dry_run: bool,
}

impl Updater<'_> {
    pub fn run(&self, ops: &mut dyn PackageOperations) -> PmResult<ReconcileReport> {
        self.run_with(ops, thread::sleep)
    }

    /// Returns [`PmError::LockTimeout`] without touching `ops` when the lock outlives the timeout.
    pub fn run_with(
        &self,
        ops: &mut dyn PackageOperations,
        sleep: impl FnMut(Duration),
    ) -> PmResult<ReconcileReport> {
        let waiter = LockWaiter::new(self.lock_file, self.timeout_secs);

        if let WaitOutcome::TimedOut { waited } = waiter.wait_with(sleep) {
            return Err(PmError::LockTimeout(waited));
        }

        info!("Pacman has exited, installing new base packages...");

        let directives = read_directives(self.directives)?;

        Reconciler::builder()
            .ops(ops)
            .dry_run(self.dry_run)
            .build()
            .reconcile(&directives)
    }
}
