use std::{path::Path, time::Duration};

use tracing::{debug, info};

const POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The lock is gone, `waited` seconds were spent sleeping
    Proceed { waited: u64 },
    TimedOut { waited: u64 },
}

/// Polls the pacman database lock until it disappears or `timeout_secs` elapse.
///
/// Reaching the timeout is final even if the lock vanished during the last
/// sleep. The lock is only observed, never taken.
pub struct LockWaiter<'a> {
    path: &'a Path,
    timeout_secs: u64,
}

impl<'a> LockWaiter<'a> {
    pub fn new(path: &'a Path, timeout_secs: u64) -> Self {
        Self { path, timeout_secs }
    }

    pub fn is_locked(&self) -> bool {
        self.path.is_file()
    }

    /// Sleeps through `sleep`, one call per poll.
    pub fn wait_with(&self, mut sleep: impl FnMut(Duration)) -> WaitOutcome {
        let mut waited = 0;

        if self.is_locked() {
            info!("Waiting for pacman to finish...");
        }

        while self.is_locked() && waited < self.timeout_secs {
            sleep(POLL_INTERVAL);
            waited += 1;
        }

        if waited >= self.timeout_secs {
            debug!("Gave up on {} after {waited}s", self.path.display());
            return WaitOutcome::TimedOut { waited };
        }

        WaitOutcome::Proceed { waited }
    }
}

#[cfg(test)]
mod test {
    use std::fs;

    use super::*;

    #[test]
    fn test_no_lock_no_sleep() {
        let dir = tempfile::tempdir().unwrap();
        let lock = dir.path().join("db.lck");
        let mut sleeps = 0;

        let res = LockWaiter::new(&lock, 1200).wait_with(|_| sleeps += 1);

        assert_eq!(res, WaitOutcome::Proceed { waited: 0 });
        assert_eq!(sleeps, 0);
    }

    #[test]
    fn test_lock_held_until_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let lock = dir.path().join("db.lck");
        fs::write(&lock, "").unwrap();
        let mut slept = Duration::ZERO;

        let res = LockWaiter::new(&lock, 1200).wait_with(|d| slept += d);

        assert_eq!(res, WaitOutcome::TimedOut { waited: 1200 });
        assert_eq!(slept, Duration::from_secs(1200));
    }

    #[test]
    fn test_lock_released_while_waiting() {
        let dir = tempfile::tempdir().unwrap();
        let lock = dir.path().join("db.lck");
        fs::write(&lock, "").unwrap();
        let mut sleeps = 0;

        let res = LockWaiter::new(&lock, 1200).wait_with(|_| {
            sleeps += 1;
            if sleeps == 3 {
                fs::remove_file(&lock).unwrap();
            }
        });

        assert_eq!(res, WaitOutcome::Proceed { waited: 3 });
    }

    #[test]
    fn test_lock_released_on_last_tick_still_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let lock = dir.path().join("db.lck");
        fs::write(&lock, "").unwrap();
        let mut sleeps = 0;

        let res = LockWaiter::new(&lock, 1200).wait_with(|_| {
            sleeps += 1;
            if sleeps == 1200 {
                fs::remove_file(&lock).unwrap();
            }
        });

        assert_eq!(res, WaitOutcome::TimedOut { waited: 1200 });
    }

    #[test]
    fn test_zero_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let lock = dir.path().join("db.lck");

        let res = LockWaiter::new(&lock, 0).wait_with(|_| panic!("should not sleep"));

        assert_eq!(res, WaitOutcome::TimedOut { waited: 0 });
    }

    #[test]
    fn test_lock_directory_is_not_a_lock() {
        let dir = tempfile::tempdir().unwrap();
        let lock = dir.path().join("db.lck");
        fs::create_dir(&lock).unwrap();

        let res = LockWaiter::new(&lock, 5).wait_with(|_| panic!("should not sleep"));

        assert_eq!(res, WaitOutcome::Proceed { waited: 0 });
    }
}
