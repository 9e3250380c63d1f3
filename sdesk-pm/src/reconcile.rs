use std::fmt::Display;

use bon::Builder;
use tracing::{debug, info, warn};

use crate::{directive::Directive, pacman::PackageOperations, PmResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Install(String),
    Remove(String),
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Install(pkg) => write!(f, "install {pkg}"),
            Action::Remove(pkg) => write!(f, "remove {pkg}"),
        }
    }
}

#[derive(Debug, Default)]
pub struct ReconcileReport {
    /// Commands issued (or planned, in dry-run mode), in directive order
    pub actions: Vec<Action>,
    /// Directives that already matched the installed set
    pub skipped: usize,
    /// Issued commands that failed, with the error message
    pub failed: Vec<(Action, String)>,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Converges the installed set towards a list of directives.
///
/// A package counts as installed only when the search result contains its
/// exact name: `vim` is not installed when only `gvim` is present.
#[derive(Builder)]
pub struct Reconciler<'a> {
    ops: &'a mut dyn PackageOperations,
    #[builder(default)]
    dry_run: bool,
}

impl Reconciler<'_> {
    fn is_installed(&self, name: &str) -> PmResult<bool> {
        let matches = self.ops.search(name)?;
        debug!("Search {name}: {matches:?}");

        Ok(matches.iter().any(|m| m == name))
    }

    pub fn reconcile(&mut self, directives: &[Directive]) -> PmResult<ReconcileReport> {
        let mut report = ReconcileReport::default();

        for directive in directives {
            let name = directive.package_name();
            let installed = self.is_installed(name)?;

            let action = match (directive.is_removal(), installed) {
                (true, true) => Action::Remove(name.to_string()),
                (false, false) => Action::Install(name.to_string()),
                (true, false) => {
                    debug!("{:?}: {name} is not installed", directive.raw_text());
                    report.skipped += 1;
                    continue;
                }
                (false, true) => {
                    debug!("{:?}: {name} is already installed", directive.raw_text());
                    report.skipped += 1;
                    continue;
                }
            };

            if let Err(e) = self.apply(&action) {
                warn!("Failed to {action}: {e}");
                report.failed.push((action.clone(), e.to_string()));
            }

            report.actions.push(action);
        }

        Ok(report)
    }

    fn apply(&mut self, action: &Action) -> PmResult<()> {
        match action {
            Action::Install(pkg) => {
                if self.dry_run {
                    info!("Would install new base package: {pkg}");
                    return Ok(());
                }
                info!("Installing new base package: {pkg}");
                self.ops.install(pkg)
            }
            Action::Remove(pkg) => {
                if self.dry_run {
                    info!("Would remove base package: {pkg}");
                    return Ok(());
                }
                info!("Removing base package: {pkg}");
                self.ops.remove(pkg)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test {
    use std::collections::BTreeSet;

    use crate::{directive::parse_directives, PmError};

    use super::*;

    /// In-memory package manager recording every mutating call
    #[derive(Default)]
    pub(crate) struct FakePackages {
        pub installed: BTreeSet<String>,
        pub calls: Vec<Action>,
        pub broken: BTreeSet<String>,
    }

    impl FakePackages {
        pub fn with_installed(pkgs: &[&str]) -> Self {
            Self {
                installed: pkgs.iter().map(|p| p.to_string()).collect(),
                ..Default::default()
            }
        }
    }

    impl PackageOperations for FakePackages {
        fn search(&self, name: &str) -> PmResult<Vec<String>> {
            Ok(self
                .installed
                .iter()
                .filter(|p| p.contains(name))
                .cloned()
                .collect())
        }

        fn install(&mut self, name: &str) -> PmResult<()> {
            self.calls.push(Action::Install(name.to_string()));
            if self.broken.contains(name) {
                return Err(PmError::PacmanFailed {
                    cmd: format!("pacman -S --noconfirm {name}"),
                    code: 1,
                });
            }
            self.installed.insert(name.to_string());
            Ok(())
        }

        fn remove(&mut self, name: &str) -> PmResult<()> {
            self.calls.push(Action::Remove(name.to_string()));
            self.installed.remove(name);
            Ok(())
        }
    }

    fn run(fake: &mut FakePackages, list: &str) -> ReconcileReport {
        Reconciler::builder()
            .ops(fake)
            .build()
            .reconcile(&parse_directives(list))
            .unwrap()
    }

    #[test]
    fn test_mixed_list() {
        let mut fake = FakePackages::with_installed(&["nano"]);
        let report = run(&mut fake, "vim\n[remove] nano\n\ngit\n");

        let expected = vec![
            Action::Install("vim".to_string()),
            Action::Remove("nano".to_string()),
            Action::Install("git".to_string()),
        ];
        assert_eq!(fake.calls, expected);
        assert_eq!(report.actions, expected);
        assert_eq!(report.skipped, 0);
        assert!(report.is_clean());
    }

    #[test]
    fn test_empty_installed_set_installs_in_order() {
        let mut fake = FakePackages::default();
        run(&mut fake, "base\n  linux  \n\n\t\nfirefox\n");

        assert_eq!(
            fake.calls,
            vec![
                Action::Install("base".to_string()),
                Action::Install("linux".to_string()),
                Action::Install("firefox".to_string()),
            ]
        );
    }

    #[test]
    fn test_second_run_is_noop() {
        let mut fake = FakePackages::with_installed(&["nano"]);
        let list = "vim\n[remove] nano\ngit\n";
        run(&mut fake, list);
        fake.calls.clear();

        let report = run(&mut fake, list);

        assert!(fake.calls.is_empty());
        assert!(report.actions.is_empty());
        assert_eq!(report.skipped, 3);
    }

    #[test]
    fn test_remove_not_installed_is_noop() {
        let mut fake = FakePackages::with_installed(&["vim"]);
        let report = run(&mut fake, "[remove] nano\n");

        assert!(fake.calls.is_empty());
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn test_partial_match_is_not_installed() {
        let mut fake = FakePackages::with_installed(&["gvim"]);
        run(&mut fake, "vim\n[remove] vi\n");

        assert_eq!(fake.calls, vec![Action::Install("vim".to_string())]);
    }

    #[test]
    fn test_failure_does_not_stop_run() {
        let mut fake = FakePackages::default();
        fake.broken.insert("vim".to_string());

        let report = run(&mut fake, "vim\ngit\n");

        assert_eq!(fake.calls.len(), 2);
        assert_eq!(report.actions.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, Action::Install("vim".to_string()));
        assert!(!report.is_clean());
    }

    #[test]
    fn test_dry_run() {
        let mut fake = FakePackages::with_installed(&["nano"]);
        let report = Reconciler::builder()
            .ops(&mut fake)
            .dry_run(true)
            .build()
            .reconcile(&parse_directives("vim\n[remove] nano\n"))
            .unwrap();

        assert_eq!(
            report.actions,
            vec![
                Action::Install("vim".to_string()),
                Action::Remove("nano".to_string()),
            ]
        );
        assert!(fake.calls.is_empty());
        assert!(fake.installed.contains("nano"));
    }
}
