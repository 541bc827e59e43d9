use crate::error::{RestoreError, RestoreResult};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub code: i32,
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

#[derive(Debug, Clone, Copy)]
pub enum InstallKind<'a> {
    ArchiveFile(&'a Path),
    RepoName(&'a str),
}

/// Everything the resolver and installer need to know about the world
/// outside the cache: the installed-package database, the official
/// repository index, and the install command itself.
pub trait PacmanBackend {
    fn is_installed(&self, name: &str) -> bool;
    fn installed_version(&self, name: &str) -> Option<String>;
    fn canonical_installed_name(&self, name: &str) -> Option<String>;
    fn is_in_official_repo(&self, name: &str) -> bool;
    fn canonical_official_name(&self, name: &str) -> Option<String>;
    fn provider_names(&self, name: &str) -> Vec<String>;
    fn run_install(&self, target: InstallKind<'_>, force: bool) -> RestoreResult<CommandOutput>;
}

/// Production backend shelling out to `package-query` and `pacman`. Every
/// call blocks until the child exits and its output is fully captured.
#[derive(Debug)]
pub struct CliBackend {
    cache_dir: PathBuf,
}

impl CliBackend {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    fn package_query(&self, args: &[&str]) -> Option<CommandOutput> {
        match run_command("package-query", args) {
            Ok(output) => Some(output),
            Err(e) => {
                warn!("package-query invocation failed: {}", e);
                None
            }
        }
    }
}

impl PacmanBackend for CliBackend {
    fn is_installed(&self, name: &str) -> bool {
        self.package_query(&["-Qiif", "%n", name])
            .is_some_and(|o| o.success())
    }

    fn installed_version(&self, name: &str) -> Option<String> {
        self.package_query(&["-Qiif", "%v", name])
            .filter(|o| o.success())
            .and_then(|o| o.stdout.first().cloned())
    }

    fn canonical_installed_name(&self, name: &str) -> Option<String> {
        self.package_query(&["-Qiif", "%n", name])
            .filter(|o| o.success())
            .and_then(|o| o.stdout.first().cloned())
    }

    fn is_in_official_repo(&self, name: &str) -> bool {
        self.package_query(&["-Siif", "%n", name])
            .is_some_and(|o| o.success())
    }

    fn canonical_official_name(&self, name: &str) -> Option<String> {
        // package-query prints one line per matching repository, the last
        // one being the most specific match
        self.package_query(&["-Siif", "%n", name])
            .filter(|o| o.success())
            .and_then(|o| o.stdout.last().cloned())
    }

    fn provider_names(&self, name: &str) -> Vec<String> {
        self.package_query(&["-Aiif", "%n", name])
            .filter(|o| o.success())
            .map(|o| o.stdout)
            .unwrap_or_default()
    }

    fn run_install(&self, target: InstallKind<'_>, force: bool) -> RestoreResult<CommandOutput> {
        let cache_dir = self.cache_dir.display().to_string();
        let mut args: Vec<&str> = match target {
            InstallKind::ArchiveFile(_) => vec!["-U"],
            InstallKind::RepoName(_) => vec!["-S", "--needed"],
        };
        args.extend(["--noconfirm", "--noprogressbar", "--cachedir", cache_dir.as_str()]);
        if force {
            args.push("--force");
        }
        let operand = match target {
            InstallKind::ArchiveFile(path) => path.display().to_string(),
            InstallKind::RepoName(name) => name.to_string(),
        };
        args.push(&operand);
        run_command("pacman", &args)
    }
}

pub fn run_command(program: &str, args: &[&str]) -> RestoreResult<CommandOutput> {
    debug!("running {} {}", program, args.join(" "));
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| RestoreError::CommandFailed {
            command: program.to_string(),
            source: e,
        })?;
    Ok(CommandOutput {
        code: output.status.code().unwrap_or(-1),
        stdout: capture_lines(&output.stdout),
        stderr: capture_lines(&output.stderr),
    })
}

fn capture_lines(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(|line| line.trim_end().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

#[cfg(test)]
pub(crate) mod mock {
    use super::{CommandOutput, InstallKind, PacmanBackend};
    use crate::error::RestoreResult;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Scripted collaborator that records every query and install so tests
    /// can observe memoization and install order.
    #[derive(Debug, Default)]
    pub struct MockBackend {
        installed: HashMap<String, String>,
        installed_aliases: HashMap<String, String>,
        official: HashMap<String, String>,
        providers: HashMap<String, Vec<String>>,
        failing: Vec<String>,
        pub queries: RefCell<Vec<String>>,
        pub installs: RefCell<Vec<String>>,
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_installed(mut self, name: &str, version: &str) -> Self {
            self.installed.insert(name.to_string(), version.to_string());
            self
        }

        pub fn with_installed_alias(mut self, alias: &str, canonical: &str) -> Self {
            self.installed_aliases
                .insert(alias.to_string(), canonical.to_string());
            self
        }

        pub fn with_official(mut self, name: &str, canonical: &str) -> Self {
            self.official.insert(name.to_string(), canonical.to_string());
            self
        }

        pub fn with_provider(mut self, name: &str, providers: &[&str]) -> Self {
            self.providers.insert(
                name.to_string(),
                providers.iter().map(|p| p.to_string()).collect(),
            );
            self
        }

        pub fn with_failing_install(mut self, target: &str) -> Self {
            self.failing.push(target.to_string());
            self
        }

        pub fn query_count(&self) -> usize {
            self.queries.borrow().len()
        }

        pub fn install_count(&self) -> usize {
            self.installs.borrow().len()
        }

        fn canonical_of(&self, name: &str) -> Option<String> {
            if self.installed.contains_key(name) {
                return Some(name.to_string());
            }
            self.installed_aliases.get(name).cloned()
        }
    }

    impl PacmanBackend for MockBackend {
        fn is_installed(&self, name: &str) -> bool {
            self.queries.borrow_mut().push(format!("is_installed {}", name));
            self.canonical_of(name).is_some()
        }

        fn installed_version(&self, name: &str) -> Option<String> {
            self.queries
                .borrow_mut()
                .push(format!("installed_version {}", name));
            self.canonical_of(name)
                .and_then(|c| self.installed.get(&c).cloned())
        }

        fn canonical_installed_name(&self, name: &str) -> Option<String> {
            self.queries
                .borrow_mut()
                .push(format!("canonical_installed_name {}", name));
            self.canonical_of(name)
        }

        fn is_in_official_repo(&self, name: &str) -> bool {
            self.queries
                .borrow_mut()
                .push(format!("is_in_official_repo {}", name));
            self.official.contains_key(name)
        }

        fn canonical_official_name(&self, name: &str) -> Option<String> {
            self.queries
                .borrow_mut()
                .push(format!("canonical_official_name {}", name));
            self.official.get(name).cloned()
        }

        fn provider_names(&self, name: &str) -> Vec<String> {
            self.queries
                .borrow_mut()
                .push(format!("provider_names {}", name));
            self.providers.get(name).cloned().unwrap_or_default()
        }

        fn run_install(&self, target: InstallKind<'_>, force: bool) -> RestoreResult<CommandOutput> {
            let label = match target {
                InstallKind::ArchiveFile(path) => format!(
                    "-U {}",
                    path.file_name().and_then(|n| n.to_str()).unwrap_or("")
                ),
                InstallKind::RepoName(name) => format!("-S {}", name),
            };
            let entry = if force {
                format!("{} --force", label)
            } else {
                label.clone()
            };
            self.installs.borrow_mut().push(entry);
            if self.failing.iter().any(|f| label.contains(f.as_str())) {
                Ok(CommandOutput {
                    code: 1,
                    stdout: vec![],
                    stderr: vec!["error: could not commit transaction".to_string()],
                })
            } else {
                Ok(CommandOutput {
                    code: 0,
                    stdout: vec![],
                    stderr: vec![],
                })
            }
        }
    }
}
