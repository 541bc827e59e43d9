use crate::backend::{InstallKind, PacmanBackend};
use crate::config::Config;
use crate::error::RestoreError;
use crate::graph::{InstallState, NodeId, PackageGraph, Repository};
use colored::Colorize;
use log::{debug, warn};
use std::collections::HashSet;

/// Walks the resolved graph dependency-first and runs the install action
/// once per node. Nodes are mutated in place; the report reads them after.
pub struct Installer<'a, B: PacmanBackend> {
    graph: &'a mut PackageGraph,
    backend: &'a B,
    use_cache_only: bool,
    force: bool,
}

impl<'a, B: PacmanBackend> Installer<'a, B> {
    pub fn new(graph: &'a mut PackageGraph, backend: &'a B, config: &Config) -> Self {
        Self {
            graph,
            backend,
            use_cache_only: config.use_cache_only,
            force: config.force,
        }
    }

    /// Pre-condition: resolution has completed for every requested name, so
    /// every dependency name is a key in the graph.
    pub fn install_all(&mut self, names: &[String]) {
        let mut visited = HashSet::new();
        for name in names {
            self.install(name, &mut visited);
        }
    }

    fn install(&mut self, name: &str, visited: &mut HashSet<NodeId>) {
        let Some(id) = self.graph.lookup(name) else {
            warn!("'{}' is missing from the resolved graph", name);
            return;
        };
        if !visited.insert(id) {
            return;
        }
        if self.graph.get(id).error.is_some() {
            return;
        }
        match self.graph.get(id).repository {
            Repository::Official => self.install_official(id),
            Repository::Local => self.install_local(id, visited),
        }
    }

    fn install_official(&mut self, id: NodeId) {
        let node = self.graph.get(id);
        let reinstall = node.state == InstallState::SameVersionInstalled;
        if reinstall && !self.force {
            debug!("{} is already installed, skipping", node.name);
            return;
        }
        if self.use_cache_only {
            let node = self.graph.get_mut(id);
            node.error = Some(RestoreError::CacheOnlyViolation(node.name.clone()));
            return;
        }
        let name = node.name.clone();
        let version = node.version.clone();
        announce(&name, version.as_deref(), reinstall);
        let result = self
            .backend
            .run_install(InstallKind::RepoName(&name), reinstall);
        self.record_outcome(id, name, result, reinstall);
    }

    fn install_local(&mut self, id: NodeId, visited: &mut HashSet<NodeId>) {
        let dependencies = self.graph.get(id).dependencies.clone();
        for dependency in &dependencies {
            self.install(dependency, visited);
            let dependency_failed = self
                .graph
                .lookup(dependency)
                .is_none_or(|dep| self.graph.get(dep).failed());
            if dependency_failed {
                let node = self.graph.get_mut(id);
                node.state = InstallState::DependencyFailed;
                node.error = Some(RestoreError::DependencyFailed(dependency.clone()));
                return;
            }
        }

        let node = self.graph.get(id);
        let reinstall = node.state == InstallState::SameVersionInstalled;
        if reinstall && !self.force {
            debug!("{} is already installed, skipping", node.name);
            return;
        }
        let Some(path) = node.archive_path.clone() else {
            debug!("no cached archive for {}, leaving installed version in place", node.name);
            return;
        };
        let name = node.name.clone();
        let version = node.version.clone();
        announce(&name, version.as_deref(), reinstall);
        let target = match &version {
            Some(v) => format!("{} {}", name, v),
            None => name.clone(),
        };
        let result = self
            .backend
            .run_install(InstallKind::ArchiveFile(&path), reinstall);
        self.record_outcome(id, target, result, reinstall);
    }

    fn record_outcome(
        &mut self,
        id: NodeId,
        target: String,
        result: crate::error::RestoreResult<crate::backend::CommandOutput>,
        reinstall: bool,
    ) {
        match result {
            Ok(output) if output.success() => {
                for line in &output.stdout {
                    println!("{}", line);
                }
                self.graph.get_mut(id).state = if reinstall {
                    InstallState::Reinstalled
                } else {
                    InstallState::FreshlyInstalled
                };
            }
            Ok(output) => {
                for line in &output.stdout {
                    println!("{}", line);
                }
                let node = self.graph.get_mut(id);
                node.state = InstallState::InstallFailed;
                node.error = Some(RestoreError::InstallFailed {
                    target,
                    stderr: output.stderr.join("\n"),
                });
            }
            Err(e) => {
                let node = self.graph.get_mut(id);
                node.state = InstallState::InstallFailed;
                node.error = Some(e);
            }
        }
    }
}

fn announce(name: &str, version: Option<&str>, reinstall: bool) {
    let action = if reinstall { "Reinstalling" } else { "Installing" };
    let message = match version {
        Some(version) => format!("{} package {} {}...", action, name, version),
        None => format!("{} package {}...", action, name),
    };
    println!("{}", message.cyan());
}
