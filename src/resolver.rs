use crate::archive::ArchiveRecord;
use crate::backend::PacmanBackend;
use crate::cache::CacheIndex;
use crate::graph::{InstallState, NodeId, PackageGraph, PackageNode};
use log::{debug, warn};

/// Builds the package graph for a set of requested names by walking their
/// declared dependencies. Resolution alone never installs anything.
pub struct Resolver<'a, B: PacmanBackend> {
    cache: &'a CacheIndex,
    backend: &'a B,
    graph: PackageGraph,
}

impl<'a, B: PacmanBackend> Resolver<'a, B> {
    pub fn new(cache: &'a CacheIndex, backend: &'a B) -> Self {
        Self {
            cache,
            backend,
            graph: PackageGraph::new(),
        }
    }

    pub fn resolve_all(mut self, names: &[String]) -> PackageGraph {
        for name in names {
            self.resolve(name);
        }
        self.graph
    }

    /// Post-condition: `name` is a key in the graph, and so is every
    /// dependency name reachable from it unless an ancestor errored first.
    /// A name is registered before its dependencies are walked, which is
    /// what makes dependency cycles terminate.
    fn resolve(&mut self, name: &str) {
        if self.graph.contains(name) {
            return;
        }
        let (id, fresh) = self.locate(name);
        if !fresh {
            return;
        }
        let node = self.graph.get(id);
        if node.error.is_some() {
            // the dependency list of a broken node cannot be trusted
            return;
        }
        let dependencies = node.dependencies.clone();
        for dependency in &dependencies {
            self.resolve(dependency);
        }
    }

    /// Finds or creates the node for `name`, preferring the exact cache
    /// match, then the installed-package identity, then the official
    /// repository, then provider aliases. Returns the node id and whether
    /// the node was newly created.
    fn locate(&mut self, name: &str) -> (NodeId, bool) {
        if let Some(record) = self.cache.best_version(name) {
            let node = self.local_node(record);
            return (self.graph.insert(node), true);
        }

        if self.backend.is_installed(name) {
            if let Some(canonical) = self.backend.canonical_installed_name(name) {
                if let Some(id) = self.graph.lookup(&canonical) {
                    self.graph.alias(name, id);
                    return (id, false);
                }
                if let Some(record) = self.cache.best_version(&canonical) {
                    let node = self.local_node(record);
                    let id = self.graph.insert(node);
                    if canonical != name {
                        self.graph.alias(name, id);
                    }
                    return (id, true);
                }
                // installed but absent from the cache: already satisfied
                let version = self.backend.installed_version(&canonical);
                let id = self
                    .graph
                    .insert(PackageNode::installed(canonical.clone(), version));
                if canonical != name {
                    self.graph.alias(name, id);
                }
                return (id, true);
            }
        }

        if self.backend.is_in_official_repo(name) {
            if let Some(canonical) = self.backend.canonical_official_name(name) {
                if let Some(id) = self.graph.lookup(&canonical) {
                    self.graph.alias(name, id);
                    return (id, false);
                }
                let state = self.installed_state(&canonical, None);
                let id = self
                    .graph
                    .insert(PackageNode::official(canonical.clone(), state));
                if canonical != name {
                    self.graph.alias(name, id);
                }
                return (id, true);
            }
        }

        for provider in self.backend.provider_names(name) {
            if let Some(id) = self.graph.lookup(&provider) {
                self.graph.alias(name, id);
                return (id, false);
            }
            if let Some(record) = self.cache.best_version(&provider) {
                let node = self.local_node(record);
                let id = self.graph.insert(node);
                self.graph.alias(name, id);
                return (id, true);
            }
        }

        debug!("no cache entry, repository entry or provider for '{}'", name);
        (self.graph.insert(PackageNode::unavailable(name.to_string())), true)
    }

    fn local_node(&self, record: &ArchiveRecord) -> PackageNode {
        let state = self.installed_state(&record.name, Some(&record.version));
        let mut node = PackageNode::local(record, state);
        match record.read_metadata() {
            Ok(metadata) => {
                node.dependencies = metadata.dependencies;
                if metadata.architecture.is_some() {
                    node.architecture = metadata.architecture;
                }
                node.license = metadata.license;
            }
            Err(e) => {
                warn!("{}", e);
                node.error = Some(e);
            }
        }
        node
    }

    fn installed_state(&self, name: &str, version: Option<&str>) -> InstallState {
        if !self.backend.is_installed(name) {
            return InstallState::NotInstalled;
        }
        match (self.backend.installed_version(name), version) {
            (Some(installed), Some(version)) if installed == version => {
                InstallState::SameVersionInstalled
            }
            _ => InstallState::DifferentVersionInstalled,
        }
    }
}
