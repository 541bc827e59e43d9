use crate::archive::ArchiveRecord;
use crate::error::RestoreError;
use std::collections::HashMap;
use std::path::PathBuf;

pub type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repository {
    /// Must come from the network repository.
    Official,
    /// Satisfied from the on-disk archive cache.
    Local,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    NotInstalled,
    SameVersionInstalled,
    DifferentVersionInstalled,
    InstallFailed,
    DependencyFailed,
    FreshlyInstalled,
    Reinstalled,
}

#[derive(Debug)]
pub struct PackageNode {
    pub name: String,
    pub version: Option<String>,
    pub architecture: Option<String>,
    pub license: Option<String>,
    pub repository: Repository,
    pub archive_path: Option<PathBuf>,
    pub dependencies: Vec<String>,
    pub state: InstallState,
    pub error: Option<RestoreError>,
}

impl PackageNode {
    pub fn local(record: &ArchiveRecord, state: InstallState) -> Self {
        Self {
            name: record.name.clone(),
            version: Some(record.version.clone()),
            architecture: Some(record.architecture.clone()),
            license: None,
            repository: Repository::Local,
            archive_path: Some(record.path.clone()),
            dependencies: Vec::new(),
            state,
            error: None,
        }
    }

    pub fn official(name: String, state: InstallState) -> Self {
        Self {
            name,
            version: None,
            architecture: None,
            license: None,
            repository: Repository::Official,
            archive_path: None,
            dependencies: Vec::new(),
            state,
            error: None,
        }
    }

    /// A package the installed-state collaborator already accounts for and
    /// the cache does not: nothing to do at install time.
    pub fn installed(name: String, version: Option<String>) -> Self {
        Self {
            name,
            version,
            architecture: None,
            license: None,
            repository: Repository::Official,
            archive_path: None,
            dependencies: Vec::new(),
            state: InstallState::SameVersionInstalled,
            error: None,
        }
    }

    pub fn unavailable(name: String) -> Self {
        let error = RestoreError::PackageUnavailable(name.clone());
        Self {
            name,
            version: None,
            architecture: None,
            license: None,
            repository: Repository::Local,
            archive_path: None,
            dependencies: Vec::new(),
            state: InstallState::NotInstalled,
            error: Some(error),
        }
    }

    /// True when this node cannot satisfy anything that depends on it.
    pub fn failed(&self) -> bool {
        self.error.is_some() || self.state == InstallState::DependencyFailed
    }
}

/// Arena of resolved nodes. Aliases map several names onto one node id, so
/// "same package" is index equality rather than pointer identity.
#[derive(Debug, Default)]
pub struct PackageGraph {
    nodes: Vec<PackageNode>,
    index: HashMap<String, NodeId>,
}

impl PackageGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn lookup(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    pub fn get(&self, id: NodeId) -> &PackageNode {
        &self.nodes[id]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut PackageNode {
        &mut self.nodes[id]
    }

    pub fn node_by_name(&self, name: &str) -> Option<&PackageNode> {
        self.lookup(name).map(|id| self.get(id))
    }

    pub fn insert(&mut self, node: PackageNode) -> NodeId {
        let id = self.nodes.len();
        self.index.insert(node.name.clone(), id);
        self.nodes.push(node);
        id
    }

    pub fn alias(&mut self, name: &str, id: NodeId) {
        self.index.insert(name.to_string(), id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_points_at_the_same_node() {
        let mut graph = PackageGraph::new();
        let id = graph.insert(PackageNode::official("bash".to_string(), InstallState::NotInstalled));
        graph.alias("sh", id);

        assert_eq!(graph.lookup("bash"), Some(id));
        assert_eq!(graph.lookup("sh"), Some(id));
        assert_eq!(graph.len(), 1);

        graph.get_mut(id).state = InstallState::FreshlyInstalled;
        assert_eq!(graph.node_by_name("sh").unwrap().state, InstallState::FreshlyInstalled);
    }

    #[test]
    fn test_unavailable_nodes_carry_their_error() {
        let node = PackageNode::unavailable("ghost".to_string());
        assert!(node.failed());
        assert_eq!(
            node.error.unwrap().to_string(),
            "No cached package available for 'ghost'"
        );
    }

    #[test]
    fn test_dependency_failed_counts_as_failed() {
        let mut node = PackageNode::official("curl".to_string(), InstallState::NotInstalled);
        assert!(!node.failed());
        node.state = InstallState::DependencyFailed;
        assert!(node.failed());
    }
}
