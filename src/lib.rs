pub mod archive;
pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod graph;
pub mod install;
pub mod report;
pub mod resolver;
pub mod version;

pub use archive::{ArchiveMetadata, ArchiveRecord};
pub use backend::{CliBackend, CommandOutput, InstallKind, PacmanBackend};
pub use cache::CacheIndex;
pub use config::Config;
pub use error::{RestoreError, RestoreResult};
pub use graph::{InstallState, NodeId, PackageGraph, PackageNode, Repository};
pub use install::Installer;
pub use resolver::Resolver;

pub const PACRESTORE_VERSION: &str = "0.1.0";
