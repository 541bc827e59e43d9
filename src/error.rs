use thiserror::Error;

pub type RestoreResult<T> = Result<T, RestoreError>;

#[derive(Error, Debug)]
pub enum RestoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to parse package file name '{0}'")]
    InvalidPackageFormat(String),

    #[error("No cached package available for '{0}'")]
    PackageUnavailable(String),

    #[error("Failed to install package {target}: {stderr}")]
    InstallFailed { target: String, stderr: String },

    #[error("Dependency '{0}' failed to install")]
    DependencyFailed(String),

    #[error("Official package '{0}' not found in cache")]
    CacheOnlyViolation(String),

    #[error("Failed to run command {command}: {source}")]
    CommandFailed {
        command: String,
        source: std::io::Error,
    },
}
