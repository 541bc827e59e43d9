use crate::error::RestoreResult;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    #[serde(default)]
    pub use_cache_only: bool,

    #[serde(default)]
    pub force: bool,

    #[serde(default = "default_color")]
    pub color: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            use_cache_only: false,
            force: false,
            color: default_color(),
        }
    }
}

impl Config {
    pub fn load(config_path: Option<&str>) -> RestoreResult<Self> {
        let config_path = match config_path {
            Some(path) => PathBuf::from(path),
            None => return Ok(Config::default()),
        };

        if config_path.exists() && config_path.is_file() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("/var/cache/pacman/pkg")
}

fn default_color() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.cache_dir, PathBuf::from("/var/cache/pacman/pkg"));
        assert!(!config.use_cache_only);
        assert!(!config.force);
        assert!(config.color);
    }

    #[test]
    fn test_load_without_path_uses_defaults() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.cache_dir, default_cache_dir());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pacrestore.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "cache_dir = \"/tmp/pkgcache\"").unwrap();
        writeln!(file, "use_cache_only = true").unwrap();

        let config = Config::load(path.to_str()).unwrap();
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/pkgcache"));
        assert!(config.use_cache_only);
        assert!(!config.force);
    }

    #[test]
    fn test_load_missing_file_falls_back_to_defaults() {
        let config = Config::load(Some("/nonexistent/pacrestore.toml")).unwrap();
        assert_eq!(config.cache_dir, default_cache_dir());
    }
}
