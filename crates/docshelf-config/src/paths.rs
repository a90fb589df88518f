//! Application paths management.

use directories::ProjectDirs;
use std::path::PathBuf;

/// Manages all application paths following platform conventions.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
    pub config_file: PathBuf,
    /// Managed directory holding the stored documents and pending markers.
    pub documents_dir: PathBuf,
    /// The indexing engine's database file (opaque to the core).
    pub index_file: PathBuf,
    pub log_dir: PathBuf,
}

impl AppPaths {
    /// Create paths using platform-specific directories.
    pub fn new() -> Option<Self> {
        let proj_dirs = ProjectDirs::from("com", "docshelf", "docshelf")?;

        let config_dir = proj_dirs.config_dir().to_path_buf();
        let data_dir = proj_dirs.data_dir().to_path_buf();

        Some(Self {
            config_file: config_dir.join("config.toml"),
            documents_dir: data_dir.join("documents"),
            index_file: data_dir.join("index.db"),
            log_dir: data_dir.join("logs"),
            config_dir,
            data_dir,
        })
    }

    /// Create paths rooted at an explicit data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            config_file: data_dir.join("config.toml"),
            documents_dir: data_dir.join("documents"),
            index_file: data_dir.join("index.db"),
            log_dir: data_dir.join("logs"),
            config_dir: data_dir.clone(),
            data_dir,
        }
    }

    /// Create all necessary directories.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(&self.documents_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }

    /// Check if docshelf has been initialized.
    pub fn is_initialized(&self) -> bool {
        self.config_file.exists() && self.documents_dir.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_paths_creation() {
        let paths = AppPaths::new();
        assert!(paths.is_some());

        let paths = paths.unwrap();
        assert!(paths.config_file.to_string_lossy().contains("config.toml"));
        assert!(paths.index_file.to_string_lossy().contains("index.db"));
        assert!(paths
            .documents_dir
            .to_string_lossy()
            .contains("documents"));
    }

    #[test]
    fn test_with_data_dir() {
        let paths = AppPaths::with_data_dir(PathBuf::from("/tmp/shelf"));
        assert_eq!(paths.documents_dir, PathBuf::from("/tmp/shelf/documents"));
        assert_eq!(paths.index_file, PathBuf::from("/tmp/shelf/index.db"));
    }
}
