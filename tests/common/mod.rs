//! Common test utilities for integration tests.

use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const XWIKI_WIKI: &str = r#"
[wikis.docs]
backend = "XWiki"
base_url = "http://localhost:8080/xwiki"
base_rest_url = "http://localhost:8080/xwiki/rest"
"#;

pub const GITHUB_WIKI: &str = r#"
[wikis.repo]
backend = "github"
base_url = "https://raw.githubusercontent.com/a/p/main"
base_rest_url = "https://api.github.com/repos/a/p"
"#;

pub const NEXTCLOUD_WIKI: &str = r#"
[wikis.cloud]
backend = "Nextcloud"
base_rest_url = "https://cloud.example.com/remote.php/dav/files/alice/.cristal"
"#;

/// A test fixture that creates a temporary workspace with a `.cristal` directory.
pub struct TestWorkspace {
    #[allow(dead_code)] // Kept to prevent TempDir from being dropped
    dir: TempDir,
    pub root: PathBuf,
}

impl TestWorkspace {
    /// Creates a new workspace with an empty `.cristal` directory.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        // Canonicalize the path to resolve symlinks (e.g., /var -> /private/var on macOS)
        let root = dir
            .path()
            .canonicalize()
            .expect("Failed to canonicalize temp directory");

        // Create .cristal directory (required for config detection)
        std::fs::create_dir(root.join(".cristal")).expect("Failed to create .cristal directory");

        Self { dir, root }
    }

    /// Creates a workspace whose `.cristal/config.toml` holds `toml`.
    pub fn with_config(toml: &str) -> Self {
        let workspace = Self::new();
        workspace.write_config(toml);
        workspace
    }

    pub fn write_config(&self, toml: &str) {
        std::fs::write(self.root.join(".cristal").join("config.toml"), toml)
            .expect("Failed to write config.toml");
    }

    /// Creates a file with the given content.
    pub fn create_file(&self, path: &str, content: &str) -> PathBuf {
        let file_path = self.root.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
        file_path
    }

    /// Creates a subdirectory.
    #[allow(dead_code)]
    pub fn create_dir(&self, path: &str) -> PathBuf {
        let dir_path = self.root.join(path);
        std::fs::create_dir_all(&dir_path).expect("Failed to create directory");
        dir_path
    }

    /// Returns the path to the root directory.
    #[allow(dead_code)]
    pub fn path(&self) -> &Path {
        &self.root
    }
}
