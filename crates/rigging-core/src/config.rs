//! Configuration parsing and validation
//!
//! This module handles loading the project file `rigging.yaml`.
//!
//! ```yaml
//! name: my-app
//! entry: src/index.js          # or a list
//! public_path: /
//! source_map: true
//! paths:
//!   app_src: src
//!   app_build: build
//! resolve:
//!   modules: [shared]
//!   alias:
//!     lodash: lodash-es
//! env:
//!   REACT_APP_API: https://api.example.com
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// File name of the project configuration
pub const CONFIG_FILE: &str = "rigging.yaml";

/// Root project configuration from `rigging.yaml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name
    pub name: String,

    /// Entry module(s)
    #[serde(default)]
    pub entry: EntrySpec,

    /// URL prefix under which the build is served
    #[serde(default = "default_public_path")]
    pub public_path: String,

    /// Emit source maps in production
    #[serde(default = "default_true")]
    pub source_map: bool,

    /// Application directories and files
    #[serde(default)]
    pub paths: PathsConfig,

    /// Extra resolution settings
    #[serde(default)]
    pub resolve: ResolveConfig,

    /// Extra client environment variables
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

fn default_public_path() -> String {
    "/".to_string()
}

fn default_true() -> bool {
    true
}

/// A single entry path or a list of them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntrySpec {
    /// One module
    Single(String),
    /// Several modules, in order
    Many(Vec<String>),
}

impl Default for EntrySpec {
    fn default() -> Self {
        Self::Single("src/index.js".to_string())
    }
}

impl EntrySpec {
    /// Ordered list of entry modules; a single path becomes a one-element list
    pub fn normalize(&self) -> Vec<String> {
        match self {
            Self::Single(path) => vec![path.clone()],
            Self::Many(paths) => paths.clone(),
        }
    }
}

/// Application paths, relative to the project directory unless absolute
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Application sources
    #[serde(default = "default_app_src")]
    pub app_src: PathBuf,
    /// Build output directory
    #[serde(default = "default_app_build")]
    pub app_build: PathBuf,
    /// HTML template
    #[serde(default = "default_app_html")]
    pub app_html: PathBuf,
    /// Installed dependencies
    #[serde(default = "default_app_node_modules")]
    pub app_node_modules: PathBuf,
    /// Package manifest
    #[serde(default = "default_app_package_json")]
    pub app_package_json: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            app_src: default_app_src(),
            app_build: default_app_build(),
            app_html: default_app_html(),
            app_node_modules: default_app_node_modules(),
            app_package_json: default_app_package_json(),
        }
    }
}

fn default_app_src() -> PathBuf {
    PathBuf::from("src")
}

fn default_app_build() -> PathBuf {
    PathBuf::from("build")
}

fn default_app_html() -> PathBuf {
    PathBuf::from("public/index.html")
}

fn default_app_node_modules() -> PathBuf {
    PathBuf::from("node_modules")
}

fn default_app_package_json() -> PathBuf {
    PathBuf::from("package.json")
}

/// Resolved application paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    /// Application sources
    pub app_src: PathBuf,
    /// Build output directory
    pub app_build: PathBuf,
    /// HTML template
    pub app_html: PathBuf,
    /// Installed dependencies
    pub app_node_modules: PathBuf,
    /// Package manifest
    pub app_package_json: PathBuf,
}

impl PathsConfig {
    /// Resolve every path against the project directory
    pub fn resolve(&self, base: &Path) -> AppPaths {
        AppPaths {
            app_src: base.join(&self.app_src),
            app_build: base.join(&self.app_build),
            app_html: base.join(&self.app_html),
            app_node_modules: base.join(&self.app_node_modules),
            app_package_json: base.join(&self.app_package_json),
        }
    }
}

/// Extra resolution settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolveConfig {
    /// Search directories appended after the built-in ones
    #[serde(default)]
    pub modules: Vec<PathBuf>,

    /// Package substitutions appended after the built-in ones
    #[serde(default)]
    pub alias: BTreeMap<String, String>,
}

/// Main configuration container
#[derive(Debug, Clone)]
pub struct Config {
    /// Project configuration
    pub project: ProjectConfig,

    /// Base path of the project
    pub base_path: PathBuf,
}

impl Config {
    /// Load configuration from a directory or a `rigging.yaml` file
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let config = Config::load("./my-app")?;
    /// println!("Project: {}", config.project.name);
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let (config_path, base_path) = if path.is_dir() {
            (path.join(CONFIG_FILE), path.to_path_buf())
        } else {
            (
                path.to_path_buf(),
                path.parent().unwrap_or(Path::new(".")).to_path_buf(),
            )
        };

        if !config_path.exists() {
            return Err(Error::ConfigNotFound {
                path: config_path.display().to_string(),
            });
        }

        let contents = std::fs::read_to_string(&config_path)?;
        let project = Self::parse(&contents)?;
        tracing::debug!(
            project = %project.name,
            path = %config_path.display(),
            "loaded configuration"
        );

        Ok(Self { project, base_path })
    }

    /// Parse and validate a configuration document
    pub fn parse(contents: &str) -> Result<ProjectConfig> {
        let project: ProjectConfig = serde_yaml::from_str(contents)?;

        if project.entry.normalize().iter().all(|e| e.trim().is_empty()) {
            return Err(Error::ConfigInvalid {
                message: "at least one entry module is required".to_string(),
            });
        }
        if project.public_path.is_empty() {
            return Err(Error::ConfigInvalid {
                message: "public_path must not be empty; use '/' or './'".to_string(),
            });
        }

        Ok(project)
    }

    /// Application paths resolved against the project directory
    pub fn app_paths(&self) -> AppPaths {
        self.project.paths.resolve(&self.base_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let config = Config::parse("name: test-app\n").unwrap();
        assert_eq!(config.name, "test-app");
        assert_eq!(config.entry, EntrySpec::Single("src/index.js".to_string()));
        assert_eq!(config.public_path, "/");
        assert!(config.source_map);
        assert_eq!(config.paths.app_src, PathBuf::from("src"));
        assert!(config.resolve.modules.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
name: test-app
entry:
  - src/polyfills.js
  - src/index.js
public_path: ./
source_map: false
paths:
  app_src: client
  app_build: dist
resolve:
  modules: [shared]
  alias:
    lodash: lodash-es
env:
  REACT_APP_API: https://api.example.com
"#;
        let config = Config::parse(yaml).unwrap();
        assert_eq!(
            config.entry.normalize(),
            vec!["src/polyfills.js", "src/index.js"]
        );
        assert_eq!(config.public_path, "./");
        assert!(!config.source_map);
        assert_eq!(config.paths.app_src, PathBuf::from("client"));
        assert_eq!(config.paths.app_html, PathBuf::from("public/index.html"));
        assert_eq!(config.resolve.modules, vec![PathBuf::from("shared")]);
        assert_eq!(
            config.resolve.alias.get("lodash").map(String::as_str),
            Some("lodash-es")
        );
        assert_eq!(config.env.len(), 1);
    }

    #[test]
    fn test_single_entry_normalizes_to_one_element() {
        let entry = EntrySpec::Single("src/index.js".to_string());
        assert_eq!(entry.normalize(), vec!["src/index.js"]);
    }

    #[test]
    fn test_empty_public_path_is_invalid() {
        let result = Config::parse("name: x\npublic_path: ''\n");
        assert!(matches!(result, Err(Error::ConfigInvalid { .. })));
    }

    #[test]
    fn test_empty_entry_list_is_invalid() {
        let result = Config::parse("name: x\nentry: []\n");
        assert!(matches!(result, Err(Error::ConfigInvalid { .. })));
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "name: loaded\n").unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.project.name, "loaded");
        assert_eq!(config.base_path, dir.path());
        assert_eq!(config.app_paths().app_src, dir.path().join("src"));
        assert_eq!(config.project.entry.normalize(), vec!["src/index.js".to_string()]);
    }

    #[test]
    fn test_load_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        match Config::load(dir.path()) {
            Err(Error::ConfigNotFound { path }) => assert!(path.ends_with(CONFIG_FILE)),
            other => panic!("Expected ConfigNotFound, got {:?}", other),
        }
    }
}
