//! CLI command implementations

use anyhow::{Context as _, Result};
use std::ffi::OsString;
use std::path::Path;

use rigging_core::{BuildMode, ComposeOptions, Config, ConfigTree};

pub mod compose;
pub mod html;
pub mod init;
pub mod route;
pub mod scan;
pub mod validate;

/// Global arguments shared by every command
pub struct Context {
    /// Configuration file or project directory
    pub config_path: String,
    /// Build mode as given on the command line or in `NODE_ENV`
    pub mode: String,
    /// Platform-delimited module search list
    pub node_path: Option<OsString>,
}

/// A loaded project with its composed tree
pub struct Composed {
    /// Project configuration
    pub config: Config,
    /// Options the tree was composed from
    pub options: ComposeOptions,
    /// Composed tree
    pub tree: ConfigTree,
}

impl Context {
    /// Parse the mode, load the project and compose it
    pub fn compose(&self) -> Result<Composed> {
        let mode = BuildMode::parse(&self.mode)?;

        tracing::debug!("Loading configuration from {}", self.config_path);
        // Absolute paths keep routing independent of how module paths are spelled
        let path = Path::new(&self.config_path);
        let path = if path.exists() {
            path.canonicalize()?
        } else {
            path.to_path_buf()
        };
        let config = Config::load(&path).context("Failed to load configuration")?;

        let options =
            ComposeOptions::from_config(&config, mode, self.node_path.as_deref(), std::env::vars())
                .context("Failed to assemble composition inputs")?;
        let tree = rigging_core::compose(mode, &options).context("Composition failed")?;

        Ok(Composed {
            config,
            options,
            tree,
        })
    }
}
