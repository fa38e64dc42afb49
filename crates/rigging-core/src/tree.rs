//! The composed pipeline description
//!
//! A [`ConfigTree`] is built by the composition root, refined by the mode
//! overlay and the style strategy, and then handed to the bundler as-is.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::mode::BuildMode;
use crate::naming::OutputNamingTemplate;
use crate::rules::RuleTable;
use crate::style::StyleStrategy;

/// Source-map strategy for script bundles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceMapStrategy {
    /// Low fidelity, fast rebuilds
    CheapModuleEvalSourceMap,
    /// Separate, high-fidelity map files
    SourceMap,
}

/// How original file locations are written into source maps
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFilenames {
    /// Absolute paths with `/` separators
    Absolute,
    /// Paths relative to a directory
    RelativeTo(PathBuf),
}

/// Named entry point
#[derive(Debug, Clone, Serialize)]
pub struct EntryPoint {
    /// Entry name (chunk name)
    pub name: String,
    /// Modules that make up the entry, in order
    pub modules: Vec<PathBuf>,
}

/// Substitute implementation for a server-only built-in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStub {
    /// Resolve to an empty module
    Empty,
}

/// Module resolution settings
#[derive(Debug, Clone, Default, Serialize)]
pub struct Resolve {
    /// Search directories; earlier ones shadow later ones
    pub modules: Vec<PathBuf>,
    /// Extensions tried in order
    pub extensions: Vec<String>,
    /// Package name substitutions, in installation order
    pub alias: Vec<(String, String)>,
}

impl Resolve {
    /// Target of an alias
    pub fn alias_target(&self, name: &str) -> Option<&str> {
        self.alias
            .iter()
            .find(|(from, _)| from == name)
            .map(|(_, to)| to.as_str())
    }
}

/// Output settings
#[derive(Debug, Clone, Serialize)]
pub struct Output {
    /// Directory for emitted files (production only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// URL prefix under which assets are served
    pub public_path: String,
    /// Entry bundle names
    pub filename: OutputNamingTemplate,
    /// Async chunk names
    pub chunk_filename: OutputNamingTemplate,
    /// Emit module path comments
    pub pathinfo: bool,
    /// Source location format in maps
    pub source_filenames: SourceFilenames,
}

/// Module-level parser settings and the routing table
#[derive(Debug, Clone, Default, Serialize)]
pub struct ModuleConfig {
    /// Missing exports are errors, not warnings
    pub strict_export_presence: bool,
    /// Whether the legacy `require.ensure` syntax is parsed
    pub require_ensure: bool,
    /// Routing table
    pub rules: RuleTable,
}

/// An extension plugin for the bundler
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plugin {
    /// Identifier, unique in the plugin list
    pub id: String,
    /// Tool implementing the plugin
    pub tool: String,
    /// Options handed to the tool verbatim
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub options: serde_json::Value,
}

impl Plugin {
    /// A plugin without options
    pub fn new(id: impl Into<String>, tool: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tool: tool.into(),
            options: serde_json::Value::Null,
        }
    }

    /// Attach options
    pub fn with_options(mut self, options: serde_json::Value) -> Self {
        self.options = options;
        self
    }
}

/// Ordered plugin list keyed by id
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct PluginSet(Vec<Plugin>);

impl PluginSet {
    /// Insert or replace by id; a replaced plugin keeps its position.
    pub fn set(&mut self, plugin: Plugin) {
        match self.0.iter_mut().find(|p| p.id == plugin.id) {
            Some(existing) => *existing = plugin,
            None => self.0.push(plugin),
        }
    }

    /// Plugin by id
    pub fn get(&self, id: &str) -> Option<&Plugin> {
        self.0.iter().find(|p| p.id == id)
    }

    /// Whether a plugin is installed
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Installed ids, in order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|p| p.id.as_str())
    }

    /// Number of plugins
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no plugin is installed
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Optimization settings
#[derive(Debug, Clone, Default, Serialize)]
pub struct Optimization {
    /// Minify script output
    pub minimize: bool,
    /// Emit performance hints about asset sizes
    pub performance_hints: bool,
}

/// The full pipeline description
#[derive(Debug, Clone, Serialize)]
pub struct ConfigTree {
    /// Mode the tree was composed for
    pub mode: BuildMode,
    /// Abort the build on the first error
    pub bail: bool,
    /// Script source maps; `None` disables them
    pub devtool: Option<SourceMapStrategy>,
    /// Entry points
    pub entry: Vec<EntryPoint>,
    /// Resolution settings
    pub resolve: Resolve,
    /// Server-only built-ins replaced by stubs
    pub node: BTreeMap<String, NodeStub>,
    /// Output settings
    pub output: Output,
    /// Parser settings and routing
    pub module: ModuleConfig,
    /// Extension plugins
    pub plugins: PluginSet,
    /// Optimizations
    pub optimization: Optimization,
    /// Stylesheet output strategy, once installed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleStrategy>,
}

impl ConfigTree {
    /// Hex SHA-256 over the serialized tree.
    ///
    /// Two trees with the same fingerprint describe the same pipeline.
    pub fn fingerprint(&self) -> crate::Result<String> {
        let json = serde_json::to_vec(self)?;
        Ok(hex::encode(Sha256::digest(&json)))
    }
}
