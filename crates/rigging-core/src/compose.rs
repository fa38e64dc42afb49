//! Composition root
//!
//! Builds the full pipeline description for one build mode:
//!
//! ```text
//! base tree ──▶ mode overlay ──▶ style strategy ──▶ ConfigTree
//!  (entry, resolve, rules, shared plugins)
//! ```
//!
//! Composition is a pure function of [`ComposeOptions`] and the mode. The
//! mode is never read from the process environment here.

use serde_json::json;
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::PathBuf;

use crate::config::{AppPaths, Config, EntrySpec};
use crate::env::{ClientEnv, module_search_paths, should_use_relative_asset_paths};
use crate::error::{Error, Result};
use crate::mode::BuildMode;
use crate::naming::{
    DEV_CHUNK_FILENAME, DEV_SCRIPT_FILENAME, MEDIA_FILENAME, OutputNamingTemplate, STYLE_FILENAME,
};
use crate::overlay::{self, OverlayOptions};
use crate::rules::{
    DefaultArm, FirstMatchGroup, MatcherRule, PathCondition, ProcessingStep, RuleTable,
};
use crate::style::{StyleOptions, StyleStrategy};
use crate::tree::{
    ConfigTree, EntryPoint, ModuleConfig, NodeStub, Optimization, Output, Plugin, PluginSet,
    Resolve, SourceFilenames,
};

/// Name of the single entry point
pub const ENTRY_NAME: &str = "index";
/// Media files below this size are embedded as data URLs
pub const INLINE_ASSET_LIMIT: u64 = 10_000;
/// Search directory consulted before any configured one
pub const BUILTIN_MODULES_DIR: &str = "node_modules";
/// Extensions tried during resolution, in order
pub const EXTENSIONS: &[&str] = &[".web.js", ".mjs", ".js", ".json", ".web.jsx", ".jsx"];
/// Server-only built-ins replaced by empty modules
pub const NODE_STUBS: &[&str] = &["dgram", "fs", "net", "tls", "child_process"];

const SCRIPT_TEST: &str = r"\.(js|jsx|mjs)$";

/// Inputs to one composition
#[derive(Debug, Clone)]
pub struct ComposeOptions {
    /// Entry module(s)
    pub entry: EntrySpec,
    /// Application paths
    pub paths: AppPaths,
    /// URL prefix the build is served from
    pub public_path: String,
    /// Client environment
    pub env: ClientEnv,
    /// Emit source maps in production
    pub source_map: bool,
    /// Extra search directories, in the order supplied
    pub module_dirs: Vec<PathBuf>,
    /// Extra package substitutions
    pub aliases: Vec<(String, String)>,
}

impl ComposeOptions {
    /// Options for a loaded project.
    ///
    /// `node_path` is the platform-delimited search list (usually
    /// `NODE_PATH`); its directories precede the project's own
    /// `resolve.modules`. `vars` supplies process variables for the client
    /// environment.
    pub fn from_config<I>(
        config: &Config,
        mode: BuildMode,
        node_path: Option<&OsStr>,
        vars: I,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let project = &config.project;

        let mut module_dirs = module_search_paths(node_path, &config.base_path)?;
        module_dirs.extend(
            project
                .resolve
                .modules
                .iter()
                .map(|dir| config.base_path.join(dir)),
        );

        let entry = match &project.entry {
            EntrySpec::Single(path) => EntrySpec::Single(resolve_entry(config, path)),
            EntrySpec::Many(paths) => {
                EntrySpec::Many(paths.iter().map(|p| resolve_entry(config, p)).collect())
            }
        };

        Ok(Self {
            entry,
            paths: config.app_paths(),
            public_path: project.public_path.clone(),
            env: ClientEnv::collect(mode, &project.public_path, vars, &project.env),
            source_map: project.source_map,
            module_dirs,
            aliases: project
                .resolve
                .alias
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        })
    }
}

fn resolve_entry(config: &Config, path: &str) -> String {
    config.base_path.join(path).to_string_lossy().into_owned()
}

/// Compose with a mode given as text; an unknown mode fails before any
/// tree exists.
pub fn compose_with_mode(mode: &str, options: &ComposeOptions) -> Result<ConfigTree> {
    let mode = BuildMode::parse(mode)?;
    compose(mode, options)
}

/// Compose the pipeline description for `mode`
pub fn compose(mode: BuildMode, options: &ComposeOptions) -> Result<ConfigTree> {
    let tree = base(mode, options)?;

    let tree = overlay::apply(
        tree,
        mode,
        &OverlayOptions {
            source_map: options.source_map,
            paths: options.paths.clone(),
        },
    );

    let strategy = StyleStrategy::for_mode(
        mode,
        &StyleOptions {
            relative_asset_paths: should_use_relative_asset_paths(&options.public_path),
            source_map: options.source_map,
            filename: OutputNamingTemplate::new(STYLE_FILENAME),
        },
    );
    let tree = strategy.install(tree)?;

    tracing::info!(
        %mode,
        entries = tree.entry.iter().map(|e| e.modules.len()).sum::<usize>(),
        plugins = tree.plugins.len(),
        "composed build pipeline"
    );
    Ok(tree)
}

/// Mode-independent part of the tree
fn base(mode: BuildMode, options: &ComposeOptions) -> Result<ConfigTree> {
    let paths = &options.paths;

    let entry = EntryPoint {
        name: ENTRY_NAME.to_string(),
        modules: options.entry.normalize().into_iter().map(PathBuf::from).collect(),
    };

    let node = NODE_STUBS
        .iter()
        .map(|name| (name.to_string(), NodeStub::Empty))
        .collect::<BTreeMap<_, _>>();

    let mut plugins = PluginSet::default();
    plugins.set(Plugin::new("module-scope", "module-scope").with_options(json!({
        "app_src": paths.app_src,
        "allowed_files": [paths.app_package_json],
    })));
    plugins.set(
        Plugin::new("interpolate-html", "interpolate-html").with_options(json!(options.env.raw)),
    );
    plugins.set(Plugin::new("define", "define").with_options(options.env.stringified.clone()));
    plugins.set(Plugin::new("ignore", "ignore").with_options(json!({
        "resource_regexp": r"^\./locale$",
        "context_regexp": "moment$",
    })));

    Ok(ConfigTree {
        mode,
        bail: false,
        devtool: None,
        entry: vec![entry],
        resolve: resolve(options)?,
        node,
        output: Output {
            path: None,
            public_path: options.public_path.clone(),
            filename: OutputNamingTemplate::new(DEV_SCRIPT_FILENAME),
            chunk_filename: OutputNamingTemplate::new(DEV_CHUNK_FILENAME),
            pathinfo: false,
            source_filenames: SourceFilenames::Absolute,
        },
        module: ModuleConfig {
            strict_export_presence: true,
            require_ensure: false,
            rules: rule_table(paths)?,
        },
        plugins,
        optimization: Optimization {
            minimize: false,
            performance_hints: false,
        },
        style: None,
    })
}

fn resolve(options: &ComposeOptions) -> Result<Resolve> {
    let paths = &options.paths;

    let mut modules = vec![PathBuf::from(BUILTIN_MODULES_DIR), paths.app_node_modules.clone()];
    modules.extend(options.module_dirs.iter().cloned());

    let mut alias = vec![
        (
            "@babel/runtime".to_string(),
            paths
                .app_node_modules
                .join("@babel/runtime")
                .to_string_lossy()
                .into_owned(),
        ),
        ("react-native".to_string(), "react-native-web".to_string()),
    ];
    for (name, target) in &options.aliases {
        validate_alias(name, target)?;
        alias.push((name.clone(), target.clone()));
    }

    Ok(Resolve {
        modules,
        extensions: EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        alias,
    })
}

fn validate_alias(name: &str, target: &str) -> Result<()> {
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(Error::ResolutionFailure {
            message: format!("alias name '{}' is not a package name", name),
        });
    }
    if target.trim().is_empty() {
        return Err(Error::ResolutionFailure {
            message: format!("alias '{}' has an empty target", name),
        });
    }
    Ok(())
}

/// Linter pre rule, first-match groups and the default arm
pub fn rule_table(paths: &AppPaths) -> Result<RuleTable> {
    let mut table = RuleTable::default();

    table.set_pre(
        MatcherRule::new("linter")
            .test(SCRIPT_TEST)?
            .include(PathCondition::under(&paths.app_src))
            .step(ProcessingStep::new("eslint").with_options(json!({
                "formatter": "react-dev-utils",
                "base_config": { "extends": ["eslint-config-react-app"] },
                "ignore": false,
                "use_eslintrc": false,
            }))),
    );

    let url = MatcherRule::new("url")
        .test(r"\.bmp$")?
        .test(r"\.gif$")?
        .test(r"\.jpe?g$")?
        .test(r"\.png$")?
        .include(PathCondition::under(&paths.app_src))
        .step(ProcessingStep::new("url").with_options(json!({
            "limit": INLINE_ASSET_LIMIT,
            "name": MEDIA_FILENAME,
            "fallback": "file",
        })));
    table.groups.push(FirstMatchGroup::new("media").rule(url));

    let babel_app = MatcherRule::new("babel-app")
        .test(SCRIPT_TEST)?
        .include(PathCondition::under(&paths.app_src))
        .step(ProcessingStep::new("thread"))
        .step(ProcessingStep::new("babel").with_options(json!({
            "babelrc": false,
            "presets": ["babel-preset-react-app"],
            "compact": true,
        })));
    let babel_modules = MatcherRule::new("babel-modules")
        .test(r"\.js$")?
        .step(ProcessingStep::new("thread"))
        .step(ProcessingStep::new("babel").with_options(json!({
            "babelrc": false,
            "compact": false,
            "presets": ["babel-preset-react-app/dependencies"],
            "cache_directory": true,
        })));
    table
        .groups
        .push(FirstMatchGroup::new("scripts").rule(babel_app).rule(babel_modules));

    table.default = Some(
        DefaultArm::new(vec![
            ProcessingStep::new("file").with_options(json!({ "name": MEDIA_FILENAME })),
        ])
        .except(PathCondition::matches(SCRIPT_TEST)?)
        .except(PathCondition::matches(r"\.html$")?)
        .except(PathCondition::matches(r"\.json$")?),
    );

    Ok(table)
}
