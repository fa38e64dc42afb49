//! Build mode overlays
//!
//! An overlay takes the mode-independent base tree and returns it with the
//! settings of one mode applied. Every overlay sets values and installs
//! plugins by id, so applying the same overlay twice changes nothing.
//! The development and production overlays are never combined in one run.

use serde_json::json;

use crate::config::AppPaths;
use crate::diagnostics::QUIET_PRECACHE_PREFIXES;
use crate::mode::BuildMode;
use crate::naming::{
    DEV_CHUNK_FILENAME, DEV_SCRIPT_FILENAME, OutputNamingTemplate, PROD_CHUNK_FILENAME,
    PROD_SCRIPT_FILENAME,
};
use crate::tree::{ConfigTree, Plugin, SourceFilenames, SourceMapStrategy};

/// File name of the asset manifest
pub const MANIFEST_FILE: &str = "asset-manifest.json";
/// File name of the precache descriptor
pub const SERVICE_WORKER_FILE: &str = "service-worker.js";

/// Inputs shared by both overlays
#[derive(Debug, Clone)]
pub struct OverlayOptions {
    /// Emit production source maps
    pub source_map: bool,
    /// Resolved application paths
    pub paths: AppPaths,
}

/// Apply the overlay for `mode`
pub fn apply(tree: ConfigTree, mode: BuildMode, options: &OverlayOptions) -> ConfigTree {
    tracing::debug!(%mode, "applying overlay");
    match mode {
        BuildMode::Development => development(tree, options),
        BuildMode::Production => production(tree, options),
    }
}

/// Fast rebuilds: stable names, cheap source maps, hot updates
pub fn development(mut tree: ConfigTree, options: &OverlayOptions) -> ConfigTree {
    let paths = &options.paths;

    tree.bail = false;
    tree.devtool = Some(SourceMapStrategy::CheapModuleEvalSourceMap);

    tree.output.path = None;
    tree.output.pathinfo = true;
    tree.output.filename = OutputNamingTemplate::new(DEV_SCRIPT_FILENAME);
    tree.output.chunk_filename = OutputNamingTemplate::new(DEV_CHUNK_FILENAME);
    tree.output.source_filenames = SourceFilenames::Absolute;

    tree.optimization.minimize = false;

    tree.plugins.set(Plugin::new("html", "html").with_options(json!({
        "inject": true,
        "template": paths.app_html,
    })));
    tree.plugins.set(Plugin::new("named-modules", "named-modules"));
    tree.plugins.set(Plugin::new("hot", "hot-module-replacement"));
    tree.plugins.set(Plugin::new("case-sensitive-paths", "case-sensitive-paths"));
    tree.plugins.set(
        Plugin::new("missing-node-modules", "watch-missing-node-modules")
            .with_options(json!({ "node_modules": paths.app_node_modules })),
    );

    tree
}

/// Small, content-hashed output that aborts on the first error
pub fn production(mut tree: ConfigTree, options: &OverlayOptions) -> ConfigTree {
    let paths = &options.paths;

    tree.bail = true;
    tree.devtool = options.source_map.then_some(SourceMapStrategy::SourceMap);

    tree.output.path = Some(paths.app_build.clone());
    tree.output.pathinfo = false;
    tree.output.filename = OutputNamingTemplate::new(PROD_SCRIPT_FILENAME);
    tree.output.chunk_filename = OutputNamingTemplate::new(PROD_CHUNK_FILENAME);
    tree.output.source_filenames = SourceFilenames::RelativeTo(paths.app_src.clone());

    tree.optimization.minimize = true;

    tree.plugins.set(Plugin::new("html", "html").with_options(json!({
        "inject": true,
        "template": paths.app_html,
        "minify": {
            "remove_comments": true,
            "collapse_whitespace": true,
            "remove_redundant_attributes": true,
            "use_short_doctype": true,
            "remove_empty_attributes": true,
            "remove_style_link_type_attributes": true,
            "keep_closing_slash": true,
            "minify_js": true,
            "minify_css": true,
            "minify_urls": true,
        },
    })));
    tree.plugins.set(Plugin::new("minify", "uglify").with_options(json!({
        "uglify_options": {
            "ecma": 8,
            "compress": { "warnings": false, "comparisons": false },
            "mangle": { "safari10": true },
            "output": { "comments": false, "ascii_only": true },
        },
        "parallel": true,
        "cache": true,
        "source_map": options.source_map,
    })));
    tree.plugins.set(
        Plugin::new("manifest", "manifest").with_options(json!({ "file_name": MANIFEST_FILE })),
    );
    tree.plugins.set(Plugin::new("service-worker", "sw-precache").with_options(json!({
        "filename": SERVICE_WORKER_FILE,
        "dont_cache_bust_urls_matching": r"\.\w{8}\.",
        "minify": true,
        "static_file_globs_ignore_patterns": [r"\.map$", r"asset-manifest\.json$"],
        "quiet_messages": QUIET_PRECACHE_PREFIXES,
    })));

    tree
}
