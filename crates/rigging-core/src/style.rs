//! Stylesheet output strategy
//!
//! The strategy is fixed per composition from the build mode:
//!
//! - **Injecting** (development): stylesheets become script modules that
//!   insert a `<style>` tag at load time, which keeps hot style swapping.
//! - **Extracting** (production): stylesheets reachable from an entry point
//!   are collected into one content-hashed file per entry. Modules only
//!   reachable from an async chunk keep an injecting pipeline, because their
//!   file is not known until the chunk is requested.
//!
//! Both strategies resolve `url()`/`@import` references and add vendor
//! prefixes before anything else.

use serde::Serialize;
use serde_json::json;

use crate::error::Result;
use crate::mode::BuildMode;
use crate::naming::OutputNamingTemplate;
use crate::rules::{MatcherRule, ProcessingStep};
use crate::tree::{ConfigTree, Plugin};

/// Group holding the stylesheet rule
pub const STYLE_GROUP: &str = "styles";
/// Rule claiming stylesheet modules
pub const STYLE_RULE: &str = "css";
/// Plugin writing extracted stylesheets
pub const EXTRACT_PLUGIN: &str = "extract-css";

/// Where stylesheet text ends up
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StyleOutputMode {
    /// Injected at runtime by the module system
    Inline,
    /// Written to static files
    ExtractedFile {
        /// Name template of the extracted file
        filename: OutputNamingTemplate,
        /// Prefix for asset references inside the file, when served relatively
        #[serde(skip_serializing_if = "Option::is_none")]
        public_path_prefix: Option<String>,
    },
}

/// State of the strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleState {
    /// Runtime injection
    Injecting,
    /// Build-time extraction
    Extracting,
}

/// Inputs to the strategy besides the mode
#[derive(Debug, Clone)]
pub struct StyleOptions {
    /// Assets are served from `./` rather than an absolute prefix
    pub relative_asset_paths: bool,
    /// Emit source maps for extracted styles
    pub source_map: bool,
    /// Name template of extracted files
    pub filename: OutputNamingTemplate,
}

/// Chosen stylesheet strategy
#[derive(Debug, Clone, Serialize)]
pub struct StyleStrategy {
    /// Output mode
    pub output: StyleOutputMode,
    /// Source maps for extracted styles
    pub source_map: bool,
}

/// `../` repeated once per directory level of `filename`.
///
/// A template with `k` segments sits `k - 1` directories below the build
/// root, so that many parent steps lead back to it.
pub fn relative_public_path(filename: &OutputNamingTemplate) -> String {
    "../".repeat(filename.path_segments().saturating_sub(1))
}

impl StyleStrategy {
    /// Pick the strategy for a mode
    pub fn for_mode(mode: BuildMode, options: &StyleOptions) -> Self {
        let output = match mode {
            BuildMode::Development => StyleOutputMode::Inline,
            BuildMode::Production => StyleOutputMode::ExtractedFile {
                filename: options.filename.clone(),
                public_path_prefix: options
                    .relative_asset_paths
                    .then(|| relative_public_path(&options.filename)),
            },
        };
        Self {
            output,
            source_map: options.source_map,
        }
    }

    /// Current state
    pub fn state(&self) -> StyleState {
        match self.output {
            StyleOutputMode::Inline => StyleState::Injecting,
            StyleOutputMode::ExtractedFile { .. } => StyleState::Extracting,
        }
    }

    /// Rule claiming `.css` modules under this strategy
    pub fn rule(&self) -> Result<MatcherRule> {
        let rule = MatcherRule::new(STYLE_RULE).test(r"\.css$")?;

        let rule = match &self.output {
            StyleOutputMode::Inline => {
                with_steps(rule, inject_step(true), css_step(false, false))
            }
            StyleOutputMode::ExtractedFile {
                public_path_prefix, ..
            } => {
                let extract = match public_path_prefix {
                    Some(prefix) => ProcessingStep::new("extract-css")
                        .with_options(json!({ "public_path": prefix })),
                    None => ProcessingStep::new("extract-css"),
                };
                let css = css_step(true, self.source_map);
                let fallback = vec![inject_step(false), css.clone(), postcss_step()];
                with_steps(rule, extract, css).async_fallback(fallback)
            }
        };
        Ok(rule)
    }

    /// Install the stylesheet rule and, when extracting, the emission plugin
    pub fn install(self, mut tree: ConfigTree) -> Result<ConfigTree> {
        tracing::debug!(state = ?self.state(), "installing style strategy");

        tree.module.rules.group_mut(STYLE_GROUP).set_rule(self.rule()?);

        if let StyleOutputMode::ExtractedFile { filename, .. } = &self.output {
            tree.plugins.set(
                Plugin::new(EXTRACT_PLUGIN, "extract-css")
                    .with_options(json!({ "filename": filename.as_str() })),
            );
        }

        tree.style = Some(self);
        Ok(tree)
    }
}

fn with_steps(rule: MatcherRule, first: ProcessingStep, css: ProcessingStep) -> MatcherRule {
    rule.step(first).step(css).step(postcss_step())
}

fn inject_step(hot: bool) -> ProcessingStep {
    if hot {
        ProcessingStep::new("style")
    } else {
        ProcessingStep::new("style").with_options(json!({ "hmr": false }))
    }
}

fn css_step(minimize: bool, source_map: bool) -> ProcessingStep {
    if minimize {
        ProcessingStep::new("css").with_options(json!({
            "import_loaders": 1,
            "minimize": true,
            "source_map": source_map,
        }))
    } else {
        ProcessingStep::new("css").with_options(json!({ "import_loaders": 1 }))
    }
}

fn postcss_step() -> ProcessingStep {
    ProcessingStep::new("postcss").with_options(json!({
        "ident": "postcss",
        "plugins": [
            { "name": "flexbugs-fixes" },
            { "name": "autoprefixer", "flexbox": "no-2009" },
        ],
    }))
}
