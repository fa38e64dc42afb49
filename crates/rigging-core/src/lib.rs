//! Rigging Core Library
//!
//! This crate composes the build pipeline description for a front-end
//! application:
//! - Project configuration loading
//! - Build mode overlays (development / production)
//! - First-match module rule dispatch
//! - Stylesheet strategy (runtime injection / extraction to hashed files)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │    Base     │────▶│    Mode     │────▶│    Style    │────▶│ ConfigTree  │
//! │    Tree     │     │   Overlay   │     │  Strategy   │     │ (bundler)   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use rigging_core::{BuildMode, ComposeOptions, Config, compose};
//!
//! let config = Config::load("./my-app")?;
//! let options =
//!     ComposeOptions::from_config(&config, BuildMode::Production, None, std::env::vars())?;
//! let tree = compose(BuildMode::Production, &options)?;
//! let route = tree.module.rules.route("src/App.css")?;
//! println!("{}", route.dispatch.label());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compose;
pub mod config;
pub mod diagnostics;
pub mod env;
pub mod error;
pub mod html;
pub mod mode;
pub mod naming;
pub mod overlay;
pub mod rules;
pub mod style;
pub mod tree;

pub use compose::{ComposeOptions, compose, compose_with_mode};
pub use config::{Config, ProjectConfig};
pub use error::{Error, Result};
pub use mode::BuildMode;
pub use rules::{ChunkKind, Dispatch, RuleTable};
pub use tree::ConfigTree;
