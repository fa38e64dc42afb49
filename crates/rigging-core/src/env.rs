//! Client environment and module search paths
//!
//! Client code sees a fixed set of environment variables: `NODE_ENV`,
//! `PUBLIC_URL`, anything prefixed with `REACT_APP_`, and the project's own
//! `env` map. The `raw` form feeds HTML interpolation; the `stringified`
//! form is substituted into script source under `process.env`.

use serde::Serialize;
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::mode::BuildMode;

/// Prefix of process variables exposed to client code
pub const CLIENT_ENV_PREFIX: &str = "REACT_APP_";

/// Environment variables exposed to client code
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClientEnv {
    /// Variable values as plain strings
    pub raw: BTreeMap<String, String>,
    /// `{"process.env": {KEY: "\"value\""}}`
    pub stringified: serde_json::Value,
}

impl ClientEnv {
    /// Collect the client environment.
    ///
    /// `vars` is usually `std::env::vars()`; only prefixed names are kept.
    /// Project variables override process ones; `NODE_ENV` and `PUBLIC_URL`
    /// override both.
    pub fn collect<I>(
        mode: BuildMode,
        public_path: &str,
        vars: I,
        project: &BTreeMap<String, String>,
    ) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut raw: BTreeMap<String, String> = vars
            .into_iter()
            .filter(|(k, _)| k.starts_with(CLIENT_ENV_PREFIX))
            .collect();
        raw.extend(project.iter().map(|(k, v)| (k.clone(), v.clone())));
        raw.insert("NODE_ENV".to_string(), mode.as_str().to_string());
        raw.insert("PUBLIC_URL".to_string(), public_url(mode, public_path));

        Self::from_raw(raw)
    }

    /// Build both forms from raw values
    pub fn from_raw(raw: BTreeMap<String, String>) -> Self {
        let process_env: serde_json::Map<String, serde_json::Value> = raw
            .iter()
            .map(|(k, v)| {
                let quoted = serde_json::Value::String(v.clone()).to_string();
                (k.clone(), serde_json::Value::String(quoted))
            })
            .collect();
        let stringified = serde_json::json!({ "process.env": process_env });
        Self { raw, stringified }
    }
}

/// `PUBLIC_URL` for a mode: empty in development, the public path without
/// its trailing slash in production.
pub fn public_url(mode: BuildMode, public_path: &str) -> String {
    match mode {
        BuildMode::Development => String::new(),
        BuildMode::Production => public_path.strip_suffix('/').unwrap_or(public_path).to_string(),
    }
}

/// Whether assets are referenced relative to the current document
pub fn should_use_relative_asset_paths(public_path: &str) -> bool {
    public_path == "./"
}

/// Split a platform-delimited search list such as `NODE_PATH`.
///
/// Empty entries are dropped and relative entries are resolved against
/// `base`. An entry containing a NUL byte cannot name a directory.
pub fn module_search_paths(list: Option<&OsStr>, base: &Path) -> Result<Vec<PathBuf>> {
    let Some(list) = list else {
        return Ok(Vec::new());
    };

    let mut dirs = Vec::new();
    for dir in std::env::split_paths(list) {
        if dir.as_os_str().is_empty() {
            continue;
        }
        if dir.to_string_lossy().contains('\0') {
            return Err(Error::ResolutionFailure {
                message: format!("module search path '{}' contains a NUL byte", dir.display()),
            });
        }
        dirs.push(if dir.is_absolute() { dir } else { base.join(dir) });
    }
    Ok(dirs)
}
