//! Show the dispatch of module paths

use anyhow::Result;
use serde::Serialize;
use std::path::Path;

use rigging_core::rules::Route;
use rigging_core::{ChunkKind, RuleTable};

use super::Context;

/// One routed module, as printed
#[derive(Serialize)]
pub struct RouteReport {
    /// Module path as given
    pub path: String,
    /// `group/rule`, `default` or `native`
    pub route: String,
    /// Pre rules applied first
    pub pre: Vec<String>,
    /// Tools in application order
    pub tools: Vec<String>,
}

impl RouteReport {
    /// Summarize a route
    pub fn new(path: &str, route: &Route<'_>) -> Self {
        Self {
            path: path.to_string(),
            route: route.dispatch.label(),
            pre: route.pre.iter().map(|r| r.id.clone()).collect(),
            tools: route.steps().iter().map(|s| s.tool.clone()).collect(),
        }
    }
}

/// Route one path, resolving relative paths against the project directory
pub fn route_one(
    rules: &RuleTable,
    base: &Path,
    path: &str,
    chunk: ChunkKind,
) -> Result<RouteReport> {
    let module = base.join(path);
    let route = rules.route_chunk(&module, chunk)?;
    Ok(RouteReport::new(path, &route))
}

/// Run the route command
pub fn run(ctx: &Context, paths: &[String], is_async: bool) -> Result<()> {
    let composed = ctx.compose()?;
    let chunk = if is_async {
        ChunkKind::Async
    } else {
        ChunkKind::Initial
    };

    for path in paths {
        let report = route_one(
            &composed.tree.module.rules,
            &composed.config.base_path,
            path,
            chunk,
        )?;
        println!("{}", serde_json::to_string(&report)?);
    }
    Ok(())
}
