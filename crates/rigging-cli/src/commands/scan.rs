//! Route every file under the application sources

use anyhow::Result;
use std::collections::BTreeMap;

use rigging_core::ChunkKind;

use super::Context;
use super::route::route_one;

/// Run the scan command
pub fn run(ctx: &Context) -> Result<()> {
    let composed = ctx.compose()?;
    let base = &composed.config.base_path;
    let app_src = &composed.options.paths.app_src;

    if !app_src.exists() {
        anyhow::bail!("Application sources not found: {}", app_src.display());
    }

    tracing::info!("Scanning {}", app_src.display());

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut entries: Vec<_> = walkdir::WalkDir::new(app_src)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .collect();
    entries.sort_by(|a, b| a.path().cmp(b.path()));

    for entry in entries {
        let relative = entry.path().strip_prefix(base).unwrap_or(entry.path());
        let report = route_one(
            &composed.tree.module.rules,
            base,
            &relative.to_string_lossy(),
            ChunkKind::Initial,
        )?;
        println!("{:<40} {}", report.path, report.route);
        *counts.entry(report.route).or_default() += 1;
    }

    tracing::info!("Routed {} files:", counts.values().sum::<usize>());
    for (route, count) in &counts {
        tracing::info!("  {:<24} {}", route, count);
    }
    Ok(())
}
