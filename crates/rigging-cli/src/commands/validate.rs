//! Validate configuration command

use anyhow::Result;

use rigging_core::diagnostics::FailurePolicy;

use super::Context;

/// Run the validate command
pub fn run(ctx: &Context) -> Result<()> {
    tracing::info!("Validating configuration: {}", ctx.config_path);

    let composed = ctx.compose()?;
    let tree = &composed.tree;

    tracing::info!("✓ Project: {}", composed.config.project.name);
    tracing::info!("✓ Mode: {}", tree.mode);
    tracing::info!("✓ Entry modules: {}", composed.options.entry.normalize().len());
    tracing::info!("✓ Output: {}", tree.output.filename);
    if let Some(style) = &tree.style {
        tracing::info!("✓ Styles: {:?}", style.state());
    }
    tracing::info!("✓ Failure policy: {:?}", FailurePolicy::from_bail(tree.bail));

    let html = &composed.options.paths.app_html;
    if !html.exists() {
        tracing::warn!("HTML template not found: {}", html.display());
    }

    println!("{}", tree.fingerprint()?);
    tracing::info!("✓ Configuration is valid");
    Ok(())
}
