//! Interpolate the HTML template

use anyhow::{Context as _, Result};

use rigging_core::html::interpolate;

use super::Context;

/// Run the html command
pub fn run(ctx: &Context, output: Option<&str>) -> Result<()> {
    let composed = ctx.compose()?;
    let template_path = &composed.options.paths.app_html;

    let template = std::fs::read_to_string(template_path)
        .with_context(|| format!("Failed to read HTML template {}", template_path.display()))?;
    let html = interpolate(&template, &composed.options.env.raw);

    match output {
        Some(path) => {
            std::fs::write(path, html)?;
            tracing::info!("✓ Wrote {}", path);
        }
        None => print!("{}", html),
    }
    Ok(())
}
