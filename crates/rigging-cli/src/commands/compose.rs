//! Print the composed pipeline description

use anyhow::{Context as _, Result};

use super::Context;
use crate::Format;

/// Run the compose command
pub fn run(ctx: &Context, format: Format) -> Result<()> {
    let composed = ctx.compose()?;

    let rendered = match format {
        Format::Json => serde_json::to_string_pretty(&composed.tree)
            .context("Failed to serialize pipeline")?,
        Format::Yaml => {
            serde_yaml::to_string(&composed.tree).context("Failed to serialize pipeline")?
        }
    };
    println!("{}", rendered);
    Ok(())
}
