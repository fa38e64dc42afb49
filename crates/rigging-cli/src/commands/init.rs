//! Initialize a new Rigging project

use anyhow::Result;
use rigging_core::config::CONFIG_FILE;
use std::fs;
use std::path::Path;

/// Run the init command
pub fn run(path: &str, name: Option<&str>) -> Result<()> {
    let project_dir = Path::new(path);

    // Create directory if it doesn't exist
    if !project_dir.exists() {
        fs::create_dir_all(project_dir)?;
    }

    // Get absolute path for deriving name
    let abs_path = project_dir.canonicalize()?;

    // Derive project name from directory name if not provided
    let project_name = match name {
        Some(n) => n.to_string(),
        None => abs_path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("Could not determine project name from path"))?,
    };

    // Check if already initialized
    if project_dir.join(CONFIG_FILE).exists() {
        anyhow::bail!(
            "Directory '{}' already contains a {}",
            project_dir.display(),
            CONFIG_FILE
        );
    }

    tracing::info!("Creating new Rigging project: {}", project_name);

    fs::create_dir_all(project_dir.join("src"))?;
    fs::create_dir_all(project_dir.join("public"))?;

    let config = format!(
        r#"# Rigging Project Configuration
name: {project_name}
entry: src/index.js

# Use "./" to serve the build from any directory
public_path: /

# Production source maps
source_map: true

paths:
  app_src: src
  app_build: build
  app_html: public/index.html

# Variables exposed to client code (in addition to REACT_APP_*)
env:
  REACT_APP_NAME: {project_name}
"#
    );
    fs::write(project_dir.join(CONFIG_FILE), config)?;

    let index_js = r#"import './index.css';

const root = document.getElementById('root');
root.textContent = `Hello from ${process.env.REACT_APP_NAME}`;
"#;
    fs::write(project_dir.join("src/index.js"), index_js)?;

    let index_css = r#"body {
  margin: 0;
  font-family: sans-serif;
}
"#;
    fs::write(project_dir.join("src/index.css"), index_css)?;

    let index_html = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <link rel="shortcut icon" href="%PUBLIC_URL%/favicon.ico">
    <title>%REACT_APP_NAME%</title>
  </head>
  <body>
    <div id="root"></div>
  </body>
</html>
"#;
    fs::write(project_dir.join("public/index.html"), index_html)?;

    let gitignore = r#"# Dependencies
node_modules/

# Build output
build/

# IDE
.idea/
.vscode/
*.swp
"#;
    fs::write(project_dir.join(".gitignore"), gitignore)?;

    tracing::info!(
        "✓ Created project '{}' at {}",
        project_name,
        abs_path.display()
    );
    tracing::info!("");
    tracing::info!("Next steps:");
    if path != "." {
        tracing::info!("  cd {}", project_dir.display());
    }
    tracing::info!("  rigging validate                 # Check configuration");
    tracing::info!("  NODE_ENV=production rigging compose   # Inspect the production pipeline");

    Ok(())
}
