//! Output naming templates
//!
//! Templates use bracketed placeholders:
//!
//! - `[name]` - logical chunk or asset name
//! - `[ext]` - file extension without the dot
//! - `[hash]`, `[chunkhash]`, `[contenthash]` - content hash, optionally
//!   truncated with `:N` (e.g. `[contenthash:8]`)
//!
//! Development names are stable; production names embed a content hash so
//! that a changed file gets a new URL.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::OnceLock;

/// Development script bundle (a virtual path served from memory)
pub const DEV_SCRIPT_FILENAME: &str = "static/js/bundle.js";
/// Development async chunk names
pub const DEV_CHUNK_FILENAME: &str = "static/js/[name].chunk.js";
/// Production script bundles
pub const PROD_SCRIPT_FILENAME: &str = "static/js/[name].[chunkhash:8].js";
/// Production async chunk names
pub const PROD_CHUNK_FILENAME: &str = "static/js/[name].[chunkhash:8].chunk.js";
/// Extracted stylesheet names
pub const STYLE_FILENAME: &str = "static/css/[name].[contenthash:8].css";
/// Emitted media names
pub const MEDIA_FILENAME: &str = "static/media/[name].[hash:8].[ext]";

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\[(name|ext|hash|chunkhash|contenthash)(?::(\d+))?\]")
            .expect("placeholder pattern is valid")
    })
}

/// Hex SHA-256 of some content
pub fn content_hash(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

/// A filename template with placeholders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputNamingTemplate(String);

impl OutputNamingTemplate {
    /// Wrap a template string
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// The raw template
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether any hash placeholder appears in the template
    pub fn is_content_addressed(&self) -> bool {
        placeholder_regex()
            .captures_iter(&self.0)
            .any(|c| c[1].ends_with("hash"))
    }

    /// Number of `/`-separated segments, the file itself included
    pub fn path_segments(&self) -> usize {
        self.0.split('/').count()
    }

    /// Substitute placeholders for one output file.
    ///
    /// `hash` is the full content hash; `:N` truncates it. Unknown
    /// bracketed text is left as-is.
    pub fn render(&self, name: &str, ext: &str, hash: &str) -> String {
        placeholder_regex()
            .replace_all(&self.0, |caps: &Captures<'_>| match &caps[1] {
                "name" => name.to_string(),
                "ext" => ext.to_string(),
                _ => {
                    let len = caps
                        .get(2)
                        .and_then(|m| m.as_str().parse::<usize>().ok())
                        .unwrap_or(hash.len());
                    hash.chars().take(len).collect()
                }
            })
            .into_owned()
    }
}

impl fmt::Display for OutputNamingTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_content_hash_is_stable_hex() {
        let a = content_hash(b"body { color: red }");
        let b = content_hash(b"body { color: red }");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, content_hash(b"body { color: blue }"));
    }

    #[test]
    fn test_render_truncates_hash() {
        let template = OutputNamingTemplate::new(PROD_SCRIPT_FILENAME);
        let rendered = template.render("main", "js", "0123456789abcdef");
        assert_eq!(rendered, "static/js/main.01234567.js");
    }

    #[test]
    fn test_render_media_name() {
        let template = OutputNamingTemplate::new(MEDIA_FILENAME);
        let rendered = template.render("logo", "svg", "deadbeefcafe");
        assert_eq!(rendered, "static/media/logo.deadbeef.svg");
    }

    #[test]
    fn test_render_full_hash_without_length() {
        let template = OutputNamingTemplate::new("[name].[hash].[ext]");
        assert_eq!(template.render("a", "png", "abc"), "a.abc.png");
    }

    #[test]
    fn test_dev_names_are_stable() {
        let template = OutputNamingTemplate::new(DEV_SCRIPT_FILENAME);
        assert!(!template.is_content_addressed());
        assert_eq!(template.render("main", "js", "ffff"), DEV_SCRIPT_FILENAME);
    }

    #[rstest]
    #[case(PROD_SCRIPT_FILENAME, true)]
    #[case(PROD_CHUNK_FILENAME, true)]
    #[case(STYLE_FILENAME, true)]
    #[case(MEDIA_FILENAME, true)]
    #[case(DEV_SCRIPT_FILENAME, false)]
    #[case(DEV_CHUNK_FILENAME, false)]
    fn test_is_content_addressed(#[case] template: &str, #[case] expected: bool) {
        assert_eq!(
            OutputNamingTemplate::new(template).is_content_addressed(),
            expected
        );
    }

    #[rstest]
    #[case("a.css", 1)]
    #[case("css/a.css", 2)]
    #[case(STYLE_FILENAME, 3)]
    fn test_path_segments(#[case] template: &str, #[case] expected: usize) {
        assert_eq!(OutputNamingTemplate::new(template).path_segments(), expected);
    }
}
