//! HTML template interpolation
//!
//! `%KEY%` tokens in the HTML entry document are replaced with client
//! environment values, e.g. `<link href="%PUBLIC_URL%/favicon.ico">`.

use std::collections::BTreeMap;

/// Replace `%KEY%` for every key in `raw`; other tokens are left alone.
pub fn interpolate(template: &str, raw: &BTreeMap<String, String>) -> String {
    raw.iter().fold(template.to_string(), |html, (key, value)| {
        html.replace(&format!("%{key}%"), value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_replaces_every_occurrence() {
        let html = r#"<link href="%PUBLIC_URL%/a.ico"><link href="%PUBLIC_URL%/b.json">"#;
        let out = interpolate(html, &raw(&[("PUBLIC_URL", "/app")]));
        assert_eq!(out, r#"<link href="/app/a.ico"><link href="/app/b.json">"#);
    }

    #[test]
    fn test_unknown_tokens_are_untouched() {
        let out = interpolate("<title>%TITLE%</title>", &raw(&[("PUBLIC_URL", "")]));
        assert_eq!(out, "<title>%TITLE%</title>");
    }

    #[test]
    fn test_values_are_literal() {
        let out = interpolate("%REACT_APP_X%", &raw(&[("REACT_APP_X", "$1 and ${name}")]));
        assert_eq!(out, "$1 and ${name}");
    }

    #[test]
    fn test_long_keys_are_replaced() {
        let key = format!("REACT_APP_{}", "X".repeat(100_000));
        let template = format!("<p>%{key}%</p>");
        let out = interpolate(&template, &raw(&[(key.as_str(), "ok")]));
        assert_eq!(out, "<p>ok</p>");
    }

    #[test]
    fn test_keys_with_regex_metacharacters() {
        let out = interpolate("%A.B% %AxB%", &raw(&[("A.B", "dot")]));
        assert_eq!(out, "dot %AxB%");
    }
}
