//! Build mode
//!
//! The two-valued switch that selects the overlay and the style strategy.
//! It is parsed once per composition and passed explicitly from there on.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Build mode of one composition run
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// Fast rebuilds, inline styles, stable filenames
    #[default]
    Development,
    /// Minified, content-hashed, extracted styles
    Production,
}

impl BuildMode {
    /// Parse a mode value; anything other than the two names is rejected.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            other => Err(Error::InvalidMode {
                value: other.to_string(),
            }),
        }
    }

    /// Canonical name of the mode
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }

    /// Whether this is the production mode
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl FromStr for BuildMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("development", BuildMode::Development)]
    #[case("production", BuildMode::Production)]
    fn test_parse_known_modes(#[case] input: &str, #[case] expected: BuildMode) {
        assert_eq!(BuildMode::parse(input).unwrap(), expected);
        assert_eq!(expected.as_str(), input);
    }

    #[rstest]
    #[case("")]
    #[case("test")]
    #[case("Production")]
    #[case(" development")]
    fn test_parse_rejects_other_values(#[case] input: &str) {
        match BuildMode::parse(input) {
            Err(Error::InvalidMode { value }) => assert_eq!(value, input),
            other => panic!("Expected InvalidMode, got {:?}", other),
        }
    }

    #[test]
    fn test_default_is_development() {
        assert_eq!(BuildMode::default(), BuildMode::Development);
        assert!(!BuildMode::default().is_production());
    }
}
