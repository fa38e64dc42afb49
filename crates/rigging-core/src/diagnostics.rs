//! Failure policy for downstream tool errors
//!
//! A production build stops at the first tool failure. A development build
//! logs it and keeps going so that the other modules are still served.

use crate::error::{Error, Result};
use crate::mode::BuildMode;

/// Precache generator messages that are informational noise
pub const QUIET_PRECACHE_PREFIXES: &[&str] =
    &["Total precache size is", "Skipping static resource"];

/// What happens when a tool fails on a module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Abort the build
    FailFast,
    /// Report and continue
    Continue,
}

impl FailurePolicy {
    /// Policy of a build mode
    pub fn for_mode(mode: BuildMode) -> Self {
        match mode {
            BuildMode::Production => Self::FailFast,
            BuildMode::Development => Self::Continue,
        }
    }

    /// Policy implied by a tree's abort-on-error flag
    pub fn from_bail(bail: bool) -> Self {
        if bail { Self::FailFast } else { Self::Continue }
    }
}

/// Final result of a build
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// No tool failed
    Success,
    /// Some modules failed; the build kept running
    CompletedWithErrors(usize),
}

impl BuildOutcome {
    /// Process exit code for the outcome
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Success => 0,
            Self::CompletedWithErrors(_) => 1,
        }
    }
}

/// Collects tool failures under a policy
#[derive(Debug)]
pub struct Diagnostics {
    policy: FailurePolicy,
    failures: Vec<Error>,
}

impl Diagnostics {
    /// Start collecting
    pub fn new(policy: FailurePolicy) -> Self {
        Self {
            policy,
            failures: Vec::new(),
        }
    }

    /// Active policy
    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Report a failure.
    ///
    /// Structural errors are always returned. Tool failures are returned
    /// under [`FailurePolicy::FailFast`] and recorded otherwise.
    pub fn report(&mut self, error: Error) -> Result<()> {
        if error.is_fatal() || self.policy == FailurePolicy::FailFast {
            tracing::error!(%error, "build aborted");
            return Err(error);
        }
        tracing::error!(%error, "module failed; continuing");
        self.failures.push(error);
        Ok(())
    }

    /// Failures recorded so far
    pub fn failures(&self) -> &[Error] {
        &self.failures
    }

    /// Outcome of the build so far
    pub fn outcome(&self) -> BuildOutcome {
        if self.failures.is_empty() {
            BuildOutcome::Success
        } else {
            BuildOutcome::CompletedWithErrors(self.failures.len())
        }
    }
}

/// Pass a precache generator message through, or drop it if it is known noise
pub fn precache_log_filter(message: &str) -> Option<&str> {
    if QUIET_PRECACHE_PREFIXES.iter().any(|p| message.starts_with(p)) {
        None
    } else {
        Some(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn tool_failure(module: &str) -> Error {
        Error::ToolFailure {
            module: module.to_string(),
            tool: "eslint".to_string(),
            message: "no-undef".to_string(),
        }
    }

    #[test]
    fn test_production_fails_fast() {
        let mut diagnostics = Diagnostics::new(FailurePolicy::for_mode(BuildMode::Production));
        assert!(diagnostics.report(tool_failure("src/a.js")).is_err());
        assert!(diagnostics.failures().is_empty());
    }

    #[test]
    fn test_development_continues() {
        let mut diagnostics = Diagnostics::new(FailurePolicy::for_mode(BuildMode::Development));
        diagnostics.report(tool_failure("src/a.js")).unwrap();
        diagnostics.report(tool_failure("src/b.js")).unwrap();

        assert_eq!(diagnostics.failures().len(), 2);
        assert_eq!(diagnostics.outcome(), BuildOutcome::CompletedWithErrors(2));
        assert_eq!(diagnostics.outcome().exit_code(), 1);
    }

    #[test]
    fn test_structural_errors_abort_in_development() {
        let mut diagnostics = Diagnostics::new(FailurePolicy::Continue);
        let result = diagnostics.report(Error::ConfigurationIncomplete {
            path: "x".to_string(),
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_clean_build_succeeds() {
        let diagnostics = Diagnostics::new(FailurePolicy::Continue);
        assert_eq!(diagnostics.outcome(), BuildOutcome::Success);
        assert_eq!(diagnostics.outcome().exit_code(), 0);
    }

    #[test]
    fn test_policy_from_bail() {
        assert_eq!(FailurePolicy::from_bail(true), FailurePolicy::FailFast);
        assert_eq!(FailurePolicy::from_bail(false), FailurePolicy::Continue);
    }

    #[rstest]
    #[case("Total precache size is about 1.2 MB for 12 resources.", None)]
    #[case("Skipping static resource \"build/x.map\"", None)]
    #[case("Error: cannot read build/index.html", Some("Error: cannot read build/index.html"))]
    #[case("  Total precache size is 0", Some("  Total precache size is 0"))]
    fn test_precache_log_filter(#[case] message: &str, #[case] expected: Option<&str>) {
        assert_eq!(precache_log_filter(message), expected);
    }
}
