//! Module rule dispatch
//!
//! Every module path is routed to exactly one processing pipeline.
//!
//! # Evaluation order
//!
//! ```text
//! pre rules ──(every match applies)──┐
//!                                    ▼
//! group 1 ─▶ group 2 ─▶ ... ─▶ default arm ─▶ Native (excluded from default)
//!   │          │                   │
//!   first match in a group wins; later rules in it are never consulted
//! ```
//!
//! Within a [`FirstMatchGroup`] rule order encodes precedence. A rule's
//! exclusion filters are checked before its inclusion filters and its test,
//! so an excluded path can never reach that rule's pipeline.

use serde::{Serialize, Serializer};
use std::fmt;
use std::path::{Component, Path, PathBuf};

use regex::Regex;

use crate::error::{Error, Result};

/// A compiled regular expression applied to a module path
#[derive(Clone)]
pub struct PathPattern(Regex);

impl PathPattern {
    /// Compile a pattern
    pub fn new(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(Self)
            .map_err(|e| Error::ConfigInvalid {
                message: format!("invalid path pattern '{}': {}", pattern, e),
            })
    }

    /// The source of the pattern
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Match against a path, using `/` separators on every platform
    pub fn is_match(&self, path: &Path) -> bool {
        self.0.is_match(&normalize(path))
    }
}

impl fmt::Debug for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.0.as_str())
    }
}

impl Serialize for PathPattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0.as_str())
    }
}

fn normalize(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Remove `.` and fold `..` into its parent without touching the filesystem.
///
/// `..` at the root stays at the root; leading `..` of a relative path is kept.
fn lexical(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }
    out
}

/// Inclusion or exclusion filter on module paths
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathCondition {
    /// Path lies inside a directory (component-wise prefix)
    Under(PathBuf),
    /// Path matches a pattern
    Matches(PathPattern),
}

impl PathCondition {
    /// Condition on a directory
    pub fn under(dir: impl Into<PathBuf>) -> Self {
        Self::Under(dir.into())
    }

    /// Condition on a pattern
    pub fn matches(pattern: &str) -> Result<Self> {
        PathPattern::new(pattern).map(Self::Matches)
    }

    /// Evaluate against a module path
    pub fn accepts(&self, path: &Path) -> bool {
        match self {
            Self::Under(dir) => path.starts_with(dir),
            Self::Matches(pattern) => pattern.is_match(path),
        }
    }
}

/// One opaque unit of work for an external transformation tool
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessingStep {
    /// Tool identifier (e.g. `babel`, `css`)
    pub tool: String,
    /// Options handed to the tool verbatim
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub options: serde_json::Value,
}

impl ProcessingStep {
    /// A step without options
    pub fn new(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            options: serde_json::Value::Null,
        }
    }

    /// Attach options
    pub fn with_options(mut self, options: serde_json::Value) -> Self {
        self.options = options;
        self
    }
}

/// Ordered sequence of processing steps
pub type Pipeline = Vec<ProcessingStep>;

/// A (predicate, pipeline) pair with path filters
#[derive(Debug, Clone, Serialize)]
pub struct MatcherRule {
    /// Rule identifier, unique within its group
    pub id: String,
    /// Any-of test patterns; an empty list accepts every path
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub test: Vec<PathPattern>,
    /// Any-of inclusion filters; an empty list accepts every path
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<PathCondition>,
    /// Any-of exclusion filters
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<PathCondition>,
    /// Steps applied to matching modules
    pub pipeline: Pipeline,
    /// Steps used instead when the module lives in an async chunk
    #[serde(skip_serializing_if = "Option::is_none")]
    pub async_fallback: Option<Pipeline>,
}

impl MatcherRule {
    /// A rule that accepts every path until tests or filters are added
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            test: Vec::new(),
            include: Vec::new(),
            exclude: Vec::new(),
            pipeline: Vec::new(),
            async_fallback: None,
        }
    }

    /// Add a test pattern
    pub fn test(mut self, pattern: &str) -> Result<Self> {
        self.test.push(PathPattern::new(pattern)?);
        Ok(self)
    }

    /// Add an inclusion filter
    pub fn include(mut self, condition: PathCondition) -> Self {
        self.include.push(condition);
        self
    }

    /// Add an exclusion filter
    pub fn exclude(mut self, condition: PathCondition) -> Self {
        self.exclude.push(condition);
        self
    }

    /// Append a step to the pipeline
    pub fn step(mut self, step: ProcessingStep) -> Self {
        self.pipeline.push(step);
        self
    }

    /// Set the async-chunk pipeline
    pub fn async_fallback(mut self, pipeline: Pipeline) -> Self {
        self.async_fallback = Some(pipeline);
        self
    }

    /// Whether this rule claims the path
    pub fn matches(&self, path: &Path) -> bool {
        if self.exclude.iter().any(|c| c.accepts(path)) {
            return false;
        }
        if !self.include.is_empty() && !self.include.iter().any(|c| c.accepts(path)) {
            return false;
        }
        self.test.is_empty() || self.test.iter().any(|p| p.is_match(path))
    }

    /// Pipeline for a chunk kind
    pub fn pipeline_for(&self, chunk: ChunkKind) -> &[ProcessingStep] {
        match (chunk, &self.async_fallback) {
            (ChunkKind::Async, Some(fallback)) => fallback,
            _ => &self.pipeline,
        }
    }
}

/// Ordered rules where the first accepting rule wins
#[derive(Debug, Clone, Serialize)]
pub struct FirstMatchGroup {
    /// Group identifier
    pub id: String,
    /// Rules in precedence order
    pub rules: Vec<MatcherRule>,
}

impl FirstMatchGroup {
    /// An empty group
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rules: Vec::new(),
        }
    }

    /// Append a rule at lowest precedence
    pub fn rule(mut self, rule: MatcherRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Insert or replace a rule by id; a replaced rule keeps its position.
    pub fn set_rule(&mut self, rule: MatcherRule) {
        match self.rules.iter_mut().find(|r| r.id == rule.id) {
            Some(existing) => *existing = rule,
            None => self.rules.push(rule),
        }
    }

    /// First rule accepting the path
    pub fn first_match(&self, path: &Path) -> Option<&MatcherRule> {
        self.rules.iter().find(|r| r.matches(path))
    }
}

/// Last-resort arm of the rule table
#[derive(Debug, Clone, Serialize)]
pub struct DefaultArm {
    /// Steps applied to otherwise unclaimed modules
    pub pipeline: Pipeline,
    /// Paths left to the bundler's built-in handling instead
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub native: Vec<PathCondition>,
}

impl DefaultArm {
    /// A default arm with no native exclusions
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            native: Vec::new(),
        }
    }

    /// Leave matching paths to the bundler
    pub fn except(mut self, condition: PathCondition) -> Self {
        self.native.push(condition);
        self
    }
}

/// Whether a module is reachable from an initial or an async chunk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChunkKind {
    /// Reachable from an entry point
    #[default]
    Initial,
    /// Only reachable through a dynamic import
    Async,
}

/// Outcome of first-match dispatch
#[derive(Debug, Clone, Copy)]
pub enum Dispatch<'a> {
    /// Claimed by a rule of a group
    Rule {
        /// Group the rule belongs to
        group: &'a str,
        /// The winning rule
        rule: &'a MatcherRule,
    },
    /// Unclaimed; handled by the default arm
    Default(&'a DefaultArm),
    /// Excluded from the default arm; handled by the bundler itself
    Native,
}

impl<'a> Dispatch<'a> {
    /// Pipeline for a chunk kind
    pub fn pipeline(&self, chunk: ChunkKind) -> &'a [ProcessingStep] {
        match *self {
            Self::Rule { rule, .. } => rule.pipeline_for(chunk),
            Self::Default(arm) => &arm.pipeline,
            Self::Native => &[],
        }
    }

    /// Short label like `scripts/babel-app`, `default` or `native`
    pub fn label(&self) -> String {
        match self {
            Self::Rule { group, rule } => format!("{}/{}", group, rule.id),
            Self::Default(_) => "default".to_string(),
            Self::Native => "native".to_string(),
        }
    }
}

/// Full routing decision for one module
#[derive(Debug, Clone)]
pub struct Route<'a> {
    /// Pre rules applying to the module, in order
    pub pre: Vec<&'a MatcherRule>,
    /// First-match outcome
    pub dispatch: Dispatch<'a>,
    /// Chunk kind the route was computed for
    pub chunk: ChunkKind,
}

impl<'a> Route<'a> {
    /// Pre steps followed by the dispatched pipeline
    pub fn steps(&self) -> Vec<&'a ProcessingStep> {
        self.pre
            .iter()
            .copied()
            .flat_map(|r| r.pipeline.iter())
            .chain(self.dispatch.pipeline(self.chunk))
            .collect()
    }
}

/// The module routing table
#[derive(Debug, Clone, Default, Serialize)]
pub struct RuleTable {
    /// Rules applied before dispatch, independently of it
    pub pre: Vec<MatcherRule>,
    /// First-match groups, in evaluation order
    pub groups: Vec<FirstMatchGroup>,
    /// Arm used when no group claims the module
    pub default: Option<DefaultArm>,
}

impl RuleTable {
    /// Group by id, created at the end of the table when missing
    pub fn group_mut(&mut self, id: &str) -> &mut FirstMatchGroup {
        let index = match self.groups.iter().position(|g| g.id == id) {
            Some(index) => index,
            None => {
                self.groups.push(FirstMatchGroup::new(id));
                self.groups.len() - 1
            }
        };
        &mut self.groups[index]
    }

    /// Insert or replace a pre rule by id
    pub fn set_pre(&mut self, rule: MatcherRule) {
        match self.pre.iter_mut().find(|r| r.id == rule.id) {
            Some(existing) => *existing = rule,
            None => self.pre.push(rule),
        }
    }

    /// Route a module reachable from an entry point
    pub fn route(&self, path: impl AsRef<Path>) -> Result<Route<'_>> {
        self.route_chunk(path, ChunkKind::Initial)
    }

    /// Route a module for a given chunk kind
    ///
    /// `.` and `..` segments are folded first, so a path cannot reach rules
    /// for a directory it does not lie in.
    pub fn route_chunk(&self, path: impl AsRef<Path>, chunk: ChunkKind) -> Result<Route<'_>> {
        let path = lexical(path.as_ref());
        let path = path.as_path();
        let pre = self.pre.iter().filter(|r| r.matches(path)).collect();
        let dispatch = self.dispatch(path)?;
        tracing::trace!(path = %path.display(), route = %dispatch.label(), "routed module");
        Ok(Route {
            pre,
            dispatch,
            chunk,
        })
    }

    fn dispatch(&self, path: &Path) -> Result<Dispatch<'_>> {
        for group in &self.groups {
            if let Some(rule) = group.first_match(path) {
                return Ok(Dispatch::Rule {
                    group: &group.id,
                    rule,
                });
            }
        }

        match &self.default {
            Some(arm) if arm.native.iter().any(|c| c.accepts(path)) => Ok(Dispatch::Native),
            Some(arm) => Ok(Dispatch::Default(arm)),
            None => Err(Error::ConfigurationIncomplete {
                path: normalize(path),
            }),
        }
    }
}
