//! Hierarchy path templates
//!
//! Hierarchy levels and backend data directories are written with
//! `%{var}` placeholders (optionally `%{::var}`, the top-scope form). They
//! are parsed once into a [`PathTemplate`] and rendered against each
//! lookup's context.

use crate::context::Context;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Matches `%{var}` and `%{::var}` placeholders in path templates.
static PLACEHOLDER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"%\{(?:::)?([A-Za-z0-9_.|-]+)\}").expect("Invalid placeholder regex")
});

/// A template references a variable the context does not define.
///
/// Recoverable: the caller skips the candidate path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Template `{template}` references missing variable `{variable}`")]
pub struct MissingVariable {
    pub template: String,
    pub variable: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Variable(String),
}

/// A parsed path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    normalized: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Parse a template, normalizing `%{var}` / `%{::var}` to `{var}`.
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let mut segments = Vec::new();
        let mut normalized = String::with_capacity(raw.len());
        let mut last = 0;

        for caps in PLACEHOLDER_REGEX.captures_iter(&raw) {
            let whole = caps.get(0).expect("capture 0 always present");
            let name = &caps[1];
            if whole.start() > last {
                let literal = &raw[last..whole.start()];
                normalized.push_str(literal);
                segments.push(Segment::Literal(literal.to_string()));
            }
            normalized.push('{');
            normalized.push_str(name);
            normalized.push('}');
            segments.push(Segment::Variable(name.to_string()));
            last = whole.end();
        }
        if last < raw.len() {
            normalized.push_str(&raw[last..]);
            segments.push(Segment::Literal(raw[last..].to_string()));
        }

        Self {
            raw,
            normalized,
            segments,
        }
    }

    /// The template as written in the configuration.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The normalized `{var}` form.
    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    /// Names of the variables referenced, in order of appearance.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Variable(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Whether the template has no placeholders.
    pub fn is_static(&self) -> bool {
        self.variables().next().is_none()
    }

    /// Substitute every placeholder from `context`.
    pub fn render(&self, context: &Context) -> Result<String, MissingVariable> {
        let mut out = String::with_capacity(self.normalized.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Variable(name) => {
                    let value = context.lookup(name).ok_or_else(|| MissingVariable {
                        template: self.raw.clone(),
                        variable: name.clone(),
                    })?;
                    out.push_str(&value);
                }
            }
        }
        Ok(out)
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized)
    }
}

impl From<&str> for PathTemplate {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}
