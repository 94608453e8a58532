//! Tokenizer for the value mini-language
//!
//! Two token forms appear inside string values:
//!
//! - function calls: `%{name('arg')}` or `%{name("arg")}`; a leading `::`
//!   on the argument is the top-scope marker and is stripped;
//! - interpolations: `%{var}` or `%{::var}`.
//!
//! Function calls are always resolved before interpolations. A function
//! call is also shaped like an interpolation, so the order matters.

use regex::{Captures, Regex};
use std::ops::Range;
use std::sync::LazyLock;

static FUNCTION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"%\{(\w+)\(['"](?:::)?([^"']*)["']\)\}"#).expect("Invalid function call regex")
});

static INTERPOLATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"%\{(?:::)?([^}]*)\}").expect("Invalid interpolation regex")
});

/// The functions the resolver understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    /// Context variable lookup
    Scope,
    /// Nested key lookup, substituted as a string
    Hiera,
    /// The argument itself
    Literal,
    /// Whole-value redirect to another key, keeping its type
    Alias,
}

impl Function {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "scope" => Some(Self::Scope),
            "hiera" => Some(Self::Hiera),
            "literal" => Some(Self::Literal),
            "alias" => Some(Self::Alias),
            _ => None,
        }
    }
}

/// One function-call token within a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall<'a> {
    /// Byte range of the whole token
    pub span: Range<usize>,
    pub name: &'a str,
    pub argument: &'a str,
}

impl FunctionCall<'_> {
    pub fn function(&self) -> Option<Function> {
        Function::from_name(self.name)
    }
}

/// All function-call tokens in `s`, left to right.
pub fn function_calls(s: &str) -> Vec<FunctionCall<'_>> {
    FUNCTION_REGEX
        .captures_iter(s)
        .map(|caps| {
            let whole = caps.get(0).unwrap();
            FunctionCall {
                span: whole.range(),
                name: caps.get(1).unwrap().as_str(),
                argument: caps.get(2).unwrap().as_str(),
            }
        })
        .collect()
}

/// Whether `s` holds any token at all.
pub fn has_tokens(s: &str) -> bool {
    INTERPOLATION_REGEX.is_match(s)
}

/// Replace every interpolation token using `lookup`; `None` becomes empty.
pub fn interpolate(s: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    INTERPOLATION_REGEX
        .replace_all(s, |caps: &Captures<'_>| lookup(&caps[1]).unwrap_or_default())
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("%{scope('name')}", "scope", "name")]
    #[case("%{hiera(\"other_key\")}", "hiera", "other_key")]
    #[case("%{scope('::name')}", "scope", "name")]
    #[case("%{literal('%')}", "literal", "%")]
    #[case("%{lookup('x')}", "lookup", "x")]
    fn finds_single_calls(#[case] input: &str, #[case] name: &str, #[case] argument: &str) {
        let calls = function_calls(input);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, name);
        assert_eq!(calls[0].argument, argument);
        assert_eq!(calls[0].span, 0..input.len());
    }

    #[test]
    fn finds_calls_left_to_right() {
        let calls = function_calls("%{hiera('a')}-%{scope('b')}");
        let names: Vec<_> = calls.iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["hiera", "scope"]);
        assert_eq!(calls[1].span.start, 14);
    }

    #[test]
    fn function_names_resolve() {
        assert_eq!(Function::from_name("alias"), Some(Function::Alias));
        assert_eq!(Function::from_name("lookup"), None);
    }

    #[rstest]
    #[case("plain value", false)]
    #[case("{not_a_token}", false)]
    #[case("hello %{name}", true)]
    #[case("%{scope('name')}", true)]
    fn detects_tokens(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(has_tokens(input), expected);
    }

    #[test]
    fn interpolates_known_and_empties_unknown() {
        let out = interpolate("%{greeting}, %{::name}%{missing}!", |var| match var {
            "greeting" => Some("hello".into()),
            "name" => Some("test".into()),
            _ => None,
        });
        assert_eq!(out, "hello, test!");
    }
}
