//! Recursive value resolution
//!
//! A raw value from a data source is resolved against the search path and
//! the lookup's context:
//!
//! - mappings and sequences are rebuilt with every element resolved, in
//!   order; the source data is never modified;
//! - strings without tokens, and all other scalars, are returned as-is;
//! - strings with tokens get function calls substituted first, then
//!   interpolations.
//!
//! `%{alias('key')}` as the whole string is replaced by the value of `key`
//! with its original type. Every other function call must produce a
//! non-empty string.

pub mod token;

use crate::backend::kind;
use crate::context::{Context, is_truthy};
use crate::hierarchy::Source;
use crate::merge::MergeAccumulator;
use crate::{Error, Result};
use serde_json::Value;
use token::{Function, FunctionCall};

/// Resolves keys and values over one lookup's search path.
///
/// Tracks the chain of keys under resolution; a key that depends on itself
/// through `hiera()` or `alias()` fails with [`Error::RecursiveLookup`]
/// instead of recursing forever.
#[derive(Debug)]
pub struct ValueResolver<'a> {
    sources: &'a [Source],
    context: &'a Context,
    active: Vec<String>,
}

impl<'a> ValueResolver<'a> {
    pub fn new(sources: &'a [Source], context: &'a Context) -> Self {
        Self {
            sources,
            context,
            active: Vec::new(),
        }
    }

    /// Find and resolve `key`.
    ///
    /// Without a merge the first source holding the key wins. With one,
    /// every source holding the key is folded into the accumulator and the
    /// result is returned if non-empty.
    pub fn get_key(&mut self, key: &str, merge: Option<MergeAccumulator>) -> Result<Value> {
        if self.active.iter().any(|k| k == key) {
            let mut chain = self.active.clone();
            chain.push(key.to_string());
            return Err(Error::RecursiveLookup {
                key: key.to_string(),
                chain: chain.join(" -> "),
            });
        }

        self.active.push(key.to_string());
        let result = self.find(key, merge);
        self.active.pop();
        result
    }

    fn find(&mut self, key: &str, mut merge: Option<MergeAccumulator>) -> Result<Value> {
        let sources = self.sources;
        for source in sources {
            let Some(raw) = source.data().get(key) else {
                continue;
            };
            let value = self.resolve(raw)?;

            match merge.as_mut() {
                Some(acc) => {
                    tracing::trace!(key, path = %source.path(), "Merging value");
                    acc.merge_value(key, value)?;
                }
                None => {
                    tracing::trace!(key, path = %source.path(), "Found value");
                    return Ok(value);
                }
            }
        }

        merge
            .and_then(MergeAccumulator::into_value)
            .ok_or_else(|| Error::not_found(key))
    }

    /// Resolve a raw value into a new value.
    pub fn resolve(&mut self, value: &Value) -> Result<Value> {
        match value {
            Value::Object(map) => {
                let mut resolved = serde_json::Map::with_capacity(map.len());
                for (k, v) in map {
                    resolved.insert(k.clone(), self.resolve(v)?);
                }
                Ok(Value::Object(resolved))
            }
            Value::Array(items) => items
                .iter()
                .map(|item| self.resolve(item))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Value::String(s) if token::has_tokens(s) => self.resolve_string(s),
            other => Ok(other.clone()),
        }
    }

    fn resolve_string(&mut self, s: &str) -> Result<Value> {
        let calls = token::function_calls(s);

        let base = match calls.as_slice() {
            [call] if call.function() == Some(Function::Alias) => {
                if call.span != (0..s.len()) {
                    return Err(Error::invalid_call(
                        s,
                        "Alias can not be used for string interpolation",
                    ));
                }
                self.nested(s, call.argument)?
            }
            _ => Value::String(self.substitute_calls(s, &calls)?),
        };

        let context = self.context;
        Ok(match base {
            Value::String(text) => Value::String(token::interpolate(&text, |var| context.lookup(var))),
            other => other,
        })
    }

    /// Replace each call token once, left to right.
    fn substitute_calls(&mut self, s: &str, calls: &[FunctionCall<'_>]) -> Result<String> {
        let mut out = String::with_capacity(s.len());
        let mut last = 0;
        for call in calls {
            out.push_str(&s[last..call.span.start]);
            out.push_str(&self.call(s, call)?);
            last = call.span.end;
        }
        out.push_str(&s[last..]);
        Ok(out)
    }

    fn call(&mut self, expression: &str, call: &FunctionCall<'_>) -> Result<String> {
        let replacement = match call.function() {
            Some(Function::Hiera) => Some(self.nested(expression, call.argument)?),
            Some(Function::Scope) => self.context.lookup(call.argument).map(Value::String),
            Some(Function::Literal) => Some(Value::String(call.argument.to_string())),
            Some(Function::Alias) => {
                return Err(Error::invalid_call(expression, "Invalid alias function call"));
            }
            None => {
                return Err(Error::invalid_call(
                    expression,
                    format!("Unknown function `{}`", call.name),
                ));
            }
        };

        match replacement.filter(is_truthy) {
            Some(Value::String(text)) => Ok(text),
            Some(other) => Err(Error::unresolvable(
                expression,
                format!("Resolved value is not a string ({})", kind(&other)),
            )),
            None => Err(Error::unresolvable(expression, "Could not resolve value")),
        }
    }

    /// Lookup of another key from inside a value.
    ///
    /// The outer key was found, so a missing inner key is unresolvable
    /// rather than not-found.
    fn nested(&mut self, expression: &str, key: &str) -> Result<Value> {
        self.get_key(key, None).map_err(|e| match e {
            Error::KeyNotFound { key } => {
                Error::unresolvable(expression, format!("Could not resolve value of `{}`", key))
            }
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::MergePolicy;
    use hiera_fs::NormalizedPath;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    fn sources(levels: Vec<Value>) -> Vec<Source> {
        levels
            .into_iter()
            .enumerate()
            .map(|(i, level)| {
                let Value::Object(map) = level else {
                    panic!("level must be a mapping")
                };
                Source::new(
                    NormalizedPath::new(format!("level{}.yaml", i + 1)),
                    "yaml",
                    Arc::new(map),
                )
            })
            .collect()
    }

    fn get(levels: Vec<Value>, context: &Context, key: &str) -> Result<Value> {
        let sources = sources(levels);
        ValueResolver::new(&sources, context).get_key(key, None)
    }

    #[test]
    fn first_match_wins() {
        let value = get(
            vec![json!({"k": "level1"}), json!({"k": "level2"})],
            &Context::new(),
            "k",
        );
        assert_eq!(value.unwrap(), json!("level1"));
    }

    #[test]
    fn missing_key_is_not_found() {
        let err = get(vec![json!({"k": 1})], &Context::new(), "other").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn merges_across_levels() {
        let sources = sources(vec![json!({"k": ["a"]}), json!({}), json!({"k": ["b"]})]);
        let acc = MergeAccumulator::new(MergePolicy::list()).unwrap();
        let value = ValueResolver::new(&sources, &Context::new())
            .get_key("k", Some(acc))
            .unwrap();
        assert_eq!(value, json!(["a", "b"]));
    }

    #[test]
    fn empty_merge_is_not_found() {
        let sources = sources(vec![json!({"k": []})]);
        let acc = MergeAccumulator::new(MergePolicy::list()).unwrap();
        let err = ValueResolver::new(&sources, &Context::new())
            .get_key("k", Some(acc))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn alias_keeps_type() {
        let value = get(
            vec![json!({"a": "%{alias('b')}", "b": {"key1": "value1"}})],
            &Context::new(),
            "a",
        );
        assert_eq!(value.unwrap(), json!({"key1": "value1"}));
    }

    #[test]
    fn alias_inside_text_is_invalid() {
        let err = get(
            vec![json!({"a": "prefix %{alias('b')}", "b": "x"})],
            &Context::new(),
            "a",
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidFunctionCall { .. }));
        assert!(err.to_string().starts_with("Alias can not be used for string interpolation"));
    }

    #[test]
    fn alias_among_other_calls_is_invalid() {
        let err = get(
            vec![json!({"a": "%{alias('b')}%{literal('x')}", "b": "x"})],
            &Context::new(),
            "a",
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidFunctionCall { .. }));
    }

    #[test]
    fn unknown_function_is_invalid() {
        let err = get(vec![json!({"a": "%{lookup('b')}"})], &Context::new(), "a").unwrap_err();
        assert!(err.to_string().contains("Unknown function `lookup`"));
    }

    #[test]
    fn hiera_substitutes_nested_strings() {
        let value = get(
            vec![json!({"url": "http://%{hiera('host')}:%{hiera('port')}/", "host": "db", "port": "5432"})],
            &Context::new(),
            "url",
        );
        assert_eq!(value.unwrap(), json!("http://db:5432/"));
    }

    #[test]
    fn hiera_of_non_string_is_unresolvable() {
        let err = get(
            vec![json!({"a": "port %{hiera('port')}", "port": 5432})],
            &Context::new(),
            "a",
        )
        .unwrap_err();
        assert!(err.to_string().contains("not a string"));
    }

    #[test]
    fn hiera_of_missing_key_is_unresolvable() {
        let err = get(vec![json!({"a": "%{hiera('nope')}"})], &Context::new(), "a").unwrap_err();
        assert!(matches!(err, Error::UnresolvableReference { .. }));
    }

    #[test]
    fn scope_of_missing_variable_is_unresolvable() {
        let err = get(vec![json!({"a": "%{scope('name')}"})], &Context::new(), "a").unwrap_err();
        assert!(err.to_string().starts_with("Could not resolve value"));
    }

    #[test]
    fn interpolation_of_missing_variable_is_empty() {
        let value = get(vec![json!({"a": "hello %{name}!"})], &Context::new(), "a");
        assert_eq!(value.unwrap(), json!("hello !"));
    }

    #[test]
    fn function_then_interpolation() {
        let ctx = Context::new().with("name", "test");
        let value = get(
            vec![json!({"a": "%{literal('x')}-%{name}-%{scope('::name')}"})],
            &ctx,
            "a",
        );
        assert_eq!(value.unwrap(), json!("x-test-test"));
    }

    #[test]
    fn resolves_nested_containers() {
        let ctx = Context::new().with("name", "wat");
        let value = get(
            vec![json!({"h": {"a": "%{scope('name')}", "b": 1, "c": ["%{literal('hi')}", null]}})],
            &ctx,
            "h",
        );
        assert_eq!(value.unwrap(), json!({"a": "wat", "b": 1, "c": ["hi", null]}));
    }

    #[test]
    fn falsy_values_round_trip() {
        let levels = vec![json!({"h": {}, "l": [], "f": false, "n": null})];
        for (key, expected) in [("h", json!({})), ("l", json!([])), ("f", json!(false)), ("n", json!(null))] {
            assert_eq!(get(levels.clone(), &Context::new(), key).unwrap(), expected);
        }
    }

    #[test]
    fn self_reference_is_reported() {
        let err = get(
            vec![json!({"a": "%{hiera('b')}", "b": "%{alias('a')}"})],
            &Context::new(),
            "a",
        )
        .unwrap_err();
        match err {
            Error::RecursiveLookup { key, chain } => {
                assert_eq!(key, "a");
                assert_eq!(chain, "a -> b -> a");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn repeated_reference_is_not_a_cycle() {
        let value = get(
            vec![json!({"a": "%{hiera('b')}/%{hiera('b')}", "b": "x"})],
            &Context::new(),
            "a",
        );
        assert_eq!(value.unwrap(), json!("x/x"));
    }

    #[test]
    fn source_data_is_not_modified() {
        let sources = sources(vec![json!({"a": {"b": "%{literal('x')}"}})]);
        let ctx = Context::new();
        ValueResolver::new(&sources, &ctx).get_key("a", None).unwrap();
        assert_eq!(
            Value::Object(sources[0].data().clone()),
            json!({"a": {"b": "%{literal('x')}"}})
        );
    }
}
