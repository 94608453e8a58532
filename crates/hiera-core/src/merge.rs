//! Accumulating a key's values across hierarchy levels
//!
//! A merge lookup does not stop at the first level holding the key; every
//! level that has it contributes, in hierarchy order:
//!
//! - **list**: concatenation, duplicates kept;
//! - **set**: union, first-seen order kept;
//! - **dict**: shallow union, the first level to define a key wins.
//!
//! Deep merging of nested containers is not supported and is rejected when
//! the accumulator is created.

use crate::backend::{Mapping, kind};
use crate::context::is_truthy;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Container type a merge lookup accumulates into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    List,
    Set,
    Dict,
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => f.write_str("list"),
            Self::Set => f.write_str("set"),
            Self::Dict => f.write_str("dict"),
        }
    }
}

/// A merge request: strategy plus the (unsupported) deep flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergePolicy {
    pub strategy: MergeStrategy,
    #[serde(default)]
    pub deep: bool,
}

impl MergePolicy {
    pub fn list() -> Self {
        MergeStrategy::List.into()
    }

    pub fn set() -> Self {
        MergeStrategy::Set.into()
    }

    pub fn dict() -> Self {
        MergeStrategy::Dict.into()
    }

    pub fn deep(mut self, deep: bool) -> Self {
        self.deep = deep;
        self
    }
}

impl From<MergeStrategy> for MergePolicy {
    fn from(strategy: MergeStrategy) -> Self {
        Self {
            strategy,
            deep: false,
        }
    }
}

#[derive(Debug)]
enum Accumulated {
    Items(Vec<Value>),
    Dict(Mapping),
}

/// Folds resolved values from successive levels into one result.
#[derive(Debug)]
pub struct MergeAccumulator {
    strategy: MergeStrategy,
    value: Accumulated,
}

impl MergeAccumulator {
    /// Start an empty accumulation. Fails fast when `policy.deep` is set.
    pub fn new(policy: MergePolicy) -> Result<Self> {
        if policy.deep {
            return Err(Error::DeepMergeUnsupported);
        }
        let value = match policy.strategy {
            MergeStrategy::List | MergeStrategy::Set => Accumulated::Items(Vec::new()),
            MergeStrategy::Dict => Accumulated::Dict(Mapping::new()),
        };
        Ok(Self {
            strategy: policy.strategy,
            value,
        })
    }

    pub fn strategy(&self) -> MergeStrategy {
        self.strategy
    }

    /// Fold the value found for `key` at the next level.
    ///
    /// Sequences contribute their elements; any other value contributes
    /// itself as one element. Dict merges only accept mappings.
    pub fn merge_value(&mut self, key: &str, value: Value) -> Result<()> {
        let strategy = self.strategy;
        match &mut self.value {
            Accumulated::Items(items) => {
                let incoming = match value {
                    Value::Array(values) => values,
                    other => vec![other],
                };
                for item in incoming {
                    if strategy == MergeStrategy::Set && items.contains(&item) {
                        continue;
                    }
                    items.push(item);
                }
            }
            Accumulated::Dict(map) => {
                let incoming = match value {
                    Value::Object(incoming) => incoming,
                    other => {
                        return Err(Error::MergeTypeMismatch {
                            key: key.to_string(),
                            strategy: strategy.to_string(),
                            found: kind(&other).to_string(),
                        });
                    }
                };
                for (k, v) in incoming {
                    if !map.contains_key(&k) {
                        map.insert(k, v);
                    }
                }
            }
        }
        Ok(())
    }

    /// Whether nothing has been accumulated yet.
    pub fn is_empty(&self) -> bool {
        match &self.value {
            Accumulated::Items(items) => items.is_empty(),
            Accumulated::Dict(map) => map.is_empty(),
        }
    }

    /// The accumulated value, or `None` if it is empty.
    pub fn into_value(self) -> Option<Value> {
        let value = match self.value {
            Accumulated::Items(items) => Value::Array(items),
            Accumulated::Dict(map) => Value::Object(map),
        };
        is_truthy(&value).then_some(value)
    }
}
