//! Optional path lookups into loosely-typed JSON
//!
//! Ultimate Guitar's page store is undocumented and changes shape between
//! page types. A `JsonPath` walks object keys and yields `None` at the first
//! missing segment instead of failing.

use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonPath(&'static [&'static str]);

impl JsonPath {
    pub const fn new(segments: &'static [&'static str]) -> Self {
        Self(segments)
    }

    pub fn lookup<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.0.iter().try_fold(root, |value, segment| value.get(*segment))
    }

    pub fn lookup_str<'a>(&self, root: &'a Value) -> Option<&'a str> {
        self.lookup(root).and_then(Value::as_str)
    }

    pub fn lookup_array<'a>(&self, root: &'a Value) -> Option<&'a Vec<Value>> {
        self.lookup(root).and_then(Value::as_array)
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

/// First path (in order) that resolves to a non-empty array
pub fn first_non_empty_array<'a>(root: &'a Value, paths: &[JsonPath]) -> Option<&'a Vec<Value>> {
    paths
        .iter()
        .filter_map(|path| path.lookup_array(root))
        .find(|items| !items.is_empty())
}
