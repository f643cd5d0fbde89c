//! Template values and key-paths
//!
//! Templates are plain nested key-value data. Every value a vendor table can
//! express in TOML or JSON maps onto [`TemplateValue`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A template body: upper-case configuration keys to values
pub type TemplateMap = BTreeMap<String, TemplateValue>;

/// A single value inside a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplateValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<TemplateValue>),
    Map(TemplateMap),
}

impl TemplateValue {
    /// Borrow the string content, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TemplateValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the nested map, if this is a map
    pub fn as_map(&self) -> Option<&TemplateMap> {
        match self {
            TemplateValue::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Borrow the list elements, if this is a list
    pub fn as_list(&self) -> Option<&[TemplateValue]> {
        match self {
            TemplateValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Child value addressed by one key-path segment
    ///
    /// Lists are addressed by decimal index. Scalars have no children.
    pub fn child(&self, segment: &str) -> Option<&TemplateValue> {
        match self {
            TemplateValue::Map(m) => m.get(segment),
            TemplateValue::List(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    }
}

impl From<&str> for TemplateValue {
    fn from(s: &str) -> Self {
        TemplateValue::String(s.to_string())
    }
}

impl From<String> for TemplateValue {
    fn from(s: String) -> Self {
        TemplateValue::String(s)
    }
}

impl From<TemplateMap> for TemplateValue {
    fn from(m: TemplateMap) -> Self {
        TemplateValue::Map(m)
    }
}

impl fmt::Display for TemplateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateValue::Boolean(b) => write!(f, "{}", b),
            TemplateValue::Integer(i) => write!(f, "{}", i),
            TemplateValue::Float(x) => write!(f, "{}", x),
            TemplateValue::String(s) => write!(f, "{}", s),
            TemplateValue::List(_) | TemplateValue::Map(_) => {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                write!(f, "{}", json)
            }
        }
    }
}

/// Resolve a key-path inside a template map
///
/// Returns `None` when the path falls off the structure, either through a
/// missing key or by trying to descend into a scalar.
pub fn lookup_in<'a>(map: &'a TemplateMap, path: &KeyPath) -> Option<&'a TemplateValue> {
    let (first, rest) = path.segments().split_first()?;
    rest.iter()
        .try_fold(map.get(first)?, |value, segment| value.child(segment))
}

/// The sequence of keys leading from a template root to a value
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyPath(Vec<String>);

impl KeyPath {
    /// Create an empty (root) path
    pub fn root() -> Self {
        Self::default()
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// A new path with one more segment
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }
}

impl<S: Into<String>> FromIterator<S> for KeyPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}
