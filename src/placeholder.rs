//! Placeholder discovery and substitution
//!
//! Variables are written inline in template strings as `{name}`. The scan is
//! permissive: an open delimiter without a matching close, or an empty `{}`,
//! is left as literal text and contributes no variable. [`ScanMode::Strict`]
//! turns those cases into errors instead.
//!
//! There is no escaping. A literal `{` or `}` in a templated string is always
//! read as a placeholder boundary.

use std::collections::{BTreeSet, HashMap};

use crate::error::ResolveError;
use crate::value::{KeyPath, TemplateMap, TemplateValue};

/// Maximum key-path length searched for string leaves
///
/// A string whose key-path is longer than this is neither scanned for
/// variables nor substituted.
pub const MAX_DEPTH: usize = 5;

/// Caller-supplied variable values
pub type Arguments = HashMap<String, String>;

/// The open/close delimiter pair around a variable name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiters {
    pub open: char,
    pub close: char,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            open: '{',
            close: '}',
        }
    }
}

/// How malformed placeholders are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanMode {
    /// Malformed placeholders are literal text
    #[default]
    Lenient,
    /// Malformed placeholders fail with [`ResolveError::MalformedPlaceholder`]
    Strict,
}

/// Where a variable occurs inside a template
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PlaceholderPath {
    pub path: KeyPath,
    pub variable: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece<'a> {
    Text(&'a str),
    Var(&'a str),
}

#[derive(Debug)]
struct Scan<'a> {
    pieces: Vec<Piece<'a>>,
    malformed: bool,
}

/// Scans strings and nested templates for placeholders
#[derive(Debug, Clone, Copy, Default)]
pub struct Extractor {
    delimiters: Delimiters,
    mode: ScanMode,
}

impl Extractor {
    pub fn new(delimiters: Delimiters, mode: ScanMode) -> Self {
        Self { delimiters, mode }
    }

    pub fn delimiters(&self) -> Delimiters {
        self.delimiters
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    fn scan<'a>(&self, s: &'a str) -> Scan<'a> {
        let Delimiters { open, close } = self.delimiters;
        let mut pieces = Vec::new();
        let mut malformed = false;
        let mut literal_start = 0;
        let mut open_at: Option<usize> = None;

        for (i, c) in s.char_indices() {
            match open_at {
                Some(start) if c == close => {
                    open_at = None;
                    let name = &s[start + open.len_utf8()..i];
                    if name.is_empty() {
                        malformed = true;
                        continue;
                    }
                    pieces.push(Piece::Text(&s[literal_start..start]));
                    pieces.push(Piece::Var(name));
                    literal_start = i + close.len_utf8();
                }
                _ if c == open => {
                    // A second open before any close restarts the placeholder
                    malformed |= open_at.is_some();
                    open_at = Some(i);
                }
                _ => {}
            }
        }
        malformed |= open_at.is_some();
        pieces.push(Piece::Text(&s[literal_start..]));

        Scan { pieces, malformed }
    }

    /// Variable names in a single string, in order of first occurrence
    pub fn extract(&self, s: &str) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for piece in self.scan(s).pieces {
            if let Piece::Var(name) = piece {
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
        }
        names
    }

    /// Every placeholder occurrence in a template, with its key-path
    pub fn extract_paths(&self, map: &TemplateMap) -> Result<Vec<PlaceholderPath>, ResolveError> {
        self.extract_paths_except(map, |_| false)
    }

    /// Like [`Extractor::extract_paths`], but string leaves whose key-path
    /// matches `skip` are neither scanned nor checked in strict mode
    pub fn extract_paths_except<F>(
        &self,
        map: &TemplateMap,
        skip: F,
    ) -> Result<Vec<PlaceholderPath>, ResolveError>
    where
        F: Fn(&KeyPath) -> bool,
    {
        let mut found = Vec::new();
        for (key, value) in map {
            self.walk(value, KeyPath::root().child(key), &skip, &mut found)?;
        }
        Ok(found)
    }

    /// The deduplicated set of variable names used anywhere in a template
    pub fn extract_variables(&self, map: &TemplateMap) -> Result<BTreeSet<String>, ResolveError> {
        Ok(self
            .extract_paths(map)?
            .into_iter()
            .map(|p| p.variable)
            .collect())
    }

    fn walk<F>(
        &self,
        value: &TemplateValue,
        path: KeyPath,
        skip: &F,
        found: &mut Vec<PlaceholderPath>,
    ) -> Result<(), ResolveError>
    where
        F: Fn(&KeyPath) -> bool,
    {
        if path.len() > MAX_DEPTH {
            return Ok(());
        }
        match value {
            TemplateValue::String(_) if skip(&path) => {}
            TemplateValue::String(s) => {
                let scan = self.scan(s);
                if scan.malformed && self.mode == ScanMode::Strict {
                    return Err(ResolveError::MalformedPlaceholder {
                        path,
                        value: s.clone(),
                    });
                }
                for variable in self.extract(s) {
                    found.push(PlaceholderPath {
                        path: path.clone(),
                        variable,
                    });
                }
            }
            TemplateValue::Map(m) => {
                for (key, child) in m {
                    self.walk(child, path.child(key), skip, found)?;
                }
            }
            TemplateValue::List(items) => {
                for (i, child) in items.iter().enumerate() {
                    self.walk(child, path.child(i.to_string()), skip, found)?;
                }
            }
            TemplateValue::Boolean(_) | TemplateValue::Integer(_) | TemplateValue::Float(_) => {}
        }
        Ok(())
    }

    /// Replace every placeholder in a string with its argument value
    ///
    /// Placeholders without a matching argument are kept verbatim.
    pub fn substitute(&self, s: &str, args: &Arguments) -> String {
        let Delimiters { open, close } = self.delimiters;
        let mut out = String::with_capacity(s.len());
        for piece in self.scan(s).pieces {
            match piece {
                Piece::Text(text) => out.push_str(text),
                Piece::Var(name) => match args.get(name) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push(open);
                        out.push_str(name);
                        out.push(close);
                    }
                },
            }
        }
        out
    }

    /// Substitute into every string leaf of a template within [`MAX_DEPTH`]
    pub fn substitute_map(&self, map: &TemplateMap, args: &Arguments) -> TemplateMap {
        map.iter()
            .map(|(key, value)| (key.clone(), self.substitute_value(value, 1, args)))
            .collect()
    }

    fn substitute_value(&self, value: &TemplateValue, depth: usize, args: &Arguments) -> TemplateValue {
        if depth > MAX_DEPTH {
            return value.clone();
        }
        match value {
            TemplateValue::String(s) => TemplateValue::String(self.substitute(s, args)),
            TemplateValue::Map(m) => TemplateValue::Map(
                m.iter()
                    .map(|(k, v)| (k.clone(), self.substitute_value(v, depth + 1, args)))
                    .collect(),
            ),
            TemplateValue::List(items) => TemplateValue::List(
                items
                    .iter()
                    .map(|v| self.substitute_value(v, depth + 1, args))
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(pairs: &[(&str, &str)]) -> Arguments {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn nested(depth: usize, leaf: &str) -> TemplateMap {
        let mut value = TemplateValue::from(leaf);
        for level in (2..=depth).rev() {
            let mut m = TemplateMap::new();
            m.insert(format!("L{}", level), value);
            value = TemplateValue::Map(m);
        }
        let mut root = TemplateMap::new();
        root.insert("L1".to_string(), value);
        root
    }

    #[test]
    fn test_extract_single() {
        let ex = Extractor::default();
        assert_eq!(ex.extract("cars/{id}/lock"), vec!["id"]);
    }

    #[test]
    fn test_extract_none() {
        let ex = Extractor::default();
        assert!(ex.extract("status").is_empty());
    }

    #[test]
    fn test_extract_multiple_and_duplicates() {
        let ex = Extractor::default();
        assert_eq!(
            ex.extract("{region}/vehicles/{vin}/{region}/{action}"),
            vec!["region", "vin", "action"]
        );
    }

    #[test]
    fn test_extract_unterminated_is_ignored() {
        let ex = Extractor::default();
        assert_eq!(ex.extract("cars/{id}/{oops"), vec!["id"]);
        assert!(ex.extract("{").is_empty());
    }

    #[test]
    fn test_extract_restarts_on_second_open() {
        let ex = Extractor::default();
        assert_eq!(ex.extract("{a{b}"), vec!["b"]);
    }

    #[test]
    fn test_extract_empty_braces_ignored() {
        let ex = Extractor::default();
        assert!(ex.extract("x{}y").is_empty());
    }

    #[test]
    fn test_extract_stray_close_is_literal() {
        let ex = Extractor::default();
        assert_eq!(ex.extract("a}b{c}"), vec!["c"]);
    }

    #[test]
    fn test_custom_delimiters() {
        let ex = Extractor::new(Delimiters { open: '<', close: '>' }, ScanMode::Lenient);
        assert_eq!(ex.extract("cars/<vin>/{literal}"), vec!["vin"]);
    }

    #[test]
    fn test_identical_open_and_close() {
        let ex = Extractor::new(Delimiters { open: '%', close: '%' }, ScanMode::Lenient);
        assert_eq!(ex.extract("a/%x%/%y%"), vec!["x", "y"]);
    }

    #[test]
    fn test_extract_paths_through_nested_maps_and_lists() {
        let map: TemplateMap = toml::from_str(
            r#"
URI = "cars/{vin}"
HEADERS = { Authorization = "Bearer {token}" }
CONTENT = ["{first}", 3, { deep = "{second}" }]
"#,
        )
        .expect("Should parse");

        let ex = Extractor::default();
        let paths = ex.extract_paths(&map).expect("Should extract");
        let rendered: Vec<String> = paths
            .iter()
            .map(|p| format!("{}={}", p.path, p.variable))
            .collect();
        assert_eq!(
            rendered,
            vec![
                "CONTENT.0=first",
                "CONTENT.2.deep=second",
                "HEADERS.Authorization=token",
                "URI=vin",
            ]
        );
    }

    #[test]
    fn test_depth_limit() {
        let ex = Extractor::default();
        let at_limit = ex.extract_variables(&nested(5, "{x}")).expect("Should extract");
        assert!(at_limit.contains("x"));

        let too_deep = ex.extract_variables(&nested(6, "{x}")).expect("Should extract");
        assert!(too_deep.is_empty());
    }

    #[test]
    fn test_strict_mode_rejects_unterminated() {
        let ex = Extractor::new(Delimiters::default(), ScanMode::Strict);
        let mut map = TemplateMap::new();
        map.insert("URI".to_string(), "cars/{id".into());
        let result = ex.extract_paths(&map);
        assert!(matches!(result, Err(ResolveError::MalformedPlaceholder { .. })));
    }

    #[test]
    fn test_skipped_leaves_not_checked() {
        let ex = Extractor::new(Delimiters::default(), ScanMode::Strict);
        let mut map = TemplateMap::new();
        map.insert("URI".to_string(), "cars/{id".into());
        map.insert("NOTE".to_string(), "{note}".into());
        let paths = ex
            .extract_paths_except(&map, |path| path.to_string() == "URI")
            .expect("Skipped leaf should not fail");
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].variable, "note");
    }

    #[test]
    fn test_strict_mode_accepts_well_formed() {
        let ex = Extractor::new(Delimiters::default(), ScanMode::Strict);
        let mut map = TemplateMap::new();
        map.insert("URI".to_string(), "cars/{id}".into());
        assert!(ex.extract_variables(&map).expect("Should extract").contains("id"));
    }

    #[test]
    fn test_substitute() {
        let ex = Extractor::default();
        let out = ex.substitute("cars/{id}/{id}/lock", &args(&[("id", "42")]));
        assert_eq!(out, "cars/42/42/lock");
    }

    #[test]
    fn test_substitute_keeps_unknown_and_malformed() {
        let ex = Extractor::default();
        let out = ex.substitute("{a}/{b}/{c", &args(&[("a", "1")]));
        assert_eq!(out, "1/{b}/{c");
    }

    #[test]
    fn test_substitute_value_containing_delimiters_is_not_rescanned() {
        let ex = Extractor::default();
        let out = ex.substitute("{a}-{b}", &args(&[("a", "{b}"), ("b", "2")]));
        assert_eq!(out, "{b}-2");
    }

    #[test]
    fn test_substitute_map_respects_depth() {
        let ex = Extractor::default();
        let a = args(&[("x", "v")]);

        let shallow = ex.substitute_map(&nested(5, "{x}"), &a);
        assert!(serde_json::to_string(&shallow).unwrap().contains("\"v\""));

        let deep = ex.substitute_map(&nested(6, "{x}"), &a);
        assert!(serde_json::to_string(&deep).unwrap().contains("{x}"));
    }
}
