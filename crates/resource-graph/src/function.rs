//! # Data Functions
//!
//! A [`DataFunction`] describes how to obtain a set of records: a structured read
//! against a table, or a call to a named function on a registered loader.
//!
//! Root descriptors usually carry literal arguments ([`DataFunction::arg`]).
//! Relationship descriptors declare parameter *bindings* instead ([`DataFunction::bind`]):
//! each binding names a slot and the parent-record field it is resolved from. The engine
//! resolves the bindings and calls [`DataFunction::replace_parameters`], which returns a
//! bound copy ready to execute.

use crate::record::Value;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Selects the fetch path for a [`DataFunction`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FunctionKind {
    /// Read through the [`DataSource`](crate::DataSource).
    Table { table: String },
    /// Call `function` on the loader registered as `loader`.
    Loader { loader: String, function: String },
}

/// Key under which a whole assembled graph is memoized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A key made only of whitespace cannot address a cache entry.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CacheKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for CacheKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// Describes one fetch. Immutable for the duration of a build.
#[derive(Debug, Clone, PartialEq)]
pub struct DataFunction {
    kind: FunctionKind,
    bindings: Vec<(String, String)>,
    arguments: Vec<(String, Value)>,
    cache_key: Option<CacheKey>,
}

impl DataFunction {
    pub fn table(table: impl Into<String>) -> Self {
        Self::with_kind(FunctionKind::Table {
            table: table.into(),
        })
    }

    pub fn loader(loader: impl Into<String>, function: impl Into<String>) -> Self {
        Self::with_kind(FunctionKind::Loader {
            loader: loader.into(),
            function: function.into(),
        })
    }

    fn with_kind(kind: FunctionKind) -> Self {
        Self {
            kind,
            bindings: Vec::new(),
            arguments: Vec::new(),
            cache_key: None,
        }
    }

    /// Declares that `slot` is filled from the source field `field` at traversal time.
    pub fn bind(mut self, slot: impl Into<String>, field: impl Into<String>) -> Self {
        self.bindings.push((slot.into(), field.into()));
        self
    }

    /// Supplies a literal argument for `slot`.
    pub fn arg(mut self, slot: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.push((slot.into(), value.into()));
        self
    }

    /// Marks the graph built from this function as cacheable under `key`.
    pub fn cached(mut self, key: impl Into<CacheKey>) -> Self {
        self.cache_key = Some(key.into());
        self
    }

    pub fn kind(&self) -> &FunctionKind {
        &self.kind
    }

    /// The ordered `slot -> field` bindings still to be resolved.
    pub fn parameters(&self) -> &[(String, String)] {
        &self.bindings
    }

    /// The ordered literal arguments handed to the collaborator.
    pub fn arguments(&self) -> &[(String, Value)] {
        &self.arguments
    }

    /// Looks up a literal argument by slot.
    pub fn argument(&self, slot: &str) -> Option<&Value> {
        self.arguments
            .iter()
            .find(|(name, _)| name == slot)
            .map(|(_, value)| value)
    }

    pub fn cache_key(&self) -> Option<&CacheKey> {
        self.cache_key.as_ref()
    }

    /// Returns a bound copy: the resolved values become arguments, appended after any
    /// literal arguments, and the bindings are cleared. `self` is left untouched.
    pub fn replace_parameters(&self, values: Vec<(String, Value)>) -> Self {
        let mut bound = self.clone();
        bound.bindings.clear();
        bound.arguments.extend(values);
        bound
    }

    /// Short label for logs: the table name or `loader::function`.
    pub fn source_label(&self) -> String {
        match &self.kind {
            FunctionKind::Table { table } => table.clone(),
            FunctionKind::Loader { loader, function } => format!("{}::{}", loader, function),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_replace_parameters_returns_bound_copy() {
        let template = DataFunction::table("comments")
            .arg("status", "published")
            .bind("articleId", "id");

        let bound = template.replace_parameters(vec![("articleId".to_string(), json!(1))]);

        assert!(bound.parameters().is_empty());
        assert_eq!(
            bound.arguments(),
            &[
                ("status".to_string(), json!("published")),
                ("articleId".to_string(), json!(1)),
            ]
        );
        // The template keeps its bindings for the next parent record.
        assert_eq!(
            template.parameters(),
            &[("articleId".to_string(), "id".to_string())]
        );
        assert_eq!(template.arguments().len(), 1);
    }

    #[test]
    fn test_kind_and_label() {
        let table = DataFunction::table("articles");
        assert_eq!(
            table.kind(),
            &FunctionKind::Table {
                table: "articles".into()
            }
        );
        assert_eq!(table.source_label(), "articles");

        let loader = DataFunction::loader("stats", "byArticle");
        assert_eq!(loader.source_label(), "stats::byArticle");
    }

    #[test]
    fn test_cache_key() {
        let function = DataFunction::table("articles").cached("articles:1");
        assert_eq!(function.cache_key().map(CacheKey::as_str), Some("articles:1"));
        assert!(!function.cache_key().unwrap().is_blank());
        assert!(CacheKey::new("  ").is_blank());
        assert!(DataFunction::table("articles").cache_key().is_none());
    }
}
