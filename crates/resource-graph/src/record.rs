//! # Records
//!
//! Flat backing rows as handed to the engine by a [`DataSource`](crate::DataSource) or a
//! [`Loader`](crate::Loader). A [`Record`] keeps its fields in insertion order and every
//! fetch yields a [`Records`] value, which is either one record or a list of them.

use serde::{Deserialize, Serialize};
use serde_json::Map;

pub use serde_json::Value;

/// One backing row: an ordered mapping from field name to a scalar or null value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a field, returning `self` so rows can be written inline.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns the field only when it is present and not `null`.
    pub fn get_non_null(&self, field: &str) -> Option<&Value> {
        self.fields.get(field).filter(|value| !value.is_null())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.fields
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// The shape of a fetch result.
///
/// Collaborators return `One` for a single row (a keyed lookup) and `Many` for a
/// list of rows, even when that list holds a single element. The distinction drives
/// how a relationship attaches its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Records {
    One(Record),
    Many(Vec<Record>),
}

impl Records {
    pub fn empty() -> Self {
        Records::Many(Vec::new())
    }

    /// True for an empty row, an empty list, or a list whose first row is empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Records::One(record) => record.is_empty(),
            Records::Many(records) => records.first().map_or(true, Record::is_empty),
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Records::Many(_))
    }

    /// Number of rows this result would produce nodes for.
    pub fn len(&self) -> usize {
        match self {
            Records::One(record) if record.is_empty() => 0,
            Records::One(_) => 1,
            Records::Many(records) => records.len(),
        }
    }

    pub fn into_vec(self) -> Vec<Record> {
        match self {
            Records::One(record) if record.is_empty() => Vec::new(),
            Records::One(record) => vec![record],
            Records::Many(records) => records,
        }
    }
}

impl Default for Records {
    fn default() -> Self {
        Records::empty()
    }
}

impl From<Record> for Records {
    fn from(record: Record) -> Self {
        Records::One(record)
    }
}

impl From<Vec<Record>> for Records {
    fn from(records: Vec<Record>) -> Self {
        Records::Many(records)
    }
}
