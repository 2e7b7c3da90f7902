//! # In-Memory Table Store
//!
//! [`TableStore`] is the blog's [`DataSource`]. Every argument of a bound table function
//! is an equality filter on the column of the same name. A lookup that filters on `id`
//! answers with the single-record shape, anything else with a list.

use async_trait::async_trait;
use resource_graph::{DataFunction, DataSource, FunctionKind, Record, Records, SourceError, Value};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
pub struct TableStore {
    tables: RwLock<HashMap<String, Vec<Record>>>,
}

impl TableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `rows` to `table` while the store is still being set up.
    pub fn with_rows<R>(mut self, table: &str, rows: impl IntoIterator<Item = R>) -> Self
    where
        R: Into<Record>,
    {
        self.tables
            .get_mut()
            .entry(table.to_string())
            .or_default()
            .extend(rows.into_iter().map(Into::into));
        self
    }

    pub async fn insert(&self, table: &str, row: impl Into<Record>) {
        self.tables
            .write()
            .await
            .entry(table.to_string())
            .or_default()
            .push(row.into());
    }

    /// Rows of `table` matching every `(column, value)` filter, in insertion order.
    pub async fn select(
        &self,
        table: &str,
        filters: &[(String, Value)],
    ) -> Result<Vec<Record>, SourceError> {
        let tables = self.tables.read().await;
        let rows = tables
            .get(table)
            .ok_or_else(|| SourceError::NotFound(format!("table {}", table)))?;
        Ok(rows
            .iter()
            .filter(|row| {
                filters
                    .iter()
                    .all(|(column, value)| row.get(column) == Some(value))
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl DataSource for TableStore {
    async fn read(&self, function: &DataFunction) -> Result<Records, SourceError> {
        let FunctionKind::Table { table } = function.kind() else {
            return Err(SourceError::Unavailable(format!(
                "{} is not a table function",
                function.source_label()
            )));
        };

        let rows = self.select(table, function.arguments()).await?;
        debug!(table = %table, filters = function.arguments().len(), rows = rows.len(), "Select");

        if function.argument("id").is_some() {
            Ok(Records::One(rows.into_iter().next().unwrap_or_default()))
        } else {
            Ok(Records::Many(rows))
        }
    }
}
