//! # Data Collaborators
//!
//! The engine reads records through two seams:
//!
//! - [`DataSource`] serves [`FunctionKind::Table`](crate::FunctionKind::Table) functions.
//! - [`Loader`]s serve [`FunctionKind::Loader`](crate::FunctionKind::Loader) functions. They
//!   are registered by name in a [`LoaderRegistry`] once at startup, so no loader is
//!   constructed while a graph is being built.
//!
//! Both are async: each call suspends the traversal until the collaborator answers.
//! Timeouts belong to the collaborator and surface as ordinary [`SourceError`]s.

use crate::error::{GraphError, SourceError};
use crate::function::DataFunction;
use crate::record::{Records, Value};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Table-style read access to backing records.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Executes a bound table function.
    async fn read(&self, function: &DataFunction) -> Result<Records, SourceError>;
}

/// A named helper exposing record-returning functions.
#[async_trait]
pub trait Loader: Send + Sync {
    /// Invokes `function` with the ordered arguments of the bound descriptor.
    async fn call(
        &self,
        function: &str,
        arguments: &[(String, Value)],
    ) -> Result<Records, SourceError>;
}

/// Maps loader names to loader instances.
#[derive(Default, Clone)]
pub struct LoaderRegistry {
    loaders: HashMap<String, Arc<dyn Loader>>,
}

impl LoaderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, loader: Arc<dyn Loader>) -> &mut Self {
        self.loaders.insert(name.into(), loader);
        self
    }

    pub fn get(&self, name: &str) -> Result<&Arc<dyn Loader>, GraphError> {
        self.loaders
            .get(name)
            .ok_or_else(|| GraphError::UnknownLoader(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.loaders.contains_key(name)
    }
}
