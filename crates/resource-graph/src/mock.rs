//! # Mock Collaborators & Testing Guide
//!
//! Expectation-driven stand-ins for the [`DataSource`] and [`Loader`] seams. They let you
//! test producers and relationship declarations against a real [`GraphBuilder`](crate::GraphBuilder)
//! without any backing store.
//!
//! Traversal is depth first and deterministic, so the mocks answer from a FIFO queue:
//! queue one expectation per fetch, in the order the graph will be walked.
//!
//! | Feature | Mocks | Real collaborators |
//! |---------|-------|--------------------|
//! | **Speed** | Instant (in-memory) | Depends on the store |
//! | **Determinism** | 100% Deterministic | Subject to data |
//! | **Assertions** | Recorded calls, bound arguments | Results only |
//! | **Error Injection** | Easy (`return_err`) | Hard |
//!
//! ```rust
//! use resource_graph::mock::MockDataSource;
//! use resource_graph::{
//!     BuildRequest, DataFunction, Encrypter, GraphBuilder, NodeProducer, PathResolver,
//!     ProducerRegistry, ProducerServices, Record, Records, ResourceNode,
//! };
//! use std::sync::Arc;
//!
//! struct Paths;
//! impl PathResolver for Paths {
//!     fn url(&self, path: &str) -> String { format!("/{}", path) }
//! }
//! impl Encrypter for Paths {
//!     fn encrypt_id(&self, id: i64) -> String { id.to_string() }
//!     fn decrypt_id(&self, s: &str) -> Option<i64> { s.parse().ok() }
//! }
//!
//! struct Tag(ResourceNode);
//! impl NodeProducer for Tag {
//!     fn set_attributes(&mut self, record: &Record) {
//!         if let Some(label) = record.get("label") {
//!             self.0.attributes.insert("label".into(), label.clone());
//!         }
//!     }
//!     fn into_node(self: Box<Self>) -> ResourceNode { self.0 }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let source = MockDataSource::new();
//!     source
//!         .expect_read("tags")
//!         .return_ok(Records::Many(vec![Record::new().with("label", "rust")]));
//!
//!     let mut producers = ProducerRegistry::new();
//!     producers.register("tag", |_ctx| Box::new(Tag(ResourceNode::new("tag"))));
//!     let services = ProducerServices::new(Arc::new(Paths), Arc::new(Paths));
//!     let builder = GraphBuilder::new(Arc::new(source.clone()), producers, services);
//!
//!     let nodes = builder
//!         .build(&BuildRequest::new("tag", DataFunction::table("tags")))
//!         .await
//!         .unwrap();
//!     assert_eq!(nodes.len(), 1);
//!     source.verify();
//! }
//! ```

use crate::error::SourceError;
use crate::function::{DataFunction, FunctionKind};
use crate::record::{Records, Value};
use crate::source::{DataSource, Loader};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// One queued answer: the table or loader function it is for, and the response.
struct Expectation {
    target: String,
    response: Result<Records, SourceError>,
}

type Queue = Arc<Mutex<VecDeque<Expectation>>>;

/// Builder returned by the `expect_*` methods.
pub struct ExpectationBuilder {
    target: String,
    expectations: Queue,
}

impl ExpectationBuilder {
    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, records: Records) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back(Expectation {
            target: self.target,
            response: Ok(records),
        });
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: SourceError) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back(Expectation {
            target: self.target,
            response: Err(error),
        });
    }
}

fn next_response(expectations: &Queue, target: &str) -> Result<Records, SourceError> {
    let expectation = expectations.lock().unwrap().pop_front();
    match expectation {
        Some(Expectation {
            target: expected,
            response,
        }) if expected == target => response,
        Some(Expectation {
            target: expected, ..
        }) => panic!("Unexpected fetch of {}, expected {}", target, expected),
        None => panic!("Unexpected fetch of {}, no expectations left", target),
    }
}

fn verify_drained(expectations: &Queue) {
    let exps = expectations.lock().unwrap();
    if !exps.is_empty() {
        let pending: Vec<&str> = exps.iter().map(|e| e.target.as_str()).collect();
        panic!(
            "Not all expectations were met. {} remaining: {:?}",
            exps.len(),
            pending
        );
    }
}

// =============================================================================
// MOCK DATA SOURCE
// =============================================================================

/// A [`DataSource`] answering table reads from queued expectations.
///
/// Clones share the same queue and call log, so keep one clone for assertions and
/// hand another to the builder.
#[derive(Clone, Default)]
pub struct MockDataSource {
    expectations: Queue,
    calls: Arc<Mutex<Vec<DataFunction>>>,
}

impl MockDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects a read against `table`.
    pub fn expect_read(&self, table: impl Into<String>) -> ExpectationBuilder {
        ExpectationBuilder {
            target: table.into(),
            expectations: self.expectations.clone(),
        }
    }

    /// Every bound function read so far, in call order.
    pub fn calls(&self) -> Vec<DataFunction> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        verify_drained(&self.expectations);
    }
}

#[async_trait]
impl DataSource for MockDataSource {
    async fn read(&self, function: &DataFunction) -> Result<Records, SourceError> {
        self.calls.lock().unwrap().push(function.clone());
        let table = match function.kind() {
            FunctionKind::Table { table } => table.as_str(),
            FunctionKind::Loader { .. } => {
                panic!("Loader function {} sent to the data source", function.source_label())
            }
        };
        next_response(&self.expectations, table)
    }
}

// =============================================================================
// MOCK LOADER
// =============================================================================

/// A [`Loader`] answering function calls from queued expectations.
#[derive(Clone, Default)]
pub struct MockLoader {
    expectations: Queue,
    calls: Arc<Mutex<Vec<(String, Vec<(String, Value)>)>>>,
}

impl MockLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects a call to `function`.
    pub fn expect_call(&self, function: impl Into<String>) -> ExpectationBuilder {
        ExpectationBuilder {
            target: function.into(),
            expectations: self.expectations.clone(),
        }
    }

    /// Every `(function, arguments)` pair received so far, in call order.
    pub fn calls(&self) -> Vec<(String, Vec<(String, Value)>)> {
        self.calls.lock().unwrap().clone()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        verify_drained(&self.expectations);
    }
}

#[async_trait]
impl Loader for MockLoader {
    async fn call(
        &self,
        function: &str,
        arguments: &[(String, Value)],
    ) -> Result<Records, SourceError> {
        self.calls
            .lock()
            .unwrap()
            .push((function.to_string(), arguments.to_vec()));
        next_response(&self.expectations, function)
    }
}
