//! # Resource Graph
//!
//! This crate assembles API-style resource graphs from flat data. A caller names a root
//! producer and a [`DataFunction`]; the [`GraphBuilder`] fetches the root records, turns
//! each one into a [`ResourceNode`] and recursively expands the relationships the
//! producers declare, down to a caller-chosen depth.
//!
//! ## Architecture Overview
//!
//! 1. **Declaration Layer** ([`NodeProducer`], [`Relationship`], [`DataFunction`]) - one
//!    producer per entity type, declaring attributes, links, meta and relationships
//! 2. **Engine Layer** ([`GraphBuilder`]) - parameter binding, fetching, depth accounting
//!    and whole-graph caching
//! 3. **Collaborator Layer** ([`DataSource`], [`Loader`], [`Cache`]) - async seams to the
//!    backing store, named helper functions and the graph cache
//!
//! Producers never fetch anything themselves. They only say *what* is related and *how*
//! to fetch it; the engine decides *whether* to fetch, based on the depth budget and
//! the relationship flags.
//!
//! ## Example
//!
//! ```rust
//! use resource_graph::mock::MockDataSource;
//! use resource_graph::{
//!     BuildRequest, DataFunction, Encrypter, GraphBuilder, NodeProducer, PathResolver,
//!     ProducerContext, ProducerRegistry, ProducerServices, Record, Records, Relationship,
//!     ResourceNode,
//! };
//! use std::sync::Arc;
//!
//! struct Api;
//! impl PathResolver for Api {
//!     fn url(&self, path: &str) -> String { format!("https://api.example/{}", path) }
//! }
//! impl Encrypter for Api {
//!     fn encrypt_id(&self, id: i64) -> String { format!("x{}", id) }
//!     fn decrypt_id(&self, s: &str) -> Option<i64> { s.strip_prefix('x')?.parse().ok() }
//! }
//!
//! struct Article(ProducerContext, ResourceNode);
//! impl NodeProducer for Article {
//!     fn set_attributes(&mut self, record: &Record) {
//!         if let Some(title) = record.get("title") {
//!             let title = self.0.transform("title", title);
//!             self.1.attributes.insert("title".into(), title);
//!         }
//!     }
//!     fn relationships(&self) -> Vec<Relationship> {
//!         vec![Relationship::new(
//!             "comments",
//!             "comment",
//!             DataFunction::table("comments").bind("articleId", "id"),
//!         )
//!         .force_list()]
//!     }
//!     fn into_node(self: Box<Self>) -> ResourceNode { self.1 }
//! }
//!
//! struct Comment(ResourceNode);
//! impl NodeProducer for Comment {
//!     fn set_attributes(&mut self, record: &Record) {
//!         if let Some(body) = record.get("body") {
//!             self.0.attributes.insert("body".into(), body.clone());
//!         }
//!     }
//!     fn into_node(self: Box<Self>) -> ResourceNode { self.0 }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let source = MockDataSource::new();
//!     source
//!         .expect_read("articles")
//!         .return_ok(Record::new().with("id", 1).with("title", "Hello").into());
//!     source
//!         .expect_read("comments")
//!         .return_ok(Records::Many(vec![Record::new().with("body", "First")]));
//!
//!     let mut producers = ProducerRegistry::new();
//!     producers
//!         .register("article", |ctx| Box::new(Article(ctx, ResourceNode::new("article"))))
//!         .register("comment", |_ctx| Box::new(Comment(ResourceNode::new("comment"))));
//!
//!     let services = ProducerServices::new(Arc::new(Api), Arc::new(Api));
//!     let builder = GraphBuilder::new(Arc::new(source.clone()), producers, services);
//!
//!     let request = BuildRequest::new("article", DataFunction::table("articles").arg("id", 1));
//!     let graph = builder.build(&request).await.unwrap();
//!
//!     let comments = graph[0].relationship("comments").unwrap();
//!     assert!(comments.is_list());
//!     assert_eq!(comments.len(), 1);
//!     source.verify();
//! }
//! ```
//!
//! ## Depth & Termination
//!
//! Every descent into a relationship costs one unit of the depth budget. A node reached
//! with a budget of zero is built from its record but its relationships are never
//! fetched. Producers may reference each other freely; the budget is what bounds the walk.
//!
//! ## Testing
//!
//! The [`mock`] module provides expectation-driven [`DataSource`] and [`Loader`]
//! implementations, and [`MemoryCache`] counts reads and saves. Together they let you
//! assert exactly which fetches a graph triggers.

pub mod builder;
pub mod cache;
pub mod error;
pub mod function;
pub mod mock;
pub mod node;
pub mod producer;
pub mod record;
pub mod relationship;
pub mod source;
pub mod tracing;

// Re-export core types for convenience
pub use builder::{BuildRequest, GraphBuilder, RelationshipOverrides};
pub use cache::{Cache, CacheKind, MemoryCache};
pub use error::{GraphError, SourceError};
pub use function::{CacheKey, DataFunction, FunctionKind};
pub use node::{Linkage, ResourceNode};
pub use producer::{
    Encrypter, NodeProducer, PathResolver, ProducerContext, ProducerFactory, ProducerRegistry,
    ProducerServices, Transformer,
};
pub use record::{Record, Records, Value};
pub use relationship::Relationship;
pub use source::{DataSource, Loader, LoaderRegistry};
