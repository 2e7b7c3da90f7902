//! # Node Producers
//!
//! A [`NodeProducer`] turns one flat [`Record`] into one [`ResourceNode`] and declares
//! the relationships of its node type. There is one producer implementation per
//! entity type; the engine instantiates a fresh producer for every record.
//!
//! Producers are looked up by type tag in a [`ProducerRegistry`] that is filled once at
//! startup. Each instantiation receives a [`ProducerContext`] carrying the shared helper
//! services and the transformer of the current build call. The transformer travels
//! with the call, never with the builder, so one builder can serve concurrent builds
//! that use different transformers.

use crate::error::GraphError;
use crate::node::ResourceNode;
use crate::record::{Record, Value};
use crate::relationship::Relationship;
use std::collections::HashMap;
use std::sync::Arc;

/// Builds links from resource paths.
pub trait PathResolver: Send + Sync {
    fn url(&self, path: &str) -> String;
}

/// Obfuscates numeric identifiers before they leave the system.
pub trait Encrypter: Send + Sync {
    fn encrypt_id(&self, id: i64) -> String;
    fn decrypt_id(&self, encrypted: &str) -> Option<i64>;
}

/// Caller-installed helper consulted by producers while populating a node.
pub trait Transformer: Send + Sync {
    fn transform(&self, field: &str, value: &Value) -> Value;
}

/// Shared helper services handed to every producer.
#[derive(Clone)]
pub struct ProducerServices {
    pub path: Arc<dyn PathResolver>,
    pub encrypter: Arc<dyn Encrypter>,
}

impl ProducerServices {
    pub fn new(path: Arc<dyn PathResolver>, encrypter: Arc<dyn Encrypter>) -> Self {
        Self { path, encrypter }
    }
}

/// Per-node view of the services plus the transformer of the current build.
#[derive(Clone)]
pub struct ProducerContext {
    pub path: Arc<dyn PathResolver>,
    pub encrypter: Arc<dyn Encrypter>,
    pub transformer: Option<Arc<dyn Transformer>>,
}

impl ProducerContext {
    pub fn new(services: &ProducerServices, transformer: Option<Arc<dyn Transformer>>) -> Self {
        Self {
            path: services.path.clone(),
            encrypter: services.encrypter.clone(),
            transformer,
        }
    }

    /// Runs `value` through the transformer, or clones it when none is installed.
    pub fn transform(&self, field: &str, value: &Value) -> Value {
        match &self.transformer {
            Some(transformer) => transformer.transform(field, value),
            None => value.clone(),
        }
    }
}

/// Produces one [`ResourceNode`] from one record.
///
/// The engine calls [`set_attributes`](NodeProducer::set_attributes),
/// [`set_links`](NodeProducer::set_links) and [`set_meta`](NodeProducer::set_meta) in
/// that order, then reads [`relationships`](NodeProducer::relationships) and finally
/// takes the node with [`into_node`](NodeProducer::into_node). Missing optional fields
/// are the producer's concern; none of these hooks can fail.
pub trait NodeProducer: Send {
    fn set_attributes(&mut self, record: &Record);

    fn set_links(&mut self, _record: &Record) {}

    fn set_meta(&mut self, _record: &Record) {}

    /// Relationships to expand below this node, in declaration order.
    fn relationships(&self) -> Vec<Relationship> {
        Vec::new()
    }

    fn into_node(self: Box<Self>) -> ResourceNode;
}

/// Constructor registered for a producer type tag.
pub type ProducerFactory = Arc<dyn Fn(ProducerContext) -> Box<dyn NodeProducer> + Send + Sync>;

/// Maps producer type tags to their constructors.
///
/// ```
/// use resource_graph::{NodeProducer, ProducerRegistry, Record, ResourceNode};
///
/// struct TagProducer(ResourceNode);
///
/// impl NodeProducer for TagProducer {
///     fn set_attributes(&mut self, record: &Record) {
///         if let Some(label) = record.get("label") {
///             self.0.attributes.insert("label".into(), label.clone());
///         }
///     }
///     fn into_node(self: Box<Self>) -> ResourceNode {
///         self.0
///     }
/// }
///
/// let mut registry = ProducerRegistry::new();
/// registry.register("tag", |_ctx| Box::new(TagProducer(ResourceNode::new("tag"))));
/// assert!(registry.contains("tag"));
/// ```
#[derive(Default, Clone)]
pub struct ProducerRegistry {
    factories: HashMap<String, ProducerFactory>,
}

impl ProducerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, type_tag: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(ProducerContext) -> Box<dyn NodeProducer> + Send + Sync + 'static,
    {
        self.factories.insert(type_tag.into(), Arc::new(factory));
        self
    }

    pub fn contains(&self, type_tag: &str) -> bool {
        self.factories.contains_key(type_tag)
    }

    pub fn create(
        &self,
        type_tag: &str,
        ctx: ProducerContext,
    ) -> Result<Box<dyn NodeProducer>, GraphError> {
        let factory = self
            .factories
            .get(type_tag)
            .ok_or_else(|| GraphError::UnknownProducer(type_tag.to_string()))?;
        Ok(factory(ctx))
    }
}
