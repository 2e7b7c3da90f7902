//! # Graph Builder
//!
//! [`GraphBuilder`] is the recursive engine that turns flat records into a depth-bounded
//! tree of [`ResourceNode`]s.
//!
//! ## Build Flow
//!
//! 1. **Cache check**: when a cache is configured and enabled and the root function
//!    carries a key, a stored graph is returned as is. No fetch, no producer call.
//! 2. **Root fetch**: the root function runs on the table or loader path.
//! 3. **Assembly**: every root record goes through [`GraphBuilder::assemble_all`], which
//!    expands relationships depth first.
//! 4. **Cache store**: on a miss the whole assembled graph is written back.
//!
//! ## Relationship Expansion
//!
//! For each relationship a producer declares, in declaration order:
//!
//! - every parameter slot is resolved from the parent record first and from the
//!   caller-supplied overrides for that relationship second; null values never bind,
//! - the bound function is fetched,
//! - each fetched record is assembled with the remaining depth budget (zero when the
//!   relationship suppresses children) and attached to the relationship's linkage.
//!
//! The depth budget is decremented on every descent. It is the only thing that stops
//! mutually referential producers from expanding forever.

use crate::cache::{Cache, CacheKind};
use crate::error::GraphError;
use crate::function::{CacheKey, DataFunction, FunctionKind};
use crate::node::ResourceNode;
use crate::producer::{ProducerContext, ProducerRegistry, ProducerServices, Transformer};
use crate::record::{Record, Records, Value};
use crate::relationship::Relationship;
use crate::source::{DataSource, LoaderRegistry};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Boxed future used for the recursive assembly step.
pub(crate) type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Caller-supplied parameter values, keyed by relationship name and then by field name.
///
/// They fill parameter slots the parent record cannot provide, such as the id of the
/// viewer for permission-scoped child fetches. Fields on the record always win.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationshipOverrides {
    values: HashMap<String, Record>,
}

impl RelationshipOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(
        mut self,
        relationship: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.insert(relationship, field, value);
        self
    }

    pub fn insert(
        &mut self,
        relationship: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<Value>,
    ) {
        self.values
            .entry(relationship.into())
            .or_default()
            .insert(field, value);
    }

    pub fn get(&self, relationship: &str) -> Option<&Record> {
        self.values.get(relationship)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One call to [`GraphBuilder::build`].
///
/// ```
/// use resource_graph::{BuildRequest, DataFunction, RelationshipOverrides};
///
/// let request = BuildRequest::new("article", DataFunction::table("articles").arg("id", 1))
///     .depth(2)
///     .overrides(RelationshipOverrides::new().with("comments", "viewerId", 42));
///
/// assert_eq!(request.producer(), "article");
/// assert_eq!(request.depth_budget(), 2);
/// ```
#[derive(Clone)]
pub struct BuildRequest {
    producer: String,
    function: DataFunction,
    depth: u32,
    overrides: RelationshipOverrides,
    transformer: Option<Arc<dyn Transformer>>,
}

impl BuildRequest {
    /// Builds `producer` nodes from the records `function` returns, one level deep.
    pub fn new(producer: impl Into<String>, function: DataFunction) -> Self {
        Self {
            producer: producer.into(),
            function,
            depth: 1,
            overrides: RelationshipOverrides::default(),
            transformer: None,
        }
    }

    pub fn depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    pub fn overrides(mut self, overrides: RelationshipOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn transformer(mut self, transformer: Arc<dyn Transformer>) -> Self {
        self.transformer = Some(transformer);
        self
    }

    pub fn producer(&self) -> &str {
        &self.producer
    }

    pub fn function(&self) -> &DataFunction {
        &self.function
    }

    pub fn depth_budget(&self) -> u32 {
        self.depth
    }
}

impl fmt::Debug for BuildRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildRequest")
            .field("producer", &self.producer)
            .field("function", &self.function)
            .field("depth", &self.depth)
            .field("overrides", &self.overrides)
            .field("transformer", &self.transformer.is_some())
            .finish()
    }
}

/// Assembles resource graphs from a data source, loaders and registered producers.
///
/// The builder holds no per-call state, so one instance can serve concurrent builds.
#[derive(Clone)]
pub struct GraphBuilder {
    source: Arc<dyn DataSource>,
    loaders: LoaderRegistry,
    producers: ProducerRegistry,
    services: ProducerServices,
    cache: Option<Arc<dyn Cache>>,
}

impl GraphBuilder {
    pub fn new(
        source: Arc<dyn DataSource>,
        producers: ProducerRegistry,
        services: ProducerServices,
    ) -> Self {
        Self {
            source,
            loaders: LoaderRegistry::default(),
            producers,
            services,
            cache: None,
        }
    }

    pub fn with_loaders(mut self, loaders: LoaderRegistry) -> Self {
        self.loaders = loaders;
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn Cache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Fetches the root records of `request` and assembles them into a graph,
    /// short-circuiting through the cache when the root function carries a key.
    #[instrument(skip(self, request), fields(producer = %request.producer, depth = request.depth))]
    pub async fn build(&self, request: &BuildRequest) -> Result<Vec<ResourceNode>, GraphError> {
        let cache = self.active_cache(&request.function)?;

        if let Some((cache, key)) = cache {
            if let Some(blob) = cache.read(key, CacheKind::Json).await? {
                let nodes: Vec<ResourceNode> = serde_json::from_str(&blob)?;
                info!(%key, nodes = nodes.len(), "Cache hit");
                return Ok(nodes);
            }
            info!(%key, "Cache miss");
        }

        let records = self.fetch(&request.function).await?;
        debug!(source = %request.function.source_label(), records = records.len(), "Root records fetched");

        let nodes = self
            .assemble_all(
                &request.producer,
                records,
                request.depth,
                &request.overrides,
                request.transformer.clone(),
            )
            .await?;

        if let Some((cache, key)) = cache {
            let blob = serde_json::to_string(&nodes)?;
            cache.save(key, blob, CacheKind::Json).await?;
            info!(%key, nodes = nodes.len(), "Cached");
        }

        Ok(nodes)
    }

    /// Assembles one node per record, preserving input order. An empty input yields
    /// an empty list.
    pub async fn assemble_all(
        &self,
        producer: &str,
        records: Records,
        depth: u32,
        overrides: &RelationshipOverrides,
        transformer: Option<Arc<dyn Transformer>>,
    ) -> Result<Vec<ResourceNode>, GraphError> {
        let records = records.into_vec();
        let mut nodes = Vec::with_capacity(records.len());
        for record in records {
            let node = self
                .assemble_one(producer, record, depth, overrides, transformer.clone())
                .await?;
            nodes.push(node);
        }
        Ok(nodes)
    }

    fn assemble_one<'a>(
        &'a self,
        producer: &'a str,
        record: Record,
        depth: u32,
        overrides: &'a RelationshipOverrides,
        transformer: Option<Arc<dyn Transformer>>,
    ) -> BoxFuture<'a, Result<ResourceNode, GraphError>> {
        Box::pin(self.assemble_node(producer, record, depth, overrides, transformer))
    }

    /// Builds the node for `record` and, while depth remains, expands its relationships.
    async fn assemble_node(
        &self,
        producer: &str,
        record: Record,
        depth: u32,
        overrides: &RelationshipOverrides,
        transformer: Option<Arc<dyn Transformer>>,
    ) -> Result<ResourceNode, GraphError> {
        let ctx = ProducerContext::new(&self.services, transformer.clone());
        let mut builder = self.producers.create(producer, ctx)?;
        builder.set_attributes(&record);
        builder.set_links(&record);
        builder.set_meta(&record);
        let relationships = builder.relationships();
        let mut node = builder.into_node();

        if depth == 0 {
            return Ok(node);
        }
        let remaining = depth - 1;
        // Overrides only address the relationships of the nodes they were given for.
        let no_overrides = RelationshipOverrides::default();

        for relationship in &relationships {
            let name = relationship.name();
            let Some(arguments) = bind_parameters(relationship, &record, overrides.get(name))? else {
                debug!(relationship = name, "Optional relationship skipped: no parameters");
                continue;
            };

            let function = relationship.function().replace_parameters(arguments);
            debug!(
                relationship = name,
                depth = remaining,
                arguments = function.arguments().len(),
                "Resolving relationship"
            );
            let data = self.fetch(&function).await?;

            if data.is_empty() {
                if relationship.is_optional() {
                    debug!(relationship = name, "Optional relationship skipped: no data");
                    continue;
                }
                warn!(relationship = name, "Required relationship data missing");
                return Err(GraphError::RequiredRelationshipDataMissing(name.to_string()));
            }

            let child_depth = relationship.child_depth(remaining);
            let children = data.into_vec();
            for child in children {
                let child_node = self
                    .assemble_one(
                        relationship.producer(),
                        child,
                        child_depth,
                        &no_overrides,
                        transformer.clone(),
                    )
                    .await?;
                node.relationship_mut(name).add(child_node);
            }
            if relationship.is_force_list() {
                node.relationship_mut(name).force_resource_list(true);
            }
        }

        Ok(node)
    }

    /// Runs a bound function on the table or loader path.
    async fn fetch(&self, function: &DataFunction) -> Result<Records, GraphError> {
        let records = match function.kind() {
            FunctionKind::Table { .. } => self.source.read(function).await?,
            FunctionKind::Loader { loader, function: name } => {
                self.loaders
                    .get(loader)?
                    .call(name, function.arguments())
                    .await?
            }
        };
        Ok(records)
    }

    /// Returns the cache and key to use for `function`, if any.
    fn active_cache<'a>(
        &'a self,
        function: &'a DataFunction,
    ) -> Result<Option<(&'a dyn Cache, &'a CacheKey)>, GraphError> {
        let (Some(cache), Some(key)) = (self.cache.as_deref(), function.cache_key()) else {
            return Ok(None);
        };
        if !cache.use_caching() {
            return Ok(None);
        }
        if key.is_blank() {
            warn!("Cached build requested with a blank key");
            return Err(GraphError::InvalidCacheKey);
        }
        Ok(Some((cache, key)))
    }
}

/// Resolves the parameter slots of `relationship` against the parent record, then
/// against the overrides given for that relationship.
///
/// Returns `Ok(None)` when an optional relationship resolved nothing and must be
/// skipped. Optional relationships that resolve only some slots are fetched with
/// the slots they did resolve.
fn bind_parameters(
    relationship: &Relationship,
    record: &Record,
    overrides: Option<&Record>,
) -> Result<Option<Vec<(String, Value)>>, GraphError> {
    let mut values = Vec::new();
    for (slot, field) in relationship.function().parameters() {
        let value = record
            .get_non_null(field)
            .or_else(|| overrides.and_then(|o| o.get_non_null(field)));
        match value {
            Some(value) => values.push((slot.clone(), value.clone())),
            None if !relationship.is_optional() => {
                warn!(relationship = relationship.name(), slot = %slot, field = %field, "Required parameter missing");
                return Err(GraphError::RequiredParameterMissing(
                    relationship.name().to_string(),
                ));
            }
            None => {}
        }
    }

    if values.is_empty() && relationship.is_optional() {
        return Ok(None);
    }
    Ok(Some(values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::error::SourceError;
    use crate::mock::{MockDataSource, MockLoader};
    use crate::producer::{Encrypter, NodeProducer, PathResolver};
    use serde_json::json;

    // --- Test Producers ---

    struct Plain;
    impl PathResolver for Plain {
        fn url(&self, path: &str) -> String {
            format!("https://api.test/{}", path)
        }
    }
    impl Encrypter for Plain {
        fn encrypt_id(&self, id: i64) -> String {
            id.to_string()
        }
        fn decrypt_id(&self, encrypted: &str) -> Option<i64> {
            encrypted.parse().ok()
        }
    }

    /// Generic producer: copies every field into attributes and exposes a fixed
    /// relationship list.
    struct FieldProducer {
        node: ResourceNode,
        relationships: Vec<Relationship>,
    }

    impl NodeProducer for FieldProducer {
        fn set_attributes(&mut self, record: &Record) {
            for (field, value) in record.iter() {
                if field == "id" {
                    self.node.id = Some(value.to_string());
                } else {
                    self.node.attributes.insert(field.clone(), value.clone());
                }
            }
        }

        fn relationships(&self) -> Vec<Relationship> {
            self.relationships.clone()
        }

        fn into_node(self: Box<Self>) -> ResourceNode {
            self.node
        }
    }

    fn register(registry: &mut ProducerRegistry, tag: &'static str, relationships: Vec<Relationship>) {
        registry.register(tag, move |_ctx| {
            Box::new(FieldProducer {
                node: ResourceNode::new(tag),
                relationships: relationships.clone(),
            })
        });
    }

    fn services() -> ProducerServices {
        ProducerServices::new(Arc::new(Plain), Arc::new(Plain))
    }

    fn comments_relationship() -> Relationship {
        Relationship::new(
            "comments",
            "comment",
            DataFunction::table("comments").bind("articleId", "id"),
        )
    }

    fn builder(source: &MockDataSource, registry: ProducerRegistry) -> GraphBuilder {
        GraphBuilder::new(Arc::new(source.clone()), registry, services())
    }

    fn article() -> Record {
        Record::new().with("id", 1).with("title", "A")
    }

    fn ids(nodes: &[ResourceNode]) -> Vec<&str> {
        nodes.iter().filter_map(ResourceNode::id).collect()
    }

    // --- assemble_all ---

    #[tokio::test]
    async fn test_assemble_all_empty_input_is_empty_list() {
        let source = MockDataSource::new();
        let mut registry = ProducerRegistry::new();
        register(&mut registry, "article", vec![comments_relationship()]);
        let builder = builder(&source, registry);

        let none = RelationshipOverrides::new();
        let nodes = builder
            .assemble_all("article", Records::empty(), 3, &none, None)
            .await
            .unwrap();
        assert!(nodes.is_empty());

        let nodes = builder
            .assemble_all("article", Records::One(Record::new()), 3, &none, None)
            .await
            .unwrap();
        assert!(nodes.is_empty());
        assert_eq!(source.call_count(), 0);
    }

    #[tokio::test]
    async fn test_assemble_all_single_and_list_preserve_order() {
        let source = MockDataSource::new();
        let mut registry = ProducerRegistry::new();
        register(&mut registry, "comment", vec![]);
        let builder = builder(&source, registry);
        let none = RelationshipOverrides::new();

        let single = builder
            .assemble_all("comment", Records::One(Record::new().with("id", 9)), 1, &none, None)
            .await
            .unwrap();
        assert_eq!(ids(&single), vec!["9"]);

        let many = Records::Many(vec![
            Record::new().with("id", 3),
            Record::new().with("id", 1),
            Record::new().with("id", 2),
        ]);
        let nodes = builder.assemble_all("comment", many, 1, &none, None).await.unwrap();
        assert_eq!(ids(&nodes), vec!["3", "1", "2"]);
    }

    #[tokio::test]
    async fn test_zero_depth_never_fetches_relationships() {
        let source = MockDataSource::new();
        let mut registry = ProducerRegistry::new();
        register(&mut registry, "article", vec![comments_relationship()]);
        let builder = builder(&source, registry);

        let nodes = builder
            .assemble_all("article", article().into(), 0, &RelationshipOverrides::new(), None)
            .await
            .unwrap();

        assert_eq!(nodes.len(), 1);
        assert!(!nodes[0].has_relationships());
        assert_eq!(source.call_count(), 0);
    }

    // --- build ---

    #[tokio::test]
    async fn test_build_attaches_list_relationship_in_order() {
        let source = MockDataSource::new();
        source.expect_read("articles").return_ok(article().into());
        source.expect_read("comments").return_ok(Records::Many(vec![
            Record::new().with("id", 10).with("body", "x"),
            Record::new().with("id", 11).with("body", "y"),
        ]));

        let mut registry = ProducerRegistry::new();
        register(&mut registry, "article", vec![comments_relationship()]);
        register(&mut registry, "comment", vec![]);
        let builder = builder(&source, registry);

        let request = BuildRequest::new("article", DataFunction::table("articles").arg("id", 1));
        let nodes = builder.build(&request).await.unwrap();

        assert_eq!(nodes.len(), 1);
        let comments = nodes[0].relationship("comments").expect("comments linkage");
        assert_eq!(ids(comments.resources()), vec!["10", "11"]);
        assert_eq!(comments.resources()[1].attribute("body"), Some(&json!("y")));

        let calls = source.calls();
        assert_eq!(calls[1].argument("articleId"), Some(&json!(1)));
        source.verify();
    }

    #[tokio::test]
    async fn test_required_parameter_missing_aborts_build() {
        let source = MockDataSource::new();
        source
            .expect_read("articles")
            .return_ok(Record::new().with("title", "no id").into());

        let mut registry = ProducerRegistry::new();
        register(&mut registry, "article", vec![comments_relationship()]);
        register(&mut registry, "comment", vec![]);
        let builder = builder(&source, registry);

        let result = builder
            .build(&BuildRequest::new("article", DataFunction::table("articles")))
            .await;

        assert!(matches!(result, Err(GraphError::RequiredParameterMissing(name)) if name == "comments"));
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test]
    async fn test_null_field_falls_back_to_override() {
        let source = MockDataSource::new();
        source
            .expect_read("articles")
            .return_ok(Record::new().with("id", Value::Null).with("title", "A").into());
        source
            .expect_read("comments")
            .return_ok(Records::Many(vec![Record::new().with("id", 10)]));

        let mut registry = ProducerRegistry::new();
        register(&mut registry, "article", vec![comments_relationship()]);
        register(&mut registry, "comment", vec![]);
        let builder = builder(&source, registry);

        let request = BuildRequest::new("article", DataFunction::table("articles"))
            .overrides(RelationshipOverrides::new().with("comments", "id", 77));
        let nodes = builder.build(&request).await.unwrap();

        assert_eq!(nodes[0].relationship("comments").map(|l| l.len()), Some(1));
        assert_eq!(source.calls()[1].argument("articleId"), Some(&json!(77)));
    }

    #[tokio::test]
    async fn test_record_field_wins_over_override() {
        let source = MockDataSource::new();
        source.expect_read("articles").return_ok(article().into());
        source
            .expect_read("comments")
            .return_ok(Records::Many(vec![Record::new().with("id", 10)]));

        let mut registry = ProducerRegistry::new();
        register(&mut registry, "article", vec![comments_relationship()]);
        register(&mut registry, "comment", vec![]);
        let builder = builder(&source, registry);

        let request = BuildRequest::new("article", DataFunction::table("articles"))
            .overrides(RelationshipOverrides::new().with("comments", "id", 77));
        builder.build(&request).await.unwrap();

        assert_eq!(source.calls()[1].argument("articleId"), Some(&json!(1)));
    }

    #[tokio::test]
    async fn test_optional_relationship_without_parameters_is_skipped() {
        let source = MockDataSource::new();
        source
            .expect_read("articles")
            .return_ok(Record::new().with("title", "no id").into());

        let mut registry = ProducerRegistry::new();
        register(&mut registry, "article", vec![comments_relationship().optional()]);
        register(&mut registry, "comment", vec![]);
        let builder = builder(&source, registry);

        let nodes = builder
            .build(&BuildRequest::new("article", DataFunction::table("articles")))
            .await
            .unwrap();

        assert_eq!(nodes.len(), 1);
        assert!(nodes[0].relationship("comments").is_none());
        assert_eq!(source.call_count(), 1);
        source.verify();
    }

    #[tokio::test]
    async fn test_optional_relationship_with_partial_binding_fetches_resolved_slots() {
        let source = MockDataSource::new();
        source.expect_read("articles").return_ok(article().into());
        source.expect_read("comments").return_ok(Records::empty());

        let partial = Relationship::new(
            "comments",
            "comment",
            DataFunction::table("comments")
                .bind("articleId", "id")
                .bind("viewerId", "viewer_id"),
        )
        .optional();
        let mut registry = ProducerRegistry::new();
        register(&mut registry, "article", vec![partial]);
        register(&mut registry, "comment", vec![]);
        let builder = builder(&source, registry);

        let nodes = builder
            .build(&BuildRequest::new("article", DataFunction::table("articles")))
            .await
            .unwrap();

        let calls = source.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].arguments().len(), 1);
        assert!(calls[1].argument("viewerId").is_none());
        assert!(nodes[0].relationship("comments").is_none());
    }

    #[tokio::test]
    async fn test_required_relationship_data_missing() {
        let source = MockDataSource::new();
        source.expect_read("articles").return_ok(article().into());
        source
            .expect_read("comments")
            .return_ok(Records::Many(vec![Record::new()]));

        let mut registry = ProducerRegistry::new();
        register(&mut registry, "article", vec![comments_relationship()]);
        register(&mut registry, "comment", vec![]);
        let builder = builder(&source, registry);

        let result = builder
            .build(&BuildRequest::new("article", DataFunction::table("articles")))
            .await;
        assert!(matches!(result, Err(GraphError::RequiredRelationshipDataMissing(name)) if name == "comments"));
    }

    #[tokio::test]
    async fn test_single_record_relationship_and_force_list() {
        let source = MockDataSource::new();
        source
            .expect_read("articles")
            .return_ok(article().with("author_id", 5).into());
        source
            .expect_read("authors")
            .return_ok(Record::new().with("id", 5).with("name", "Ada").into());
        source
            .expect_read("comments")
            .return_ok(Records::Many(vec![Record::new().with("id", 10)]));

        let author = Relationship::new(
            "author",
            "author",
            DataFunction::table("authors").bind("authorId", "author_id"),
        );
        let mut registry = ProducerRegistry::new();
        register(
            &mut registry,
            "article",
            vec![author, comments_relationship().force_list()],
        );
        register(&mut registry, "author", vec![]);
        register(&mut registry, "comment", vec![]);
        let builder = builder(&source, registry);

        let nodes = builder
            .build(&BuildRequest::new("article", DataFunction::table("articles")))
            .await
            .unwrap();

        let author = nodes[0].relationship("author").unwrap();
        assert_eq!(author.len(), 1);
        assert!(!author.is_list());

        let comments = nodes[0].relationship("comments").unwrap();
        assert_eq!(comments.len(), 1);
        assert!(comments.is_list());

        let names: Vec<&str> = nodes[0].relationship_names().collect();
        assert_eq!(names, vec!["author", "comments"]);
    }

    #[tokio::test]
    async fn test_suppress_children_stops_expansion_below_relationship() {
        let source = MockDataSource::new();
        source.expect_read("articles").return_ok(article().into());
        source
            .expect_read("comments")
            .return_ok(Records::Many(vec![Record::new().with("id", 10).with("author_id", 5)]));

        let comment_author = Relationship::new(
            "author",
            "author",
            DataFunction::table("authors").bind("authorId", "author_id"),
        );
        let mut registry = ProducerRegistry::new();
        register(
            &mut registry,
            "article",
            vec![comments_relationship().suppress_children()],
        );
        register(&mut registry, "comment", vec![comment_author]);
        register(&mut registry, "author", vec![]);
        let builder = builder(&source, registry);

        let request = BuildRequest::new("article", DataFunction::table("articles")).depth(5);
        let nodes = builder.build(&request).await.unwrap();

        let comment = &nodes[0].relationship("comments").unwrap().resources()[0];
        assert!(!comment.has_relationships());
        assert_eq!(source.call_count(), 2);
        source.verify();
    }

    #[tokio::test]
    async fn test_depth_budget_decrements_per_level() {
        let source = MockDataSource::new();
        source.expect_read("articles").return_ok(article().into());
        source
            .expect_read("comments")
            .return_ok(Records::Many(vec![Record::new().with("id", 10).with("author_id", 5)]));

        let comment_author = Relationship::new(
            "author",
            "author",
            DataFunction::table("authors").bind("authorId", "author_id"),
        );
        let mut registry = ProducerRegistry::new();
        register(&mut registry, "article", vec![comments_relationship()]);
        register(&mut registry, "comment", vec![comment_author]);
        register(&mut registry, "author", vec![]);
        let builder = builder(&source, registry);

        // Depth 1: comments are attached, their authors are not.
        let nodes = builder
            .build(&BuildRequest::new("article", DataFunction::table("articles")))
            .await
            .unwrap();
        let comment = &nodes[0].relationship("comments").unwrap().resources()[0];
        assert!(comment.relationship("author").is_none());
        source.verify();
    }

    #[tokio::test]
    async fn test_loader_path_uses_registered_loader() {
        let source = MockDataSource::new();
        source.expect_read("articles").return_ok(article().into());
        let loader = MockLoader::new();
        loader
            .expect_call("byArticle")
            .return_ok(Record::new().with("views", 120).into());

        let stats = Relationship::new(
            "stats",
            "stats",
            DataFunction::loader("stats", "byArticle").bind("articleId", "id"),
        );
        let mut registry = ProducerRegistry::new();
        register(&mut registry, "article", vec![stats]);
        register(&mut registry, "stats", vec![]);

        let mut loaders = LoaderRegistry::new();
        loaders.register("stats", Arc::new(loader.clone()));
        let builder = builder(&source, registry).with_loaders(loaders);

        let nodes = builder
            .build(&BuildRequest::new("article", DataFunction::table("articles")))
            .await
            .unwrap();

        let stats = &nodes[0].relationship("stats").unwrap().resources()[0];
        assert_eq!(stats.attribute("views"), Some(&json!(120)));
        assert_eq!(loader.calls(), vec![("byArticle".to_string(), vec![("articleId".to_string(), json!(1))])]);
        loader.verify();
    }

    #[tokio::test]
    async fn test_unknown_loader() {
        let source = MockDataSource::new();
        let builder = builder(&source, ProducerRegistry::new());
        let result = builder
            .build(&BuildRequest::new("stats", DataFunction::loader("missing", "all")))
            .await;
        assert!(matches!(result, Err(GraphError::UnknownLoader(name)) if name == "missing"));
    }

    #[tokio::test]
    async fn test_source_errors_propagate() {
        let source = MockDataSource::new();
        source
            .expect_read("articles")
            .return_err(SourceError::Unavailable("timeout".into()));
        let builder = builder(&source, ProducerRegistry::new());

        let result = builder
            .build(&BuildRequest::new("article", DataFunction::table("articles")))
            .await;
        assert!(matches!(result, Err(GraphError::Source(SourceError::Unavailable(_)))));
    }

    // --- cache ---

    #[tokio::test]
    async fn test_cache_miss_stores_then_hit_skips_source() {
        let source = MockDataSource::new();
        source.expect_read("articles").return_ok(article().into());
        source
            .expect_read("comments")
            .return_ok(Records::Many(vec![Record::new().with("id", 10)]));

        let mut registry = ProducerRegistry::new();
        register(&mut registry, "article", vec![comments_relationship().force_list()]);
        register(&mut registry, "comment", vec![]);
        let cache = Arc::new(MemoryCache::new());
        let builder = builder(&source, registry).with_cache(cache.clone());

        let request = BuildRequest::new(
            "article",
            DataFunction::table("articles").arg("id", 1).cached("article:1"),
        );

        let first = builder.build(&request).await.unwrap();
        assert_eq!(source.call_count(), 2);
        assert_eq!(cache.saves(), 1);

        let second = builder.build(&request).await.unwrap();
        assert_eq!(source.call_count(), 2);
        assert_eq!(cache.saves(), 1);
        assert_eq!(cache.reads(), 2);
        assert_eq!(first, second);
        assert!(second[0].relationship("comments").unwrap().is_list());
    }

    #[tokio::test]
    async fn test_disabled_cache_is_bypassed() {
        let source = MockDataSource::new();
        source.expect_read("comments").return_ok(Records::empty());
        source.expect_read("comments").return_ok(Records::empty());

        let mut registry = ProducerRegistry::new();
        register(&mut registry, "comment", vec![]);
        let cache = Arc::new(MemoryCache::disabled());
        let builder = builder(&source, registry).with_cache(cache.clone());

        let request = BuildRequest::new("comment", DataFunction::table("comments").cached("c"));
        builder.build(&request).await.unwrap();
        builder.build(&request).await.unwrap();

        assert_eq!(cache.reads(), 0);
        assert_eq!(cache.saves(), 0);
        source.verify();
    }

    #[tokio::test]
    async fn test_blank_cache_key_is_rejected() {
        let source = MockDataSource::new();
        let builder =
            builder(&source, ProducerRegistry::new()).with_cache(Arc::new(MemoryCache::new()));

        let request = BuildRequest::new("article", DataFunction::table("articles").cached(" "));
        let result = builder.build(&request).await;

        assert!(matches!(result, Err(GraphError::InvalidCacheKey)));
        assert_eq!(source.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_build_is_not_cached() {
        let source = MockDataSource::new();
        source.expect_read("articles").return_ok(article().into());
        source.expect_read("comments").return_ok(Records::empty());

        let mut registry = ProducerRegistry::new();
        register(&mut registry, "article", vec![comments_relationship()]);
        let cache = Arc::new(MemoryCache::new());
        let builder = builder(&source, registry).with_cache(cache.clone());

        let request =
            BuildRequest::new("article", DataFunction::table("articles").cached("article:1"));
        assert!(builder.build(&request).await.is_err());
        assert_eq!(cache.saves(), 0);
    }
}
