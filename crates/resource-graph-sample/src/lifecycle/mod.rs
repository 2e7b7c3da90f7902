//! # Blog System Wiring
//!
//! [`BlogSystem`] is the composition root of the sample: it seeds the table store,
//! registers the producers and the statistics loader, plugs in the graph cache and
//! hands out a ready [`GraphBuilder`].
//!
//! All configuration happens here, at construction time:
//!
//! ```rust,ignore
//! let store = Arc::new(seed());
//! let mut loaders = LoaderRegistry::new();
//! loaders.register(STATS_LOADER, Arc::new(StatsLoader::new(store.clone())));
//!
//! let builder = GraphBuilder::new(store, producers::registry(), services)
//!     .with_loaders(loaders)
//!     .with_cache(cache);
//! ```
//!
//! The builder keeps no per-call state, so a single `BlogSystem` can serve concurrent
//! builds, each with its own depth, overrides and viewer.

use crate::loaders::{StatsLoader, STATS_LOADER};
use crate::model::{ArticleRow, AuthorRow, CommentRow};
use crate::producers::{self, ARTICLE, AUTHOR};
use crate::services::{BaseUrlPath, HexEncrypter, ViewerTransformer};
use crate::store::TableStore;
use resource_graph::{
    BuildRequest, Cache, DataFunction, GraphBuilder, GraphError, LoaderRegistry, MemoryCache,
    ProducerServices, RelationshipOverrides, ResourceNode,
};
use std::sync::Arc;
use tracing::info;

pub const BASE_URL: &str = "https://blog.example/api";
pub const ID_SALT: i64 = 0x2f1d;

/// Who a graph is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    Anonymous,
    /// A signed-in author. Their id drives viewer-scoped statistics.
    Author(i64),
    Staff,
}

impl Viewer {
    fn transformer(self) -> ViewerTransformer {
        match self {
            Viewer::Staff => ViewerTransformer::staff(),
            _ => ViewerTransformer::anonymous(),
        }
    }

    fn cache_segment(self) -> String {
        match self {
            Viewer::Anonymous => "anon".to_string(),
            Viewer::Author(id) => format!("author{}", id),
            Viewer::Staff => "staff".to_string(),
        }
    }
}

pub struct BlogSystem {
    pub store: Arc<TableStore>,
    pub cache: Arc<MemoryCache>,
    pub builder: GraphBuilder,
}

impl BlogSystem {
    /// A system over the demo data with an enabled cache.
    pub fn new() -> Self {
        Self::with_store(seed(), MemoryCache::new())
    }

    pub fn with_store(store: TableStore, cache: MemoryCache) -> Self {
        let store = Arc::new(store);
        let cache = Arc::new(cache);

        let mut loaders = LoaderRegistry::new();
        loaders.register(STATS_LOADER, Arc::new(StatsLoader::new(store.clone())));

        let services = ProducerServices::new(
            Arc::new(BaseUrlPath::new(BASE_URL)),
            Arc::new(HexEncrypter::new(ID_SALT)),
        );
        let builder = GraphBuilder::new(store.clone(), producers::registry(), services)
            .with_loaders(loaders)
            .with_cache(cache.clone());

        info!(caching = cache.use_caching(), "Blog system ready");
        Self {
            store,
            cache,
            builder,
        }
    }

    /// Builds one article with its relationships expanded `depth` levels, cached per
    /// article, depth and viewer.
    pub async fn article_graph(
        &self,
        id: i64,
        depth: u32,
        viewer: Viewer,
    ) -> Result<Vec<ResourceNode>, GraphError> {
        let key = format!("article:{}:{}:{}", id, depth, viewer.cache_segment());
        let function = DataFunction::table("articles").arg("id", id).cached(key);

        let mut overrides = RelationshipOverrides::new();
        if let Viewer::Author(viewer_id) = viewer {
            overrides.insert("stats", "viewer_id", viewer_id);
        }

        let request = BuildRequest::new(ARTICLE, function)
            .depth(depth)
            .overrides(overrides)
            .transformer(Arc::new(viewer.transformer()));
        self.builder.build(&request).await
    }

    /// Builds one author with their articles. Never cached.
    pub async fn author_graph(
        &self,
        id: i64,
        depth: u32,
        viewer: Viewer,
    ) -> Result<Vec<ResourceNode>, GraphError> {
        let request = BuildRequest::new(AUTHOR, DataFunction::table("authors").arg("id", id))
            .depth(depth)
            .transformer(Arc::new(viewer.transformer()));
        self.builder.build(&request).await
    }
}

impl Default for BlogSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// The demo data set: two authors, three articles, a handful of comments.
pub fn seed() -> TableStore {
    TableStore::new()
        .with_rows(
            "authors",
            vec![
                AuthorRow::new(1, "Ada Lovelace").with_email("ada@blog.example"),
                AuthorRow::new(2, "Charles Babbage"),
            ],
        )
        .with_rows(
            "articles",
            vec![
                ArticleRow::new(1, 1, "Notes on the Engine", "The engine weaves algebraic patterns."),
                ArticleRow::new(2, 2, "Difference Engines", "Tables computed by machine."),
                ArticleRow::new(3, 1, "Unfinished Thoughts", "Coming soon.").draft(),
            ],
        )
        .with_rows(
            "comments",
            vec![
                CommentRow::new(1, 1, 2, "A remarkable translation."),
                CommentRow::new(2, 1, 1, "Thank you, Charles."),
                CommentRow::new(3, 2, 1, "The tables are beautiful."),
            ],
        )
}
