//! # Statistics Loader
//!
//! [`StatsLoader`] is registered as the `stats` loader. It computes figures on demand
//! from the comments table instead of storing them.
//!
//! | Function | Arguments | Result |
//! |----------|-----------|--------|
//! | `byArticle` | `article_id`, optional `viewer_id` | one stats record |
//! | `all` | none | one stats record per article |

use crate::store::TableStore;
use async_trait::async_trait;
use resource_graph::{Loader, Record, Records, SourceError, Value};
use std::sync::Arc;
use tracing::debug;

pub const STATS_LOADER: &str = "stats";

#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("stats has no function named {0}")]
    UnknownFunction(String),
    #[error("stats::{function} requires the {argument} argument")]
    MissingArgument {
        function: &'static str,
        argument: &'static str,
    },
}

impl From<StatsError> for SourceError {
    fn from(error: StatsError) -> Self {
        SourceError::Custom(Box::new(error))
    }
}

pub struct StatsLoader {
    store: Arc<TableStore>,
}

impl StatsLoader {
    pub fn new(store: Arc<TableStore>) -> Self {
        Self { store }
    }

    async fn article_stats(
        &self,
        article_id: &Value,
        viewer_id: Option<&Value>,
    ) -> Result<Record, SourceError> {
        let comments = self
            .store
            .select("comments", &[("article_id".to_string(), article_id.clone())])
            .await?;
        let words: usize = comments
            .iter()
            .filter_map(|c| c.get("body").and_then(Value::as_str))
            .map(|body| body.split_whitespace().count())
            .sum();

        let mut stats = Record::new()
            .with("id", article_id.clone())
            .with("comments", comments.len())
            .with("words", words);
        if let Some(viewer_id) = viewer_id {
            let commented = comments
                .iter()
                .any(|c| c.get("author_id") == Some(viewer_id));
            stats.insert("viewer_commented", commented);
        }
        Ok(stats)
    }
}

fn argument<'a>(arguments: &'a [(String, Value)], slot: &str) -> Option<&'a Value> {
    arguments
        .iter()
        .find(|(name, _)| name == slot)
        .map(|(_, value)| value)
}

#[async_trait]
impl Loader for StatsLoader {
    async fn call(
        &self,
        function: &str,
        arguments: &[(String, Value)],
    ) -> Result<Records, SourceError> {
        debug!(function, arguments = arguments.len(), "Stats call");
        match function {
            "byArticle" => {
                let article_id =
                    argument(arguments, "article_id").ok_or(StatsError::MissingArgument {
                        function: "byArticle",
                        argument: "article_id",
                    })?;
                let stats = self
                    .article_stats(article_id, argument(arguments, "viewer_id"))
                    .await?;
                Ok(Records::One(stats))
            }
            "all" => {
                let articles = self.store.select("articles", &[]).await?;
                let mut all = Vec::with_capacity(articles.len());
                for article in &articles {
                    if let Some(id) = article.get("id") {
                        all.push(self.article_stats(id, None).await?);
                    }
                }
                Ok(Records::Many(all))
            }
            other => Err(StatsError::UnknownFunction(other.to_string()).into()),
        }
    }
}
