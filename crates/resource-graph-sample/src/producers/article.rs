use super::{copy_attributes, identify, AUTHOR, COMMENT, STATS};
use crate::loaders::STATS_LOADER;
use resource_graph::{
    DataFunction, NodeProducer, ProducerContext, Record, Relationship, ResourceNode, Value,
};
use serde_json::json;

pub struct ArticleProducer {
    ctx: ProducerContext,
    node: ResourceNode,
}

impl ArticleProducer {
    pub fn new(ctx: ProducerContext) -> Self {
        Self {
            ctx,
            node: ResourceNode::new("article"),
        }
    }
}

impl NodeProducer for ArticleProducer {
    fn set_attributes(&mut self, record: &Record) {
        copy_attributes(&self.ctx, &mut self.node, record, &["title", "body", "published"]);
    }

    fn set_links(&mut self, record: &Record) {
        identify(&self.ctx, &mut self.node, record, "articles");
    }

    fn set_meta(&mut self, record: &Record) {
        if let Some(body) = record.get("body").and_then(Value::as_str) {
            let words = body.split_whitespace().count();
            self.node.meta.insert("word_count".into(), json!(words));
        }
    }

    fn relationships(&self) -> Vec<Relationship> {
        vec![
            Relationship::new(
                "author",
                AUTHOR,
                DataFunction::table("authors").bind("id", "author_id"),
            ),
            Relationship::new(
                "comments",
                COMMENT,
                DataFunction::table("comments").bind("article_id", "id"),
            )
            .optional()
            .force_list(),
            // viewer_id is never on the article row; callers pass it as an override.
            Relationship::new(
                "stats",
                STATS,
                DataFunction::loader(STATS_LOADER, "byArticle")
                    .bind("article_id", "id")
                    .bind("viewer_id", "viewer_id"),
            )
            .optional(),
        ]
    }

    fn into_node(self: Box<Self>) -> ResourceNode {
        self.node
    }
}
