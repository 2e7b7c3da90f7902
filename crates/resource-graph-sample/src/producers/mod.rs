//! # Blog Producers
//!
//! One [`NodeProducer`](resource_graph::NodeProducer) per blog entity. The relationship
//! map they declare:
//!
//! ```text
//! article ──author──▶ author ──articles──▶ article ...
//!    │
//!    ├──comments──▶ comment ──author──▶ author
//!    │                 └──article──▶ article (children suppressed)
//!    └──stats──▶ stats (loader)
//! ```
//!
//! The graph is cyclic; the depth budget of each build decides how much of it is walked.

pub mod article;
pub mod author;
pub mod comment;
pub mod stats;

pub use article::ArticleProducer;
pub use author::AuthorProducer;
pub use comment::CommentProducer;
pub use stats::StatsProducer;

use resource_graph::{ProducerContext, ProducerRegistry, Record, ResourceNode, Value};
use serde_json::json;

pub const ARTICLE: &str = "article";
pub const AUTHOR: &str = "author";
pub const COMMENT: &str = "comment";
pub const STATS: &str = "stats";

/// Registers every blog producer under its type tag.
pub fn registry() -> ProducerRegistry {
    let mut registry = ProducerRegistry::new();
    registry
        .register(ARTICLE, |ctx| Box::new(ArticleProducer::new(ctx)))
        .register(AUTHOR, |ctx| Box::new(AuthorProducer::new(ctx)))
        .register(COMMENT, |ctx| Box::new(CommentProducer::new(ctx)))
        .register(STATS, |ctx| Box::new(StatsProducer::new(ctx)));
    registry
}

/// Sets the node id from the record's numeric `id` and adds the `self` link under
/// `collection`. Returns the raw id.
fn identify(
    ctx: &ProducerContext,
    node: &mut ResourceNode,
    record: &Record,
    collection: &str,
) -> Option<i64> {
    let id = record.get("id").and_then(Value::as_i64)?;
    let hidden = ctx.encrypter.encrypt_id(id);
    let link = ctx.path.url(&format!("{}/{}", collection, hidden));
    node.links.insert("self".into(), json!(link));
    node.id = Some(hidden);
    Some(id)
}

/// Copies `fields` from the record into attributes, through the transformer.
fn copy_attributes(ctx: &ProducerContext, node: &mut ResourceNode, record: &Record, fields: &[&str]) {
    for field in fields {
        if let Some(value) = record.get(field) {
            node.attributes
                .insert((*field).to_string(), ctx.transform(field, value));
        }
    }
}
