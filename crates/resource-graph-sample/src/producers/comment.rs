use super::{copy_attributes, identify, ARTICLE, AUTHOR};
use resource_graph::{DataFunction, NodeProducer, ProducerContext, Record, Relationship, ResourceNode};

pub struct CommentProducer {
    ctx: ProducerContext,
    node: ResourceNode,
}

impl CommentProducer {
    pub fn new(ctx: ProducerContext) -> Self {
        Self {
            ctx,
            node: ResourceNode::new("comment"),
        }
    }
}

impl NodeProducer for CommentProducer {
    fn set_attributes(&mut self, record: &Record) {
        copy_attributes(&self.ctx, &mut self.node, record, &["body"]);
    }

    fn set_links(&mut self, record: &Record) {
        identify(&self.ctx, &mut self.node, record, "comments");
    }

    fn relationships(&self) -> Vec<Relationship> {
        vec![
            Relationship::new(
                "author",
                AUTHOR,
                DataFunction::table("authors").bind("id", "author_id"),
            ),
            // Back-reference only; the article is usually the parent already.
            Relationship::new(
                "article",
                ARTICLE,
                DataFunction::table("articles").bind("id", "article_id"),
            )
            .suppress_children(),
        ]
    }

    fn into_node(self: Box<Self>) -> ResourceNode {
        self.node
    }
}
