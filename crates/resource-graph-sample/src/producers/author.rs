use super::{copy_attributes, identify, ARTICLE};
use resource_graph::{DataFunction, NodeProducer, ProducerContext, Record, Relationship, ResourceNode};

pub struct AuthorProducer {
    ctx: ProducerContext,
    node: ResourceNode,
}

impl AuthorProducer {
    pub fn new(ctx: ProducerContext) -> Self {
        Self {
            ctx,
            node: ResourceNode::new("author"),
        }
    }
}

impl NodeProducer for AuthorProducer {
    fn set_attributes(&mut self, record: &Record) {
        copy_attributes(&self.ctx, &mut self.node, record, &["name", "email"]);
    }

    fn set_links(&mut self, record: &Record) {
        identify(&self.ctx, &mut self.node, record, "authors");
    }

    fn relationships(&self) -> Vec<Relationship> {
        vec![Relationship::new(
            "articles",
            ARTICLE,
            DataFunction::table("articles").bind("author_id", "id"),
        )
        .optional()
        .force_list()]
    }

    fn into_node(self: Box<Self>) -> ResourceNode {
        self.node
    }
}
