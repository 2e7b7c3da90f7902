use super::copy_attributes;
use resource_graph::{NodeProducer, ProducerContext, Record, ResourceNode, Value};

/// Builds the `stats` node of an article. The node shares the article's id.
pub struct StatsProducer {
    ctx: ProducerContext,
    node: ResourceNode,
}

impl StatsProducer {
    pub fn new(ctx: ProducerContext) -> Self {
        Self {
            ctx,
            node: ResourceNode::new("stats"),
        }
    }
}

impl NodeProducer for StatsProducer {
    fn set_attributes(&mut self, record: &Record) {
        if let Some(id) = record.get("id").and_then(Value::as_i64) {
            self.node.id = Some(self.ctx.encrypter.encrypt_id(id));
        }
        copy_attributes(
            &self.ctx,
            &mut self.node,
            record,
            &["comments", "words", "viewer_commented"],
        );
    }

    fn into_node(self: Box<Self>) -> ResourceNode {
        self.node
    }
}
