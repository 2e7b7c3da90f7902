use resource_graph::Record;
use serde::{Deserialize, Serialize};

/// One row of the `comments` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentRow {
    pub id: i64,
    pub article_id: i64,
    pub author_id: i64,
    pub body: String,
}

impl CommentRow {
    pub fn new(id: i64, article_id: i64, author_id: i64, body: impl Into<String>) -> Self {
        Self {
            id,
            article_id,
            author_id,
            body: body.into(),
        }
    }
}

impl From<CommentRow> for Record {
    fn from(row: CommentRow) -> Self {
        Record::new()
            .with("id", row.id)
            .with("article_id", row.article_id)
            .with("author_id", row.author_id)
            .with("body", row.body)
    }
}
