use resource_graph::Record;
use serde::{Deserialize, Serialize};

/// One row of the `articles` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRow {
    pub id: i64,
    pub author_id: i64,
    pub title: String,
    pub body: String,
    pub published: bool,
}

impl ArticleRow {
    pub fn new(id: i64, author_id: i64, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id,
            author_id,
            title: title.into(),
            body: body.into(),
            published: true,
        }
    }

    pub fn draft(mut self) -> Self {
        self.published = false;
        self
    }
}

impl From<ArticleRow> for Record {
    fn from(row: ArticleRow) -> Self {
        Record::new()
            .with("id", row.id)
            .with("author_id", row.author_id)
            .with("title", row.title)
            .with("body", row.body)
            .with("published", row.published)
    }
}
