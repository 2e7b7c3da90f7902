use resource_graph::Record;
use serde::{Deserialize, Serialize};

/// One row of the `authors` table. Authors without a public address store `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorRow {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
}

impl AuthorRow {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

impl From<AuthorRow> for Record {
    fn from(row: AuthorRow) -> Self {
        Record::new()
            .with("id", row.id)
            .with("name", row.name)
            .with("email", row.email)
    }
}
