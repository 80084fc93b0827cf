use serde::{Serialize, Deserialize};
use std::collections::BTreeSet;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PostId(pub u64);

impl PostId {
    pub fn new(id: u64) -> Self {
        PostId(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for PostId {
    fn from(id: u64) -> Self {
        PostId(id)
    }
}

/// Immutable post snapshot handed over by the post-service collaborator.
/// The engine only ever reads these; mutation happens upstream and is
/// signalled through the invalidation entry points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub author: String,
    pub tags: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    pub views: u64,
}

impl PostRecord {
    pub fn new(id: u64, title: &str, author: &str) -> Self {
        PostRecord {
            id: PostId(id),
            title: title.to_string(),
            content: String::new(),
            author: author.to_string(),
            tags: BTreeSet::new(),
            created_at: Utc::now(),
            views: 0,
        }
    }

    pub fn with_content(mut self, content: &str) -> Self {
        self.content = content.to_string();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_views(mut self, views: u64) -> Self {
        self.views = views;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}
