use parking_lot::RwLock;
use std::collections::BTreeMap;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{PostId, PostRecord};

/// Inbound seam to the external post-service collaborator. `fetch_all`
/// returns the full current snapshot the indexes are rebuilt from; failures
/// belong to the snapshot error class and are never retried here.
pub trait PostProvider: Send + Sync {
    fn fetch_all(&self) -> Result<Vec<PostRecord>>;
}

/// In-memory system of record used by tests, demos, and benchmarks. Mutation
/// goes through here; callers are responsible for signalling the engine's
/// invalidation entry points afterwards, exactly like a real repository
/// collaborator would.
pub struct InMemoryPostStore {
    posts: RwLock<BTreeMap<PostId, PostRecord>>,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        InMemoryPostStore {
            posts: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn with_posts<I: IntoIterator<Item = PostRecord>>(posts: I) -> Self {
        InMemoryPostStore {
            posts: RwLock::new(posts.into_iter().map(|post| (post.id, post)).collect()),
        }
    }

    pub fn create(&self, post: PostRecord) -> Result<()> {
        let mut posts = self.posts.write();
        if posts.contains_key(&post.id) {
            return Err(Error::new(
                ErrorKind::InvalidState,
                format!("post {} already exists", post.id.value()),
            ));
        }
        posts.insert(post.id, post);
        Ok(())
    }

    /// Replace an existing post. Returns false when the id is unknown.
    pub fn update(&self, post: PostRecord) -> bool {
        let mut posts = self.posts.write();
        match posts.get_mut(&post.id) {
            Some(slot) => {
                *slot = post;
                true
            }
            None => false,
        }
    }

    pub fn delete(&self, id: PostId) -> bool {
        self.posts.write().remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.posts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.read().is_empty()
    }
}

impl Default for InMemoryPostStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PostProvider for InMemoryPostStore {
    fn fetch_all(&self) -> Result<Vec<PostRecord>> {
        Ok(self.posts.read().values().cloned().collect())
    }
}
