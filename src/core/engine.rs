use std::sync::Arc;
use tracing::debug;
use crate::core::config::EngineConfig;
use crate::core::error::Result;
use crate::core::stats::PerformanceMetrics;
use crate::core::types::{PostId, PostRecord};
use crate::query::engine::QueryEngine;
use crate::query::provider::PostProvider;
use crate::sort::quick::{SortDirection, SortKey, sort_posts};

/// Facade over the query, sort, and cache layers. One explicitly owned
/// instance per post collection; construction wires the provider and the
/// cache configuration, nothing is process-global.
///
/// The post-service collaborator owns the system of record and signals
/// every mutation through the `on_post_*` entry points so stale query
/// results are never served.
pub struct SearchEngine {
    query: QueryEngine,
}

impl SearchEngine {
    pub fn new(provider: Arc<dyn PostProvider>) -> Self {
        Self::with_config(provider, EngineConfig::default())
    }

    pub fn with_config(provider: Arc<dyn PostProvider>, config: EngineConfig) -> Self {
        SearchEngine {
            query: QueryEngine::new(provider, &config),
        }
    }

    pub fn search_by_keyword(&self, keyword: &str) -> Result<Vec<PostRecord>> {
        self.query.search_by_keyword(keyword)
    }

    pub fn search_by_author(&self, author: &str) -> Result<Vec<PostRecord>> {
        self.query.search_by_author(author)
    }

    pub fn search_by_tag(&self, tag: &str) -> Result<Vec<PostRecord>> {
        self.query.search_by_tag(tag)
    }

    pub fn search_all(&self, query: &str) -> Result<Vec<PostRecord>> {
        self.query.search_all(query)
    }

    pub fn search_by_title_prefix(&self, prefix: &str) -> Result<Vec<PostRecord>> {
        self.query.search_by_title_prefix(prefix)
    }

    pub fn get_post(&self, id: PostId) -> Result<Option<PostRecord>> {
        self.query.get_post(id)
    }

    /// In-place ordering of a result list; see the sort module for the
    /// direction and tie-break contract.
    pub fn sort(&self, posts: &mut [PostRecord], key: SortKey, direction: SortDirection) {
        sort_posts(posts, key, direction);
    }

    pub fn on_post_created(&self) {
        debug!(target: "blogdex::engine", "post created, invalidating");
        self.query.invalidate_cache();
    }

    pub fn on_post_updated(&self) {
        debug!(target: "blogdex::engine", "post updated, invalidating");
        self.query.invalidate_cache();
    }

    pub fn on_post_deleted(&self) {
        debug!(target: "blogdex::engine", "post deleted, invalidating");
        self.query.invalidate_cache();
    }

    pub fn invalidate_cache(&self) {
        self.query.invalidate_cache();
    }

    pub fn invalidate_keyword_cache(&self, key: &str) -> bool {
        self.query.invalidate_keyword_cache(key)
    }

    pub fn invalidate_author_cache(&self, key: &str) -> bool {
        self.query.invalidate_author_cache(key)
    }

    pub fn invalidate_tag_cache(&self, key: &str) -> bool {
        self.query.invalidate_tag_cache(key)
    }

    pub fn preload_cache(&self) -> Result<usize> {
        self.query.preload_cache()
    }

    pub fn metrics(&self) -> PerformanceMetrics {
        self.query.performance_metrics()
    }

    pub fn cleanup_expired(&self) -> usize {
        self.query.cleanup_expired()
    }

    pub fn reset_cache_stats(&self) {
        self.query.reset_cache_stats()
    }

    pub fn generation(&self) -> u64 {
        self.query.generation()
    }
}
