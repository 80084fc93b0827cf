use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::debug;
use crate::analysis::tokenizer::{StandardTokenizer, Tokenizer, normalize};
use crate::cache::bounded::BoundedCache;
use crate::core::config::EngineConfig;
use crate::core::error::{Error, Result, ValidationCode};
use crate::core::stats::PerformanceMetrics;
use crate::core::types::{PostId, PostRecord};
use crate::index::builder::IndexSet;
use crate::query::provider::PostProvider;

/// Resolves keyword/author/tag/hybrid queries through the index set,
/// memoizing id lists per query-type partition.
///
/// The index set is rebuilt lazily: invalidation only marks it stale, and
/// the next query swaps in a freshly built `Arc<IndexSet>` under the write
/// lock. Readers observe the old set or the new set, never a partial one.
/// The generation counter increments once per successful rebuild so callers
/// can assert a rebuild happened without relying on timing.
pub struct QueryEngine {
    provider: Arc<dyn PostProvider>,
    tokenizer: StandardTokenizer,
    indexes: RwLock<Arc<IndexSet>>,
    stale: AtomicBool,
    generation: AtomicU64,
    keyword_cache: BoundedCache<String, Vec<PostId>>,
    author_cache: BoundedCache<String, Vec<PostId>>,
    tag_cache: BoundedCache<String, Vec<PostId>>,
    hybrid_cache: BoundedCache<String, Vec<PostId>>,
    preload_keyword_limit: usize,
}

impl QueryEngine {
    pub fn new(provider: Arc<dyn PostProvider>, config: &EngineConfig) -> Self {
        QueryEngine {
            provider,
            tokenizer: StandardTokenizer::default(),
            indexes: RwLock::new(Arc::new(IndexSet::empty())),
            stale: AtomicBool::new(true),
            generation: AtomicU64::new(0),
            keyword_cache: BoundedCache::new(config.cache_capacity, config.cache_ttl),
            author_cache: BoundedCache::new(config.cache_capacity, config.cache_ttl),
            tag_cache: BoundedCache::new(config.cache_capacity, config.cache_ttl),
            hybrid_cache: BoundedCache::new(config.cache_capacity, config.cache_ttl),
            preload_keyword_limit: config.preload_keyword_limit,
        }
    }

    /// Current index set, rebuilding first if an invalidation marked it
    /// stale. A failed rebuild leaves the previous set installed and
    /// surfaces the snapshot error to the caller.
    fn current_indexes(&self) -> Result<Arc<IndexSet>> {
        if !self.stale.load(Ordering::Acquire) {
            return Ok(self.indexes.read().clone());
        }

        let mut indexes = self.indexes.write();
        // Another caller may have rebuilt while this one waited on the lock.
        if self.stale.load(Ordering::Acquire) {
            let posts = self
                .provider
                .fetch_all()
                .map_err(|err| Error::snapshot(format!("post snapshot unavailable: {err}")))?;
            let built = IndexSet::build(&posts, &self.tokenizer);
            *indexes = Arc::new(built);
            self.stale.store(false, Ordering::Release);
            let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
            debug!(
                target: "blogdex::query",
                generation,
                posts = indexes.post_count(),
                "index set rebuilt"
            );
        }
        Ok(indexes.clone())
    }

    fn validated(value: &str, code: ValidationCode) -> Result<String> {
        let normalized = normalize(value);
        if normalized.is_empty() {
            return Err(Error::validation(
                code,
                format!("{} must not be empty or blank", code.field()),
            ));
        }
        Ok(normalized)
    }

    fn resolve(index: &IndexSet, ids: &[PostId]) -> Vec<PostRecord> {
        ids.iter()
            .filter_map(|id| index.get(*id).cloned())
            .collect()
    }

    /// Exact-token lookup through the inverted index, memoized in the
    /// keyword partition. Results come back in ascending id order.
    pub fn search_by_keyword(&self, keyword: &str) -> Result<Vec<PostRecord>> {
        let key = Self::validated(keyword, ValidationCode::KeywordRequired)?;
        let index = self.current_indexes()?;

        if let Some(ids) = self.keyword_cache.get(&key) {
            return Ok(Self::resolve(&index, &ids));
        }

        let ids: Vec<PostId> = index
            .posts_with_token(&key)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        self.keyword_cache.put(key, ids.clone());
        Ok(Self::resolve(&index, &ids))
    }

    pub fn search_by_author(&self, author: &str) -> Result<Vec<PostRecord>> {
        let key = Self::validated(author, ValidationCode::AuthorRequired)?;
        let index = self.current_indexes()?;

        if let Some(ids) = self.author_cache.get(&key) {
            return Ok(Self::resolve(&index, &ids));
        }

        let ids: Vec<PostId> = index
            .posts_by_author(&key)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        self.author_cache.put(key, ids.clone());
        Ok(Self::resolve(&index, &ids))
    }

    pub fn search_by_tag(&self, tag: &str) -> Result<Vec<PostRecord>> {
        let key = Self::validated(tag, ValidationCode::TagRequired)?;
        let index = self.current_indexes()?;

        if let Some(ids) = self.tag_cache.get(&key) {
            return Ok(Self::resolve(&index, &ids));
        }

        let ids: Vec<PostId> = index
            .posts_by_tag(&key)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        self.tag_cache.put(key, ids.clone());
        Ok(Self::resolve(&index, &ids))
    }

    /// Hybrid search: unranked union of keyword hits (per query token),
    /// author hits, tag hits, and a title substring scan, deduplicated by
    /// id. Absence in any one index contributes an empty set, not an error.
    pub fn search_all(&self, query: &str) -> Result<Vec<PostRecord>> {
        let key = Self::validated(query, ValidationCode::QueryRequired)?;
        let index = self.current_indexes()?;

        if let Some(ids) = self.hybrid_cache.get(&key) {
            return Ok(Self::resolve(&index, &ids));
        }

        let mut merged: BTreeSet<PostId> = BTreeSet::new();
        for token in self.tokenizer.tokenize(&key) {
            if let Some(ids) = index.posts_with_token(&token) {
                merged.extend(ids);
            }
        }
        if let Some(ids) = index.posts_by_author(&key) {
            merged.extend(ids);
        }
        if let Some(ids) = index.posts_by_tag(&key) {
            merged.extend(ids);
        }
        merged.extend(index.titles_containing(&key));

        let ids: Vec<PostId> = merged.into_iter().collect();
        self.hybrid_cache.put(key, ids.clone());
        Ok(Self::resolve(&index, &ids))
    }

    /// Ordered prefix scan over the title index. Index-backed, uncached.
    pub fn search_by_title_prefix(&self, prefix: &str) -> Result<Vec<PostRecord>> {
        let key = Self::validated(prefix, ValidationCode::QueryRequired)?;
        let index = self.current_indexes()?;
        let ids: Vec<PostId> = index.titles_with_prefix(&key).into_iter().collect();
        Ok(Self::resolve(&index, &ids))
    }

    pub fn get_post(&self, id: PostId) -> Result<Option<PostRecord>> {
        let index = self.current_indexes()?;
        Ok(index.get(id).cloned())
    }

    /// Clear every cache partition and mark the index set stale. Rebuild is
    /// deferred to the next query; cumulative cache counters survive.
    pub fn invalidate_cache(&self) {
        self.keyword_cache.clear();
        self.author_cache.clear();
        self.tag_cache.clear();
        self.hybrid_cache.clear();
        self.stale.store(true, Ordering::Release);
        debug!(target: "blogdex::query", "caches invalidated, index marked stale");
    }

    pub fn invalidate_keyword_cache(&self, key: &str) -> bool {
        self.keyword_cache.remove(&normalize(key))
    }

    pub fn invalidate_author_cache(&self, key: &str) -> bool {
        self.author_cache.remove(&normalize(key))
    }

    pub fn invalidate_tag_cache(&self, key: &str) -> bool {
        self.tag_cache.remove(&normalize(key))
    }

    /// Warm the partitions with a representative query set: every author,
    /// every tag, and the first `preload_keyword_limit` keyword tokens in
    /// dictionary order. Returns the number of queries executed.
    pub fn preload_cache(&self) -> Result<usize> {
        let index = self.current_indexes()?;

        let authors: Vec<String> = {
            let mut keys: Vec<String> = index.author_keys().map(String::from).collect();
            keys.sort();
            keys
        };
        let tags: Vec<String> = {
            let mut keys: Vec<String> = index.tag_keys().map(String::from).collect();
            keys.sort();
            keys
        };
        let tokens: Vec<String> = {
            let mut keys: Vec<String> = index.keyword_tokens().map(String::from).collect();
            keys.sort();
            keys.truncate(self.preload_keyword_limit);
            keys
        };

        let mut warmed = 0;
        for author in &authors {
            self.search_by_author(author)?;
            warmed += 1;
        }
        for tag in &tags {
            self.search_by_tag(tag)?;
            warmed += 1;
        }
        for token in &tokens {
            self.search_by_keyword(token)?;
            warmed += 1;
        }
        debug!(target: "blogdex::query", warmed, "cache preloaded");
        Ok(warmed)
    }

    pub fn performance_metrics(&self) -> PerformanceMetrics {
        let partitions = [
            self.keyword_cache.stats(),
            self.author_cache.stats(),
            self.tag_cache.stats(),
            self.hybrid_cache.stats(),
        ];
        let hits: u64 = partitions.iter().map(|stats| stats.hits).sum();
        let misses: u64 = partitions.iter().map(|stats| stats.misses).sum();
        let requests = hits + misses;
        let cache_hit_rate = if requests == 0 {
            0.0
        } else {
            hits as f64 / requests as f64
        };

        PerformanceMetrics {
            cache_hit_rate,
            keyword_cache_size: self.keyword_cache.len(),
            author_cache_size: self.author_cache.len(),
            tag_cache_size: self.tag_cache.len(),
            hybrid_cache_size: self.hybrid_cache.len(),
            index_generation: self.generation.load(Ordering::Acquire),
            indexed_posts: self.indexes.read().post_count(),
        }
    }

    /// Sweep expired entries out of every partition; returns total removed.
    pub fn cleanup_expired(&self) -> usize {
        self.keyword_cache.cleanup_expired()
            + self.author_cache.cleanup_expired()
            + self.tag_cache.cleanup_expired()
            + self.hybrid_cache.cleanup_expired()
    }

    pub fn reset_cache_stats(&self) {
        self.keyword_cache.reset_stats();
        self.author_cache.reset_stats();
        self.tag_cache.reset_stats();
        self.hybrid_cache.reset_stats();
    }

    /// Rebuild generation the current index set was built under.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use crate::query::provider::InMemoryPostStore;
    use chrono::{TimeZone, Utc};

    fn seeded_store() -> Arc<InMemoryPostStore> {
        Arc::new(InMemoryPostStore::with_posts([
            PostRecord::new(1, "Intro to Rust", "Ann")
                .with_content("Ownership and borrowing explained.")
                .with_tags(["rust", "beginners"])
                .with_views(10)
                .with_created_at(Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap()),
            PostRecord::new(2, "Intro to Go", "Ann")
                .with_content("Goroutines for the impatient.")
                .with_tags(["go"])
                .with_views(20)
                .with_created_at(Utc.with_ymd_and_hms(2024, 2, 5, 9, 0, 0).unwrap()),
            PostRecord::new(3, "Database Internals", "Bea")
                .with_content("B-trees, pages, write-ahead logging in Rust.")
                .with_tags(["databases", "rust"])
                .with_views(15)
                .with_created_at(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()),
        ]))
    }

    fn engine_over(store: &Arc<InMemoryPostStore>) -> QueryEngine {
        QueryEngine::new(store.clone() as Arc<dyn PostProvider>, &EngineConfig::default())
    }

    fn ids(posts: &[PostRecord]) -> Vec<u64> {
        posts.iter().map(|post| post.id.value()).collect()
    }

    #[test]
    fn keyword_search_resolves_via_inverted_index() {
        let store = seeded_store();
        let engine = engine_over(&store);
        assert_eq!(ids(&engine.search_by_keyword("rust").unwrap()), vec![1, 3]);
        assert_eq!(ids(&engine.search_by_keyword("goroutines").unwrap()), vec![2]);
        assert!(engine.search_by_keyword("cobol").unwrap().is_empty());
    }

    #[test]
    fn keyword_search_normalizes_like_indexing() {
        let store = seeded_store();
        let engine = engine_over(&store);
        assert_eq!(ids(&engine.search_by_keyword("  RUST ").unwrap()), vec![1, 3]);
    }

    #[test]
    fn blank_keyword_is_rejected_before_index_or_cache() {
        let store = seeded_store();
        let engine = engine_over(&store);
        for input in ["", "   "] {
            let err = engine.search_by_keyword(input).unwrap_err();
            match err.kind {
                ErrorKind::Validation { code, field } => {
                    assert_eq!(code, ValidationCode::KeywordRequired);
                    assert_eq!(field, "keyword");
                }
                other => panic!("expected validation error, got {other:?}"),
            }
        }
        // Rejected input never became a cache request.
        assert_eq!(engine.performance_metrics().cache_hit_rate, 0.0);
    }

    #[test]
    fn author_and_tag_validation_codes() {
        let store = seeded_store();
        let engine = engine_over(&store);

        let err = engine.search_by_author(" ").unwrap_err();
        assert!(matches!(
            err.kind,
            ErrorKind::Validation { code: ValidationCode::AuthorRequired, field: "author" }
        ));

        let err = engine.search_by_tag("").unwrap_err();
        assert!(matches!(
            err.kind,
            ErrorKind::Validation { code: ValidationCode::TagRequired, field: "tagName" }
        ));

        let err = engine.search_all("").unwrap_err();
        assert!(matches!(
            err.kind,
            ErrorKind::Validation { code: ValidationCode::QueryRequired, field: "query" }
        ));
    }

    #[test]
    fn author_search_is_case_insensitive() {
        let store = seeded_store();
        let engine = engine_over(&store);
        assert_eq!(ids(&engine.search_by_author("ann").unwrap()), vec![1, 2]);
        assert_eq!(ids(&engine.search_by_author("ANN").unwrap()), vec![1, 2]);
    }

    #[test]
    fn repeated_query_is_served_from_cache() {
        let store = seeded_store();
        let engine = engine_over(&store);
        let first = engine.search_by_keyword("rust").unwrap();
        let second = engine.search_by_keyword("rust").unwrap();
        assert_eq!(first, second);

        let metrics = engine.performance_metrics();
        assert_eq!(metrics.keyword_cache_size, 1);
        // One miss populated the entry, one hit followed.
        assert!((metrics.cache_hit_rate - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn hybrid_search_merges_and_dedupes_across_indexes() {
        let store = seeded_store();
        let engine = engine_over(&store);
        // "rust" hits the keyword index (1, 3), the tag index (1, 3), and
        // the title substring scan (1); the union dedupes to {1, 3}.
        assert_eq!(ids(&engine.search_all("rust").unwrap()), vec![1, 3]);
        // Author-only match still surfaces through the union.
        assert_eq!(ids(&engine.search_all("bea").unwrap()), vec![3]);
        // Title substring nobody's hash index can serve.
        assert_eq!(ids(&engine.search_all("intro").unwrap()), vec![1, 2]);
        // No index knows the term: empty result, not an error.
        assert!(engine.search_all("zzzzz").unwrap().is_empty());
    }

    #[test]
    fn title_prefix_search_scans_in_order() {
        let store = seeded_store();
        let engine = engine_over(&store);
        assert_eq!(ids(&engine.search_by_title_prefix("Intro").unwrap()), vec![1, 2]);
        assert!(engine.search_by_title_prefix("zzz").unwrap().is_empty());
    }

    #[test]
    fn get_post_uses_direct_index() {
        let store = seeded_store();
        let engine = engine_over(&store);
        assert_eq!(engine.get_post(PostId(2)).unwrap().unwrap().title, "Intro to Go");
        assert!(engine.get_post(PostId(99)).unwrap().is_none());
    }

    #[test]
    fn first_query_builds_generation_one() {
        let store = seeded_store();
        let engine = engine_over(&store);
        assert_eq!(engine.generation(), 0);
        engine.search_by_keyword("rust").unwrap();
        assert_eq!(engine.generation(), 1);
        // Further queries reuse the installed set.
        engine.search_by_author("ann").unwrap();
        assert_eq!(engine.generation(), 1);
    }

    #[test]
    fn invalidation_clears_caches_and_forces_rebuild() {
        let store = seeded_store();
        let engine = engine_over(&store);
        engine.search_by_keyword("rust").unwrap();
        engine.search_by_keyword("rust").unwrap();
        let before = engine.generation();

        engine.invalidate_cache();
        engine.reset_cache_stats();

        // First post-invalidation lookup must miss and must rebuild.
        assert_eq!(ids(&engine.search_by_keyword("rust").unwrap()), vec![1, 3]);
        assert_eq!(engine.generation(), before + 1);
        let metrics = engine.performance_metrics();
        assert_eq!(metrics.cache_hit_rate, 0.0);
    }

    #[test]
    fn rebuild_reflects_store_mutations() {
        let store = seeded_store();
        let engine = engine_over(&store);
        assert_eq!(ids(&engine.search_by_author("ann").unwrap()), vec![1, 2]);

        store.delete(PostId(2));
        engine.invalidate_cache();
        assert_eq!(ids(&engine.search_by_author("ann").unwrap()), vec![1]);
        assert!(engine.search_by_keyword("goroutines").unwrap().is_empty());

        store
            .create(
                PostRecord::new(4, "Rust Macros", "Ann").with_tags(["rust"]),
            )
            .unwrap();
        engine.invalidate_cache();
        assert_eq!(ids(&engine.search_by_keyword("rust").unwrap()), vec![1, 3, 4]);
    }

    #[test]
    fn targeted_invalidation_leaves_other_entries_intact() {
        let store = seeded_store();
        let engine = engine_over(&store);
        engine.search_by_keyword("rust").unwrap();
        engine.search_by_keyword("goroutines").unwrap();
        assert_eq!(engine.performance_metrics().keyword_cache_size, 2);

        assert!(engine.invalidate_keyword_cache("RUST"));
        assert!(!engine.invalidate_keyword_cache("rust"));
        assert_eq!(engine.performance_metrics().keyword_cache_size, 1);

        engine.search_by_author("ann").unwrap();
        assert!(engine.invalidate_author_cache("Ann"));
        engine.search_by_tag("go").unwrap();
        assert!(engine.invalidate_tag_cache("go"));
    }

    #[test]
    fn preload_warms_every_partition() {
        let store = seeded_store();
        let engine = engine_over(&store);
        let warmed = engine.preload_cache().unwrap();
        assert!(warmed > 0);

        let metrics = engine.performance_metrics();
        assert_eq!(metrics.author_cache_size, 2); // ann, bea
        assert_eq!(metrics.tag_cache_size, 4); // rust, beginners, go, databases
        assert!(metrics.keyword_cache_size > 0);

        engine.reset_cache_stats();
        engine.search_by_author("ann").unwrap();
        assert_eq!(engine.performance_metrics().cache_hit_rate, 1.0);
    }

    struct FailingProvider {
        fail: AtomicBool,
        inner: Arc<InMemoryPostStore>,
    }

    impl PostProvider for FailingProvider {
        fn fetch_all(&self) -> Result<Vec<PostRecord>> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(Error::snapshot("repository offline"));
            }
            self.inner.fetch_all()
        }
    }

    #[test]
    fn failed_rebuild_keeps_old_index_authoritative() {
        let provider = Arc::new(FailingProvider {
            fail: AtomicBool::new(false),
            inner: seeded_store(),
        });
        let engine = QueryEngine::new(
            provider.clone() as Arc<dyn PostProvider>,
            &EngineConfig::default(),
        );
        assert_eq!(ids(&engine.search_by_keyword("rust").unwrap()), vec![1, 3]);
        let generation = engine.generation();

        provider.fail.store(true, Ordering::SeqCst);
        engine.invalidate_cache();
        let err = engine.search_by_keyword("rust").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Snapshot);
        assert_eq!(engine.generation(), generation);

        // Collaborator recovers: the next query rebuilds and answers.
        provider.fail.store(false, Ordering::SeqCst);
        assert_eq!(ids(&engine.search_by_keyword("rust").unwrap()), vec![1, 3]);
        assert_eq!(engine.generation(), generation + 1);
    }

    #[test]
    fn concurrent_queries_share_one_rebuild() {
        let store = seeded_store();
        let engine = Arc::new(engine_over(&store));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let engine = Arc::clone(&engine);
                std::thread::spawn(move || engine.search_by_keyword("rust").unwrap())
            })
            .collect();
        for handle in handles {
            assert_eq!(ids(&handle.join().unwrap()), vec![1, 3]);
        }
        assert_eq!(engine.generation(), 1);
    }
}
