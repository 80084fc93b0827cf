use serde::{Serialize, Deserialize};

/// Aggregate engine metrics. A closed set of named fields rather than an
/// open-ended map; callers that want the raw counters go through
/// `CacheStats` on the individual partitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// hits / (hits + misses) across every cache partition, 0.0 before the
    /// first request
    pub cache_hit_rate: f64,
    pub keyword_cache_size: usize,
    pub author_cache_size: usize,
    pub tag_cache_size: usize,
    pub hybrid_cache_size: usize,
    /// Monotonic rebuild counter; 0 until the first successful build.
    pub index_generation: u64,
    pub indexed_posts: usize,
}
