use std::time::Duration;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Max live entries per cache partition.
    pub cache_capacity: usize,
    /// Default time-to-live for cached query results. Zero disables expiry.
    pub cache_ttl: Duration,
    /// How many keyword tokens (dictionary order) preload_cache warms.
    pub preload_keyword_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            cache_capacity: 1000,
            cache_ttl: Duration::from_secs(5 * 60),
            preload_keyword_limit: 64,
        }
    }
}
