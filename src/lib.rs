pub mod core;
pub mod analysis;
pub mod cache;
pub mod index;
pub mod query;
pub mod sort;

/*
┌────────────────────────────────────────────────────────────────────────────┐
│                         BLOGDEX STRUCT ARCHITECTURE                         │
└────────────────────────────────────────────────────────────────────────────┘

┌────────────────────────────────── CORE LAYER ──────────────────────────────┐
│                                                                             │
│  ┌──────────────────────────────────────────────────────────────────────┐ │
│  │                        struct SearchEngine                            │ │
│  │  ┌────────────────────────────────────────────────────────────────┐ │ │
│  │  │ query: QueryEngine            // indexes + cache partitions    │ │ │
│  │  │ on_post_created/updated/deleted() // mutation signals          │ │ │
│  │  │ sort() / metrics() / preload_cache() / cleanup_expired()       │ │ │
│  │  └────────────────────────────────────────────────────────────────┘ │ │
│  └──────────────────────────────────────────────────────────────────────┘ │
│                                                                             │
│  ┌──────────────────┐  ┌───────────────────┐  ┌──────────────────────────┐│
│  │ struct PostId    │  │ struct PostRecord │  │ struct PerformanceMetrics││
│  │ • 0: u64         │  │ • id, title       │  │ • cache_hit_rate         ││
│  └──────────────────┘  │ • content, author │  │ • per-partition sizes    ││
│                        │ • tags, views     │  │ • index_generation       ││
│  ┌──────────────────┐  │ • created_at      │  │ • indexed_posts          ││
│  │ struct Error     │  └───────────────────┘  └──────────────────────────┘│
│  │ • kind, context  │                                                      │
│  └──────────────────┘                                                      │
└─────────────────────────────────────────────────────────────────────────────┘

┌───────────────────────────────── QUERY LAYER ──────────────────────────────┐
│                                                                             │
│  ┌──────────────────────────────────────────────────────────────────────┐ │
│  │                        struct QueryEngine                             │ │
│  │  ┌────────────────────────────────────────────────────────────────┐ │ │
│  │  │ provider: Arc<dyn PostProvider>  // snapshot collaborator      │ │ │
│  │  │ indexes: RwLock<Arc<IndexSet>>   // atomic swap on rebuild     │ │ │
│  │  │ stale: AtomicBool                // set by invalidation        │ │ │
│  │  │ generation: AtomicU64            // bumps once per rebuild     │ │ │
│  │  │ keyword/author/tag/hybrid_cache: BoundedCache<String, ids>     │ │ │
│  │  └────────────────────────────────────────────────────────────────┘ │ │
│  └──────────────────────────────────────────────────────────────────────┘ │
└─────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────── INDEXING LAYER ────────────────────────────┐
│                                                                             │
│  ┌──────────────────────────────────────────────────────────────────────┐ │
│  │                          struct IndexSet                              │ │
│  │  ┌────────────────────────────────────────────────────────────────┐ │ │
│  │  │ direct:  HashMap<PostId, PostRecord>   // authoritative ids    │ │ │
│  │  │ keyword: HashMap<token, BTreeSet<PostId>> // inverted index    │ │ │
│  │  │ author:  HashMap<name,  BTreeSet<PostId>> // hash index        │ │ │
│  │  │ tag:     HashMap<tag,   BTreeSet<PostId>> // hash index        │ │ │
│  │  │ title:   BTreeMap<title, BTreeSet<PostId>> // range/prefix     │ │ │
│  │  └────────────────────────────────────────────────────────────────┘ │ │
│  └──────────────────────────────────────────────────────────────────────┘ │
│                                                                             │
│  ┌─────────────────────┐  ┌──────────────────────────────────────────────┐│
│  │ trait Tokenizer     │  │ struct StandardTokenizer                     ││
│  │ • tokenize()        │  │ • lowercase unicode words, length-capped     ││
│  └─────────────────────┘  └──────────────────────────────────────────────┘│
└─────────────────────────────────────────────────────────────────────────────┘

┌───────────────────────────────── CACHE LAYER ──────────────────────────────┐
│                                                                             │
│  ┌──────────────────────────────────────────────────────────────────────┐ │
│  │                     struct BoundedCache<K, V>                         │ │
│  │  ┌────────────────────────────────────────────────────────────────┐ │ │
│  │  │ entries: Mutex<LruCache<K, CacheEntry<V>>> // LRU + TTL        │ │ │
│  │  │ hits/misses/puts/removals/evictions: AtomicU64                 │ │ │
│  │  └────────────────────────────────────────────────────────────────┘ │ │
│  └──────────────────────────────────────────────────────────────────────┘ │
│                                                                             │
│  ┌──────────────────────┐  ┌──────────────────────────────────────────────┐│
│  │ struct CacheStats    │  │ struct CacheEntry<V>                         ││
│  │ • counters, hit_rate │  │ • value, expires_at: Option<Instant>         ││
│  └──────────────────────┘  └──────────────────────────────────────────────┘│
└─────────────────────────────────────────────────────────────────────────────┘

┌───────────────────────────────── SORT LAYER ───────────────────────────────┐
│                                                                             │
│  ┌──────────────────────┐  ┌──────────────────────────────────────────────┐│
│  │ enum SortKey         │  │ fn sort_posts(&mut [PostRecord], key, dir)   ││
│  │ • Title/Views/       │  │ • in-place quicksort, median-of-three        ││
│  │   CreatedAt/Author   │  │ • direction inverts primary cmp only         ││
│  │ enum SortDirection   │  │ • tie-break: id ascending, both directions   ││
│  └──────────────────────┘  └──────────────────────────────────────────────┘│
└─────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────── RELATIONSHIPS ─────────────────────────────┐
│                                                                             │
│  SearchEngine ──owns──> QueryEngine ──reads──> Arc<IndexSet>               │
│       │                     │                                               │
│       │                     ├──consults──> BoundedCache (per partition)    │
│       │                     │                                               │
│       │                     └──fetches──> PostProvider ──snapshot──>       │
│       │                                        Vec<PostRecord>             │
│       │                                                                     │
│       └──signals──> invalidate_cache ──marks──> stale index, cleared cache │
│                                                                             │
│  IndexSet::build ──tokenizes_with──> StandardTokenizer (rayon fan-out)     │
│                                                                             │
│  sort_posts ──orders──> query results (deterministic id tie-break)         │
│                                                                             │
└─────────────────────────────────────────────────────────────────────────────┘
*/
