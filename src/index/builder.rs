use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use crate::analysis::tokenizer::{Tokenizer, normalize};
use crate::core::types::{PostId, PostRecord};

/// Immutable index bundle over one post snapshot.
///
/// Rebuilt wholesale and swapped behind an `Arc`, so readers always observe
/// a fully-built set. Id sets are `BTreeSet`s: membership dedup plus the
/// ascending id order the query layer returns.
pub struct IndexSet {
    /// id -> record, the authoritative membership for this snapshot
    direct: HashMap<PostId, PostRecord>,
    /// normalized token -> ids of posts whose title or content contains it
    keyword: HashMap<String, BTreeSet<PostId>>,
    /// normalized author name -> ids
    author: HashMap<String, BTreeSet<PostId>>,
    /// normalized tag -> ids
    tag: HashMap<String, BTreeSet<PostId>>,
    /// lowercase title -> ids, ordered for range and prefix traversal;
    /// duplicate titles resolve by id order inside the set
    title: BTreeMap<String, BTreeSet<PostId>>,
}

impl IndexSet {
    pub fn empty() -> Self {
        IndexSet {
            direct: HashMap::new(),
            keyword: HashMap::new(),
            author: HashMap::new(),
            tag: HashMap::new(),
            title: BTreeMap::new(),
        }
    }

    /// Deterministic pure function of the snapshot: identical input yields
    /// identical key -> id-set contents. Tokenization fans out per post,
    /// the merge into shared maps is sequential.
    pub fn build(posts: &[PostRecord], tokenizer: &dyn Tokenizer) -> Self {
        let tokenized: Vec<(PostId, BTreeSet<String>)> = posts
            .par_iter()
            .map(|post| {
                let mut tokens: BTreeSet<String> =
                    tokenizer.tokenize(&post.title).into_iter().collect();
                tokens.extend(tokenizer.tokenize(&post.content));
                (post.id, tokens)
            })
            .collect();

        let mut index = IndexSet::empty();
        for (post, (id, tokens)) in posts.iter().zip(tokenized) {
            debug_assert_eq!(post.id, id);

            for token in tokens {
                index.keyword.entry(token).or_default().insert(post.id);
            }

            let author = normalize(&post.author);
            if !author.is_empty() {
                index.author.entry(author).or_default().insert(post.id);
            }

            for tag in &post.tags {
                let tag = normalize(tag);
                if !tag.is_empty() {
                    index.tag.entry(tag).or_default().insert(post.id);
                }
            }

            index
                .title
                .entry(post.title.to_lowercase())
                .or_default()
                .insert(post.id);

            index.direct.insert(post.id, post.clone());
        }

        debug_assert!(index.ids_are_consistent());
        index
    }

    /// Every id referenced by a secondary index must resolve through the
    /// direct index, and the title index (which covers every post) must
    /// account for the whole direct key set.
    fn ids_are_consistent(&self) -> bool {
        let direct_ids: BTreeSet<PostId> = self.direct.keys().copied().collect();
        let mut referenced: BTreeSet<PostId> = BTreeSet::new();
        for ids in self.keyword.values() {
            referenced.extend(ids);
        }
        for ids in self.author.values() {
            referenced.extend(ids);
        }
        for ids in self.tag.values() {
            referenced.extend(ids);
        }
        let mut titled: BTreeSet<PostId> = BTreeSet::new();
        for ids in self.title.values() {
            titled.extend(ids);
        }
        referenced.is_subset(&direct_ids) && titled == direct_ids
    }

    pub fn post_count(&self) -> usize {
        self.direct.len()
    }

    pub fn is_empty(&self) -> bool {
        self.direct.is_empty()
    }

    pub fn get(&self, id: PostId) -> Option<&PostRecord> {
        self.direct.get(&id)
    }

    pub fn posts_with_token(&self, token: &str) -> Option<&BTreeSet<PostId>> {
        self.keyword.get(token)
    }

    pub fn posts_by_author(&self, author: &str) -> Option<&BTreeSet<PostId>> {
        self.author.get(author)
    }

    pub fn posts_by_tag(&self, tag: &str) -> Option<&BTreeSet<PostId>> {
        self.tag.get(tag)
    }

    /// Ordered scan of titles starting with `prefix` (lowercase key space).
    pub fn titles_with_prefix(&self, prefix: &str) -> BTreeSet<PostId> {
        let mut ids = BTreeSet::new();
        for (_, title_ids) in self
            .title
            .range(prefix.to_string()..)
            .take_while(|(title, _)| title.starts_with(prefix))
        {
            ids.extend(title_ids);
        }
        ids
    }

    /// Substring scan over the ordered title index. Serves the partial
    /// matches the exact hash indexes cannot.
    pub fn titles_containing(&self, needle: &str) -> BTreeSet<PostId> {
        let mut ids = BTreeSet::new();
        for (title, title_ids) in &self.title {
            if title.contains(needle) {
                ids.extend(title_ids);
            }
        }
        ids
    }

    pub fn keyword_tokens(&self) -> impl Iterator<Item = &str> {
        self.keyword.keys().map(String::as_str)
    }

    pub fn author_keys(&self) -> impl Iterator<Item = &str> {
        self.author.keys().map(String::as_str)
    }

    pub fn tag_keys(&self) -> impl Iterator<Item = &str> {
        self.tag.keys().map(String::as_str)
    }
}
