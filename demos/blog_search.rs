use blogdex::core::engine::SearchEngine;
use blogdex::core::types::{PostId, PostRecord};
use blogdex::query::provider::{InMemoryPostStore, PostProvider};
use blogdex::sort::quick::{SortDirection, SortKey};
use std::sync::Arc;

fn main() {
    let store = Arc::new(InMemoryPostStore::with_posts([
        PostRecord::new(1, "Intro to Rust", "Ann")
            .with_content("Ownership, borrowing, and lifetimes from scratch.")
            .with_tags(["rust", "beginners"])
            .with_views(120),
        PostRecord::new(2, "Intro to Go", "Ann")
            .with_content("Goroutines and channels for the impatient.")
            .with_tags(["go"])
            .with_views(300),
        PostRecord::new(3, "Database Internals", "Bea")
            .with_content("B-trees, pages, and write-ahead logging in Rust.")
            .with_tags(["databases", "rust"])
            .with_views(210),
    ]));

    let engine = SearchEngine::new(store.clone() as Arc<dyn PostProvider>);

    println!("== keyword: rust ==");
    for post in engine.search_by_keyword("rust").unwrap() {
        println!("  #{} {} ({} views)", post.id.value(), post.title, post.views);
    }

    println!("== author: ann (case-insensitive) ==");
    let mut by_ann = engine.search_by_author("ANN").unwrap();
    engine.sort(&mut by_ann, SortKey::Views, SortDirection::Descending);
    for post in &by_ann {
        println!("  #{} {} ({} views)", post.id.value(), post.title, post.views);
    }

    println!("== hybrid: intro ==");
    for post in engine.search_all("intro").unwrap() {
        println!("  #{} {}", post.id.value(), post.title);
    }

    // Mutation goes through the store; the signal keeps the engine honest.
    store.delete(PostId(2));
    engine.on_post_deleted();
    println!("== after delete, author: ann ==");
    for post in engine.search_by_author("ann").unwrap() {
        println!("  #{} {}", post.id.value(), post.title);
    }

    // Validation errors carry a machine-readable code and field.
    let err = engine.search_by_keyword("   ").unwrap_err();
    println!("== validation ==\n  {err}");

    println!("== metrics ==");
    println!("{}", serde_json::to_string_pretty(&engine.metrics()).unwrap());
}
