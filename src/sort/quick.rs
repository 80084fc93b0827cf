use serde::{Serialize, Deserialize};
use std::cmp::Ordering;
use crate::core::types::PostRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    Title,
    Views,
    CreatedAt,
    Author,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// In-place quicksort over a result list. Direction inverts the primary
/// comparison only; the id-ascending tie-break is applied afterwards in both
/// directions, so equal-key elements keep one reproducible order no matter
/// the input ordering or pivot choice. Empty and single-element slices
/// return immediately.
pub fn sort_posts(posts: &mut [PostRecord], key: SortKey, direction: SortDirection) {
    if posts.len() < 2 {
        return;
    }
    quicksort(posts, key, direction);
}

fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

fn compare(a: &PostRecord, b: &PostRecord, key: SortKey, direction: SortDirection) -> Ordering {
    let primary = match key {
        SortKey::Title => cmp_ignore_case(&a.title, &b.title),
        SortKey::Views => a.views.cmp(&b.views),
        SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
        SortKey::Author => cmp_ignore_case(&a.author, &b.author),
    };
    let primary = match direction {
        SortDirection::Ascending => primary,
        SortDirection::Descending => primary.reverse(),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

fn quicksort(posts: &mut [PostRecord], key: SortKey, direction: SortDirection) {
    if posts.len() < 2 {
        return;
    }
    let pivot = partition(posts, key, direction);
    let (left, right) = posts.split_at_mut(pivot);
    quicksort(left, key, direction);
    quicksort(&mut right[1..], key, direction);
}

/// Lomuto partition around a median-of-three pivot. The median step keeps
/// already-sorted input away from the quadratic worst case.
fn partition(posts: &mut [PostRecord], key: SortKey, direction: SortDirection) -> usize {
    let hi = posts.len() - 1;
    let mid = hi / 2;

    if compare(&posts[mid], &posts[0], key, direction).is_lt() {
        posts.swap(mid, 0);
    }
    if compare(&posts[hi], &posts[0], key, direction).is_lt() {
        posts.swap(hi, 0);
    }
    if compare(&posts[hi], &posts[mid], key, direction).is_lt() {
        posts.swap(hi, mid);
    }
    // Median now sits at mid; park it at the end as the pivot.
    posts.swap(mid, hi);

    let mut store = 0;
    for i in 0..hi {
        if compare(&posts[i], &posts[hi], key, direction).is_lt() {
            posts.swap(i, store);
            store += 1;
        }
    }
    posts.swap(store, hi);
    store
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::PostRecord;
    use chrono::{TimeZone, Utc};

    fn posts() -> Vec<PostRecord> {
        vec![
            PostRecord::new(1, "Intro to Rust", "Ann")
                .with_views(10)
                .with_created_at(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()),
            PostRecord::new(2, "Intro to Go", "ann")
                .with_views(20)
                .with_created_at(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            PostRecord::new(3, "zig Notes", "Bea")
                .with_views(10)
                .with_created_at(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()),
        ]
    }

    fn ids(posts: &[PostRecord]) -> Vec<u64> {
        posts.iter().map(|post| post.id.value()).collect()
    }

    #[test]
    fn sorts_by_views_descending() {
        let mut list = posts();
        sort_posts(&mut list, SortKey::Views, SortDirection::Descending);
        // Views 20, then the two 10-view posts tie-broken by id ascending.
        assert_eq!(ids(&list), vec![2, 1, 3]);
    }

    #[test]
    fn sorts_by_title_case_insensitively() {
        let mut list = posts();
        sort_posts(&mut list, SortKey::Title, SortDirection::Ascending);
        assert_eq!(ids(&list), vec![2, 1, 3]);
        sort_posts(&mut list, SortKey::Title, SortDirection::Descending);
        assert_eq!(ids(&list), vec![3, 1, 2]);
    }

    #[test]
    fn sorts_by_creation_date() {
        let mut list = posts();
        sort_posts(&mut list, SortKey::CreatedAt, SortDirection::Ascending);
        assert_eq!(ids(&list), vec![2, 3, 1]);
    }

    #[test]
    fn author_ties_break_by_id_in_both_directions() {
        let mut list = posts();
        sort_posts(&mut list, SortKey::Author, SortDirection::Ascending);
        assert_eq!(ids(&list), vec![1, 2, 3]);

        // Descending reverses the author order but "Ann"/"ann" still
        // tie-break id-ascending.
        sort_posts(&mut list, SortKey::Author, SortDirection::Descending);
        assert_eq!(ids(&list), vec![3, 1, 2]);
    }

    #[test]
    fn sorting_is_idempotent() {
        let mut first = posts();
        sort_posts(&mut first, SortKey::Views, SortDirection::Ascending);
        let mut second = first.clone();
        sort_posts(&mut second, SortKey::Views, SortDirection::Ascending);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_and_single_are_no_ops() {
        let mut empty: Vec<PostRecord> = vec![];
        sort_posts(&mut empty, SortKey::Title, SortDirection::Ascending);
        assert!(empty.is_empty());

        let mut single = vec![PostRecord::new(1, "Only", "ann")];
        sort_posts(&mut single, SortKey::Title, SortDirection::Descending);
        assert_eq!(ids(&single), vec![1]);
    }

    #[test]
    fn already_sorted_input_stays_sorted() {
        let mut list: Vec<PostRecord> = (1..=64)
            .map(|i| PostRecord::new(i, &format!("Post {i:03}"), "ann").with_views(i))
            .collect();
        sort_posts(&mut list, SortKey::Views, SortDirection::Ascending);
        let expected: Vec<u64> = (1..=64).collect();
        assert_eq!(ids(&list), expected);
        // A second pass over sorted input must not degrade or reorder.
        sort_posts(&mut list, SortKey::Views, SortDirection::Ascending);
        assert_eq!(ids(&list), expected);
    }

    #[test]
    fn result_order_is_independent_of_input_order() {
        let mut forward = posts();
        let mut backward = posts();
        backward.reverse();
        sort_posts(&mut forward, SortKey::Views, SortDirection::Descending);
        sort_posts(&mut backward, SortKey::Views, SortDirection::Descending);
        assert_eq!(ids(&forward), ids(&backward));
    }
}
