//! Main feed ranking
//!
//! Ranks a pre-fetched candidate window into one feed page:
//! - Priority tier per candidate: 3 = friend author with a shared interest
//!   tag, 2 = friend author only, 1 = shared tag only, 0 = neither
//! - Total order: (priority desc, created_at desc, id asc)
//! - Lookahead pagination: a window larger than the page size yields the
//!   first excluded post's id as the next cursor
//!
//! This is a pure transformation over already-fetched data. It performs no
//! queries, holds no state, and is deterministic: identical inputs always
//! produce the identical page, cursor included. The candidate vector is
//! consumed (sorted in place).

use crate::models::{CandidatePost, FeedPage, RankedPost};
use std::collections::HashSet;
use tracing::debug;
use uuid::Uuid;

/// Priority tier for one candidate given the two membership predicates
pub fn priority_tier(is_friend: bool, has_shared_tag: bool) -> u8 {
    match (is_friend, has_shared_tag) {
        (true, true) => 3,
        (true, false) => 2,
        (false, true) => 1,
        (false, false) => 0,
    }
}

fn priority_for(
    post: &CandidatePost,
    friend_ids: &HashSet<Uuid>,
    interest_tag_ids: &HashSet<Uuid>,
) -> u8 {
    let is_friend = friend_ids.contains(&post.author_id);
    let has_shared_tag = post.tags.iter().any(|tag| interest_tag_ids.contains(&tag.id));
    priority_tier(is_friend, has_shared_tag)
}

/// Rank one candidate window into a feed page.
///
/// `candidates` must already exclude posts authored by `user_id` (the store
/// filter owns that); a zero-priority candidate is still ranked, last, never
/// dropped. `limit` is taken as given, the caller owns defaulting and
/// clamping.
///
/// # Arguments
/// * `friend_ids` - accepted-friendship counterparties of the requesting user
/// * `interest_tag_ids` - interest tags on the requesting user's profile
/// * `candidates` - candidate window, at most one entry larger than `limit`
/// * `limit` - page size
///
/// # Returns
/// The ranked page plus the id of the first excluded post, when one exists
pub fn compute_feed(
    user_id: Uuid,
    friend_ids: &HashSet<Uuid>,
    interest_tag_ids: &HashSet<Uuid>,
    candidates: Vec<CandidatePost>,
    limit: usize,
) -> FeedPage {
    let mut scored: Vec<(u8, CandidatePost)> = candidates
        .into_iter()
        .map(|post| (priority_for(&post, friend_ids, interest_tag_ids), post))
        .collect();

    scored.sort_by(|a, b| {
        b.0.cmp(&a.0)
            .then_with(|| b.1.created_at.cmp(&a.1.created_at))
            .then_with(|| a.1.id.cmp(&b.1.id))
    });

    let next_cursor = if scored.len() > limit {
        Some(scored[limit].1.id)
    } else {
        None
    };
    scored.truncate(limit);

    debug!(
        %user_id,
        returned = scored.len(),
        has_more = next_cursor.is_some(),
        "feed page ranked"
    );

    FeedPage {
        posts: scored
            .into_iter()
            .map(|(priority, post)| RankedPost {
                priority,
                post: post.into(),
            })
            .collect(),
        next_cursor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TagRef;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn uid(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn make_post(id: Uuid, author: Uuid, tag_ids: &[Uuid], age_minutes: i64) -> CandidatePost {
        CandidatePost {
            id,
            author_id: author,
            username: "poster".to_string(),
            avatar_url: None,
            content: "hello".to_string(),
            created_at: base_time() - Duration::minutes(age_minutes),
            media: vec![],
            tags: tag_ids
                .iter()
                .map(|t| TagRef {
                    id: *t,
                    name: format!("tag-{}", t),
                })
                .collect(),
            like_count: 0,
            comment_count: 0,
        }
    }

    fn page_ids(page: &FeedPage) -> Vec<Uuid> {
        page.posts.iter().map(|p| p.post.post_id).collect()
    }

    #[test]
    fn priority_tier_matrix() {
        assert_eq!(priority_tier(true, true), 3);
        assert_eq!(priority_tier(true, false), 2);
        assert_eq!(priority_tier(false, true), 1);
        assert_eq!(priority_tier(false, false), 0);
    }

    #[test]
    fn friend_with_shared_tag_outranks_everything() {
        let me = uid(1);
        let friend = uid(2);
        let stranger = uid(3);
        let tag = uid(100);
        let friends: HashSet<Uuid> = [friend].into();
        let interests: HashSet<Uuid> = [tag].into();

        // The highest-tier post is deliberately the oldest
        let candidates = vec![
            make_post(uid(10), stranger, &[tag], 1),
            make_post(uid(11), friend, &[], 2),
            make_post(uid(12), friend, &[tag], 3),
        ];

        let page = compute_feed(me, &friends, &interests, candidates, 10);

        assert_eq!(page_ids(&page), vec![uid(12), uid(11), uid(10)]);
        assert_eq!(
            page.posts.iter().map(|p| p.priority).collect::<Vec<_>>(),
            vec![3, 2, 1]
        );
        assert_eq!(page.next_cursor, None);
    }

    #[test]
    fn mixed_tiers_with_lookahead_drop_the_lowest() {
        let me = uid(1);
        let a = uid(2);
        let b = uid(3);
        let tag1 = uid(100);
        let friends: HashSet<Uuid> = [a].into();
        let interests: HashSet<Uuid> = [tag1].into();

        let p1 = make_post(uid(10), a, &[tag1], 4);
        let p2 = make_post(uid(11), a, &[], 3);
        let p3 = make_post(uid(12), b, &[tag1], 2);
        let p4 = make_post(uid(13), b, &[], 1);

        let page = compute_feed(
            me,
            &friends,
            &interests,
            vec![p1.clone(), p2.clone(), p3.clone(), p4.clone()],
            3,
        );

        assert_eq!(page_ids(&page), vec![p1.id, p2.id, p3.id]);
        assert_eq!(
            page.posts.iter().map(|p| p.priority).collect::<Vec<_>>(),
            vec![3, 2, 1]
        );
        assert_eq!(page.next_cursor, Some(p4.id));
    }

    #[test]
    fn recency_orders_within_a_tier() {
        let me = uid(1);
        let friend = uid(2);
        let friends: HashSet<Uuid> = [friend].into();
        let interests: HashSet<Uuid> = HashSet::new();

        let candidates = vec![
            make_post(uid(10), friend, &[], 30),
            make_post(uid(11), friend, &[], 10),
            make_post(uid(12), friend, &[], 20),
        ];

        let page = compute_feed(me, &friends, &interests, candidates, 10);

        assert_eq!(page_ids(&page), vec![uid(11), uid(12), uid(10)]);
    }

    #[test]
    fn equal_timestamps_tie_break_on_id_ascending() {
        let me = uid(1);
        let friend = uid(2);
        let friends: HashSet<Uuid> = [friend].into();
        let interests: HashSet<Uuid> = HashSet::new();

        // Same tier, same created_at; insertion order scrambled
        let candidates = vec![
            make_post(uid(12), friend, &[], 5),
            make_post(uid(10), friend, &[], 5),
            make_post(uid(11), friend, &[], 5),
        ];

        let page = compute_feed(me, &friends, &interests, candidates, 10);

        assert_eq!(page_ids(&page), vec![uid(10), uid(11), uid(12)]);
    }

    #[test]
    fn empty_relations_collapse_to_pure_recency() {
        let me = uid(1);
        let friends = HashSet::new();
        let interests = HashSet::new();

        let candidates = vec![
            make_post(uid(10), uid(2), &[uid(100)], 20),
            make_post(uid(11), uid(3), &[], 10),
        ];

        let page = compute_feed(me, &friends, &interests, candidates, 10);

        assert_eq!(page_ids(&page), vec![uid(11), uid(10)]);
        assert!(page.posts.iter().all(|p| p.priority == 0));
    }

    #[test]
    fn zero_priority_candidates_sort_last_but_are_kept() {
        let me = uid(1);
        let friend = uid(2);
        let friends: HashSet<Uuid> = [friend].into();
        let interests: HashSet<Uuid> = HashSet::new();

        // A loosened upstream filter may hand over a post matching neither
        // predicate; it ranks last, it is not dropped.
        let candidates = vec![
            make_post(uid(10), uid(3), &[], 1),
            make_post(uid(11), friend, &[], 2),
        ];

        let page = compute_feed(me, &friends, &interests, candidates, 10);

        assert_eq!(page_ids(&page), vec![uid(11), uid(10)]);
        assert_eq!(page.posts[1].priority, 0);
    }

    #[test]
    fn empty_candidates_yield_empty_page_without_cursor() {
        let page = compute_feed(uid(1), &HashSet::new(), &HashSet::new(), vec![], 10);
        assert!(page.posts.is_empty());
        assert_eq!(page.next_cursor, None);
    }

    #[test]
    fn window_equal_to_limit_has_no_cursor() {
        let me = uid(1);
        let friends: HashSet<Uuid> = [uid(2)].into();
        let candidates = vec![
            make_post(uid(10), uid(2), &[], 1),
            make_post(uid(11), uid(2), &[], 2),
        ];

        let page = compute_feed(me, &friends, &HashSet::new(), candidates, 2);

        assert_eq!(page.posts.len(), 2);
        assert_eq!(page.next_cursor, None);
    }

    #[test]
    fn oversized_window_drops_lowest_ranked_and_exposes_it_as_cursor() {
        let me = uid(1);
        let friend = uid(2);
        let friends: HashSet<Uuid> = [friend].into();
        let interests: HashSet<Uuid> = [uid(100)].into();

        // Lowest-ranked is the tag-only post even though it is the newest
        let candidates = vec![
            make_post(uid(10), friend, &[uid(100)], 3),
            make_post(uid(11), friend, &[], 2),
            make_post(uid(12), uid(3), &[uid(100)], 1),
        ];

        let page = compute_feed(me, &friends, &interests, candidates, 2);

        assert_eq!(page_ids(&page), vec![uid(10), uid(11)]);
        assert_eq!(page.next_cursor, Some(uid(12)));
    }

    #[test]
    fn identical_inputs_produce_identical_pages() {
        let me = uid(1);
        let friends: HashSet<Uuid> = [uid(2)].into();
        let interests: HashSet<Uuid> = [uid(100)].into();
        let candidates = vec![
            make_post(uid(10), uid(2), &[uid(100)], 1),
            make_post(uid(11), uid(3), &[uid(100)], 2),
            make_post(uid(12), uid(2), &[], 3),
        ];

        let first = compute_feed(me, &friends, &interests, candidates.clone(), 2);
        let second = compute_feed(me, &friends, &interests, candidates, 2);

        assert_eq!(first, second);
    }
}
