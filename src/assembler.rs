//! Result Assembler
//!
//! Turns a fan-out outcome into a listing page. Two policies exist:
//!
//! - page-first: the ID list is sliced before fetching; the page is
//!   returned in ID-list order with failed ids omitted, and `total` is the
//!   length of the full ID list.
//! - fetch-all: every listed entity is fetched, optionally filtered on
//!   `type`, sorted newest first by `time`, then sliced; `total` counts the
//!   filtered set and `unfiltered_total` the fetched set.

use std::collections::HashMap;

use crate::fetcher::OutcomeSet;
use crate::models::{Entity, ItemId, ListingResponse, PageRequest};

/// The ids that make up `page` of the listing.
pub fn page_ids<'a>(ids: &'a [ItemId], page: &PageRequest) -> &'a [ItemId] {
    &ids[page.window(ids.len())]
}

/// Reorders an outcome set to follow `ids`, omitting ids with no entity.
pub fn in_list_order(ids: &[ItemId], outcome: OutcomeSet) -> Vec<Entity> {
    let mut resolved: HashMap<ItemId, Entity> = outcome.into_iter().collect();
    ids.iter().filter_map(|id| resolved.remove(id)).collect()
}

/// Page-first assembly: `page_ids` were already sliced from a list of
/// `list_len` ids.
pub fn assemble_page(page_ids: &[ItemId], outcome: OutcomeSet, list_len: usize) -> ListingResponse {
    ListingResponse {
        items: in_list_order(page_ids, outcome),
        total: list_len,
        unfiltered_total: None,
    }
}

/// Fetch-all assembly over the complete ID list.
pub fn assemble_sorted(ids: &[ItemId], outcome: OutcomeSet, page: &PageRequest) -> ListingResponse {
    // List order first, so equal timestamps keep their listing position
    let fetched = in_list_order(ids, outcome);
    let unfiltered_total = fetched.len();

    let mut selected: Vec<Entity> = match page.kind() {
        Some(kind) => fetched
            .into_iter()
            .filter(|entity| entity.kind() == Some(kind))
            .collect(),
        None => fetched,
    };
    sort_newest_first(&mut selected);

    let total = selected.len();
    let items = selected.drain(page.window(total)).collect();

    ListingResponse {
        items,
        total,
        unfiltered_total: Some(unfiltered_total),
    }
}

/// Stable sort on `time` descending; missing times sort as 0.
pub fn sort_newest_first(entities: &mut [Entity]) {
    entities.sort_by(|a, b| b.sort_time().total_cmp(&a.sort_time()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::{json, Value};

    fn entity(value: Value) -> Entity {
        Entity::try_from(value).unwrap()
    }

    fn item(id: u64, kind: &str, time: u64) -> (ItemId, Entity) {
        (id, entity(json!({"id": id, "type": kind, "time": time})))
    }

    fn ids_of(items: &[Entity]) -> Vec<ItemId> {
        items.iter().filter_map(Entity::id).collect()
    }

    #[test]
    fn test_sorts_by_time_descending() {
        let mut entities = vec![
            entity(json!({"id": 1, "time": 5})),
            entity(json!({"id": 2, "time": 3})),
            entity(json!({"id": 3, "time": 9})),
        ];
        sort_newest_first(&mut entities);
        let times: Vec<f64> = entities.iter().map(Entity::sort_time).collect();
        assert_eq!(times, vec![9.0, 5.0, 3.0]);
    }

    #[test]
    fn test_missing_time_sorts_last() {
        let mut entities = vec![
            entity(json!({"id": 1})),
            entity(json!({"id": 2, "time": 1})),
            entity(json!({"id": 3, "time": "soon"})),
        ];
        sort_newest_first(&mut entities);
        assert_eq!(ids_of(&entities), vec![2, 1, 3]);
    }

    #[test]
    fn test_type_filter() {
        let ids = [1, 2, 3, 4];
        let outcome = vec![
            item(4, "job", 40),
            item(1, "story", 10),
            item(3, "story", 30),
            item(2, "job", 20),
        ];
        let page = PageRequest::new(1, 20, Some("story".to_string()));

        let listing = assemble_sorted(&ids, outcome, &page);

        assert_eq!(ids_of(&listing.items), vec![3, 1]);
        assert!(listing.items.iter().all(|e| e.kind() == Some("story")));
        assert_eq!(listing.total, 2);
        assert_eq!(listing.unfiltered_total, Some(4));
    }

    #[test]
    fn test_fetch_all_pagination() {
        let ids = [1, 2, 3, 4, 5];
        let outcome = (1..=5).map(|id| item(id, "story", id * 10)).collect();
        let page = PageRequest::new(2, 2, None);

        let listing = assemble_sorted(&ids, outcome, &page);

        // Sorted newest first: [5, 4, 3, 2, 1]; indices [2, 4)
        assert_eq!(ids_of(&listing.items), vec![3, 2]);
        assert_eq!(listing.total, 5);
    }

    #[test]
    fn test_fetch_all_ties_keep_list_order() {
        let ids = [7, 3, 9];
        let outcome = vec![item(9, "story", 1), item(3, "story", 1), item(7, "story", 1)];

        let listing = assemble_sorted(&ids, outcome, &PageRequest::default());
        assert_eq!(ids_of(&listing.items), vec![7, 3, 9]);
    }

    #[test]
    fn test_fetch_all_page_out_of_range() {
        let ids = [1, 2];
        let outcome = vec![item(1, "story", 1), item(2, "story", 2)];

        let listing = assemble_sorted(&ids, outcome, &PageRequest::new(5, 10, None));
        assert!(listing.items.is_empty());
        assert_eq!(listing.total, 2);
    }

    #[test]
    fn test_page_first_reorders_and_omits_failures() {
        let page_ids = [7, 3, 9];
        // id 3 failed; outcome arrives in completion order
        let outcome = vec![item(9, "story", 1), item(7, "story", 2)];

        let listing = assemble_page(&page_ids, outcome, 30);

        assert_eq!(ids_of(&listing.items), vec![7, 9]);
        assert_eq!(listing.total, 30);
        assert_eq!(listing.unfiltered_total, None);
    }

    #[test]
    fn test_page_ids_window() {
        let ids = [1, 2, 3, 4, 5];
        assert_eq!(page_ids(&ids, &PageRequest::new(2, 2, None)), &[3, 4]);
        assert_eq!(page_ids(&ids, &PageRequest::new(3, 2, None)), &[5]);
        assert!(page_ids(&ids, &PageRequest::new(4, 2, None)).is_empty());
    }

    proptest! {
        // Slicing never exceeds `limit` and never leaves [0, total).
        #[test]
        fn prop_window_in_bounds(page in -5i64..50, limit in -5i64..150, total in 0usize..500) {
            let req = PageRequest::new(page, limit, None);
            let window = req.window(total);
            prop_assert!(window.len() <= req.limit());
            prop_assert!(window.start <= window.end);
            prop_assert!(window.end <= total);
            if req.offset() >= total {
                prop_assert!(window.is_empty());
            }
        }

        // Clamp law: page < 1 -> 1, limit outside [1, 100] -> 20.
        #[test]
        fn prop_clamp_law(page in any::<i64>(), limit in any::<i64>()) {
            let req = PageRequest::new(page, limit, None);
            let expected_page = if page < 1 { 1 } else { page as usize };
            let expected_limit = if (1..=100).contains(&limit) { limit as usize } else { 20 };
            prop_assert_eq!(req.page(), expected_page);
            prop_assert_eq!(req.limit(), expected_limit);
        }

        // Page-first keeps list order and never invents entities.
        #[test]
        fn prop_page_first_preserves_order(
            len in 0usize..60,
            failed in prop::collection::hash_set(0u64..60, 0..20),
            page in 1i64..8,
            limit in 1i64..20,
        ) {
            let ids: Vec<ItemId> = (0..len as u64).collect();
            let req = PageRequest::new(page, limit, None);
            let slice = page_ids(&ids, &req);
            let outcome: OutcomeSet = slice
                .iter()
                .rev()
                .filter(|id| !failed.contains(*id))
                .map(|&id| item(id, "story", id))
                .collect();

            let listing = assemble_page(slice, outcome, ids.len());
            let expected: Vec<ItemId> =
                slice.iter().copied().filter(|id| !failed.contains(id)).collect();
            prop_assert_eq!(ids_of(&listing.items), expected);
            prop_assert_eq!(listing.total, len);
        }
    }
}
