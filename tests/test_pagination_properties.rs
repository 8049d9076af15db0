//! Property tests for page slicing and clamping.

use airdrop_hunter::pagination::paginate;
use proptest::prelude::*;
use std::num::NonZeroUsize;

fn page_size() -> impl Strategy<Value = NonZeroUsize> {
    (1usize..=20).prop_map(|n| NonZeroUsize::new(n).expect("strategy yields non-zero"))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn page_is_always_in_range(len in 0usize..200, requested in any::<i64>(), size in page_size()) {
        let items: Vec<usize> = (0..len).collect();
        let (slice, info) = paginate(&items, requested, size);

        prop_assert_eq!(info.total_items, len);
        prop_assert_eq!(info.total_pages, len.div_ceil(size.get()));
        prop_assert!(info.current_page >= 1);
        prop_assert!(info.current_page <= info.total_pages.max(1));
        prop_assert!(slice.len() <= size.get());
        prop_assert_eq!(info.has_prev, info.current_page > 1);
        prop_assert_eq!(info.has_next, info.current_page < info.total_pages);
        prop_assert_eq!(info.prev_page.is_some(), info.has_prev);
        prop_assert_eq!(info.next_page.is_some(), info.has_next);
    }

    #[test]
    fn pages_partition_the_items(len in 0usize..200, size in page_size()) {
        let items: Vec<usize> = (0..len).collect();
        let (_, first) = paginate(&items, 1, size);

        let mut seen = Vec::with_capacity(len);
        for page in 1..=first.total_pages.max(1) {
            let (slice, info) = paginate(&items, page as i64, size);
            prop_assert_eq!(info.current_page, page);
            seen.extend_from_slice(slice);
        }

        prop_assert_eq!(seen, items);
    }

    #[test]
    fn out_of_range_requests_clamp(
        len in 1usize..200,
        size in page_size(),
        overshoot in 1i64..1000
    ) {
        let items: Vec<usize> = (0..len).collect();
        let (_, first) = paginate(&items, 1, size);
        let last_page = first.total_pages as i64;

        let (low, low_info) = paginate(&items, 1 - overshoot, size);
        let (first_slice, _) = paginate(&items, 1, size);
        prop_assert_eq!(low_info.current_page, 1);
        prop_assert_eq!(low, first_slice);

        let (high, high_info) = paginate(&items, last_page + overshoot, size);
        let (last_slice, _) = paginate(&items, last_page, size);
        prop_assert_eq!(high_info.current_page, first.total_pages);
        prop_assert_eq!(high, last_slice);
        prop_assert!(!high.is_empty());
    }
}
