// Property tests for reporting id filters: absent, empty and 0 are wildcards,
// anything else behaves as IN over the supplied ids.

use std::collections::BTreeSet;

use estate_reporting::core::{DimensionFilter, ReportingIdFilter};
use proptest::prelude::*;

proptest! {
    #[test]
    fn test_wildcard_constructors(id in any::<i32>()) {
        prop_assert!(ReportingIdFilter::any().is_wildcard());
        prop_assert!(ReportingIdFilter::single(None).is_wildcard());
        prop_assert!(ReportingIdFilter::single(Some(0)).is_wildcard());
        prop_assert!(ReportingIdFilter::from_ids(Vec::new()).is_wildcard());
        prop_assert_eq!(ReportingIdFilter::single(Some(id)).is_wildcard(), id == 0);
    }

    #[test]
    fn test_ids_are_the_distinct_nonzero_inputs(
        ids in prop::collection::vec(-50i32..50, 0..12),
    ) {
        let filter = ReportingIdFilter::from_ids(ids.clone());
        let expected: Vec<i32> = ids
            .into_iter()
            .filter(|id| *id != 0)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        prop_assert_eq!(filter.ids(), expected.as_slice());
    }

    #[test]
    fn test_zero_ids_are_ignored(
        ids in prop::collection::vec(0i32..5, 0..10),
    ) {
        let filter = ReportingIdFilter::from_ids(ids.clone());
        prop_assert!(!filter.ids().contains(&0));
        prop_assert_eq!(filter.is_wildcard(), ids.iter().all(|id| *id == 0));
    }

    #[test]
    fn test_csv_parsing_matches_list(ids in prop::collection::vec(1i32..10_000, 0..8)) {
        let csv = ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(",");
        let parsed: ReportingIdFilter = csv.parse().unwrap();
        prop_assert_eq!(parsed, ReportingIdFilter::from_ids(ids));
    }

    #[test]
    fn test_merchant_and_operator_pair(merchant in 0i32..5, operator in 0i32..5) {
        let filter = DimensionFilter::merchant_and_operator(Some(merchant), Some(operator));
        prop_assert_eq!(filter.merchants.is_wildcard(), merchant == 0);
        prop_assert_eq!(filter.operators.is_wildcard(), operator == 0);
        prop_assert!(filter.products.is_wildcard());
    }
}
