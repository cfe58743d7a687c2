use crate::group::Listing;
use crate::report::Stage;

use super::PrunePlan;

/// Keep the `target` lightest listings; everything after them relocates.
///
/// Listings are expected to be distinct products already (the keep-lightest
/// pass ran first). Unknown weights sort last, ties keep input order.
pub fn keep_target_count(mut listings: Vec<Listing>, target: usize) -> PrunePlan {
    let mut plan = PrunePlan::new(Stage::Excess);
    listings.sort_by_key(|l| l.weight());

    if listings.len() > target {
        plan.relocate = listings.split_off(target);
    }
    plan.keep = listings;
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::FilePair;
    use crate::policy::NormalizationPolicy;
    use std::path::PathBuf;

    fn listing(stem: &str) -> Listing {
        let pair = FilePair {
            stem: stem.to_string(),
            image: PathBuf::from(format!("/shop/{stem}.jpg")),
            sidecars: Vec::new(),
        };
        Listing::new(pair, &NormalizationPolicy::strict())
    }

    #[test]
    fn test_keeps_lightest_target_count() {
        let listings: Vec<Listing> = (1..=25)
            .rev()
            .map(|i| listing(&format!("product{i:02} {}g", i * 10)))
            .collect();

        let plan = keep_target_count(listings, 20);
        assert_eq!(plan.keep.len(), 20);
        assert_eq!(plan.relocate.len(), 5);
        assert!(plan
            .relocate
            .iter()
            .all(|l| l.weight().value().unwrap() > 200.0));
    }

    #[test]
    fn test_small_directory_is_noop() {
        let plan = keep_target_count(vec![listing("a 1kg"), listing("b")], 20);
        assert!(plan.is_noop());
        assert_eq!(plan.keep.len(), 2);
    }

    #[test]
    fn test_unknown_weights_pruned_first() {
        let plan = keep_target_count(
            vec![listing("mystery"), listing("a 2kg"), listing("b 1kg")],
            2,
        );
        assert_eq!(plan.relocate.len(), 1);
        assert_eq!(plan.relocate[0].pair.stem, "mystery");
    }
}
