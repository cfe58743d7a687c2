use crate::group::ProductGroup;
use crate::report::Stage;

use super::PrunePlan;

const NO_KNOWN_WEIGHT: &str = "no member of the group has a known weight";

/// Keep the lightest variant of every group; heavier variants relocate.
///
/// A group whose lightest member has no known weight is left alone.
pub fn keep_lightest(groups: Vec<ProductGroup>) -> Vec<PrunePlan> {
    groups
        .into_iter()
        .map(|mut group| {
            group.sort_by_weight();
            let mut plan = PrunePlan::new(Stage::Duplicate);
            plan.key = Some(group.key);

            let mut members = group.members.into_iter();
            let Some(lightest) = members.next() else {
                return plan;
            };
            let rest: Vec<_> = members.collect();

            if rest.is_empty() {
                plan.keep.push(lightest);
            } else if !lightest.weight().is_known() {
                plan.skip.push(lightest);
                plan.skip.extend(rest);
                plan.skip_reason = Some(NO_KNOWN_WEIGHT.to_string());
            } else {
                plan.canonical = Some(lightest.pair.image.clone());
                plan.keep.push(lightest);
                plan.relocate = rest;
            }
            plan
        })
        .collect()
}

/// Relocate the lightest variant of every group, singletons included.
pub fn collect_lightest(groups: Vec<ProductGroup>) -> Vec<PrunePlan> {
    groups
        .into_iter()
        .map(|mut group| {
            group.sort_by_weight();
            let mut plan = PrunePlan::new(Stage::Collect);
            plan.key = Some(group.key);

            let mut members = group.members.into_iter();
            let Some(lightest) = members.next() else {
                return plan;
            };
            plan.keep = members.collect();

            if lightest.weight().is_known() {
                plan.canonical = Some(lightest.pair.image.clone());
                plan.relocate.push(lightest);
            } else {
                plan.skip.push(lightest);
                plan.skip_reason = Some(NO_KNOWN_WEIGHT.to_string());
            }
            plan
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::FilePair;
    use crate::group::{group_listings, Listing};
    use crate::policy::NormalizationPolicy;
    use std::path::PathBuf;

    fn listings(stems: &[&str]) -> Vec<Listing> {
        stems
            .iter()
            .map(|stem| {
                let pair = FilePair {
                    stem: stem.to_string(),
                    image: PathBuf::from(format!("/shop/{stem}.jpg")),
                    sidecars: Vec::new(),
                };
                Listing::new(pair, &NormalizationPolicy::strict())
            })
            .collect()
    }

    fn stems(list: &[Listing]) -> Vec<&str> {
        list.iter().map(|l| l.pair.stem.as_str()).collect()
    }

    #[test]
    fn test_keep_lightest_retains_smallest_pack() {
        let plans = keep_lightest(group_listings(listings(&["A_3kg", "A_1kg", "A_5kg"])));
        assert_eq!(plans.len(), 1);
        assert_eq!(stems(&plans[0].keep), vec!["A_1kg"]);
        assert_eq!(stems(&plans[0].relocate), vec!["A_3kg", "A_5kg"]);
        assert_eq!(plans[0].canonical, Some(PathBuf::from("/shop/A_1kg.jpg")));
    }

    #[test]
    fn test_unknown_weight_never_retained_over_known() {
        let plans = keep_lightest(group_listings(listings(&["A", "A_2kg"])));
        assert_eq!(stems(&plans[0].keep), vec!["A_2kg"]);
        assert_eq!(stems(&plans[0].relocate), vec!["A"]);
    }

    #[test]
    fn test_group_without_known_weight_is_skipped() {
        let plans = keep_lightest(group_listings(listings(&["B (대형)", "B [소형]"])));
        assert_eq!(plans.len(), 1);
        assert!(plans[0].relocate.is_empty());
        assert_eq!(plans[0].skip.len(), 2);
        assert!(plans[0].skip_reason.is_some());
    }

    #[test]
    fn test_singletons_are_kept() {
        let plans = keep_lightest(group_listings(listings(&["A_1kg", "B"])));
        assert!(plans.iter().all(|p| p.is_noop()));
        assert_eq!(plans.iter().map(|p| p.keep.len()).sum::<usize>(), 2);
    }

    #[test]
    fn test_equal_weights_first_seen_wins() {
        let plans = keep_lightest(group_listings(listings(&["C 1kg", "C_1000g"])));
        assert_eq!(stems(&plans[0].keep), vec!["C 1kg"]);
    }

    #[test]
    fn test_collect_lightest_takes_one_per_group() {
        let plans = collect_lightest(group_listings(listings(&[
            "A_3kg", "A_1kg", "B_500g", "C",
        ])));
        let relocated: Vec<&str> = plans.iter().flat_map(|p| stems(&p.relocate)).collect();
        assert_eq!(relocated, vec!["A_1kg", "B_500g"]);
        assert_eq!(plans[2].skip.len(), 1);
    }
}
