use std::collections::HashMap;

use crate::files::FilePair;
use crate::parse::{parse_listing, ParsedListing, Weight};
use crate::policy::NormalizationPolicy;

/// A file pair with its parsed quantity and grouping key.
#[derive(Debug, Clone)]
pub struct Listing {
    pub pair: FilePair,
    pub parsed: ParsedListing,
    pub key: String,
}

impl Listing {
    pub fn new(pair: FilePair, policy: &NormalizationPolicy) -> Self {
        let parsed = parse_listing(&pair.stem, policy);
        let mut key = policy.canonical_key(&parsed.base_name);
        if key.is_empty() {
            key = pair.stem.clone();
        }
        Self { pair, parsed, key }
    }

    pub fn weight(&self) -> Weight {
        self.parsed.weight()
    }
}

/// Pack-size variants of one product, in first-seen order.
#[derive(Debug, Clone)]
pub struct ProductGroup {
    pub key: String,
    pub members: Vec<Listing>,
}

impl ProductGroup {
    /// Stable ascending sort by weight; unknown weights go last and ties
    /// keep first-seen order.
    pub fn sort_by_weight(&mut self) {
        self.members.sort_by_key(|l| l.weight());
    }
}

/// Group listings by exact key, preserving first-seen order of groups and members.
pub fn group_listings(listings: Vec<Listing>) -> Vec<ProductGroup> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<ProductGroup> = Vec::new();

    for listing in listings {
        match index.get(&listing.key) {
            Some(&i) => groups[i].members.push(listing),
            None => {
                index.insert(listing.key.clone(), groups.len());
                groups.push(ProductGroup {
                    key: listing.key.clone(),
                    members: vec![listing],
                });
            }
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
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
    fn test_pack_sizes_share_a_group() {
        let groups = group_listings(vec![
            listing("오리젠 캣 5.4kg"),
            listing("웰니스 코어 2kg"),
            listing("[무료배송] 오리젠 캣 1.8kg"),
            listing("오리젠 캣 340g"),
        ]);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, "오리젠 캣");
        assert_eq!(groups[0].members.len(), 3);
        assert_eq!(groups[1].key, "웰니스 코어");
    }

    #[test]
    fn test_sort_by_weight_is_stable_with_unknown_last() {
        let mut group = ProductGroup {
            key: "A".to_string(),
            members: vec![listing("A"), listing("A_2kg"), listing("A 2000g"), listing("A_1kg")],
        };
        group.sort_by_weight();
        let stems: Vec<&str> = group.members.iter().map(|l| l.pair.stem.as_str()).collect();
        assert_eq!(stems, vec!["A_1kg", "A_2kg", "A 2000g", "A"]);
    }

    #[test]
    fn test_unparsed_listing_keyed_by_normalized_stem() {
        let l = listing("[단품] 강아지 방석");
        assert_eq!(l.weight(), Weight::Unknown);
        assert_eq!(l.key, "강아지 방석");
    }

    #[test]
    fn test_all_noise_falls_back_to_stem() {
        let l = listing("[이벤트]");
        assert_eq!(l.key, "[이벤트]");
    }
}
