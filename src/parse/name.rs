use lazy_static::lazy_static;
use regex::Regex;

use crate::policy::NormalizationPolicy;

lazy_static! {
    static ref BRACKETED: Regex = Regex::new(r"\[.*?\]").unwrap();
    static ref PARENTHESIZED: Regex = Regex::new(r"\(.*?\)").unwrap();
}

/// Drop the first `segments` underscore-delimited segments, if there are more.
fn strip_prefix_segments(name: &str, segments: usize) -> &str {
    if segments == 0 {
        return name;
    }
    let parts: Vec<&str> = name.splitn(segments + 1, '_').collect();
    if parts.len() > segments {
        parts[segments]
    } else {
        name
    }
}

/// Map a base-name candidate to the key listings are grouped by.
pub fn canonical_key(base_name: &str, policy: &NormalizationPolicy) -> String {
    let name = strip_prefix_segments(base_name, policy.prefix_segments);
    let name = BRACKETED.replace_all(name, "");
    let mut name = PARENTHESIZED.replace_all(&name, "").into_owned();

    for token in &policy.noise_tokens {
        if !token.is_empty() {
            name = name.replace(token.as_str(), "");
        }
    }

    let words = name.split_whitespace();
    match policy.key_tokens {
        Some(limit) => words.take(limit).collect::<Vec<_>>().join(" "),
        None => words.collect::<Vec<_>>().join(" "),
    }
}
