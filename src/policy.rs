use serde::{Deserialize, Serialize};
use std::fmt;

use crate::parse::name;

/// Marketing terms that never contribute to a product's identity.
pub const DEFAULT_NOISE_TOKENS: [&str; 6] = ["리뉴얼", "무료배송", "단품", "1+1", "2+1", "증정"];

/// A quantity unit recognised in listing filenames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Kg,
    L,
    G,
    Ml,
    Cube,
}

impl Unit {
    /// Default priority order, also the tie-break order for equal offsets.
    pub const ALL: [Unit; 5] = [Unit::Kg, Unit::L, Unit::G, Unit::Ml, Unit::Cube];

    pub fn token(self) -> &'static str {
        match self {
            Unit::Kg => "kg",
            Unit::L => "l",
            Unit::G => "g",
            Unit::Ml => "ml",
            Unit::Cube => "큐브",
        }
    }

    /// Factor converting a value in this unit to grams, millilitres or a count.
    pub fn scale(self) -> f64 {
        match self {
            Unit::Kg | Unit::L => 1000.0,
            Unit::G | Unit::Ml | Unit::Cube => 1.0,
        }
    }

    /// Label of the base unit after scaling.
    pub fn base_label(self) -> &'static str {
        match self {
            Unit::Kg | Unit::G => "g",
            Unit::L | Unit::Ml => "ml",
            Unit::Cube => "cube",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// How the governing quantity token is chosen when several units match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnitSelection {
    /// The rightmost match across all units; ties go to the earlier unit.
    #[default]
    Rightmost,
    /// The first unit (in priority order) that matches anywhere.
    Priority,
}

/// Built-in normalization presets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Profile {
    /// Full base name is the grouping key.
    #[default]
    Strict,
    /// Filenames start with `<animal>_<category>_`; only the first three
    /// words of the remainder identify the product.
    CategoryPrefixed,
}

impl Profile {
    pub fn policy(self) -> NormalizationPolicy {
        match self {
            Profile::Strict => NormalizationPolicy::strict(),
            Profile::CategoryPrefixed => NormalizationPolicy::category_prefixed(),
        }
    }
}

/// Everything that differs between the ways listings get parsed and keyed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationPolicy {
    pub noise_tokens: Vec<String>,
    pub prefix_segments: usize,
    pub key_tokens: Option<usize>,
    pub units: Vec<Unit>,
    pub unit_selection: UnitSelection,
    pub apply_multiplier: bool,
}

impl NormalizationPolicy {
    pub fn strict() -> Self {
        Self {
            noise_tokens: DEFAULT_NOISE_TOKENS.iter().map(|s| s.to_string()).collect(),
            prefix_segments: 0,
            key_tokens: None,
            units: Unit::ALL.to_vec(),
            unit_selection: UnitSelection::Rightmost,
            apply_multiplier: true,
        }
    }

    pub fn category_prefixed() -> Self {
        Self {
            prefix_segments: 2,
            key_tokens: Some(3),
            ..Self::strict()
        }
    }

    /// Canonical grouping key for a base-name candidate.
    pub fn canonical_key(&self, base_name: &str) -> String {
        name::canonical_key(base_name, self)
    }
}

impl Default for NormalizationPolicy {
    fn default() -> Self {
        Self::strict()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_prefixed_differs_only_in_key_shape() {
        let strict = NormalizationPolicy::strict();
        let prefixed = NormalizationPolicy::category_prefixed();
        assert_eq!(strict.noise_tokens, prefixed.noise_tokens);
        assert_eq!(strict.units, prefixed.units);
        assert_eq!(prefixed.prefix_segments, 2);
        assert_eq!(prefixed.key_tokens, Some(3));
        assert_eq!(strict.key_tokens, None);
    }

    #[test]
    fn test_unit_scale() {
        assert_eq!(Unit::Kg.scale(), 1000.0);
        assert_eq!(Unit::L.scale(), 1000.0);
        assert_eq!(Unit::Cube.scale(), 1.0);
        assert_eq!(Unit::L.base_label(), "ml");
    }
}
