//! Extraction of a package weight/volume from a free-text listing name.
//!
//! Listing names carry their net quantity in whatever notation the seller
//! picked: `1.5kg`, `85g`, `1.2L`, `150큐브`, `300g x 20개`, `85g*12`. The
//! parser finds the token that governs the product, converts it to grams,
//! millilitres or a plain count, and returns the text in front of it as the
//! base-name candidate used for grouping.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

use crate::policy::{NormalizationPolicy, Unit, UnitSelection};

lazy_static! {
    static ref KG: Regex = unit_regex("kg");
    static ref L: Regex = unit_regex("l");
    static ref G: Regex = unit_regex("g");
    static ref ML: Regex = unit_regex("ml");
    static ref CUBE: Regex = unit_regex("큐브");
    static ref COUNT_MULTIPLIER: Regex = Regex::new(r"(?i)(\d+)(?:개|ea)").unwrap();
    static ref X_MULTIPLIER: Regex = Regex::new(r"(?i)x\s*(\d+)").unwrap();
    static ref GRAM_TIMES_PACKS: Regex = Regex::new(r"(?i)(\d+)\s*g\s*\*\s*(\d+)").unwrap();
    static ref TRAILING_SEPARATORS: Regex = Regex::new(r"[,_\-\s]+$").unwrap();
}

fn unit_regex(unit: &str) -> Regex {
    // Admits malformed numbers like `1.2.3` or `.`; those are rejected when
    // the value is parsed.
    Regex::new(&format!(r"(?i)([\d.]+)\s*{}", regex::escape(unit))).unwrap()
}

/// ASCII form of a matched number. `\d` is Unicode-aware, so full-width
/// digits (`２`) are folded; any other script's digits are rejected.
fn ascii_number(token: &str) -> Option<String> {
    token
        .chars()
        .map(|c| match c {
            '.' | '0'..='9' => Some(c),
            '０'..='９' => char::from_digit(c as u32 - '０' as u32, 10),
            _ => None,
        })
        .collect()
}

fn parse_number<T: std::str::FromStr>(token: &str) -> Option<T> {
    ascii_number(token)?.parse().ok()
}

fn pattern_for(unit: Unit) -> &'static Regex {
    match unit {
        Unit::Kg => &KG,
        Unit::L => &L,
        Unit::G => &G,
        Unit::Ml => &ML,
        Unit::Cube => &CUBE,
    }
}

/// Normalized package quantity. `Unknown` sorts after every known value.
#[derive(Debug, Clone, Copy)]
pub enum Weight {
    Known(f64),
    Unknown,
}

impl Weight {
    pub fn is_known(&self) -> bool {
        matches!(self, Weight::Known(_))
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Weight::Known(v) => Some(*v),
            Weight::Unknown => None,
        }
    }
}

impl PartialEq for Weight {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Weight {}

impl PartialOrd for Weight {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Weight {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Weight::Known(a), Weight::Known(b)) => a.total_cmp(b),
            (Weight::Known(_), Weight::Unknown) => Ordering::Less,
            (Weight::Unknown, Weight::Known(_)) => Ordering::Greater,
            (Weight::Unknown, Weight::Unknown) => Ordering::Equal,
        }
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Weight::Known(v) => write!(f, "{}", v),
            Weight::Unknown => f.write_str("unknown"),
        }
    }
}

impl Serialize for Weight {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Weight::Known(v) => serializer.serialize_some(v),
            Weight::Unknown => serializer.serialize_none(),
        }
    }
}

/// A successfully parsed quantity token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedQuantity {
    /// Value in the base unit with the multiplier already applied.
    pub value: f64,
    pub unit: Unit,
    pub multiplier: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedListing {
    pub quantity: Option<ParsedQuantity>,
    /// Text in front of the quantity token, or the whole name when nothing matched.
    pub base_name: String,
}

impl ParsedListing {
    pub fn weight(&self) -> Weight {
        match &self.quantity {
            Some(q) => Weight::Known(q.value),
            None => Weight::Unknown,
        }
    }

    fn unmatched(name: &str) -> Self {
        Self {
            quantity: None,
            base_name: name.to_string(),
        }
    }
}

struct UnitMatch {
    unit: Unit,
    start: usize,
    end: usize,
    number: String,
}

fn select_match(name: &str, policy: &NormalizationPolicy) -> Option<UnitMatch> {
    let mut selected: Option<UnitMatch> = None;

    for &unit in &policy.units {
        let Some(m) = pattern_for(unit).captures_iter(name).last() else {
            continue;
        };
        let whole = m.get(0)?;
        let candidate = UnitMatch {
            unit,
            start: whole.start(),
            end: whole.end(),
            number: m[1].to_string(),
        };

        match policy.unit_selection {
            UnitSelection::Priority => return Some(candidate),
            UnitSelection::Rightmost => {
                if selected.as_ref().map_or(true, |s| candidate.start > s.start) {
                    selected = Some(candidate);
                }
            }
        }
    }

    selected
}

fn find_multiplier(rest: &str) -> Option<u32> {
    COUNT_MULTIPLIER
        .captures(rest)
        .or_else(|| X_MULTIPLIER.captures(rest))
        .and_then(|c| parse_number::<u32>(&c[1]))
        .filter(|m| *m > 0)
}

fn trim_base(prefix: &str) -> String {
    TRAILING_SEPARATORS
        .replace(prefix.trim(), "")
        .into_owned()
}

/// Parse the quantity token out of a listing name (a file stem).
pub fn parse_listing(name: &str, policy: &NormalizationPolicy) -> ParsedListing {
    if let Some(m) = select_match(name, policy) {
        let Some(raw) = parse_number::<f64>(&m.number) else {
            return ParsedListing::unmatched(name);
        };

        let mut multiplier = 1;
        if policy.apply_multiplier {
            if let Some(found) = find_multiplier(&name[m.end..]) {
                multiplier = found;
            }
        }

        return ParsedListing {
            quantity: Some(ParsedQuantity {
                value: raw * m.unit.scale() * multiplier as f64,
                unit: m.unit,
                multiplier,
            }),
            base_name: trim_base(&name[..m.start]),
        };
    }

    if let Some(c) = GRAM_TIMES_PACKS.captures(name) {
        let grams = parse_number::<f64>(&c[1]);
        let packs = parse_number::<u32>(&c[2]);
        if let (Some(grams), Some(packs)) = (grams, packs) {
            let start = c.get(0).map_or(0, |m| m.start());
            return ParsedListing {
                quantity: Some(ParsedQuantity {
                    value: grams * packs as f64,
                    unit: Unit::G,
                    multiplier: packs,
                }),
                base_name: trim_base(&name[..start]),
            };
        }
    }

    ParsedListing::unmatched(name)
}
