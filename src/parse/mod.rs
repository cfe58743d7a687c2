pub mod name;
pub mod weight;

pub use weight::{parse_listing, ParsedListing, ParsedQuantity, Weight};
