pub mod mover;
pub mod pair;

pub use mover::{move_pair, plan_pair, MovedFile};
pub use pair::{collect_pairs, has_extension, FilePair};
