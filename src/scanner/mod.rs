pub mod walk;

pub use walk::find_listing_directories;
