pub mod catalog;
pub mod handlers;
pub mod seed;

pub use catalog::JobCatalog;
