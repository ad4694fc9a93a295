pub mod normalize;
pub mod paged;

pub use paged::{fetch_all_pages, FetchOptions, PageCallback, PageSource};
