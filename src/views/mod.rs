pub mod derive;
pub mod refresh;

pub use derive::{derive_views, sort_newest_first, DerivedViews, TagGroup, TOP_LISTINGS, TOP_TAGS};
pub use refresh::{Generation, RefreshTracker};
