pub mod category;
pub mod config;
pub mod csv;
pub mod error;
pub mod feed;
pub mod filter;
pub mod pin;
pub mod rank;
pub mod record;
pub mod resolver;
pub mod style;
pub mod text_filter;

pub use category::CategoryKey;
pub use config::{Locale, MapConfig};
pub use error::FeedError;
pub use feed::{FeedFormat, FeedLoader, FeedPlan, FeedSource};
pub use filter::{FilterCommand, FilterState, MarkerLayer, PinBoard, SyncReport};
pub use pin::{NumberingPolicy, Pin, PinId, ViewOptions};
pub use rank::{Rank, RankFilter};
pub use style::{StyleEntry, StyleRegistry};
