//! Hydrogen drum machine catalog feed.
//!
//! - `classify`: Decides whether an artifact is a drumkit, pattern or song
//! - `feed`: Format negotiation and feed assembly
//! - `xml`: XML rendering

pub mod classify;
pub mod feed;
pub mod xml;

pub use classify::{classify, Category, Classification, FEED_POLICY, HYDROGEN};
pub use feed::{assemble, hydrogen_feed, FeedError, FeedItem, HydrogenFeed, OutputFormat};
