pub mod feed;
pub mod history;
pub mod registry;

pub use feed::{feed_stream, spawn_replay, FeedEvent, FeedSummary, SymbolFeed};
pub use history::{load_history, parse_history, render_timestamp};
pub use registry::EngineRegistry;
