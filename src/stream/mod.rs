// src/stream/mod.rs
//
// Live query streams

pub mod dedup;
pub mod query_stream;

pub use dedup::DuplicateFilter;
pub use query_stream::{spawn_query_stream, QueryStream, SubscriptionHandle};
