//! hotcache - An embeddable LRU cache with lazy TTL expiry
//!
//! Provides a thread-safe, capacity-bounded cache plus the small TCP server
//! scaffolding that hosts it.

pub mod cache;
pub mod config;
pub mod error;
pub mod server;
pub mod tasks;

pub use cache::{CacheStats, LruCache};
pub use config::Config;
pub use error::{Error, Result};
pub use server::{listen_and_serve, EchoHandler, Handler};
pub use tasks::spawn_expiry_sweeper;
