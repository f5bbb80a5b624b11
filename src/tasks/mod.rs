//! Background Tasks Module
//!
//! Contains background tasks that may run alongside the server.
//!
//! # Tasks
//! - Expiry sweep: reclaims expired cache entries at a fixed interval

mod sweeper;

pub use sweeper::spawn_expiry_sweeper;
