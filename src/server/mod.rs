//! Server Module
//!
//! Generic TCP hosting for the cache process: an accept loop with graceful
//! shutdown and the handler interface it drives.

mod echo;
mod handler;
mod listener;

pub use echo::EchoHandler;
pub use handler::Handler;
pub use listener::listen_and_serve;
