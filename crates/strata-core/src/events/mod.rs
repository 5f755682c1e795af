//! Pipeline event callbacks.

pub mod handler;
pub mod types;

pub use handler::{NullEventHandler, StrataEventHandler};
pub use types::*;
