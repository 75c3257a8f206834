//! Common types shared across the bidlens crates.

pub mod error;
pub mod messages;

pub use error::{Error, Result};
pub use messages::ControlCommand;
