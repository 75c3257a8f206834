//! Seams over the host page's advertising libraries.
//!
//! The collector never talks to the page directly. It sees two traits,
//! [`AuctionProvider`] for the header bidding library and [`AdServer`] for
//! the tag-serving library, plus a channel of [`PageEvent`] notifications.
//! Production wires these to a WebSocket bridge; tests wire them to mocks.

pub mod traits;
pub mod types;

pub use traits::{AdServer, AuctionProvider};
pub use types::{AuctionEvent, AuctionEventArgs, PageEvent, SlotHandle, BID_REQUESTED};
