//! Client-side cart/wishlist synchronisation for the storefront.
//!
//! Target-independent: the browser crate and the native HTTP client both plug
//! into [`SyncEngine`] through the [`StorefrontApi`] and [`Surfaces`] traits.

pub mod api;
pub mod carousel;
pub mod cart_page;
pub mod checkout;
pub mod engine;
pub mod error;
pub mod look;
pub mod money;
pub mod sequence;
pub mod store;
#[cfg(test)]
mod testing;
pub mod token;

pub use api::{StorefrontApi, Surfaces};
pub use engine::{Outcome, Step, SyncEngine};
pub use error::{SyncError, SyncResult};
pub use money::Money;
pub use store::{CartLine, Membership, MenuEntry, MirrorStore, StoreEvent};
