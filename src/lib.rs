//! Airdrop Hunter - catalog browser with per-user wishlists and reminders
//!
//! This crate provides the navigation core behind a chat front end: it turns
//! short opaque tokens into typed screens, paginates the airdrop catalog and
//! keeps each user's wishlist and reminder log consistent under concurrent use.

pub mod bootstrap;
pub mod catalog;
pub mod config;
pub mod console;
pub mod error;
pub mod pagination;
pub mod router;
pub mod state;
pub mod types;

// Re-export main types for convenience
pub use catalog::CatalogStore;
pub use config::AppConfig;
pub use error::{RouteError, StoreError, TokenError};
pub use router::{NavigationRouter, Token, Transition, ViewDescriptor};
pub use state::UserStateStore;
pub use types::{AirdropRecord, ReminderEntry, UserIdentity, Wishlist};
