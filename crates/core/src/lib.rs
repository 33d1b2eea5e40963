//! Voltmart Core - Shared types library.
//!
//! This crate provides common types used across all Voltmart client components:
//! - `storefront` - Remote API client, session store, cart and checkout
//! - `admin` - Administration console view models
//! - `cli` - Command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, quantities and statuses
//! - [`pager`] - Client-side list pagination
//! - [`validation`] - Per-field form validation helpers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod pager;
pub mod types;
pub mod validation;

pub use pager::{PageCursor, PagerError, paginate};
pub use types::*;
