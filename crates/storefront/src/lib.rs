//! Voltmart Storefront library.
//!
//! Remote API client, session store and the storefront view models
//! (catalog, cart, checkout, account). Front ends construct one
//! [`session::SessionStore`] and one [`api::ApiClient`] and hand clones of
//! them to each view model.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod account;
pub mod api;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod session;
