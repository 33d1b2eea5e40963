//! Voltmart Admin library.
//!
//! View models for the administration console: dashboard statistics and the
//! product, category, order and user tables. Every table is built on the
//! storefront's [`voltmart_storefront::api::ApiClient`] and paginates
//! client-side.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod components;
pub mod dashboard;
pub mod error;
pub mod tables;

pub use error::AdminError;
pub use tables::{AdminTable, CategoryTable, OrderTable, ProductTable, UserTable};
