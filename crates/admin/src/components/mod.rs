//! Reusable presentation components.

pub mod data_table;
