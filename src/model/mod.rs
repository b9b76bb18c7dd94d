//! Data types, and the store that persists them.

pub mod api;
pub mod common;
pub mod db;
pub mod mongodb;
pub mod store;
