//! DB-compatible (e.g. de/serialisable) types.
//!
//! The types in this module are serialised in an DB-friendly way, e.g.:
//!
//! - IDs and datetimes are serialised in MongoDB's own format.
//! - Field names are camelCase, matching the stored document layout.

pub mod account;
pub mod response;
pub mod survey;
