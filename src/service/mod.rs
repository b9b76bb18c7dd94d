//! Survey and response operations, on top of any [`Store`](crate::model::store::Store).
//!
//! Handlers pass the caller's identity in explicitly; ownership is checked here.

pub mod response;
pub mod results;
pub mod survey;
