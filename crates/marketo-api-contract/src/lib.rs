//! Marketo REST API contract types and validation
//!
//! This crate defines the wire types shared between the production REST
//! client and the mock implementation: the uniform Marketo response
//! envelope, the lead/list/campaign request and response bodies, and the
//! OAuth token grant response.

pub mod error;
pub mod types;

pub use error::*;
pub use types::*;
