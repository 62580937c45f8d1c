//! Wire types for the CodeBox sandbox API.
//!
//! This crate contains the serde-serializable request and response bodies
//! exchanged with the CodeBox REST service. These types represent the
//! "protocol layer" - the shapes of data as they appear on the wire.
//!
//! Types in this crate are:
//! - **Pure data**: No behavior beyond serialization and small accessors
//! - **1:1 with the service**: Field names match the JSON the service emits
//!
//! The session-aware client is built on top of these types in `codebox-rs`.

pub mod requests;
pub mod responses;

pub use requests::*;
pub use responses::*;
