//! Romanian Football Store core - shared types library.
//!
//! This crate provides the value types used by the client library and the
//! command-line tool:
//! - typed ids for every server collection
//! - prices, jersey sizes and quantity bounds
//! - user roles and stock status classification
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O and no HTTP
//! client. Wire records live in `football-store-client`.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
