//! Agent Helper Core - Shared types library.
//!
//! This crate provides common types used across all Agent Helper components:
//! - `admin` - Admin API access layer and the OAuth installation server
//! - `cli` - Command-line tools for agents operating on store data
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Validated shop domains, Shopify global IDs and health statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
