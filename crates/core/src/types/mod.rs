//! Core types for Agent Helper.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod shop;
pub mod status;

pub use id::{ResourceKind, to_gid};
pub use shop::{ShopDomain, ShopDomainError};
pub use status::{CheckStatus, OverallStatus};
