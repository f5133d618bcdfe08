//! Agent Helper admin library.
//!
//! This crate provides the Shopify Admin API access layer used by the CLI,
//! and the OAuth installation server that issues its access token.
//!
//! - [`shopify`] - request executor, paginated fetcher, search filters, mutations
//! - [`batch`] - paced bulk mutation with per-item failure capture
//! - [`analytics`] - sales and inventory rollups
//! - [`health`] - store health checks and status reduction
//! - [`config`] - environment-driven configuration
//! - [`routes`] - installation server handlers
//!
//! # Security
//!
//! This crate handles HIGH PRIVILEGE credentials:
//! - Admin API access tokens (full read/write within the installed scopes)
//! - The app client secret used to sign OAuth callbacks

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod analytics;
pub mod batch;
pub mod config;
pub mod error;
pub mod health;
pub mod routes;
pub mod shopify;
pub mod state;
