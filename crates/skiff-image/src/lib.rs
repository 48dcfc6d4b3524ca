//! # skiff-image
//!
//! Image-transport plumbing for the skiff CLI.
//!
//! Handles:
//! - **Context**: the [`context::SystemContext`] configuration record that
//!   carries authentication, TLS, path, and compression settings into a
//!   resolution or transfer operation.
//! - **Auth**: `USERNAME[:PASSWORD]` credential parsing.
//! - **Compression**: compression-format name lookup.
//! - **Transport**: `transport:name` image-reference parsing and thin local
//!   layout access for the `dir:` and `oci:` transports.
//!
//! Registry network protocol, signature verification, and blob transfer are
//! deliberately out of scope; the network transports parse but do not open.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod auth;
pub mod compression;
pub mod context;
pub mod transport;
