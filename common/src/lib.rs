//! Shared building blocks for the `sweepr` workspace.
//!
//! Holds the data model passed between the scanner and the resolver, range and
//! target parsing, run configuration and the error taxonomy.

pub mod config;
pub mod error;
pub mod log;
pub mod network;
