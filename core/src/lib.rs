//! Ping sweep and hostname resolution engine.
//!
//! * [`scanner`] finds the live hosts of an address range.
//! * [`resolver`] names a live host through an ordered fallback chain.
//! * [`discovery`] ties the two together.

pub mod discovery;
pub mod neighbor;
pub mod resolver;
pub mod scanner;
pub mod system;

pub use tokio_util::sync::CancellationToken;
