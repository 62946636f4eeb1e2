//! Error types for the Parley NPC chat extension.
//!
//! This crate provides the foundation error types used throughout the Parley workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use parley_error::{ParleyResult, StoreError, StoreErrorKind};
//!
//! fn fetch_reply() -> ParleyResult<String> {
//!     Err(StoreError::new(StoreErrorKind::GlobalCapReached(10)))?
//! }
//!
//! match fetch_reply() {
//!     Ok(reply) => println!("Got: {}", reply),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod provider;
mod store;
mod worker;

pub use config::ConfigError;
pub use error::{ParleyError, ParleyErrorKind, ParleyResult};
pub use provider::{ProviderError, ProviderErrorKind, ProviderResult};
pub use store::{StoreError, StoreErrorKind, StoreResult};
pub use worker::{WorkerError, WorkerErrorKind};
