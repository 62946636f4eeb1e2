//! Layered settings resolution.
//!
//! Settings come from three places, later sources winning:
//! 1. Bundled defaults (`parley.toml`, compiled in)
//! 2. The engine-supplied mod config (already parsed into JSON)
//! 3. An optional local override file (TOML or JSON)
//!
//! Nested tables merge key by key. A broken layer never aborts startup: it is
//! logged and the result without it is used.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod effective;
mod resolve;

pub use effective::{EffectiveConfig, ProviderSettings};
pub use resolve::{DEFAULT_CONFIG, resolve};
