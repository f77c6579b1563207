#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, unreachable_pub, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

//! Engine configuration for lexicache.
//!
//! Layout: `model.rs` (`EngineConfig` and its sections), `loader.rs`
//! (defaults → JSON file → environment, canonical bundle loading),
//! `validate.rs` (field parsers), `defaults.rs`, `error.rs`.

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;
mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ENV_CONFIG, load_canonical_bundle};
pub use model::{EngineConfig, FillConfig, LogSettings};
