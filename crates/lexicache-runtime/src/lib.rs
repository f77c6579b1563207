#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, unreachable_pub, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

//! Runtime side of lexicache: the locale registry and the resolver.
//!
//! Layout: `registry.rs` (`LocaleRegistry` context object), `resolver.rs`
//! (lookups, locale switching, coalesced fills), `error.rs` (`RuntimeError`).

pub mod error;
pub mod registry;
pub mod resolver;

pub use error::{RuntimeError, RuntimeResult};
pub use registry::LocaleRegistry;
pub use resolver::{FillOutcome, LocaleState, Resolver, SwitchOutcome};
