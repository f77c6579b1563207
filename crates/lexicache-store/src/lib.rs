#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, unreachable_pub, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

//! Durable registry snapshots for lexicache.
//!
//! Layout: `kv.rs` (`KeyValueStore` and its file/memory backends),
//! `snapshot.rs` (persisted envelope), `store.rs` (`LocaleStore`).

pub mod error;
pub mod kv;
pub mod snapshot;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, is_valid_key};
pub use snapshot::RegistrySnapshot;
pub use store::{DEFAULT_STORAGE_KEY, LocaleStore};
