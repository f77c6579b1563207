#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, unreachable_pub, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

//! Translation bundles and the pure pieces of the diff-fill pipeline.
//!
//! Layout: `tree.rs` (`TreeNode`, authored-source validation), `codec.rs`
//! (flatten/unflatten), `diff.rs` (missing and stale keys), `merge.rs`
//! (positional merge), `locale.rs` (`LocaleCode`).

pub mod codec;
pub mod diff;
pub mod error;
pub mod locale;
pub mod merge;
pub mod tree;

pub use codec::{FlatMapping, flatten, unflatten};
pub use diff::{is_complete, missing_keys, prune_stale, source_texts, stale_keys};
pub use error::{CodecError, CodecResult};
pub use locale::LocaleCode;
pub use merge::{merge, merge_bundle};
pub use tree::{TreeNode, is_missing, parse_bundle, present};
