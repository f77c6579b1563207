#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, unreachable_pub, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

//! Boundary to the external translation provider.
//!
//! Layout: `client.rs` (`FillClient` trait and the single-batch contract),
//! `http.rs` (reqwest adapter), `error.rs` (`FillError`).

pub mod client;
pub mod error;
pub mod http;

pub use client::{FillClient, fill_batch};
pub use error::{FillError, FillResult};
pub use http::{HttpFillClient, HttpFillConfig};
