//! Provider trait consumed by the fill pipeline.

use async_trait::async_trait;
use lexicache_bundle::LocaleCode;
use tracing::debug;

use crate::error::{FillError, FillResult};

/// Batch translation provider.
///
/// Implementations receive canonical source strings in order and must return
/// translations in the same order and of the same length. Any error, timeout
/// included, is treated by callers as "nothing filled this round".
#[async_trait]
pub trait FillClient: Send + Sync {
    /// Translate `texts` into `target`.
    async fn translate_batch(&self, texts: &[String], target: &LocaleCode)
    -> FillResult<Vec<String>>;
}

/// Issue exactly one batch request and enforce the length contract.
///
/// An empty input short-circuits without touching the provider.
///
/// # Errors
///
/// Propagates provider failures and returns [`FillError::LengthMismatch`]
/// when the response does not line up with the request.
pub async fn fill_batch(
    client: &dyn FillClient,
    texts: &[String],
    target: &LocaleCode,
) -> FillResult<Vec<String>> {
    if texts.is_empty() {
        return Ok(Vec::new());
    }
    debug!(locale = %target, count = texts.len(), "requesting translation batch");
    let translated = client.translate_batch(texts, target).await?;
    if translated.len() != texts.len() {
        return Err(FillError::LengthMismatch {
            expected: texts.len(),
            actual: translated.len(),
        });
    }
    Ok(translated)
}
