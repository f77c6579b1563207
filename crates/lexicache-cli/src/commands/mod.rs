//! Command handlers grouped by concern.

pub(crate) mod locale;
pub(crate) mod resolve;
