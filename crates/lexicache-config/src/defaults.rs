//! Default values applied before any configuration source.

/// Locale the bundled copy is authored in.
pub const DEFAULT_CANONICAL_LOCALE: &str = "en";
/// Directory holding persisted registry files.
pub const DEFAULT_STORE_DIR: &str = ".lexicache";
/// Storage key for the persisted registry.
pub const DEFAULT_STORAGE_KEY: &str = "lexicache.registry";
/// Translation provider endpoint (Google Translate v2).
pub const DEFAULT_FILL_ENDPOINT: &str = "https://translation.googleapis.com/language/translate/v2";
/// Per-request provider timeout in seconds.
pub const DEFAULT_FILL_TIMEOUT_SECS: u64 = 10;
