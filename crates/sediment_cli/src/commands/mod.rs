//! CLI command handlers.

/// Pattern-age queries: blame or survey the matches of a selector.
pub mod age;
/// Shell completion generation.
pub mod completions;
/// Per-file edit counts since a date.
pub mod edits;
/// Supported language listing.
pub mod languages;

/// Convenience alias for command return types.
pub type Result<T = ()> = anyhow::Result<T>;

/// Builds a tokio runtime for one command invocation.
pub(crate) fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| anyhow::anyhow!("failed to create async runtime: {e}"))
}
