use thiserror::Error;

/// Failures that can stop a feed from loading. Per-row problems never surface
/// here; malformed rows are skipped where they are parsed.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("fetch of '{url}' failed: {reason}")]
    Network { url: String, reason: String },
    #[error("fetch of '{url}' returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("feed document could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("configuration error: {0}")]
    Config(String),
}
