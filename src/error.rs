//! Error types for the two external boundaries: snapshots and balance config.
//!
//! Gameplay operations never return these. Insufficient funds, unmet
//! requirements and repeated claims are silent no-ops reported via `bool`.

use thiserror::Error;

/// Failure while encoding, decoding or storing a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The stored text is not a valid snapshot document.
    #[error("snapshot is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    /// The document is not an object carrying a numeric `version`.
    #[error("snapshot is not a versioned object")]
    Malformed,
    /// The snapshot predates the oldest format we can still migrate.
    #[error("snapshot version {saved} is older than minimum compatible version {min}")]
    Incompatible { saved: u32, min: u32 },
    /// The backing store rejected the write.
    #[error("snapshot store failed: {0}")]
    Store(String),
}

/// Failure while loading a balance configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    /// A multiplier or duration must be finite and strictly positive.
    #[error("config field `{field}` must be finite and > 0")]
    Invalid { field: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incompatible_message_names_both_versions() {
        let e = SnapshotError::Incompatible { saved: 0, min: 1 };
        let msg = e.to_string();
        assert!(msg.contains('0') && msg.contains('1'), "got: {}", msg);
    }

    #[test]
    fn parse_error_converts_from_serde() {
        let err = serde_json::from_str::<u32>("nope").unwrap_err();
        let e: SnapshotError = err.into();
        assert!(matches!(e, SnapshotError::Parse(_)));
    }
}
