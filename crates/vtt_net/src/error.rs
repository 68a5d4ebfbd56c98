//! Network-layer error types.

/// Errors that can occur in the synchronization layer.
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    /// Failed to encode a message to JSON.
    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),

    /// Failed to decode a message from JSON.
    #[error("failed to decode message: {0}")]
    Decode(#[source] serde_json::Error),

    /// A delta was applied against the wrong base snapshot. The only
    /// recovery is a full resync.
    #[error("delta base seq {got} does not match snapshot seq {expected}")]
    StaleDelta {
        /// The snapshot's sequence number.
        expected: u64,
        /// The delta's base sequence number.
        got: u64,
    },

    /// The transport is no longer open; the send was dropped.
    #[error("transport closed")]
    Closed,
}
