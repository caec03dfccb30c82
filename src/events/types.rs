//! Payload types carried by [`Event`](crate::Event) variants.
//!
//! The bus treats all of these as opaque values: it never inspects or mutates
//! them, it only moves them into a dispatch task. They are thin summaries of
//! the node-side objects they stand for, cheap to clone and safe to share
//! across threads.

use bytes::Bytes;

/// A node found by discovery (not yet connected).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeHandle {
    /// Public node identifier (hex-encoded).
    pub id: String,
    /// Advertised host.
    pub host: String,
    /// Advertised listen port.
    pub port: u16,
}

/// Handle to an active peer connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerHandle {
    /// Public node identifier of the remote.
    pub node_id: String,
    /// Remote address as `host:port`.
    pub remote: String,
}

/// Summary of the handshake greeting received from a peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelloInfo {
    /// Negotiated p2p protocol version.
    pub p2p_version: u8,
    /// Remote client identifier string.
    pub client_id: String,
    /// Capabilities the remote advertised.
    pub capabilities: Vec<String>,
    /// Port the remote listens on.
    pub listen_port: u16,
}

/// Chain status advertised by a peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusInfo {
    /// Sub-protocol version.
    pub protocol_version: u8,
    /// Network the peer is on.
    pub network_id: u32,
    /// Total difficulty of the peer's best chain.
    pub total_difficulty: u128,
    /// Hash of the peer's best block.
    pub best_hash: Bytes,
}

/// Compact description of an imported block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSummary {
    /// Block number.
    pub number: u64,
    /// Block hash.
    pub hash: Bytes,
    /// Transactions included in the block.
    pub transactions: Vec<Transaction>,
}

/// Minimal transaction reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Transaction hash.
    pub hash: Bytes,
}

/// Execution receipt for a single transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    /// Hash of the executed transaction.
    pub tx_hash: Bytes,
    /// Whether execution succeeded.
    pub success: bool,
}

/// Where a pending transaction currently sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingTxState {
    /// Just arrived, not yet validated against the pending state.
    NewPending,
    /// Validated and waiting for inclusion.
    Pending,
    /// Included in a block.
    IncludedInBlock,
    /// Dropped from the pending set.
    Dropped,
}

/// Snapshot of the pending transaction set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PendingSnapshot {
    /// Transactions currently pending.
    pub pending: Vec<Transaction>,
}

/// Outcome summary of a transaction execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionSummary {
    /// Hash of the executed transaction.
    pub tx_hash: Bytes,
    /// Gas consumed by the execution.
    pub gas_used: u64,
    /// Whether the execution ended in failure.
    pub failed: bool,
}

/// How far long-range sync has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Blocks are imported without full validation of the ancient part.
    Unsecure,
    /// The chain below the pivot is validated.
    Secure,
    /// The node is fully synced and validates everything.
    Complete,
}
