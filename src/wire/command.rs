//! Protocol command identifiers.
//!
//! Every encoded frame opens with a single command-identifier byte; decoders
//! verify it against the command they expect before touching any field.

/// Wire protocol command, one byte on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    /// Session greeting.
    Hello = 0x00,
    /// Graceful disconnect notice.
    Disconnect = 0x01,
    /// Liveness probe.
    Ping = 0x02,
    /// Liveness reply.
    Pong = 0x03,
    /// Request known peers.
    GetPeers = 0x10,
    /// Known-peers reply.
    Peers = 0x11,
    /// Broadcast of pending transactions.
    Transactions = 0x12,
    /// Broadcast of blocks.
    Blocks = 0x13,
    /// Request pending transactions.
    GetTransactions = 0x16,
    /// Request a run of block hashes descending from a parent.
    GetBlockHashes = 0x17,
    /// Block-hashes reply.
    BlockHashes = 0x18,
    /// Request full blocks by hash.
    GetBlocks = 0x19,
}

impl Command {
    /// The identifier byte as it travels on the wire.
    #[inline]
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Maps an identifier byte back to a command, if known.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Command::Hello),
            0x01 => Some(Command::Disconnect),
            0x02 => Some(Command::Ping),
            0x03 => Some(Command::Pong),
            0x10 => Some(Command::GetPeers),
            0x11 => Some(Command::Peers),
            0x12 => Some(Command::Transactions),
            0x13 => Some(Command::Blocks),
            0x16 => Some(Command::GetTransactions),
            0x17 => Some(Command::GetBlockHashes),
            0x18 => Some(Command::BlockHashes),
            0x19 => Some(Command::GetBlocks),
            _ => None,
        }
    }

    /// Canonical wire-log name.
    pub fn name(self) -> &'static str {
        match self {
            Command::Hello => "HELLO",
            Command::Disconnect => "DISCONNECT",
            Command::Ping => "PING",
            Command::Pong => "PONG",
            Command::GetPeers => "GET_PEERS",
            Command::Peers => "PEERS",
            Command::Transactions => "TRANSACTIONS",
            Command::Blocks => "BLOCKS",
            Command::GetTransactions => "GET_TRANSACTIONS",
            Command::GetBlockHashes => "GET_BLOCK_HASHES",
            Command::BlockHashes => "BLOCK_HASHES",
            Command::GetBlocks => "GET_BLOCKS",
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
