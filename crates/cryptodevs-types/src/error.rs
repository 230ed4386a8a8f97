use serde::Serialize;

/// Failure classes surfaced to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Wallet connect or transaction signing declined by the user.
    UserRejected,
    NetworkMismatch,
    /// Transport, JSON-RPC or ABI decoding failure.
    Rpc,
    /// Transaction mined (or simulated) and rejected by the contract.
    Reverted,
    /// A state-changing call is already awaiting confirmation.
    Busy,
    Config,
}

impl FailureKind {
    /// Whether the user should be shown a blocking notice.
    pub fn is_blocking(self) -> bool {
        matches!(self, Self::NetworkMismatch)
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::UserRejected => "user_rejected",
            Self::NetworkMismatch => "network_mismatch",
            Self::Rpc => "rpc",
            Self::Reverted => "reverted",
            Self::Busy => "busy",
            Self::Config => "config",
        };
        f.write_str(s)
    }
}
