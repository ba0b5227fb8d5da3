//! Error types for the execution engine.

use momentum_abi::AbiError;
use momentum_primitives::PrimitiveError;
use momentum_storage::StorageError;
use thiserror::Error;

/// Result type for engine operations.
pub type VmResult<T> = Result<T, VmError>;

/// Errors raised while metering, validating, applying or generating blocks.
///
/// Contract-logic errors returned from an embedded method during a receive
/// are recorded on the ledger; internal errors (see [`VmError::is_internal`])
/// are converted to [`VmError::EngineFault`] by the supervisor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VmError {
    // --- codec and structure ---
    #[error(transparent)]
    Abi(#[from] AbiError),

    #[error(transparent)]
    Primitive(#[from] PrimitiveError),

    #[error("invalid block hash")]
    InvalidBlockHash,

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("chain identifier mismatch: expected {expected}, got {actual}")]
    ChainIdentifierMismatch { expected: u64, actual: u64 },

    #[error("invalid height: expected {expected}, got {actual}")]
    InvalidHeight { expected: u64, actual: u64 },

    #[error("previous hash does not match the account frontier")]
    InvalidPreviousHash,

    #[error("acknowledged momentum not found")]
    MomentumNotFound,

    #[error("contract blocks cannot be submitted directly")]
    ContractBlockNotAllowed,

    #[error("payload is not canonically encoded")]
    NonCanonicalPayload,

    #[error("payload too big")]
    PayloadTooBig,

    #[error("invalid token or amount")]
    InvalidTokenOrAmount,

    // --- plasma admission ---
    #[error("forbidden parameter")]
    ForbiddenParam,

    #[error("not enough plasma: fused {fused}, available {available}")]
    NotEnoughPlasma { fused: u64, available: u64 },

    #[error("not enough total plasma: total {total}, base {base}")]
    NotEnoughTotalPlasma { total: u64, base: u64 },

    #[error("block plasma limit reached: {total}")]
    BlockPlasmaLimitReached { total: u64 },

    #[error("declared plasma does not match: base {declared_base}/{base}, total {declared_total}/{total}")]
    PlasmaMismatch {
        declared_base: u64,
        base: u64,
        declared_total: u64,
        total: u64,
    },

    #[error("invalid proof-of-work nonce")]
    InvalidNonce,

    #[error("insufficient balance")]
    InsufficientBalance,

    // --- embedded registry ---
    #[error("not a contract address")]
    NotContractAddress,

    #[error("contract doesn't exist")]
    ContractDoesntExist,

    #[error("contract method not found")]
    ContractMethodNotFound,

    // --- receives ---
    #[error("send block not found")]
    SendBlockNotFound,

    #[error("send block targets another account")]
    ReceiverMismatch,

    #[error("send block already received")]
    AlreadyReceived,

    #[error("contract receive does not match regeneration: {0}")]
    ReceiveMismatch(String),

    #[error("nothing to receive")]
    NothingToReceive,

    #[error("receive out of order: next pending send is {expected}")]
    OutOfOrderReceive { expected: String },

    #[error("invalid descendant block: {0}")]
    InvalidDescendant(String),

    // --- momentums ---
    #[error("invalid momentum: {0}")]
    InvalidMomentum(String),

    #[error("block {0} not found")]
    BlockNotFound(String),

    #[error("block {0} already confirmed")]
    AlreadyConfirmed(String),

    #[error("predecessor of block {0} is not confirmed")]
    PredecessorNotConfirmed(String),

    #[error("genesis already applied")]
    GenesisAlreadyApplied,

    // --- contract logic ---
    #[error("permission denied")]
    PermissionDenied,

    #[error("data non existent")]
    DataNonExistent,

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("fusion entry not yet expired")]
    FusionNotExpired,

    // --- internal ---
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("internal fault: {0}")]
    Internal(String),

    #[error("engine fault: {0}")]
    EngineFault(String),
}

impl VmError {
    /// Unexpected faults: storage failures and broken invariants.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            VmError::Storage(_) | VmError::Internal(_) | VmError::EngineFault(_)
        )
    }

    pub fn internal(message: impl Into<String>) -> Self {
        VmError::Internal(message.into())
    }

    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        VmError::InvalidArguments(message.into())
    }

    pub fn invalid_momentum(message: impl Into<String>) -> Self {
        VmError::InvalidMomentum(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_classification() {
        assert!(VmError::Storage(StorageError::backend("io")).is_internal());
        assert!(VmError::internal("negative plasma").is_internal());
        assert!(!VmError::PermissionDenied.is_internal());
        assert!(!VmError::ContractMethodNotFound.is_internal());
        assert!(!VmError::Abi(AbiError::EmptyInput).is_internal());
    }

    #[test]
    fn test_display_is_recordable() {
        assert_eq!(VmError::PermissionDenied.to_string(), "permission denied");
        assert_eq!(VmError::Abi(AbiError::EmptyInput).to_string(), "abi: empty input");
    }
}
