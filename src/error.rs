//! Node-level error type.

use momentum_storage::StorageError;
use momentum_vm::VmError;
use thiserror::Error;

pub type NodeResult<T> = Result<T, NodeError>;

#[derive(Error, Debug)]
pub enum NodeError {
    #[error(transparent)]
    Vm(#[from] VmError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
