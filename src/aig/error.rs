use std::fmt;

use thiserror::Error;

use super::NodeId;

/// The result of an AIG operation.
pub type Result<T> = std::result::Result<T, AigError>;

/// Error returned when building or analyzing an AIG failed.
#[derive(Debug, Error)]
pub enum AigError {
    /// Node ids must lie within `1..=max_index`.
    #[error("node id={id} is out of range 1..={max_index}")]
    IdOutOfRange { id: NodeId, max_index: NodeId },

    /// A different node with the given id already exists.
    #[error("a different node with id={0} already exists")]
    DuplicateId(NodeId),

    /// AND operands must reference strictly smaller ids than the gate itself.
    #[error("gate {gate} references operand {operand} which does not precede it")]
    OperandOutOfOrder { gate: NodeId, operand: NodeId },

    /// The header counts must account for every node id up to the maximum
    /// index, so `M == I + L + A`.
    #[error("header mismatch: max index is {max_index} but I+L+A={actual}")]
    HeaderCountMismatch { max_index: NodeId, actual: u64 },

    /// The number of provided input values must match the number of inputs.
    #[error("expected {expected} input values, got {got}")]
    InputCountMismatch { expected: usize, got: usize },

    /// Just forwarding a [`ParserError`].
    #[error("{0}")]
    Parser(#[from] ParserError),

    /// Just forwarding a [`ConfigError`].
    #[error("{0}")]
    Config(#[from] ConfigError),
}

/// Error returned when parsing AIGER input failed.
#[derive(Debug, Error)]
pub enum ParserError {
    /// The input uses a recognized format feature this crate deliberately
    /// does not implement. Distinct from [`ParserError::InvalidToken`] so
    /// callers can message it specifically.
    #[error("unsupported feature: {0}")]
    Unsupported(Feature),

    /// Invalid token, something else was expected.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// An IO error occured (file doesn't exist, or doesn't have the right extension, ...).
    #[error("io error: {0}")]
    Io(String),
}

/// Format features that are recognized but not implemented.
///
/// This is a closed set: every member is an explicit rejection, not a
/// silently skipped or partially parsed construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    /// The binary AIGER variant (`aig` header, `.aig` files).
    BinaryFormat,
    /// Latches (sequential circuits), i.e. a header with `L > 0`.
    Latches,
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feature::BinaryFormat => write!(f, "binary AIGER format"),
            Feature::Latches => write!(f, "latches"),
        }
    }
}

/// Error returned when an analysis pass is misconfigured.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The disbalance estimator needs at least one sample.
    #[error("sample size must be positive, got {0}")]
    NonPositiveSampleSize(u32),
}
