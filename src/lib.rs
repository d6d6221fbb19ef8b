pub mod aig;
pub mod cnf;
pub mod disbalance;
pub mod dot;
pub mod eqgates;
pub mod layering;
pub mod oracle;

// Re-exporting symbols and modules.
pub use aig::{Aig, AigError, AigNode, ConfigError, Feature, NodeId, ParserError, Ref, Result};
