// Service exports
pub mod cache;
pub mod oracle;
pub mod retry;
pub mod ucsc;

pub use cache::{CacheKey, WindowCache};
pub use oracle::{OracleError, RemoteOracle, ScoringOracle};
pub use retry::RetryPolicy;
pub use ucsc::{SequenceResponse, SequenceSource, UcscClient, UcscError};
