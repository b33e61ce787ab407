mod embedding_error;
mod hierarchy_error;
mod provider_error;
mod retrieval_error;
mod storage_error;
mod strata_error;

pub use embedding_error::EmbeddingError;
pub use hierarchy_error::HierarchyError;
pub use provider_error::ProviderError;
pub use retrieval_error::RetrievalError;
pub use storage_error::StorageError;
pub use strata_error::{StrataError, StrataResult};
