pub mod collection_ext;
pub mod error;
pub mod fingerprint;

pub use collection_ext::unique_ordered;
pub use error::{ApiError, ApiResult, ErrorKind};
pub use fingerprint::fingerprint;
