use formrelay_core::exception::Error;

/// Transient store failures
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
	#[error("Store connection error: {0}")]
	Connection(String),
	#[error("Store backend error: {0}")]
	Backend(String),
}

impl From<StoreError> for Error {
	fn from(err: StoreError) -> Self {
		Error::Persistence(err.to_string())
	}
}
