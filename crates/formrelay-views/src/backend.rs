//! Store selection from settings

use formrelay_conf::RelaySettings;
use formrelay_core::exception::Result;
use formrelay_store::{MemoryTransientStore, StoreCleanupTask, TransientStore};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// An opened transient store and, for the memory backend, its sweeper
pub struct StoreBackend {
	pub store: Arc<dyn TransientStore>,
	pub cleanup: Option<JoinHandle<()>>,
}

impl StoreBackend {
	/// Stop the sweeper, if one is running
	pub fn shutdown(&mut self) {
		if let Some(handle) = self.cleanup.take() {
			handle.abort();
		}
	}
}

impl Drop for StoreBackend {
	fn drop(&mut self) {
		self.shutdown();
	}
}

/// Open the store described by `settings`
///
/// With `redis_url` set this connects to Redis; otherwise a memory store is
/// created and swept every `cleanup_interval_secs`. Must be called from
/// within a tokio runtime.
pub async fn open_store(settings: &RelaySettings) -> Result<StoreBackend> {
	if let Some(url) = settings.redis_url.as_deref() {
		return open_redis(url, settings).await;
	}

	let store = Arc::new(MemoryTransientStore::new());
	let cleanup = StoreCleanupTask::new(Arc::clone(&store), settings.cleanup_interval()).spawn();
	tracing::debug!(
		interval_secs = settings.cleanup_interval_secs,
		"using in-memory transient store"
	);
	Ok(StoreBackend {
		store,
		cleanup: Some(cleanup),
	})
}

#[cfg(feature = "redis-backend")]
async fn open_redis(url: &str, settings: &RelaySettings) -> Result<StoreBackend> {
	let store = formrelay_store::RedisTransientStore::connect(url)
		.await?
		.with_key_prefix(settings.key_prefix.as_str());
	tracing::debug!("using Redis transient store");
	Ok(StoreBackend {
		store: Arc::new(store),
		cleanup: None,
	})
}

#[cfg(not(feature = "redis-backend"))]
async fn open_redis(_url: &str, _settings: &RelaySettings) -> Result<StoreBackend> {
	Err(formrelay_core::exception::Error::Configuration(
		"redis_url is set but the redis-backend feature is disabled".to_string(),
	))
}

#[cfg(test)]
mod tests {
	use super::*;
	use formrelay_core::exception::Error;
	use formrelay_store::SessionToken;
	use rstest::rstest;

	#[rstest]
	#[tokio::test]
	async fn test_memory_store_by_default() {
		// Arrange
		let settings = RelaySettings::default();

		// Act
		let mut backend = open_store(&settings).await.unwrap();

		// Assert
		assert!(backend.cleanup.is_some());
		let token = SessionToken::generate();
		backend
			.store
			.write(&token, "x".to_string(), settings.record_ttl())
			.await
			.unwrap();
		assert_eq!(backend.store.take(&token).await.unwrap(), Some("x".to_string()));
		backend.shutdown();
		assert!(backend.cleanup.is_none());
	}

	#[cfg(not(feature = "redis-backend"))]
	#[rstest]
	#[tokio::test]
	async fn test_redis_url_without_feature_is_a_configuration_error() {
		let settings = RelaySettings {
			redis_url: Some("redis://127.0.0.1/".to_string()),
			..Default::default()
		};

		let result = open_store(&settings).await;

		assert!(matches!(result, Err(Error::Configuration(_))));
	}
}
