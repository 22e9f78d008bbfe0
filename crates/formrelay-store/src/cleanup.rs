//! Periodic removal of expired records
//!
//! Expired records are never served, but the memory store only drops them
//! lazily. A [`StoreCleanupTask`] sweeps on a fixed interval so abandoned
//! redirects do not pile up.
//!
//! ## Example
//!
//! ```rust
//! use formrelay_store::{MemoryTransientStore, StoreCleanupTask};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let store = Arc::new(MemoryTransientStore::new());
//! let cleanup = StoreCleanupTask::new(Arc::clone(&store), Duration::from_secs(60));
//!
//! // Run once by hand, or `cleanup.spawn()` to sweep in the background
//! assert_eq!(cleanup.run_cleanup(), 0);
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::memory::MemoryTransientStore;

/// Background sweeper for a [`MemoryTransientStore`]
#[derive(Debug, Clone)]
pub struct StoreCleanupTask {
	store: Arc<MemoryTransientStore>,
	interval: Duration,
}

impl StoreCleanupTask {
	pub fn new(store: Arc<MemoryTransientStore>, interval: Duration) -> Self {
		Self { store, interval }
	}

	pub fn interval(&self) -> Duration {
		self.interval
	}

	/// Sweep once, returning how many records were removed
	pub fn run_cleanup(&self) -> usize {
		let removed = self.store.cleanup();
		if removed > 0 {
			tracing::debug!(removed, "removed expired transient records");
		}
		removed
	}

	/// Sweep every `interval` until the handle is aborted
	///
	/// Must be called from within a tokio runtime.
	pub fn spawn(self) -> JoinHandle<()> {
		// tokio rejects a zero period
		let period = self.interval.max(Duration::from_millis(1));
		tokio::spawn(async move {
			let mut ticker = tokio::time::interval(period);
			// The first tick completes immediately
			ticker.tick().await;
			loop {
				ticker.tick().await;
				self.run_cleanup();
			}
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::store::TransientStore;
	use crate::token::SessionToken;
	use rstest::rstest;

	async fn store_with_expired(count: usize) -> Arc<MemoryTransientStore> {
		let store = Arc::new(MemoryTransientStore::new());
		for _ in 0..count {
			store
				.write(&SessionToken::generate(), "x".to_string(), Duration::ZERO)
				.await
				.unwrap();
		}
		store
	}

	#[rstest]
	#[tokio::test]
	async fn test_run_cleanup_reports_removed_count() {
		let store = store_with_expired(4).await;
		let cleanup = StoreCleanupTask::new(Arc::clone(&store), Duration::from_secs(60));

		assert_eq!(cleanup.run_cleanup(), 4);
		assert!(store.is_empty());
	}

	#[rstest]
	#[tokio::test]
	async fn test_spawned_task_sweeps_periodically() {
		// Arrange
		let store = store_with_expired(2).await;
		let cleanup = StoreCleanupTask::new(Arc::clone(&store), Duration::from_millis(10));

		// Act
		let handle = cleanup.spawn();
		tokio::time::sleep(Duration::from_millis(100)).await;
		handle.abort();

		// Assert
		assert!(store.is_empty());
	}
}
