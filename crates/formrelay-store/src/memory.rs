//! In-process transient store

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crate::error::StoreError;
use crate::store::TransientStore;
use crate::token::SessionToken;

#[derive(Debug, Clone)]
struct Entry {
	payload: String,
	expires_at: Instant,
}

impl Entry {
	fn is_live(&self, now: Instant) -> bool {
		now < self.expires_at
	}
}

/// Transient store backed by a process-local map
///
/// Records are lost on restart, which is acceptable for data that lives for
/// one redirect. Expired records are never returned; they are dropped
/// lazily once the map grows past a threshold, or by [`cleanup`].
///
/// [`cleanup`]: MemoryTransientStore::cleanup
///
/// # Examples
///
/// ```
/// use formrelay_store::{MemoryTransientStore, SessionToken, TransientStore};
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() {
/// let store = MemoryTransientStore::new();
/// let token = SessionToken::generate();
///
/// store.write(&token, "{}".to_string(), Duration::from_secs(60)).await.unwrap();
/// assert_eq!(store.take(&token).await.unwrap(), Some("{}".to_string()));
/// assert_eq!(store.take(&token).await.unwrap(), None);
/// # }
/// ```
#[derive(Debug)]
pub struct MemoryTransientStore {
	entries: RwLock<HashMap<String, Entry>>,
	cleanup_threshold: AtomicUsize,
}

impl Default for MemoryTransientStore {
	fn default() -> Self {
		Self::new()
	}
}

impl MemoryTransientStore {
	/// Map size above which a write first drops expired records
	pub const DEFAULT_CLEANUP_THRESHOLD: usize = 10_000;

	pub fn new() -> Self {
		Self {
			entries: RwLock::new(HashMap::new()),
			cleanup_threshold: AtomicUsize::new(Self::DEFAULT_CLEANUP_THRESHOLD),
		}
	}

	pub fn with_cleanup_threshold(self, threshold: usize) -> Self {
		self.cleanup_threshold.store(threshold, Ordering::Relaxed);
		self
	}

	/// Drop expired records, returning how many were removed
	pub fn cleanup(&self) -> usize {
		let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
		let before = entries.len();
		let now = Instant::now();
		entries.retain(|_, entry| entry.is_live(now));
		before - entries.len()
	}

	/// Number of stored records, expired ones included
	pub fn len(&self) -> usize {
		let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
		entries.len()
	}

	pub fn is_empty(&self) -> bool {
		let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
		entries.is_empty()
	}

	pub fn clear(&self) {
		let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
		entries.clear();
	}
}

#[async_trait]
impl TransientStore for MemoryTransientStore {
	async fn write(
		&self,
		token: &SessionToken,
		payload: String,
		ttl: Duration,
	) -> Result<(), StoreError> {
		let now = Instant::now();
		let expires_at = now
			.checked_add(ttl)
			.ok_or_else(|| StoreError::Backend(format!("record TTL {:?} is out of range", ttl)))?;

		let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
		entries.insert(
			token.as_str().to_string(),
			Entry {
				payload,
				expires_at,
			},
		);

		let threshold = self.cleanup_threshold.load(Ordering::Relaxed);
		if entries.len() > threshold {
			entries.retain(|_, entry| entry.is_live(now));
		}
		Ok(())
	}

	async fn read(&self, token: &SessionToken) -> Result<Option<String>, StoreError> {
		let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
		let now = Instant::now();
		Ok(entries
			.get(token.as_str())
			.filter(|entry| entry.is_live(now))
			.map(|entry| entry.payload.clone()))
	}

	async fn delete(&self, token: &SessionToken) -> Result<(), StoreError> {
		let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
		entries.remove(token.as_str());
		Ok(())
	}

	async fn take(&self, token: &SessionToken) -> Result<Option<String>, StoreError> {
		let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
		let now = Instant::now();
		Ok(entries
			.remove(token.as_str())
			.filter(|entry| entry.is_live(now))
			.map(|entry| entry.payload))
	}
}
