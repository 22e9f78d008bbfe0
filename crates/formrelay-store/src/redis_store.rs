//! Redis transient store
//!
//! Records are plain strings under `{key_prefix}{token}`, written with
//! `SET .. EX` and consumed with `GETDEL` so two concurrent loads cannot both
//! see the same record.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use std::time::Duration;

use crate::error::StoreError;
use crate::store::TransientStore;
use crate::token::SessionToken;

/// Transient store backed by Redis
#[derive(Clone)]
pub struct RedisTransientStore {
	connection: ConnectionManager,
	key_prefix: String,
}

impl RedisTransientStore {
	/// Connect to `url` (e.g. `redis://127.0.0.1/`)
	pub async fn connect(url: &str) -> Result<Self, StoreError> {
		let client = redis::Client::open(url)
			.map_err(|e| StoreError::Connection(format!("Invalid Redis URL: {}", e)))?;
		let connection = client
			.get_connection_manager()
			.await
			.map_err(|e| StoreError::Connection(format!("Failed to connect to Redis: {}", e)))?;

		Ok(Self::from_connection(connection))
	}

	/// Wrap an existing connection manager
	pub fn from_connection(connection: ConnectionManager) -> Self {
		Self {
			connection,
			key_prefix: String::new(),
		}
	}

	pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.key_prefix = prefix.into();
		self
	}

	fn build_key(&self, token: &SessionToken) -> String {
		format!("{}{}", self.key_prefix, token.as_str())
	}
}

#[async_trait]
impl TransientStore for RedisTransientStore {
	async fn write(
		&self,
		token: &SessionToken,
		payload: String,
		ttl: Duration,
	) -> Result<(), StoreError> {
		let mut conn = self.connection.clone();
		// EX must be at least one second
		let seconds = ttl.as_secs().max(1);
		redis::cmd("SET")
			.arg(self.build_key(token))
			.arg(payload)
			.arg("EX")
			.arg(seconds)
			.query_async::<()>(&mut conn)
			.await
			.map_err(|e| StoreError::Backend(format!("Failed to write record: {}", e)))
	}

	async fn read(&self, token: &SessionToken) -> Result<Option<String>, StoreError> {
		let mut conn = self.connection.clone();
		redis::cmd("GET")
			.arg(self.build_key(token))
			.query_async::<Option<String>>(&mut conn)
			.await
			.map_err(|e| StoreError::Backend(format!("Failed to read record: {}", e)))
	}

	async fn delete(&self, token: &SessionToken) -> Result<(), StoreError> {
		let mut conn = self.connection.clone();
		redis::cmd("DEL")
			.arg(self.build_key(token))
			.query_async::<()>(&mut conn)
			.await
			.map_err(|e| StoreError::Backend(format!("Failed to delete record: {}", e)))
	}

	async fn take(&self, token: &SessionToken) -> Result<Option<String>, StoreError> {
		let mut conn = self.connection.clone();
		redis::cmd("GETDEL")
			.arg(self.build_key(token))
			.query_async::<Option<String>>(&mut conn)
			.await
			.map_err(|e| StoreError::Backend(format!("Failed to take record: {}", e)))
	}
}
