use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::error::StoreError;
use crate::token::SessionToken;

/// Key/value store ferrying one serialized record across one redirect
///
/// Each session has at most one record; writing replaces whatever was there.
/// Reading is expected to be followed by deletion, which [`take`] does in
/// one call.
///
/// [`take`]: TransientStore::take
#[async_trait]
pub trait TransientStore: Send + Sync {
	/// Store `payload` for `token`, replacing any unread record
	async fn write(
		&self,
		token: &SessionToken,
		payload: String,
		ttl: Duration,
	) -> Result<(), StoreError>;

	/// Current unexpired record for `token`
	async fn read(&self, token: &SessionToken) -> Result<Option<String>, StoreError>;

	/// Remove the record for `token`; missing records are not an error
	async fn delete(&self, token: &SessionToken) -> Result<(), StoreError>;

	/// Read and delete in one step
	///
	/// Backends that can do this atomically should override it. A record that
	/// was read is returned even when deleting it fails; the failure is logged
	/// and the record lingers until its TTL runs out.
	async fn take(&self, token: &SessionToken) -> Result<Option<String>, StoreError> {
		let Some(payload) = self.read(token).await? else {
			return Ok(None);
		};
		if let Err(e) = self.delete(token).await {
			tracing::warn!(
				token = %token.redacted(),
				error = %e,
				"failed to delete a consumed record"
			);
		}
		Ok(Some(payload))
	}
}

#[async_trait]
impl<T: TransientStore + ?Sized> TransientStore for Arc<T> {
	async fn write(
		&self,
		token: &SessionToken,
		payload: String,
		ttl: Duration,
	) -> Result<(), StoreError> {
		(**self).write(token, payload, ttl).await
	}

	async fn read(&self, token: &SessionToken) -> Result<Option<String>, StoreError> {
		(**self).read(token).await
	}

	async fn delete(&self, token: &SessionToken) -> Result<(), StoreError> {
		(**self).delete(token).await
	}

	async fn take(&self, token: &SessionToken) -> Result<Option<String>, StoreError> {
		(**self).take(token).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::sync::Mutex;

	/// Backend without an atomic `take` whose deletes can be made to fail
	#[derive(Default)]
	struct SplitStore {
		record: Mutex<Option<String>>,
		fail_deletes: bool,
		deletes: Mutex<usize>,
	}

	#[async_trait]
	impl TransientStore for SplitStore {
		async fn write(
			&self,
			_token: &SessionToken,
			payload: String,
			_ttl: Duration,
		) -> Result<(), StoreError> {
			*self.record.lock().unwrap() = Some(payload);
			Ok(())
		}

		async fn read(&self, _token: &SessionToken) -> Result<Option<String>, StoreError> {
			Ok(self.record.lock().unwrap().clone())
		}

		async fn delete(&self, _token: &SessionToken) -> Result<(), StoreError> {
			*self.deletes.lock().unwrap() += 1;
			if self.fail_deletes {
				return Err(StoreError::Backend("delete refused".to_string()));
			}
			*self.record.lock().unwrap() = None;
			Ok(())
		}
	}

	#[rstest]
	#[tokio::test]
	async fn test_default_take_reads_then_deletes() {
		// Arrange
		let store = SplitStore::default();
		let token = SessionToken::generate();
		store.write(&token, "r".to_string(), Duration::from_secs(60)).await.unwrap();

		// Act
		let first = store.take(&token).await.unwrap();
		let second = store.take(&token).await.unwrap();

		// Assert
		assert_eq!(first, Some("r".to_string()));
		assert_eq!(second, None);
		assert_eq!(*store.deletes.lock().unwrap(), 1);
	}

	#[rstest]
	#[tokio::test]
	async fn test_default_take_returns_record_when_delete_fails() {
		// Arrange
		let store = SplitStore {
			fail_deletes: true,
			..Default::default()
		};
		let token = SessionToken::generate();
		store.write(&token, "r".to_string(), Duration::from_secs(60)).await.unwrap();

		// Act
		let taken = store.take(&token).await;

		// Assert
		assert_eq!(taken.unwrap(), Some("r".to_string()));
		assert_eq!(*store.deletes.lock().unwrap(), 1);
	}

	#[rstest]
	#[tokio::test]
	async fn test_default_take_propagates_read_failure() {
		struct Offline;

		#[async_trait]
		impl TransientStore for Offline {
			async fn write(
				&self,
				_token: &SessionToken,
				_payload: String,
				_ttl: Duration,
			) -> Result<(), StoreError> {
				Ok(())
			}

			async fn read(&self, _token: &SessionToken) -> Result<Option<String>, StoreError> {
				Err(StoreError::Connection("offline".to_string()))
			}

			async fn delete(&self, _token: &SessionToken) -> Result<(), StoreError> {
				Ok(())
			}
		}

		let result = Offline.take(&SessionToken::generate()).await;

		assert!(matches!(result, Err(StoreError::Connection(_))));
	}
}
