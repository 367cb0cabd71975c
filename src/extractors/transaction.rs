use axum::{extract::FromRequestParts, http::request::Parts};
use std::sync::Arc;
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};

use crate::AppError;

/// Per-request transaction lent to the handler by the transaction scope.
///
/// The scope keeps a clone and takes the transaction back once the handler
/// has produced its response.
pub struct TransactionHandle<T>(Arc<Mutex<Option<T>>>);

impl<T> Clone for TransactionHandle<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: Send> TransactionHandle<T> {
    pub fn new(tx: T) -> Self {
        Self(Arc::new(Mutex::new(Some(tx))))
    }

    pub async fn lock(&self) -> Result<MappedMutexGuard<'_, T>, AppError> {
        let guard = self.0.lock().await;
        MutexGuard::try_map(guard, |slot| slot.as_mut())
            .map_err(|_| AppError::Internal("Transaction already closed".to_string()))
    }

    pub async fn take(&self) -> Option<T> {
        self.0.lock().await.take()
    }
}

impl<S, T> FromRequestParts<S> for TransactionHandle<T>
where
    S: Send + Sync,
    T: Send + 'static,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TransactionHandle<T>>()
            .cloned()
            .ok_or_else(|| AppError::Internal("Route is not wrapped in a transaction scope".to_string()))
    }
}

/// Upload files written during the request. The transaction scope removes
/// them unless the transaction commits.
#[derive(Clone, Default)]
pub struct StagedUploads(Arc<Mutex<Vec<String>>>);

impl StagedUploads {
    pub async fn push(&self, name: String) {
        self.0.lock().await.push(name);
    }

    pub async fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock().await)
    }
}

impl<S> FromRequestParts<S> for StagedUploads
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<StagedUploads>()
            .cloned()
            .ok_or_else(|| AppError::Internal("Route is not wrapped in a transaction scope".to_string()))
    }
}
