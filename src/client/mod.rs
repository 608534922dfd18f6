//! Client facade for the partitioned key-value store
//!
//! Composes the connection manager and the conflict resolver behind the
//! small API application code calls:
//! - [`Client`] - get / get_all / put / delete against the bound store
//! - [`ClientBuilder`] - configurable construction, bootstraps on build
//!
//! # Basic Usage
//! ```rust,ignore
//! use vkv_client::ClientBuilder;
//!
//! let client = ClientBuilder::new("inventory", vec!["n1:6666".into(), "n2:6667".into()])
//!     .request_limit_per_node(200)
//!     .build(transport)
//!     .await?;
//!
//! client.put("widget", "7 in stock").await?;
//! let value = client.get("widget").await?;
//! ```

mod builder;

pub use builder::*;


use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::ConflictResolver;
use crate::ConnectionManager;
use crate::Error;
use crate::Response;
use crate::Result;
use crate::Transport;
use crate::Version;

/// Handle to one store of the cluster.
///
/// Reads pass through the conflict resolver, so callers see one value
/// per key even when writers raced; writes pass straight through. The
/// manager behind the facade is one mutable unit, so every operation
/// takes one lock for its whole check-rebalance-forward sequence. A
/// caller whose request triggers a rebalance pays the reconnect latency
/// inside its own call.
pub struct Client<T> {
    manager: Mutex<ConnectionManager<T>>,
    resolver: Arc<dyn ConflictResolver>,
}

impl<T: Transport> Client<T> {
    pub(crate) fn new(
        manager: ConnectionManager<T>,
        resolver: Arc<dyn ConflictResolver>,
    ) -> Self {
        Self {
            manager: Mutex::new(manager),
            resolver,
        }
    }

    /// Retrieves the resolved value for `key`.
    ///
    /// # Returns
    /// - `Ok(Some(value))` when the key exists, conflicts resolved
    /// - `Ok(None)` when the key is absent
    ///
    /// # Errors
    /// - [`Error::NotConnected`] before a successful bootstrap
    /// - [`Error::Server`] for an error-flagged response; the rotation
    ///   it triggered only benefits later requests
    pub async fn get(
        &self,
        key: impl AsRef<[u8]>,
    ) -> Result<Option<Vec<u8>>> {
        let key = key.as_ref();
        let response = {
            let mut manager = self.manager.lock().await;
            manager.get(key).await?
        };
        let response = reject_flagged(response)?;

        let versions = response.versions_for(key).to_vec();
        Ok(self.resolver.resolve(versions).map(|winner| winner.value))
    }

    /// Batched read; each key's version set resolves independently.
    ///
    /// Keys absent from the store are omitted from the returned map, not
    /// mapped to an empty value.
    pub async fn get_all(
        &self,
        keys: impl IntoIterator<Item = impl AsRef<[u8]>>,
    ) -> Result<HashMap<Vec<u8>, Vec<u8>>> {
        let keys: Vec<Vec<u8>> = keys.into_iter().map(|key| key.as_ref().to_vec()).collect();
        let response = {
            let mut manager = self.manager.lock().await;
            manager.get_all(&keys).await?
        };
        let response = reject_flagged(response)?;

        let mut values = HashMap::new();
        for (key, versions) in response.take_versions() {
            if let Some(winner) = self.resolver.resolve(versions) {
                values.insert(key, winner.value);
            }
        }
        Ok(values)
    }

    /// Stores `value` under `key`. No conflict resolution applies to
    /// writes.
    pub async fn put(
        &self,
        key: impl AsRef<[u8]>,
        value: impl AsRef<[u8]>,
    ) -> Result<()> {
        self.put_versioned(key, value, None).await
    }

    /// Stores `value` against an explicit version, for optimistic
    /// read-modify-write flows.
    pub async fn put_versioned(
        &self,
        key: impl AsRef<[u8]>,
        value: impl AsRef<[u8]>,
        version: Option<Version>,
    ) -> Result<()> {
        let response = {
            let mut manager = self.manager.lock().await;
            let route = manager.routed();
            manager.put(key.as_ref(), value.as_ref(), version, route).await?
        };
        reject_flagged(response)?;
        Ok(())
    }

    /// Deletes `key`.
    pub async fn delete(
        &self,
        key: impl AsRef<[u8]>,
    ) -> Result<()> {
        let response = {
            let mut manager = self.manager.lock().await;
            manager.delete(key.as_ref()).await?
        };
        reject_flagged(response)?;
        Ok(())
    }

    /// Drops the active connection and retires the client. Data
    /// operations after this fail with [`Error::NotConnected`].
    pub async fn close(&self) {
        self.manager.lock().await.terminate().await;
    }

    /// Runs `inspect` against the managed connection, for callers that
    /// want to observe the active node or request counter.
    pub async fn with_manager<R>(
        &self,
        inspect: impl FnOnce(&ConnectionManager<T>) -> R,
    ) -> R {
        let manager = self.manager.lock().await;
        inspect(&manager)
    }
}

/// An error-flagged response becomes the caller's error; the forced
/// reconnect has already been scheduled by the manager.
fn reject_flagged(response: Response) -> Result<Response> {
    match response.error() {
        Some(message) => Err(Error::Server(message.to_string())),
        None => Ok(response),
    }
}
