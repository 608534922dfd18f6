//! Transport abstraction layer
//!
//! The client never touches a socket itself. Everything on the wire goes
//! through [`Transport`], the collaborator that owns connection state,
//! frame serialization and its own deadlines. The connection manager
//! drives it through this narrow contract and nothing else.

use std::collections::HashMap;

#[cfg(test)]
use mockall::automock;

use async_trait::async_trait;

use crate::TransportError;
use crate::Version;
use crate::VersionedValue;

/// Wire collaborator for one node connection at a time.
///
/// `connect` re-targets the live connection; an implementation drops any
/// previous link when a new one is established. Data operations run
/// against whichever node accepted the last successful `connect`.
///
/// Two failure channels exist and they are not interchangeable: an `Err`
/// is an I/O-level transport failure, while an error-flagged [`Response`]
/// is a server-reported failure and is what drives the forced-reconnect
/// path in the connection manager.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Attempts to connect to one node. `true` on success.
    async fn connect(
        &mut self,
        host: &str,
        port: u16,
    ) -> bool;

    /// Drops the active connection, if any.
    async fn disconnect(&mut self);

    /// Reads every stored version of `key` from `store`.
    async fn get(
        &mut self,
        store: &str,
        key: &[u8],
        routed: bool,
    ) -> Result<Response, TransportError>;

    /// Batched read over `keys`.
    async fn get_all(
        &mut self,
        store: &str,
        keys: &[Vec<u8>],
        routed: bool,
    ) -> Result<Response, TransportError>;

    /// Writes `value` under `key`, optionally against an explicit version.
    async fn put(
        &mut self,
        store: &str,
        key: &[u8],
        value: &[u8],
        version: Option<Version>,
        route: bool,
    ) -> Result<Response, TransportError>;

    /// Deletes `key` from `store`.
    async fn delete(
        &mut self,
        store: &str,
        key: &[u8],
    ) -> Result<Response, TransportError>;
}

/// Outcome of one transport operation.
///
/// Carries the server-side error flag and, for reads, the per-key version
/// sets. Writes come back with an empty version map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    error: Option<String>,
    versions: HashMap<Vec<u8>, Vec<VersionedValue>>,
}

impl Response {
    /// Successful response with no payload.
    pub fn ok() -> Self {
        Self::default()
    }

    /// Successful read response.
    pub fn with_versions(versions: HashMap<Vec<u8>, Vec<VersionedValue>>) -> Self {
        Self {
            error: None,
            versions,
        }
    }

    /// Error-flagged response with the server's message.
    pub fn flagged(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            versions: HashMap::new(),
        }
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Server error message when the response is flagged.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Versions stored for `key`, empty when the key is absent.
    pub fn versions_for(
        &self,
        key: &[u8],
    ) -> &[VersionedValue] {
        self.versions.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Consumes the response, yielding the per-key version sets.
    pub fn take_versions(self) -> HashMap<Vec<u8>, Vec<VersionedValue>> {
        self.versions
    }
}
