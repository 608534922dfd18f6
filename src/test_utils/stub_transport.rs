use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::constants::METADATA_STORE;
use crate::Response;
use crate::TransportError;
use crate::Version;
use crate::VersionedValue;

use super::SAMPLE_CLUSTER_XML;
use super::SAMPLE_STORES_XML;

/// Scripted transport for connection-manager and client tests.
///
/// Backed by shared state so a test can keep a clone and re-script
/// behavior (refuse a node, flag the next response) while the client
/// owns the stub. Every connect target and data operation is recorded.
#[derive(Clone)]
pub struct StubTransport {
    state: Arc<Mutex<StubState>>,
}

struct StubState {
    refused: HashMap<String, bool>,
    default_accept: bool,
    stores: HashMap<String, HashMap<Vec<u8>, Vec<VersionedValue>>>,
    flagged: VecDeque<String>,
    connects: Vec<String>,
    ops: Vec<String>,
    active: Option<String>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(StubState {
                refused: HashMap::new(),
                default_accept: true,
                stores: HashMap::new(),
                flagged: VecDeque::new(),
                connects: Vec::new(),
                ops: Vec::new(),
                active: None,
            })),
        }
    }

    /// Stub preloaded with the sample descriptors on the metadata store.
    pub fn with_sample_cluster() -> Self {
        let stub = Self::new();
        stub.insert_versions(
            METADATA_STORE,
            b"cluster.xml",
            vec![VersionedValue::new(SAMPLE_CLUSTER_XML, Version::with_timestamp(1))],
        );
        stub.insert_versions(
            METADATA_STORE,
            b"stores.xml",
            vec![VersionedValue::new(SAMPLE_STORES_XML, Version::with_timestamp(1))],
        );
        stub
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StubState> {
        self.state.lock().unwrap()
    }

    /// Refuse future connects to `host:port`.
    pub fn refuse(
        &self,
        address: &str,
    ) {
        self.lock().refused.insert(address.to_string(), true);
    }

    /// Accept future connects to `host:port` again.
    pub fn accept(
        &self,
        address: &str,
    ) {
        self.lock().refused.insert(address.to_string(), false);
    }

    /// Default outcome for addresses with no explicit script.
    pub fn set_default_accept(
        &self,
        accept: bool,
    ) {
        self.lock().default_accept = accept;
    }

    /// Replace the version set stored for `key`.
    pub fn insert_versions(
        &self,
        store: &str,
        key: &[u8],
        versions: Vec<VersionedValue>,
    ) {
        self.lock()
            .stores
            .entry(store.to_string())
            .or_default()
            .insert(key.to_vec(), versions);
    }

    /// Flag the next data response with `message`.
    pub fn flag_next(
        &self,
        message: &str,
    ) {
        self.lock().flagged.push_back(message.to_string());
    }

    /// Every connect target so far, in order.
    pub fn connects(&self) -> Vec<String> {
        self.lock().connects.clone()
    }

    pub fn connect_count(&self) -> usize {
        self.lock().connects.len()
    }

    /// Every data operation so far, as `op store key` lines.
    pub fn ops(&self) -> Vec<String> {
        self.lock().ops.clone()
    }

    /// Target of the last successful connect.
    pub fn active_target(&self) -> Option<String> {
        self.lock().active.clone()
    }

    fn next_response(
        state: &mut StubState,
        reads: Option<(&str, Vec<Vec<u8>>)>,
    ) -> Response {
        if let Some(message) = state.flagged.pop_front() {
            return Response::flagged(message);
        }
        match reads {
            Some((store, keys)) => {
                let mut map = HashMap::new();
                if let Some(data) = state.stores.get(store) {
                    for key in keys {
                        if let Some(versions) = data.get(&key) {
                            map.insert(key, versions.clone());
                        }
                    }
                }
                Response::with_versions(map)
            }
            None => Response::ok(),
        }
    }
}

impl Default for StubTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl crate::Transport for StubTransport {
    async fn connect(
        &mut self,
        host: &str,
        port: u16,
    ) -> bool {
        let address = format!("{host}:{port}");
        let mut state = self.lock();
        state.connects.push(address.clone());
        let accepted = !state
            .refused
            .get(&address)
            .copied()
            .unwrap_or(!state.default_accept);
        if accepted {
            state.active = Some(address);
        }
        accepted
    }

    async fn disconnect(&mut self) {
        self.lock().active = None;
    }

    async fn get(
        &mut self,
        store: &str,
        key: &[u8],
        _routed: bool,
    ) -> Result<Response, TransportError> {
        let mut state = self.lock();
        state
            .ops
            .push(format!("get {store} {}", String::from_utf8_lossy(key)));
        Ok(Self::next_response(&mut state, Some((store, vec![key.to_vec()]))))
    }

    async fn get_all(
        &mut self,
        store: &str,
        keys: &[Vec<u8>],
        _routed: bool,
    ) -> Result<Response, TransportError> {
        let mut state = self.lock();
        state.ops.push(format!("get_all {store} {} keys", keys.len()));
        Ok(Self::next_response(&mut state, Some((store, keys.to_vec()))))
    }

    async fn put(
        &mut self,
        store: &str,
        key: &[u8],
        value: &[u8],
        version: Option<Version>,
        _route: bool,
    ) -> Result<Response, TransportError> {
        let mut state = self.lock();
        state
            .ops
            .push(format!("put {store} {}", String::from_utf8_lossy(key)));
        if let Some(message) = state.flagged.pop_front() {
            return Ok(Response::flagged(message));
        }
        let stored = VersionedValue::new(value, version.unwrap_or_default());
        state
            .stores
            .entry(store.to_string())
            .or_default()
            .insert(key.to_vec(), vec![stored]);
        Ok(Response::ok())
    }

    async fn delete(
        &mut self,
        store: &str,
        key: &[u8],
    ) -> Result<Response, TransportError> {
        let mut state = self.lock();
        state
            .ops
            .push(format!("delete {store} {}", String::from_utf8_lossy(key)));
        if let Some(message) = state.flagged.pop_front() {
            return Ok(Response::flagged(message));
        }
        if let Some(data) = state.stores.get_mut(store) {
            data.remove(key);
        }
        Ok(Response::ok())
    }
}
