//! Connection lifecycle and rebalancing
//!
//! One [`ConnectionManager`] owns one transport handle, the acquired
//! [`ClusterTopology`] and the request counter. It bootstraps from seed
//! addresses over the metadata channel, keeps exactly one node active at
//! a time, rotates the connection when a node has served its request
//! quota, and forces a rotation when a response comes back error-flagged.

use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::constants::CLUSTER_DESCRIPTOR_KEY;
use crate::constants::METADATA_STORE;
use crate::constants::PROTOCOL_VERSION;
use crate::constants::STORE_CATALOG_KEY;
use crate::topology;
use crate::BootstrapError;
use crate::ClientConfig;
use crate::ClusterTopology;
use crate::Error;
use crate::Node;
use crate::NodeSelector;
use crate::Response;
use crate::Result;
use crate::Transport;
use crate::Version;


/// Where the manager sits in its lifecycle.
///
/// Data operations are only permitted in `Connected`. The transient
/// rebalancing step inside `before_request` is not a stored state; it
/// begins and ends within the triggering call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    Bootstrapping,
    Connected,
    Terminated,
}

/// Runtime record of the managed connection.
///
/// Exactly one exists per manager and only the manager mutates it.
#[derive(Debug)]
pub struct ConnectionState {
    active_node: Option<Node>,
    request_count: u64,
    request_limit: u64,
    lifecycle: Lifecycle,
}

impl ConnectionState {
    fn new(request_limit: u64) -> Self {
        Self {
            active_node: None,
            request_count: 0,
            request_limit,
            lifecycle: Lifecycle::Uninitialized,
        }
    }

    /// Node currently serving requests, if any.
    pub fn active_node(&self) -> Option<&Node> {
        self.active_node.as_ref()
    }

    /// Requests served by the active node since it was connected.
    pub fn request_count(&self) -> u64 {
        self.request_count
    }

    /// Configured per-node request ceiling.
    pub fn request_limit(&self) -> u64 {
        self.request_limit
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }
}

/// Orchestrates bootstrap, the active connection and rebalancing.
///
/// The manager is a single mutable unit: callers sharing it across tasks
/// must serialize access behind one lock, which is exactly what
/// [`Client`](crate::Client) does. Every operation blocks its caller
/// until the transport completes or fails; a rebalance triggered by a
/// request is paid for by that request.
pub struct ConnectionManager<T> {
    transport: T,
    db_name: String,
    seeds: Vec<(String, u16)>,
    topology: Option<ClusterTopology>,
    selector: NodeSelector,
    state: ConnectionState,
    routed: bool,
}

impl<T: Transport> ConnectionManager<T> {
    /// Builds an unconnected manager bound to `db_name`.
    ///
    /// Seed addresses are validated here; connecting to them is
    /// [`bootstrap`](Self::bootstrap)'s job.
    pub fn new(
        db_name: impl Into<String>,
        seeds: Vec<String>,
        config: ClientConfig,
        transport: T,
    ) -> Result<Self> {
        let seeds = seeds
            .iter()
            .map(|addr| parse_seed(addr))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            transport,
            db_name: db_name.into(),
            seeds,
            topology: None,
            selector: NodeSelector::new(),
            state: ConnectionState::new(config.request_limit_per_node),
            routed: config.routed,
        })
    }

    /// Acquires the cluster topology and connects to a first node.
    ///
    /// Walks the seed addresses in order; the first seed that accepts a
    /// connection serves both the cluster descriptor and the
    /// store-catalog descriptor over the metadata channel. The catalog
    /// is fetched to prove the seed serves metadata; its content belongs
    /// to the transport layer and is discarded here. The parsed node set
    /// then replaces any previous topology and a random node is
    /// connected.
    ///
    /// # Errors
    ///
    /// [`BootstrapError`] when every seed is unreachable, the descriptor
    /// is malformed or empty, or no listed node accepts a connection.
    pub async fn bootstrap(&mut self) -> Result<&ClusterTopology> {
        self.state.lifecycle = Lifecycle::Bootstrapping;

        let cluster_xml = self.fetch_descriptors().await?;
        let nodes = topology::parse_cluster_descriptor(&cluster_xml).map_err(BootstrapError::Descriptor)?;
        if nodes.is_empty() {
            return Err(BootstrapError::EmptyTopology.into());
        }
        info!(nodes = nodes.len(), db_name = %self.db_name, "cluster topology acquired");

        self.topology = Some(ClusterTopology::new(self.db_name.clone(), nodes));

        if self.connect_to_random_node().await.is_none() {
            return Err(BootstrapError::NoNodeAvailable.into());
        }
        self.state.lifecycle = Lifecycle::Connected;

        self.topology.as_ref().ok_or(Error::NotConnected)
    }

    /// Walks the shuffled node set and activates the first node that
    /// accepts a connection, resetting the request counter. `None` when
    /// every candidate refuses; the caller decides whether that is
    /// fatal.
    pub async fn connect_to_random_node(&mut self) -> Option<Node> {
        let nodes = match &self.topology {
            Some(topology) => topology.nodes(),
            None => return None,
        };
        let candidates = self.selector.order_for_attempt(nodes);

        for node in candidates {
            debug!(host = %node.host, port = node.port, "attempting connection");
            if self.transport.connect(&node.host, node.port).await {
                info!(node_id = %node.id, host = %node.host, "connected");
                self.state.active_node = Some(node.clone());
                self.state.request_count = 0;
                return Some(node);
            }
        }
        None
    }

    /// Re-runs the random connect. When every candidate refuses, the
    /// previous connection is kept and the failure logged; only
    /// bootstrap treats exhaustion as fatal.
    pub async fn reconnect(&mut self) {
        if self.connect_to_random_node().await.is_none() {
            warn!("no cluster node accepted a connection; keeping the previous one");
        }
    }

    /// True once the active node has served its request quota.
    pub fn should_rebalance(&self) -> bool {
        self.state.request_count >= self.state.request_limit
    }

    /// Gate run before every counted data operation.
    ///
    /// The rebalance check reads the pre-increment count, so the request
    /// that trips the limit is itself served by the fresh connection and
    /// restarts the counter as its first request.
    pub async fn before_request(&mut self) -> Result<()> {
        self.ensure_connected()?;
        if self.should_rebalance() {
            debug!(
                count = self.state.request_count,
                limit = self.state.request_limit,
                "request quota reached, rotating connection"
            );
            self.reconnect().await;
        }
        self.state.request_count += 1;
        Ok(())
    }

    /// Forces a rotation when a response is error-flagged, regardless of
    /// the request counter. The flagged response itself still goes back
    /// to the caller; only future requests see the new connection.
    pub async fn reconnect_on_error(
        &mut self,
        response: &Response,
    ) {
        if response.has_error() {
            warn!(
                error = response.error().unwrap_or(""),
                "error-flagged response, rotating connection"
            );
            self.reconnect().await;
        }
    }

    /// Reads every stored version of `key`.
    pub async fn get(
        &mut self,
        key: &[u8],
    ) -> Result<Response> {
        self.before_request().await?;
        let response = self.transport.get(&self.db_name, key, self.routed).await?;
        self.reconnect_on_error(&response).await;
        Ok(response)
    }

    /// Batched read over `keys`.
    pub async fn get_all(
        &mut self,
        keys: &[Vec<u8>],
    ) -> Result<Response> {
        self.before_request().await?;
        let response = self.transport.get_all(&self.db_name, keys, self.routed).await?;
        self.reconnect_on_error(&response).await;
        Ok(response)
    }

    /// Writes `value` under `key`, optionally against an explicit
    /// version.
    pub async fn put(
        &mut self,
        key: &[u8],
        value: &[u8],
        version: Option<Version>,
        route: bool,
    ) -> Result<Response> {
        self.before_request().await?;
        let response = self
            .transport
            .put(&self.db_name, key, value, version, route)
            .await?;
        self.reconnect_on_error(&response).await;
        Ok(response)
    }

    /// Deletes `key`.
    ///
    /// Delete is exempt from the request-count rotation path; it takes
    /// the connected guard and the error-driven rotation only. Kept from
    /// the original connection design.
    pub async fn delete(
        &mut self,
        key: &[u8],
    ) -> Result<Response> {
        self.ensure_connected()?;
        let response = self.transport.delete(&self.db_name, key).await?;
        self.reconnect_on_error(&response).await;
        Ok(response)
    }

    /// Drops the active connection and retires the manager.
    pub async fn terminate(&mut self) {
        self.transport.disconnect().await;
        self.state.active_node = None;
        self.state.lifecycle = Lifecycle::Terminated;
    }

    /// Protocol identity advertised during negotiation.
    pub fn protocol_version(&self) -> &'static str {
        PROTOCOL_VERSION
    }

    /// Store name this manager is bound to.
    pub fn db_name(&self) -> &str {
        &self.db_name
    }

    /// Whether data operations ask the server for partition routing.
    pub fn routed(&self) -> bool {
        self.routed
    }

    /// Topology acquired by the last successful bootstrap.
    pub fn topology(&self) -> Option<&ClusterTopology> {
        self.topology.as_ref()
    }

    /// Runtime connection record.
    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.state.lifecycle == Lifecycle::Connected && self.state.active_node.is_some() {
            Ok(())
        } else {
            Err(Error::NotConnected)
        }
    }

    /// First seed that serves both descriptors wins. Individual seed
    /// failures are logged and skipped, not surfaced.
    async fn fetch_descriptors(&mut self) -> std::result::Result<String, BootstrapError> {
        let seeds = self.seeds.clone();

        for (host, port) in &seeds {
            if !self.transport.connect(host, *port).await {
                debug!(%host, port, "seed refused the connection");
                continue;
            }

            let cluster = match self.read_descriptor(CLUSTER_DESCRIPTOR_KEY).await {
                Ok(text) => text,
                Err(error) => {
                    warn!(%host, port, %error, "cluster descriptor read failed");
                    continue;
                }
            };
            match self.read_descriptor(STORE_CATALOG_KEY).await {
                Ok(_catalog) => return Ok(cluster),
                Err(error) => {
                    warn!(%host, port, %error, "store catalog read failed");
                    continue;
                }
            }
        }

        Err(BootstrapError::NoSeedReachable)
    }

    /// One metadata read: the first version's value is the raw
    /// descriptor text.
    async fn read_descriptor(
        &mut self,
        key: &'static str,
    ) -> std::result::Result<String, BootstrapError> {
        let response = self
            .transport
            .get(METADATA_STORE, key.as_bytes(), false)
            .await
            .map_err(|source| BootstrapError::Metadata { key, source })?;

        if let Some(message) = response.error() {
            return Err(BootstrapError::FlaggedMetadata {
                key,
                message: message.to_string(),
            });
        }

        let first = response
            .versions_for(key.as_bytes())
            .first()
            .ok_or(BootstrapError::MissingDescriptor { key })?;

        String::from_utf8(first.value.clone()).map_err(|_| BootstrapError::DescriptorNotText { key })
    }
}

fn parse_seed(addr: &str) -> std::result::Result<(String, u16), BootstrapError> {
    let (host, port) = addr
        .rsplit_once(':')
        .ok_or_else(|| BootstrapError::InvalidSeed(addr.to_string()))?;
    if host.is_empty() {
        return Err(BootstrapError::InvalidSeed(addr.to_string()));
    }
    let port = port
        .parse()
        .map_err(|_| BootstrapError::InvalidSeed(addr.to_string()))?;
    Ok((host.to_string(), port))
}
