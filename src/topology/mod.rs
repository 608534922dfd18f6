//! Cluster topology acquisition
//!
//! Turns the raw cluster descriptor served over the metadata channel into
//! typed [`Node`] records. Extraction is by fixed element path per
//! `<server>` entry; a node missing a required field aborts the whole
//! parse rather than producing a half-populated record, so a bootstrap
//! never serves from an incomplete topology.

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;
use serde::Serialize;

use crate::TopologyFormatError;


/// One cluster member as listed by the cluster descriptor.
///
/// Immutable once parsed; replaced wholesale when the next bootstrap or
/// rebalance acquires a fresh descriptor. `partitions` is the raw
/// partition-assignment text, opaque to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Opaque member identifier
    pub id: String,
    /// Hostname or IP
    pub host: String,
    /// Client service port
    pub port: u16,
    /// Management port, operator-facing only
    pub http_port: Option<u16>,
    /// Management port, operator-facing only
    pub admin_port: Option<u16>,
    /// Raw partition-assignment text
    pub partitions: Option<String>,
}

impl Node {
    /// Node address as `host:port`.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// The full known node set plus the store name the client is bound to.
///
/// Owned exclusively by the connection manager; replaced on bootstrap,
/// never mutated in place. Non-empty after any successful bootstrap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterTopology {
    db_name: String,
    nodes: Vec<Node>,
}

impl ClusterTopology {
    pub fn new(
        db_name: impl Into<String>,
        nodes: Vec<Node>,
    ) -> Self {
        Self {
            db_name: db_name.into(),
            nodes,
        }
    }

    /// Store name this topology was acquired for.
    pub fn db_name(&self) -> &str {
        &self.db_name
    }

    /// All known nodes, in descriptor document order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Fields collected for one `<server>` entry before validation.
#[derive(Default)]
struct ServerEntry {
    id: Option<String>,
    host: Option<String>,
    socket_port: Option<String>,
    http_port: Option<String>,
    admin_port: Option<String>,
    partitions: Option<String>,
}

impl ServerEntry {
    fn record(
        &mut self,
        element: &str,
        text: &str,
    ) {
        let slot = match element {
            "id" => &mut self.id,
            "host" => &mut self.host,
            "socket-port" => &mut self.socket_port,
            "http-port" => &mut self.http_port,
            "admin-port" => &mut self.admin_port,
            "partitions" => &mut self.partitions,
            _ => return,
        };
        *slot = Some(text.to_string());
    }

    fn into_node(self, index: usize) -> Result<Node, TopologyFormatError> {
        let id = self
            .id
            .ok_or(TopologyFormatError::MissingField { index, element: "id" })?;
        let host = self
            .host
            .ok_or(TopologyFormatError::MissingField { index, element: "host" })?;
        let socket_port = self.socket_port.ok_or(TopologyFormatError::MissingField {
            index,
            element: "socket-port",
        })?;
        let port = parse_port(&socket_port, index, "socket-port")?;
        let http_port = self
            .http_port
            .map(|raw| parse_port(&raw, index, "http-port"))
            .transpose()?;
        let admin_port = self
            .admin_port
            .map(|raw| parse_port(&raw, index, "admin-port"))
            .transpose()?;

        Ok(Node {
            id,
            host,
            port,
            http_port,
            admin_port,
            partitions: self.partitions,
        })
    }
}

fn parse_port(
    raw: &str,
    index: usize,
    element: &'static str,
) -> Result<u16, TopologyFormatError> {
    raw.parse().map_err(|_| TopologyFormatError::InvalidField {
        index,
        element,
        reason: format!("{raw:?} is not a port number"),
    })
}

/// Extracts the node list from a raw cluster descriptor.
///
/// Fixed element path per entry: `/cluster/server/{id, host, socket-port,
/// http-port, admin-port, partitions}`. `id`, `host` and `socket-port`
/// are required; the management ports and partition text are carried
/// verbatim when present. Document order is preserved.
///
/// # Errors
///
/// [`TopologyFormatError`] when the descriptor is not well-formed XML or
/// any entry is missing a required field. No partial node list is
/// returned.
pub fn parse_cluster_descriptor(raw: &str) -> Result<Vec<Node>, TopologyFormatError> {
    let mut reader = Reader::from_str(raw);
    reader.trim_text(true);

    let mut nodes = Vec::new();
    let mut entry: Option<ServerEntry> = None;
    let mut element: Option<String> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                if name == "server" && entry.is_none() {
                    entry = Some(ServerEntry::default());
                } else if entry.is_some() {
                    element = Some(name);
                }
            }
            Event::Empty(empty) => {
                // A self-closing <server/> carries no fields at all.
                if empty.name().as_ref() == b"server" && entry.is_none() {
                    nodes.push(ServerEntry::default().into_node(nodes.len())?);
                }
            }
            Event::Text(text) => {
                if let (Some(entry), Some(element)) = (entry.as_mut(), element.as_deref()) {
                    entry.record(element, text.unescape()?.trim());
                }
            }
            Event::End(end) => {
                if end.name().as_ref() == b"server" {
                    if let Some(entry) = entry.take() {
                        nodes.push(entry.into_node(nodes.len())?);
                    }
                } else {
                    element = None;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if entry.is_some() {
        return Err(TopologyFormatError::Truncated);
    }

    Ok(nodes)
}
