use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_REQUEST_LIMIT_PER_NODE;

/// Client configuration parameters for connection management
///
/// Encapsulates the tunable settings of the connection policy. Network
/// deadlines are deliberately absent: the transport collaborator owns
/// its own timeouts and the client adds none on top.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Requests served by one node before the connection is rotated
    /// Default: 500
    pub request_limit_per_node: u64,

    /// Ask the server to route requests to the owning partition
    /// Default: true
    pub routed: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_limit_per_node: DEFAULT_REQUEST_LIMIT_PER_NODE,
            routed: true,
        }
    }
}
