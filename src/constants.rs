// -
// Metadata channel

/// Reserved logical store that serves cluster metadata during bootstrap.
pub const METADATA_STORE: &str = "metadata";

/// Metadata key holding the cluster descriptor.
pub const CLUSTER_DESCRIPTOR_KEY: &str = "cluster.xml";

/// Metadata key holding the store-catalog descriptor.
pub const STORE_CATALOG_KEY: &str = "stores.xml";

// -
// Protocol negotiation

/// Protocol identity advertised to the server during negotiation.
/// Opaque constant, never parsed or computed.
pub const PROTOCOL_VERSION: &str = "pb0";

// -
// Connection policy

/// Requests served by one node before the connection is rotated.
pub const DEFAULT_REQUEST_LIMIT_PER_NODE: u64 = 500;
