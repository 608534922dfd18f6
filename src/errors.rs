//! Client Error Hierarchy
//!
//! Defines the error types for the cluster client, categorized by the
//! phase that produces them: bootstrap, descriptor parsing, transport,
//! and request handling.

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Topology acquisition or initial connection failures
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),

    /// A data operation was attempted without an active connection
    #[error("no active connection; bootstrap the client before issuing requests")]
    NotConnected,

    /// I/O-level failures reported by the transport collaborator
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// An error-flagged server response surfaced to the caller
    #[error("server error: {0}")]
    Server(String),
}

/// Failures while acquiring the cluster topology or establishing the
/// first connection. Fatal; surfaced from `bootstrap` with the original
/// cause preserved.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// Seed addresses must be `host:port`
    #[error("seed address {0:?} is not host:port")]
    InvalidSeed(String),

    /// Every configured seed refused the connection or the metadata reads
    #[error("no seed host answered the metadata requests")]
    NoSeedReachable,

    /// Transport failure while reading a metadata descriptor
    #[error("metadata read for {key} failed")]
    Metadata {
        key: &'static str,
        #[source]
        source: TransportError,
    },

    /// The metadata read came back error-flagged
    #[error("metadata response for {key} was error-flagged: {message}")]
    FlaggedMetadata { key: &'static str, message: String },

    /// The metadata response carried no version for the descriptor key
    #[error("metadata response for {key} carried no versions")]
    MissingDescriptor { key: &'static str },

    /// Descriptor payloads are text; anything else is rejected
    #[error("descriptor {key} is not valid UTF-8")]
    DescriptorNotText { key: &'static str },

    /// The cluster descriptor failed extraction
    #[error("cluster descriptor rejected")]
    Descriptor(#[from] TopologyFormatError),

    /// A descriptor listing no servers cannot serve anything
    #[error("cluster descriptor lists no servers")]
    EmptyTopology,

    /// Topology was acquired but every node refused a connection
    #[error("no cluster node accepted a connection")]
    NoNodeAvailable,
}

/// Extraction failures over the cluster descriptor. No partial node list
/// is ever produced; the first bad entry aborts the whole parse.
#[derive(Debug, thiserror::Error)]
pub enum TopologyFormatError {
    /// The descriptor is not well-formed XML
    #[error("malformed cluster descriptor: {0}")]
    Malformed(#[from] quick_xml::Error),

    /// A server entry lacks one of `id`, `host`, `socket-port`
    #[error("server entry {index} is missing required element <{element}>")]
    MissingField { index: usize, element: &'static str },

    /// A server entry carries a value the field type rejects
    #[error("server entry {index} has invalid <{element}>: {reason}")]
    InvalidField {
        index: usize,
        element: &'static str,
        reason: String,
    },

    /// The descriptor text ends inside a `<server>` entry
    #[error("cluster descriptor ends inside a <server> entry")]
    Truncated,
}

/// I/O-level failures from the transport collaborator. Distinct from
/// error-flagged responses, which are server-reported and drive the
/// forced-reconnect path instead.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The active connection failed mid-request
    #[error("i/o failure on the active connection: {0}")]
    Io(#[from] std::io::Error),

    /// Transport-specific failure with no richer classification
    #[error("{0}")]
    Other(String),
}
