//! Client-side connection manager for a partitioned, replicated
//! key-value store.
//!
//! Discovers cluster topology from a handful of seed addresses, keeps a
//! live connection to exactly one member node at a time, rotates that
//! connection when a node has served its request quota or starts
//! erroring, and resolves concurrently written versions of a value into
//! one winner at read time. The store is eventually consistent by
//! design; resolution is a policy, not a guarantee.
//!
//! The byte-level wire protocol stays outside this crate: implement
//! [`Transport`] over your codec and hand it to the builder.
//!
//! ```rust,ignore
//! use vkv_client::ClientBuilder;
//!
//! let client = ClientBuilder::new("inventory", vec!["s1:6666".into(), "s2:6666".into()])
//!     .build(transport)
//!     .await?;
//!
//! client.put("widget", "7 in stock").await?;
//! let value = client.get("widget").await?;
//! ```

mod client;
mod config;
mod connection;
mod constants;
mod errors;
mod resolver;
mod selector;
mod topology;
mod transport;
mod version;

pub use client::*;
pub use config::*;
pub use connection::*;
pub use constants::*;
pub use errors::*;
pub use resolver::*;
pub use selector::*;
pub use topology::*;
pub use transport::*;
pub use version::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
