use std::collections::HashMap;

use crate::Response;
use crate::Version;
use crate::VersionedValue;

/// Two-node descriptor mirroring a small production ring.
pub const SAMPLE_CLUSTER_XML: &str = r#"
<cluster>
  <name>qa-ring</name>
  <server>
    <id>1</id>
    <host>n1</host>
    <socket-port>6666</socket-port>
    <http-port>8081</http-port>
    <admin-port>6670</admin-port>
    <partitions>0, 2</partitions>
  </server>
  <server>
    <id>2</id>
    <host>n2</host>
    <socket-port>6667</socket-port>
    <http-port>8082</http-port>
    <admin-port>6671</admin-port>
    <partitions>1, 3</partitions>
  </server>
</cluster>
"#;

pub const SAMPLE_STORES_XML: &str = r#"
<stores>
  <store>
    <name>inventory</name>
    <persistence>bdb</persistence>
    <replication-factor>2</replication-factor>
  </store>
</stores>
"#;

/// Read response holding `text` as the single version of `key`.
pub fn descriptor_response(
    key: &str,
    text: &str,
) -> Response {
    let mut versions = HashMap::new();
    versions.insert(
        key.as_bytes().to_vec(),
        vec![VersionedValue::new(text, Version::with_timestamp(1))],
    );
    Response::with_versions(versions)
}

static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    env_logger::init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
}
