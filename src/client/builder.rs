use std::sync::Arc;

use super::Client;
use crate::ClientConfig;
use crate::ConflictResolver;
use crate::ConnectionManager;
use crate::MostRecentTimestamp;
use crate::Result;
use crate::Transport;

pub struct ClientBuilder {
    db_name: String,
    seeds: Vec<String>,
    config: ClientConfig,
    resolver: Arc<dyn ConflictResolver>,
}

impl ClientBuilder {
    /// Create a new builder with default config and specified seeds
    ///
    /// # Arguments
    /// * `db_name` - Store the client binds to
    /// * `seeds` - `host:port` addresses used for topology discovery
    ///
    /// # Panics
    /// Will panic if no seed address is provided
    pub fn new(
        db_name: impl Into<String>,
        seeds: Vec<String>,
    ) -> Self {
        assert!(!seeds.is_empty(), "at least one seed address required");
        Self {
            db_name: db_name.into(),
            seeds,
            config: ClientConfig::default(),
            resolver: Arc::new(MostRecentTimestamp),
        }
    }

    /// Set the per-node request ceiling (default: 500)
    pub fn request_limit_per_node(
        mut self,
        limit: u64,
    ) -> Self {
        self.config.request_limit_per_node = limit;
        self
    }

    /// Enable/disable server-side partition routing (default: enabled)
    pub fn routed(
        mut self,
        routed: bool,
    ) -> Self {
        self.config.routed = routed;
        self
    }

    /// Completely replaces the default configuration
    pub fn set_config(
        mut self,
        config: ClientConfig,
    ) -> Self {
        self.config = config;
        self
    }

    /// Inject a conflict-resolution strategy
    ///
    /// Replaces the default most-recent-timestamp policy. Closures of
    /// the matching shape qualify:
    ///
    /// ```rust,ignore
    /// let builder = ClientBuilder::new("inventory", seeds)
    ///     .resolver(|versions| versions.into_iter().next());
    /// ```
    pub fn resolver(
        mut self,
        resolver: impl ConflictResolver + 'static,
    ) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }

    /// Build the client over `transport` with current configuration
    ///
    /// Bootstraps before returning: a client that exists is connected.
    ///
    /// # Errors
    /// [`crate::BootstrapError`] when discovery or the first connection
    /// fails; the underlying cause is preserved.
    pub async fn build<T: Transport>(
        self,
        transport: T,
    ) -> Result<Client<T>> {
        let mut manager = ConnectionManager::new(self.db_name, self.seeds, self.config, transport)?;
        manager.bootstrap().await?;
        Ok(Client::new(manager, self.resolver))
    }
}
