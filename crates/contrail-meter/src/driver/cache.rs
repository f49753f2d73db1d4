//! Per-cycle memoization of driver clients

use crate::analytics::AnalyticsClient;
use crate::config::AnalyticsSettings;
use crate::directory::ResourceDirectory;
use crate::error::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Clients a driver needs for one polling cycle
#[derive(Clone)]
pub struct DriverClients {
    pub analytics: AnalyticsClient,
    pub directory: Arc<dyn ResourceDirectory>,
}

impl DriverClients {
    pub fn connect(
        endpoint: &str,
        settings: &AnalyticsSettings,
        directory: &Arc<dyn ResourceDirectory>,
    ) -> Result<Self> {
        Ok(Self {
            analytics: AnalyticsClient::new(endpoint, settings)?,
            directory: Arc::clone(directory),
        })
    }
}

/// Clients shared by all meters polled within one cycle.
///
/// Entries are keyed by a fixed name per driver, so the first endpoint seen
/// in a cycle is the one used for the rest of it. The owner clears the cache
/// between cycles.
#[derive(Default)]
pub struct SessionCache {
    entries: HashMap<&'static str, DriverClients>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached clients for `key`, building them with `init` on first use.
    pub fn get_or_try_insert_with<F>(&mut self, key: &'static str, init: F) -> Result<DriverClients>
    where
        F: FnOnce() -> Result<DriverClients>,
    {
        if let Some(clients) = self.entries.get(key) {
            return Ok(clients.clone());
        }
        let clients = init()?;
        debug!(key, endpoint = %clients.analytics.endpoint(), "Cached driver clients");
        self.entries.insert(key, clients.clone());
        Ok(clients)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget every client; called at the start of a new cycle.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
