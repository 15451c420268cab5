use std::sync::Arc;

use dashmap::DashMap;
use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::{debug, warn};

use super::registration::{AgentRegistration, RegisteredAgent};
use crate::agent::{AgentContext, DynAgent};
use crate::{Error, Result};

/// Async constructor for a registered agent type.
pub type AgentFactory =
    Arc<dyn Fn(AgentContext) -> BoxFuture<'static, Result<Arc<dyn DynAgent>>> + Send + Sync>;

#[derive(Clone)]
struct Entry {
    registration: AgentRegistration,
    factory: AgentFactory,
}

/// Name-keyed table of agent types. Cloning shares the table.
#[derive(Clone, Default)]
pub struct AgentRegistry {
    entries: Arc<DashMap<String, Entry>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: RegisteredAgent>(&self) {
        let factory: AgentFactory = Arc::new(|context: AgentContext| {
            async move {
                let agent = T::build(&context).await?;
                Ok::<Arc<dyn DynAgent>, Error>(Arc::new(agent))
            }
            .boxed()
        });
        self.register_with(T::registration(), factory);
    }

    /// Registers an agent under `registration.name`, replacing any previous
    /// entry with that name.
    pub fn register_with(&self, registration: AgentRegistration, factory: AgentFactory) {
        let name = registration.name.clone();
        let previous = self.entries.insert(
            name.clone(),
            Entry {
                registration,
                factory,
            },
        );
        if previous.is_some() {
            warn!(agent = %name, "Agent registration replaced");
        } else {
            debug!(agent = %name, "Agent registered");
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<AgentRegistration> {
        self.entries
            .get(name)
            .map(|entry| entry.registration.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Every registration, sorted by name.
    pub fn catalog(&self) -> Vec<AgentRegistration> {
        let mut catalog: Vec<AgentRegistration> = self
            .entries
            .iter()
            .map(|e| e.registration.clone())
            .collect();
        catalog.sort_by(|a, b| a.name.cmp(&b.name));
        catalog
    }

    /// Registrations whose keywords match `task`, sorted by name. Agents
    /// declaring no keywords are always included.
    pub fn candidates(&self, task: &str) -> Vec<AgentRegistration> {
        let mut candidates = self.catalog();
        candidates.retain(|registration| registration.can_handle(task));
        candidates
    }

    /// Builds a fresh instance of the named agent.
    pub async fn create(&self, name: &str, context: &AgentContext) -> Result<Arc<dyn DynAgent>> {
        // Clone the factory out so no shard lock is held while building.
        let factory = self
            .entries
            .get(name)
            .map(|entry| Arc::clone(&entry.factory))
            .ok_or_else(|| Error::AgentNotFound {
                name: name.to_string(),
            })?;
        factory(context.clone()).await
    }
}

impl std::fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentRegistry")
            .field("agents", &self.names())
            .finish()
    }
}
