use std::collections::HashMap;
use std::sync::Arc;

use super::declaration::Resource;
use super::errors::{ResourceError, Result};

/// Name → resource lookup used to resolve relationship targets.
///
/// Registration is last-write: declaring a resource again under the same name
/// replaces the entry but keeps its original position in declaration order.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    entries: HashMap<String, Arc<Resource>>,
    order: Vec<String>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource, returning the one it replaced
    pub fn register(&mut self, resource: Arc<Resource>) -> Option<Arc<Resource>> {
        let name = resource.name().to_string();
        let previous = self.entries.insert(name.clone(), resource);
        if previous.is_none() {
            self.order.push(name);
        }
        previous
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Resource>> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<Resource>> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| ResourceError::UnresolvedTarget {
                target: name.to_string(),
            })
    }

    /// Names in declaration order
    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Resource>> + '_ {
        self.order.iter().filter_map(move |name| self.entries.get(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
