//! Property collection across the inheritance chain.
//!
//! Given a resource, the collector returns every property visible on it:
//! first the properties of all proper ancestors (ordered by creation index),
//! then the resource's own properties. Inherited properties are cloned so a
//! subclass never shares property state with its ancestors or siblings.
//!
//! Mixin bases are not resources and contribute nothing here; they are only
//! recorded as bases of the generated model.

use std::collections::HashSet;
use std::sync::Arc;

use super::declaration::{ModelMethod, Resource};
use super::errors::{ResourceError, Result};
use super::property::Property;
use super::registry::ResourceRegistry;

/// A property together with the resource that declared it
#[derive(Debug, Clone)]
pub struct CollectedProperty {
    pub name: String,
    pub property: Property,
    pub declared_by: String,
}

pub struct PropertyCollector<'a> {
    registry: &'a ResourceRegistry,
}

impl<'a> PropertyCollector<'a> {
    pub fn new(registry: &'a ResourceRegistry) -> Self {
        Self { registry }
    }

    /// Proper ancestors of `resource`, nearest first.
    ///
    /// Fails when a parent is not registered or the chain loops back.
    pub fn ancestors(&self, resource: &Resource) -> Result<Vec<Arc<Resource>>> {
        let mut ancestors = Vec::new();
        let mut seen = HashSet::new();
        seen.insert(resource.name().to_string());

        let mut next = resource.parent().map(str::to_string);
        while let Some(parent_name) = next {
            if !seen.insert(parent_name.clone()) {
                return Err(ResourceError::HierarchyWalk {
                    resource: resource.name().to_string(),
                    reason: format!("inheritance cycle through '{}'", parent_name),
                });
            }
            let parent = self.registry.get(&parent_name).cloned().ok_or_else(|| {
                ResourceError::HierarchyWalk {
                    resource: resource.name().to_string(),
                    reason: format!("base resource '{}' is not declared", parent_name),
                }
            })?;
            next = parent.parent().map(str::to_string);
            ancestors.push(parent);
        }

        Ok(ancestors)
    }

    pub fn collect(&self, resource: &Resource) -> Result<Vec<CollectedProperty>> {
        let ancestors = self.ancestors(resource)?;

        // Farthest ancestor first so the stable sort keeps base-before-derived
        // for equal indices.
        let mut inherited: Vec<CollectedProperty> = ancestors
            .iter()
            .rev()
            .flat_map(|ancestor| {
                ancestor
                    .properties()
                    .iter()
                    .map(move |(name, property)| CollectedProperty {
                        name: name.clone(),
                        property: property.clone(),
                        declared_by: ancestor.name().to_string(),
                    })
            })
            .collect();
        inherited.sort_by_key(|collected| collected.property.creation_index());

        let mut own: Vec<CollectedProperty> = resource
            .properties()
            .iter()
            .map(|(name, property)| CollectedProperty {
                name: name.clone(),
                property: property.clone(),
                declared_by: resource.name().to_string(),
            })
            .collect();
        own.sort_by_key(|collected| collected.property.creation_index());

        log::debug!(
            "Collected {} inherited and {} own properties for '{}'",
            inherited.len(),
            own.len(),
            resource.name()
        );

        inherited.extend(own);
        Ok(inherited)
    }

    /// Methods visible on `resource`; nearer declarations override farther ones
    pub fn collect_methods(&self, resource: &Resource) -> Result<Vec<(String, ModelMethod)>> {
        let ancestors = self.ancestors(resource)?;
        let mut methods: Vec<(String, ModelMethod)> = Vec::new();

        let chain = ancestors
            .iter()
            .rev()
            .map(|ancestor| ancestor.as_ref())
            .chain(std::iter::once(resource));
        for declaring in chain {
            for (name, method) in declaring.methods() {
                match methods.iter_mut().find(|(existing, _)| existing == name) {
                    Some(slot) => slot.1 = method.clone(),
                    None => methods.push((name.clone(), method.clone())),
                }
            }
        }

        Ok(methods)
    }
}
