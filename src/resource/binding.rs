//! Relationship target binding.
//!
//! Relationships are declared with textual targets. Binding runs on the first
//! generation request touching a resource: it resolves every target of the
//! pending resources reachable from that resource, completes one-to-many
//! pairs with a synthesized many-to-one inverse, and checks that declared
//! inverses agree with each other.
//!
//! A pending resource with a one-to-many into the unit joins the unit too,
//! since its key lives on a unit member. A subclass inherits its base's
//! one-to-many as an independent side: unless the inherited inverse already
//! points back at the subclass, the target gets a separate many-to-one named
//! after the subclass.

use std::collections::{HashMap, HashSet, VecDeque};

use super::descriptor::ResourceDescriptor;
use super::errors::{ResourceError, Result};
use super::property::{Relationship, RelationshipKind};
use super::registry::ResourceRegistry;
use crate::model::generator::ModelRegistry;
use crate::model::schema::ReferentialAction;
use crate::utils::naming::snake_case;

struct OneToManySide {
    owner: String,
    inherited: bool,
    relationship: String,
    target: String,
    inverse: Option<String>,
    on_update: Option<ReferentialAction>,
    on_delete: Option<ReferentialAction>,
}

pub struct RelationshipBinder<'a> {
    resources: &'a ResourceRegistry,
}

impl<'a> RelationshipBinder<'a> {
    pub fn new(resources: &'a ResourceRegistry) -> Self {
        Self { resources }
    }

    fn is_pending(
        name: &str,
        descriptors: &HashMap<String, ResourceDescriptor>,
        models: &ModelRegistry,
    ) -> bool {
        descriptors
            .get(name)
            .map(|d| !d.is_abstract() && !d.is_model_generated())
            .unwrap_or(false)
            && !models.contains(name)
    }

    /// Bind the compilation unit of `root`: `root` plus every pending
    /// concrete resource reachable from it through relationships.
    ///
    /// Returns the unit in declaration order.
    pub fn bind(
        &self,
        root: &str,
        descriptors: &mut HashMap<String, ResourceDescriptor>,
        models: &ModelRegistry,
    ) -> Result<Vec<String>> {
        let mut component = self.resolve_component(root, descriptors, models)?;
        self.synthesize_inverses(&component, descriptors, models)?;
        for name in &component {
            Self::validate_relationships(name, descriptors)?;
        }

        let order = self.resources.names();
        component.sort_by_key(|name| order.iter().position(|declared| declared == name));
        log::debug!("Bound compilation unit of '{}': {:?}", root, component);
        Ok(component)
    }

    fn resolve_component(
        &self,
        root: &str,
        descriptors: &mut HashMap<String, ResourceDescriptor>,
        models: &ModelRegistry,
    ) -> Result<Vec<String>> {
        let mut component = Vec::new();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();
        seen.insert(root.to_string());
        queue.push_back(root.to_string());

        while let Some(name) = queue.pop_front() {
            let descriptor =
                descriptors
                    .get_mut(&name)
                    .ok_or_else(|| ResourceError::UnresolvedTarget {
                        target: name.clone(),
                    })?;

            let mut targets = Vec::new();
            for entry in descriptor.relationships_mut() {
                let context = format!("relationship '{}' on resource '{}'", entry.name, name);
                let target = entry
                    .relationship
                    .target_mut()
                    .resolve(self.resources, &context)?;
                if target.is_abstract() {
                    return Err(ResourceError::AbstractTarget {
                        target: target.name().to_string(),
                    });
                }
                log::debug!("Resolved '{}.{}' -> '{}'", name, entry.name, target.name());
                targets.push(target.name().to_string());
            }

            // one-to-many owners keep their key on this resource
            for dependent in self.resources.names() {
                if seen.contains(dependent) || !Self::is_pending(dependent, descriptors, models) {
                    continue;
                }
                let refers_here = descriptors.get(dependent).is_some_and(|d| {
                    d.relationships().iter().any(|e| {
                        e.relationship.kind() == RelationshipKind::OneToMany
                            && e.relationship.target_name() == name
                    })
                });
                if refers_here {
                    seen.insert(dependent.clone());
                    queue.push_back(dependent.clone());
                }
            }

            component.push(name);
            for target in targets {
                if seen.insert(target.clone()) && Self::is_pending(&target, descriptors, models) {
                    queue.push_back(target);
                }
            }
        }

        Ok(component)
    }

    fn synthesize_inverses(
        &self,
        component: &[String],
        descriptors: &mut HashMap<String, ResourceDescriptor>,
        models: &ModelRegistry,
    ) -> Result<()> {
        let mut sides = Vec::new();
        for name in component {
            let Some(descriptor) = descriptors.get(name) else {
                continue;
            };
            for entry in descriptor.relationships() {
                let relationship = &entry.relationship;
                if relationship.kind() != RelationshipKind::OneToMany {
                    continue;
                }
                let (on_update, on_delete) = relationship.foreign_key_actions();
                sides.push(OneToManySide {
                    owner: name.clone(),
                    inherited: entry.declared_by != *name,
                    relationship: entry.name.clone(),
                    target: relationship.target_name().to_string(),
                    inverse: relationship.inverse_name().map(str::to_string),
                    on_update,
                    on_delete,
                });
            }
        }

        for side in sides {
            let points_back = |inverse: &str| {
                descriptors
                    .get(&side.target)
                    .and_then(|target| target.relationship(inverse))
                    .is_some_and(|other| other.target_name() == side.owner)
            };
            let inverse = match side.inverse {
                Some(inverse) if !side.inherited || points_back(&inverse) => inverse,
                _ => snake_case(&side.owner),
            };
            if let Some(relationship) = descriptors
                .get_mut(&side.owner)
                .and_then(|d| d.relationship_mut(&side.relationship))
            {
                relationship.set_inverse(inverse.clone());
            }

            let generated = models.contains(&side.target);
            let target = descriptors.get_mut(&side.target).ok_or_else(|| {
                ResourceError::unresolved_target_with_context(
                    side.target.clone(),
                    format!(
                        "relationship '{}' on resource '{}'",
                        side.relationship, side.owner
                    ),
                )
            })?;
            if target.has_property(&inverse) {
                continue;
            }
            if generated || target.is_model_generated() {
                return Err(ResourceError::InvalidInverse {
                    resource: side.owner,
                    relationship: side.relationship,
                    inverse,
                    reason: format!(
                        "'{}' is already generated and does not declare it",
                        side.target
                    ),
                });
            }

            let mut synthesized = Relationship::many_to_one(side.owner.clone())
                .inverse(side.relationship.clone())
                .synthesized();
            if let Some(action) = side.on_update {
                synthesized = synthesized.on_update(action);
            }
            if let Some(action) = side.on_delete {
                synthesized = synthesized.on_delete(action);
            }
            let context = format!(
                "inverse of relationship '{}' on resource '{}'",
                side.relationship, side.owner
            );
            synthesized.target_mut().resolve(self.resources, &context)?;
            target.add_relationship(&inverse, synthesized)?;
            log::debug!(
                "Synthesized many-to-one '{}.{}' for '{}.{}'",
                side.target,
                inverse,
                side.owner,
                side.relationship
            );
        }

        Ok(())
    }

    fn validate_relationships(
        name: &str,
        descriptors: &HashMap<String, ResourceDescriptor>,
    ) -> Result<()> {
        let Some(descriptor) = descriptors.get(name) else {
            return Ok(());
        };

        for entry in descriptor.relationships() {
            let relationship = &entry.relationship;
            let kind = relationship.kind();
            let primary_side = |reason: &str| ResourceError::InvalidPrimarySide {
                resource: name.to_string(),
                relationship: entry.name.clone(),
                reason: reason.to_string(),
            };

            if kind == RelationshipKind::ManyToOne && relationship.is_primary() {
                return Err(primary_side("a many-to-one side always hosts the key"));
            }
            // inverses name the declaring resource, not its subclasses
            if entry.declared_by != name {
                continue;
            }

            let counterpart = relationship.inverse_name().and_then(|inverse| {
                descriptors
                    .get(relationship.target_name())
                    .filter(|target| target.has_property(inverse))
                    .map(|target| (inverse, target.relationship(inverse)))
            });

            match counterpart {
                Some((inverse, other)) => {
                    let invalid_inverse = |reason: String| ResourceError::InvalidInverse {
                        resource: name.to_string(),
                        relationship: entry.name.clone(),
                        inverse: inverse.to_string(),
                        reason,
                    };
                    let other = other.ok_or_else(|| {
                        invalid_inverse(format!(
                            "'{}.{}' is a field",
                            relationship.target_name(),
                            inverse
                        ))
                    })?;
                    if other.target_name() != name {
                        return Err(invalid_inverse(format!(
                            "it targets '{}' instead of '{}'",
                            other.target_name(),
                            name
                        )));
                    }
                    if other.kind() != kind.inverse_kind() {
                        return Err(invalid_inverse(format!(
                            "expected a {} relationship, found {}",
                            kind.inverse_kind(),
                            other.kind()
                        )));
                    }
                    if kind == RelationshipKind::OneToOne
                        && other.is_primary() == relationship.is_primary()
                    {
                        return Err(primary_side(
                            "exactly one side of a one-to-one pair must be primary",
                        ));
                    }
                }
                None => {
                    if kind == RelationshipKind::OneToOne && relationship.is_primary() {
                        return Err(primary_side(
                            "a one-to-one without a declared inverse must host the key",
                        ));
                    }
                }
            }
        }

        Ok(())
    }
}
