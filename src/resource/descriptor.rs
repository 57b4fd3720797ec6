//! Per-resource registry of fields, relationships and builders.
//!
//! The descriptor is the single source of truth for what a resource
//! contains once it is instrumented. Each registered property contributes
//! one builder to the resource's [`ModelBuilder`].
//!
//! Names are unique across fields and relationships of one descriptor.
//! Registering a name twice from the same declaring resource fails; a
//! property coming from a nearer level of the inheritance chain replaces the
//! inherited entry (and its builder) in place.

use super::collector::CollectedProperty;
use super::declaration::{ModelMethod, Resource};
use super::errors::{ResourceError, Result};
use super::options::ResourceOptions;
use super::property::{Field, Property, Relationship};
use crate::model::builder::{BuildContext, BuildPhase, ModelBuilder};

#[derive(Debug, Clone)]
pub struct FieldEntry {
    pub name: String,
    pub field: Field,
    pub declared_by: String,
}

#[derive(Debug, Clone)]
pub struct RelationshipEntry {
    pub name: String,
    pub relationship: Relationship,
    pub declared_by: String,
}

/// Read-only view of a descriptor's properties handed to builders
#[derive(Debug, Clone, Copy)]
pub struct PropertyView<'a> {
    resource: &'a str,
    fields: &'a [FieldEntry],
    relationships: &'a [RelationshipEntry],
}

impl<'a> PropertyView<'a> {
    /// View with no properties
    pub fn empty(resource: &'a str) -> Self {
        Self {
            resource,
            fields: &[],
            relationships: &[],
        }
    }

    pub fn resource_name(&self) -> &'a str {
        self.resource
    }

    pub fn field(&self, name: &str) -> Option<&'a Field> {
        self.fields.iter().find(|e| e.name == name).map(|e| &e.field)
    }

    pub fn relationship(&self, name: &str) -> Option<&'a Relationship> {
        self.relationships
            .iter()
            .find(|e| e.name == name)
            .map(|e| &e.relationship)
    }
}

pub struct ResourceDescriptor {
    resource_name: String,
    options: ResourceOptions,
    fields: Vec<FieldEntry>,
    relationships: Vec<RelationshipEntry>,
    methods: Vec<(String, ModelMethod)>,
    model_builder: ModelBuilder,
}

impl ResourceDescriptor {
    pub fn new(resource: &Resource) -> Self {
        Self {
            resource_name: resource.name().to_string(),
            options: resource.options().clone(),
            fields: Vec::new(),
            relationships: Vec::new(),
            methods: Vec::new(),
            model_builder: ModelBuilder::default(),
        }
    }

    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    pub fn options(&self) -> &ResourceOptions {
        &self.options
    }

    pub fn is_abstract(&self) -> bool {
        self.options.is_abstract
    }

    /// Register a field declared directly on this resource
    pub fn add_field(&mut self, name: &str, field: Field) -> Result<()> {
        let declared_by = self.resource_name.clone();
        self.insert(name, Property::Field(field), &declared_by)
    }

    /// Register a relationship declared directly on this resource
    pub fn add_relationship(&mut self, name: &str, relationship: Relationship) -> Result<()> {
        let declared_by = self.resource_name.clone();
        self.insert(name, Property::Relationship(relationship), &declared_by)
    }

    /// Register a property produced by the collector
    pub fn register(&mut self, collected: CollectedProperty) -> Result<()> {
        self.insert(&collected.name, collected.property, &collected.declared_by)
    }

    /// Register a field ahead of every other property
    pub fn prepend_field(&mut self, name: &str, field: Field) -> Result<()> {
        if let Some(origin) = self.declared_by(name) {
            return Err(ResourceError::DuplicateProperty {
                resource: origin.to_string(),
                property: name.to_string(),
            });
        }
        let property = Property::Field(field);
        self.model_builder
            .insert_builder(0, property.create_builder(name));
        if let Property::Field(field) = property {
            self.fields.insert(
                0,
                FieldEntry {
                    name: name.to_string(),
                    field,
                    declared_by: self.resource_name.clone(),
                },
            );
        }
        Ok(())
    }

    fn declared_by(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.declared_by.as_str())
            .or_else(|| {
                self.relationships
                    .iter()
                    .find(|e| e.name == name)
                    .map(|e| e.declared_by.as_str())
            })
    }

    fn insert(&mut self, name: &str, property: Property, declared_by: &str) -> Result<()> {
        let builder = property.create_builder(name);

        match self.declared_by(name) {
            Some(origin) if origin == declared_by => {
                return Err(ResourceError::DuplicateProperty {
                    resource: self.resource_name.clone(),
                    property: name.to_string(),
                });
            }
            Some(origin) => {
                log::debug!(
                    "'{}.{}' declared by '{}' shadows the one inherited from '{}'",
                    self.resource_name,
                    name,
                    declared_by,
                    origin
                );
                self.model_builder.replace_builder(name, builder);
            }
            None => self.model_builder.add_builder(builder),
        }

        match property {
            Property::Field(field) => {
                self.relationships.retain(|e| e.name != name);
                let entry = FieldEntry {
                    name: name.to_string(),
                    field,
                    declared_by: declared_by.to_string(),
                };
                match self.fields.iter_mut().find(|e| e.name == name) {
                    Some(slot) => *slot = entry,
                    None => self.fields.push(entry),
                }
            }
            Property::Relationship(relationship) => {
                self.fields.retain(|e| e.name != name);
                let entry = RelationshipEntry {
                    name: name.to_string(),
                    relationship,
                    declared_by: declared_by.to_string(),
                };
                match self.relationships.iter_mut().find(|e| e.name == name) {
                    Some(slot) => *slot = entry,
                    None => self.relationships.push(entry),
                }
            }
        }
        Ok(())
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|e| e.name == name).map(|e| &e.field)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields
            .iter_mut()
            .find(|e| e.name == name)
            .map(|e| &mut e.field)
    }

    pub fn relationship(&self, name: &str) -> Option<&Relationship> {
        self.relationships
            .iter()
            .find(|e| e.name == name)
            .map(|e| &e.relationship)
    }

    pub fn relationship_mut(&mut self, name: &str) -> Option<&mut Relationship> {
        self.relationships
            .iter_mut()
            .find(|e| e.name == name)
            .map(|e| &mut e.relationship)
    }

    pub fn fields(&self) -> &[FieldEntry] {
        &self.fields
    }

    pub fn relationships(&self) -> &[RelationshipEntry] {
        &self.relationships
    }

    pub(crate) fn relationships_mut(&mut self) -> impl Iterator<Item = &mut RelationshipEntry> {
        self.relationships.iter_mut()
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.declared_by(name).is_some()
    }

    pub fn has_primary_key(&self) -> bool {
        self.fields.iter().any(|e| e.field.is_primary_key())
    }

    pub fn methods(&self) -> &[(String, ModelMethod)] {
        &self.methods
    }

    pub(crate) fn set_methods(&mut self, methods: Vec<(String, ModelMethod)>) {
        self.methods = methods;
    }

    pub fn model_builder(&self) -> &ModelBuilder {
        &self.model_builder
    }

    pub fn is_model_generated(&self) -> bool {
        self.model_builder.is_finished()
    }

    pub(crate) fn mark_model_generated(&mut self) {
        self.model_builder.finish();
    }

    pub fn view(&self) -> PropertyView<'_> {
        PropertyView {
            resource: &self.resource_name,
            fields: &self.fields,
            relationships: &self.relationships,
        }
    }

    /// Run one build phase on every builder, in builder-insertion order
    pub fn call_model_builder(
        &mut self,
        phase: BuildPhase,
        ctx: &mut BuildContext<'_>,
    ) -> Result<()> {
        let view = PropertyView {
            resource: &self.resource_name,
            fields: &self.fields,
            relationships: &self.relationships,
        };
        self.model_builder.run(phase, &view, ctx)
    }

    /// Run phase 1 on the builders that extend this resource's primary key
    pub fn call_primary_key_builders(&mut self, ctx: &mut BuildContext<'_>) -> Result<()> {
        let view = PropertyView {
            resource: &self.resource_name,
            fields: &self.fields,
            relationships: &self.relationships,
        };
        self.model_builder.run_primary_key_builders(&view, ctx)
    }

    /// Targets whose primary key this resource's primary key copies
    pub fn identifying_targets(&self) -> Vec<&str> {
        self.relationships
            .iter()
            .map(|e| &e.relationship)
            .filter(|r| r.is_identifying() && r.generate_foreign_key())
            .map(|r| r.target_name())
            .collect()
    }

    /// Discard builder state left by a failed compilation pass
    pub(crate) fn reset_model_builder(&mut self) {
        self.model_builder.reset();
    }

    /// Same as [`Self::call_model_builder`], addressing the phase by its
    /// operation name (`create_non_primary_key_columns`, `create_properties`)
    pub fn call_model_builder_named(
        &mut self,
        operation: &str,
        ctx: &mut BuildContext<'_>,
    ) -> Result<()> {
        let phase: BuildPhase = operation.parse()?;
        self.call_model_builder(phase, ctx)
    }
}

impl std::fmt::Debug for ResourceDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("ResourceDescriptor")
            .field("resource_name", &self.resource_name)
            .field("options", &self.options)
            .field("fields", &self.fields)
            .field("relationships", &self.relationships)
            .field("model_builder", &self.model_builder)
            .finish()
    }
}
