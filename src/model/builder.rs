//! Builder graph.
//!
//! Every property registered on a [`ResourceDescriptor`] contributes one
//! [`PropertyBuilder`]. The model generator drives builders through the two
//! [`BuildPhase`]s against in-progress table drafts:
//!
//! 1. `create_non_primary_key_columns` - synthesize key columns and
//!    constraints that depend on other tables' primary keys
//! 2. `create_properties` - register logical properties (column mappings and
//!    relation objects) on the owning model
//!
//! Phase 1 runs for every resource of a compilation unit before any phase 2
//! step, so mutually dependent resources see each other's key columns.
//! Builders whose key columns become part of the owner's primary key
//! ([`PropertyBuilder::forces_primary_key`]) run their phase 1 step first,
//! targets before dependents, so every primary key is complete before a
//! foreign key copies it.
//!
//! [`ResourceDescriptor`]: crate::resource::descriptor::ResourceDescriptor

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::generator::ModelRegistry;
use super::schema::{GeneratedModel, MappedProperty, Table};
use crate::resource::descriptor::PropertyView;
use crate::resource::errors::{ResourceError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildPhase {
    NonPrimaryKeyColumns,
    Properties,
}

impl BuildPhase {
    /// Phases in execution order
    pub const ALL: [BuildPhase; 2] = [BuildPhase::NonPrimaryKeyColumns, BuildPhase::Properties];

    pub fn operation(self) -> &'static str {
        match self {
            BuildPhase::NonPrimaryKeyColumns => "create_non_primary_key_columns",
            BuildPhase::Properties => "create_properties",
        }
    }
}

impl fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.operation())
    }
}

impl FromStr for BuildPhase {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "create_non_primary_key_columns" => Ok(BuildPhase::NonPrimaryKeyColumns),
            "create_properties" => Ok(BuildPhase::Properties),
            other => Err(ResourceError::UnknownBuildPhase {
                phase: other.to_string(),
            }),
        }
    }
}

/// Mutable view of the compilation unit handed to builders.
///
/// `drafts` holds the models being compiled in this pass; `generated` holds
/// models cached by earlier passes, which are read-only.
pub struct BuildContext<'a> {
    owner: &'a str,
    drafts: &'a mut HashMap<String, GeneratedModel>,
    generated: &'a ModelRegistry,
}

impl<'a> BuildContext<'a> {
    pub fn new(
        owner: &'a str,
        drafts: &'a mut HashMap<String, GeneratedModel>,
        generated: &'a ModelRegistry,
    ) -> Self {
        Self {
            owner,
            drafts,
            generated,
        }
    }

    pub fn owner(&self) -> &str {
        self.owner
    }

    fn owner_model_mut(&mut self) -> Result<&mut GeneratedModel> {
        self.drafts
            .get_mut(self.owner)
            .ok_or_else(|| ResourceError::UnresolvedTarget {
                target: self.owner.to_string(),
            })
    }

    pub fn owner_table(&self) -> Result<&Table> {
        let model = self
            .drafts
            .get(self.owner)
            .ok_or_else(|| ResourceError::UnresolvedTarget {
                target: self.owner.to_string(),
            })?;
        model.table.as_ref().ok_or_else(|| ResourceError::AbstractTarget {
            target: self.owner.to_string(),
        })
    }

    pub fn owner_table_mut(&mut self) -> Result<&mut Table> {
        let owner = self.owner;
        self.owner_model_mut()?
            .table
            .as_mut()
            .ok_or_else(|| ResourceError::AbstractTarget {
                target: owner.to_string(),
            })
    }

    /// Table of `target`, looked up among the drafts first, then among
    /// already generated models
    pub fn target_table(&self, target: &str) -> Result<&Table> {
        let model = match self.drafts.get(target) {
            Some(draft) => draft,
            None => self
                .generated
                .get(target)
                .map(|model| model.as_ref())
                .ok_or_else(|| ResourceError::UnresolvedTarget {
                    target: target.to_string(),
                })?,
        };
        model.table.as_ref().ok_or_else(|| ResourceError::AbstractTarget {
            target: target.to_string(),
        })
    }

    pub fn add_mapped_property(&mut self, property: MappedProperty) -> Result<()> {
        let model = self.owner_model_mut()?;
        if model.property(property.name()).is_some() {
            return Err(ResourceError::DuplicateProperty {
                resource: model.resource.clone(),
                property: property.name().to_string(),
            });
        }
        model.properties.push(property);
        Ok(())
    }
}

/// Unit of work materializing one property.
///
/// Both phases default to no-ops; a builder implements the ones it takes
/// part in.
pub trait PropertyBuilder: fmt::Debug + Send + Sync {
    fn property_name(&self) -> &str;

    fn create_non_primary_key_columns(
        &mut self,
        _view: &PropertyView<'_>,
        _ctx: &mut BuildContext<'_>,
    ) -> Result<()> {
        Ok(())
    }

    fn create_properties(
        &mut self,
        _view: &PropertyView<'_>,
        _ctx: &mut BuildContext<'_>,
    ) -> Result<()> {
        Ok(())
    }

    /// Whether phase 1 of this builder adds columns to the owner's primary key
    fn forces_primary_key(&self) -> bool {
        false
    }

    /// Drop state recorded by an aborted pass
    fn reset(&mut self) {}
}

/// Maps a field's column onto the model.
///
/// The column itself is materialized with the table draft, before any phase
/// runs, so primary keys are visible to every relationship builder.
#[derive(Debug, Clone)]
pub struct FieldBuilder {
    name: String,
}

impl FieldBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl PropertyBuilder for FieldBuilder {
    fn property_name(&self) -> &str {
        &self.name
    }

    fn create_properties(
        &mut self,
        _view: &PropertyView<'_>,
        ctx: &mut BuildContext<'_>,
    ) -> Result<()> {
        ctx.add_mapped_property(MappedProperty::Column {
            name: self.name.clone(),
            column: self.name.clone(),
        })
    }
}

/// Ordered set of property builders of one resource
#[derive(Debug, Default)]
pub struct ModelBuilder {
    builders: Vec<Box<dyn PropertyBuilder>>,
    finished: bool,
}

impl ModelBuilder {
    pub fn add_builder(&mut self, builder: Box<dyn PropertyBuilder>) {
        self.builders.push(builder);
    }

    pub fn insert_builder(&mut self, index: usize, builder: Box<dyn PropertyBuilder>) {
        let index = index.min(self.builders.len());
        self.builders.insert(index, builder);
    }

    /// Replace the builder registered under `name`, keeping its position
    pub fn replace_builder(&mut self, name: &str, builder: Box<dyn PropertyBuilder>) {
        match self
            .builders
            .iter_mut()
            .find(|existing| existing.property_name() == name)
        {
            Some(slot) => *slot = builder,
            None => self.builders.push(builder),
        }
    }

    pub fn builder_names(&self) -> Vec<&str> {
        self.builders.iter().map(|b| b.property_name()).collect()
    }

    pub fn len(&self) -> usize {
        self.builders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }

    /// Invoke `phase` on every builder in insertion order
    pub fn run(
        &mut self,
        phase: BuildPhase,
        view: &PropertyView<'_>,
        ctx: &mut BuildContext<'_>,
    ) -> Result<()> {
        log::debug!(
            "Running {} on {} builder(s) of '{}'",
            phase,
            self.builders.len(),
            view.resource_name()
        );
        for builder in self.builders.iter_mut() {
            match phase {
                BuildPhase::NonPrimaryKeyColumns => {
                    builder.create_non_primary_key_columns(view, ctx)?
                }
                BuildPhase::Properties => builder.create_properties(view, ctx)?,
            }
        }
        Ok(())
    }

    /// Run phase 1 on the builders that extend the owner's primary key only
    pub fn run_primary_key_builders(
        &mut self,
        view: &PropertyView<'_>,
        ctx: &mut BuildContext<'_>,
    ) -> Result<()> {
        for builder in self
            .builders
            .iter_mut()
            .filter(|builder| builder.forces_primary_key())
        {
            log::debug!(
                "Creating primary key columns of '{}.{}'",
                view.resource_name(),
                builder.property_name()
            );
            builder.create_non_primary_key_columns(view, ctx)?;
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        for builder in self.builders.iter_mut() {
            builder.reset();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn finish(&mut self) {
        self.finished = true;
    }
}
