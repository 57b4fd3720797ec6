//! Model generation and the generated-model cache.
//!
//! `generate` is idempotent: the first call for a resource compiles its
//! compilation unit and caches one [`GeneratedModel`] per resource name;
//! later calls return the cached `Arc`. A failed compilation caches nothing.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use super::builder::{BuildContext, BuildPhase};
use super::schema::{Column, GeneratedModel, MappedProperty, Table};
use crate::config::CompilerConfig;
use crate::resource::binding::RelationshipBinder;
use crate::resource::descriptor::ResourceDescriptor;
use crate::resource::errors::{ResourceError, Result};
use crate::resource::registry::ResourceRegistry;
use crate::utils::naming::{named_generator, validate_identifier, TableNameGenerator};

/// Generated models keyed by resource name, in generation order
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: HashMap<String, Arc<GeneratedModel>>,
    order: Vec<String>,
}

impl ModelRegistry {
    pub fn get(&self, name: &str) -> Option<&Arc<GeneratedModel>> {
        self.models.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// Cache a model. An entry already present is kept and returned instead.
    pub(crate) fn insert(&mut self, model: GeneratedModel) -> Arc<GeneratedModel> {
        if let Some(existing) = self.models.get(&model.resource) {
            return existing.clone();
        }
        let name = model.resource.clone();
        let model = Arc::new(model);
        self.models.insert(name.clone(), model.clone());
        self.order.push(name);
        model
    }

    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<GeneratedModel>> + '_ {
        self.order.iter().filter_map(move |name| self.models.get(name))
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

pub struct ModelGenerator<'a> {
    config: &'a CompilerConfig,
    default_generator: TableNameGenerator,
    resources: &'a ResourceRegistry,
    descriptors: &'a mut HashMap<String, ResourceDescriptor>,
    models: &'a mut ModelRegistry,
}

impl<'a> ModelGenerator<'a> {
    pub fn new(
        config: &'a CompilerConfig,
        resources: &'a ResourceRegistry,
        descriptors: &'a mut HashMap<String, ResourceDescriptor>,
        models: &'a mut ModelRegistry,
    ) -> Result<Self> {
        Ok(Self {
            default_generator: named_generator(&config.tablename_generator)?,
            config,
            resources,
            descriptors,
            models,
        })
    }

    /// Cached model of `name`, compiling it (and its pending
    /// relationship targets) on first request
    pub fn generate(&mut self, name: &str) -> Result<Arc<GeneratedModel>> {
        if let Some(model) = self.models.get(name) {
            log::debug!("Model '{}' already generated, returning cached model", name);
            return Ok(model.clone());
        }

        let resource = self.resources.resolve(name)?;
        if resource.is_abstract() {
            return self.generate_abstract(name);
        }

        let component = RelationshipBinder::new(self.resources).bind(
            name,
            &mut *self.descriptors,
            &*self.models,
        )?;
        self.compile(&component)?;

        self.models
            .get(name)
            .cloned()
            .ok_or_else(|| ResourceError::UnresolvedTarget {
                target: name.to_string(),
            })
    }

    /// Abstract model of `name`: columns without a table, never persisted
    pub fn generate_abstract(&mut self, name: &str) -> Result<Arc<GeneratedModel>> {
        if let Some(model) = self.models.get(name) {
            log::debug!("Model '{}' already generated, returning cached model", name);
            return Ok(model.clone());
        }

        let mut model = self.draft(name, true)?;
        model.properties = self
            .descriptor(name)?
            .fields()
            .iter()
            .map(|entry| MappedProperty::Column {
                name: entry.name.clone(),
                column: entry.name.clone(),
            })
            .collect();

        let model = self.models.insert(model);
        if let Some(descriptor) = self.descriptors.get_mut(name) {
            descriptor.mark_model_generated();
        }
        log::info!("Generated abstract model '{}'", name);
        Ok(model)
    }

    /// Every registered resource, in declaration order
    pub fn generate_all(&mut self) -> Result<Vec<Arc<GeneratedModel>>> {
        let names: Vec<String> = self.resources.names().to_vec();
        names.iter().map(|name| self.generate(name)).collect()
    }

    fn descriptor(&self, name: &str) -> Result<&ResourceDescriptor> {
        self.descriptors
            .get(name)
            .ok_or_else(|| ResourceError::UnresolvedTarget {
                target: name.to_string(),
            })
    }

    /// Compile a bound unit: draft every table, run phase 1 on all of them,
    /// then phase 2, and cache the results only if every step succeeded.
    fn compile(&mut self, component: &[String]) -> Result<()> {
        let mut drafts = HashMap::with_capacity(component.len());
        for name in component {
            drafts.insert(name.clone(), self.draft(name, false)?);
        }

        if let Err(err) = self.run_phases(component, &mut drafts) {
            for name in component {
                if let Some(descriptor) = self.descriptors.get_mut(name) {
                    descriptor.reset_model_builder();
                }
            }
            log::warn!("Compilation of {:?} failed: {}", component, err);
            return Err(err);
        }

        for name in component {
            let Some(model) = drafts.remove(name) else {
                continue;
            };
            let tablename = model.tablename().unwrap_or_default().to_string();
            self.models.insert(model);
            if let Some(descriptor) = self.descriptors.get_mut(name) {
                descriptor.mark_model_generated();
            }
            log::info!("Generated model '{}' (table '{}')", name, tablename);
        }
        Ok(())
    }

    fn run_phases(
        &mut self,
        component: &[String],
        drafts: &mut HashMap<String, GeneratedModel>,
    ) -> Result<()> {
        for name in self.primary_key_order(component) {
            let descriptor = self.descriptors.get_mut(&name).ok_or_else(|| {
                ResourceError::UnresolvedTarget {
                    target: name.clone(),
                }
            })?;
            let mut ctx = BuildContext::new(&name, drafts, &*self.models);
            descriptor.call_primary_key_builders(&mut ctx)?;
        }

        for phase in BuildPhase::ALL {
            for name in component {
                let descriptor = self.descriptors.get_mut(name).ok_or_else(|| {
                    ResourceError::UnresolvedTarget {
                        target: name.clone(),
                    }
                })?;
                let mut ctx = BuildContext::new(name, drafts, &*self.models);
                descriptor.call_model_builder(phase, &mut ctx)?;
            }
        }
        Ok(())
    }

    /// Resources of the unit whose primary key copies another table's key,
    /// ordered so each comes after the unit members it copies from.
    ///
    /// Members caught in a cycle are appended in unit order; their builders
    /// then report the missing key.
    fn primary_key_order(&self, component: &[String]) -> Vec<String> {
        let mut pending: Vec<(&String, Vec<&str>)> = component
            .iter()
            .filter_map(|name| {
                let targets = self.descriptors.get(name)?.identifying_targets();
                (!targets.is_empty()).then_some((name, targets))
            })
            .collect();

        let mut ordered = Vec::with_capacity(pending.len());
        while !pending.is_empty() {
            let blocked: HashSet<&str> = pending.iter().map(|&(name, _)| name.as_str()).collect();
            let (ready, rest): (Vec<_>, Vec<_>) =
                pending.into_iter().partition(|(name, targets)| {
                    targets
                        .iter()
                        .all(|target| *target == name.as_str() || !blocked.contains(target))
                });
            if ready.is_empty() {
                ordered.extend(rest.into_iter().map(|(name, _)| name.clone()));
                break;
            }
            ordered.extend(ready.into_iter().map(|(name, _)| name.clone()));
            pending = rest;
        }
        ordered
    }

    /// Model shell with bases, methods and field columns materialized
    fn draft(&self, name: &str, is_abstract: bool) -> Result<GeneratedModel> {
        let resource = self.resources.resolve(name)?;
        let descriptor = self.descriptor(name)?;

        let columns: Vec<Column> = descriptor
            .fields()
            .iter()
            .map(|entry| {
                Column::new(
                    entry.name.clone(),
                    entry.field.create_storage_type(),
                    entry.field.column_options.clone(),
                )
            })
            .collect();

        let mut bases = resource.mixins().to_vec();
        bases.push(self.config.model_base.clone());

        let methods: BTreeMap<_, _> = descriptor.methods().iter().cloned().collect();

        let (table, mixin_columns) = if is_abstract {
            (None, columns)
        } else {
            let tablename = descriptor
                .options()
                .table_name_for(name, &self.default_generator);
            validate_identifier("table", &tablename)?;
            let mut table = Table::new(tablename, self.config.schema.clone());
            table.columns = columns;
            (Some(table), Vec::new())
        };

        Ok(GeneratedModel {
            name: name.to_string(),
            resource: name.to_string(),
            doc: resource.doc().map(str::to_string),
            bases,
            is_abstract,
            table,
            mixin_columns,
            properties: Vec::new(),
            methods,
        })
    }
}
