//! Compiler context.
//!
//! [`Ember`] owns everything the compiler keeps between calls: declared
//! resources, their descriptors, configurators and the generated-model cache.
//! Declare every resource first, then generate models or initialize a host
//! application; generation only reads declarations.
//!
//! ```ignore
//! let mut ember = Ember::new(CompilerConfig::default());
//! ember.declare(ResourceDef::new("UserAccount").field("email", Field::text()))?;
//! ember.declare(
//!     ResourceDef::new("Post")
//!         .relationship("author", Relationship::many_to_one("UserAccount")),
//! )?;
//!
//! let mut app = Application::new("blog");
//! let schema = ember.init_app(&mut app)?;
//! println!("{}", schema.to_sql());
//! ```

mod app;
mod compiled;

pub use app::{get_ember, Application, Extensions, HostApp, EXTENSION_NAME};
pub use compiled::CompiledSchema;

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::CompilerConfig;
use crate::model::generator::{ModelGenerator, ModelRegistry};
use crate::model::schema::GeneratedModel;
use crate::resource::collector::PropertyCollector;
use crate::resource::configurator::{PrimaryKeyConfigurator, ResourceConfigurator};
use crate::resource::declaration::{Resource, ResourceDef};
use crate::resource::descriptor::ResourceDescriptor;
use crate::resource::errors::Result;
use crate::resource::registry::ResourceRegistry;
use crate::utils::naming::validate_identifier;

pub struct Ember {
    config: CompilerConfig,
    resources: ResourceRegistry,
    descriptors: HashMap<String, ResourceDescriptor>,
    models: ModelRegistry,
    configurators: Vec<Box<dyn ResourceConfigurator>>,
}

impl Default for Ember {
    fn default() -> Self {
        Self::new(CompilerConfig::default())
    }
}

impl Ember {
    pub fn new(config: CompilerConfig) -> Self {
        let mut configurators: Vec<Box<dyn ResourceConfigurator>> = Vec::new();
        if config.auto_primary_key {
            configurators.push(Box::new(PrimaryKeyConfigurator));
        }
        Self {
            config,
            resources: ResourceRegistry::new(),
            descriptors: HashMap::new(),
            models: ModelRegistry::default(),
            configurators,
        }
    }

    /// Add a configurator, applied to resources declared from now on
    pub fn with_configurator(mut self, configurator: impl ResourceConfigurator + 'static) -> Self {
        self.configurators.push(Box::new(configurator));
        self
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Instrument and register a resource.
    ///
    /// Relationship targets are not looked up here; they may name resources
    /// declared later. A failing declaration registers nothing.
    pub fn declare(&mut self, def: ResourceDef) -> Result<Arc<Resource>> {
        let resource = Arc::new(def.build());
        let descriptor = self.instrument(&resource)?;
        let name = resource.name().to_string();

        if self.resources.register(resource.clone()).is_some() {
            log::warn!("Resource '{}' redefined", name);
        }
        log::info!(
            "Declared resource '{}' ({} fields, {} relationships)",
            name,
            descriptor.fields().len(),
            descriptor.relationships().len()
        );
        self.descriptors.insert(name, descriptor);
        Ok(resource)
    }

    /// Build the descriptor of `resource` without registering anything
    pub fn instrument(&self, resource: &Resource) -> Result<ResourceDescriptor> {
        validate_identifier("resource", resource.name())?;
        for (name, _) in resource.properties() {
            validate_identifier("property", name)?;
        }

        let collector = PropertyCollector::new(&self.resources);
        let mut descriptor = ResourceDescriptor::new(resource);
        for collected in collector.collect(resource)? {
            descriptor.register(collected)?;
        }
        descriptor.set_methods(collector.collect_methods(resource)?);

        for configurator in &self.configurators {
            log::debug!(
                "Applying configurator '{}' to '{}'",
                configurator.name(),
                resource.name()
            );
            configurator.configure(&mut descriptor, &self.config)?;
        }
        Ok(descriptor)
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<Resource>> {
        self.resources.resolve(name)
    }

    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    pub fn descriptor(&self, name: &str) -> Option<&ResourceDescriptor> {
        self.descriptors.get(name)
    }

    pub fn descriptor_mut(&mut self, name: &str) -> Option<&mut ResourceDescriptor> {
        self.descriptors.get_mut(name)
    }

    fn generator(&mut self) -> Result<ModelGenerator<'_>> {
        ModelGenerator::new(
            &self.config,
            &self.resources,
            &mut self.descriptors,
            &mut self.models,
        )
    }

    pub fn generate(&mut self, name: &str) -> Result<Arc<GeneratedModel>> {
        self.generator()?.generate(name)
    }

    pub fn generate_abstract(&mut self, name: &str) -> Result<Arc<GeneratedModel>> {
        self.generator()?.generate_abstract(name)
    }

    pub fn generate_all(&mut self) -> Result<Vec<Arc<GeneratedModel>>> {
        self.generator()?.generate_all()
    }

    /// Cached model, without generating
    pub fn model(&self, name: &str) -> Option<Arc<GeneratedModel>> {
        self.models.get(name).cloned()
    }

    pub fn models(&self) -> &ModelRegistry {
        &self.models
    }

    /// Generate every declared resource and snapshot the result
    pub fn compiled_schema(&mut self) -> Result<CompiledSchema> {
        Ok(CompiledSchema::new(self.generate_all()?))
    }

    /// Compile every declared resource and register the result on `app`.
    ///
    /// Initializing an application that already carries the extension is a
    /// no-op returning the registered schema.
    pub fn init_app<A: HostApp + ?Sized>(&mut self, app: &mut A) -> Result<Arc<CompiledSchema>> {
        if app.extensions().contains(EXTENSION_NAME) {
            log::info!("Application already initialized, skipping");
            return get_ember(app);
        }

        let schema = Arc::new(self.compiled_schema()?);
        app.extensions_mut().insert(EXTENSION_NAME, schema.clone());
        log::info!(
            "Initialized application with {} model(s)",
            schema.len()
        );
        Ok(schema)
    }
}

impl std::fmt::Debug for Ember {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let configurators: Vec<&str> = self.configurators.iter().map(|c| c.name()).collect();
        f.debug_struct("Ember")
            .field("config", &self.config)
            .field("resources", &self.resources.names())
            .field("models", &self.models.names())
            .field("configurators", &configurators)
            .finish()
    }
}
