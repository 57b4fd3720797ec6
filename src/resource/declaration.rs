//! Resource declarations.
//!
//! A [`Resource`] is the immutable, declared shape of a data-model class:
//! its own properties in declaration order, its parent resource (if any),
//! non-resource mixin bases, options and methods. Declarations are built with
//! [`ResourceDef`] and handed to [`crate::ember::Ember::declare`], which
//! instruments them.
//!
//! ```ignore
//! let post = ResourceDef::new("Post")
//!     .field("title", Field::string(Some(200)).nullable(false))
//!     .relationship("author", Relationship::many_to_one("User").inverse("posts"))
//!     .tablename("posts");
//! ember.declare(post)?;
//! ```

use std::fmt;
use std::sync::Arc;

use super::options::ResourceOptions;
use super::property::{Field, Property, Relationship};
use crate::model::schema::GeneratedModel;
use crate::utils::naming::TableNameGenerator;

/// Method copied onto generated models
pub type ModelMethod = Arc<dyn Fn(&GeneratedModel) -> String + Send + Sync>;

pub struct Resource {
    name: String,
    parent: Option<String>,
    mixins: Vec<String>,
    properties: Vec<(String, Property)>,
    options: ResourceOptions,
    doc: Option<String>,
    methods: Vec<(String, ModelMethod)>,
}

impl Resource {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent resource this one extends
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Non-resource bases carried over to the generated model
    pub fn mixins(&self) -> &[String] {
        &self.mixins
    }

    /// Properties declared directly on this resource
    pub fn properties(&self) -> &[(String, Property)] {
        &self.properties
    }

    pub fn options(&self) -> &ResourceOptions {
        &self.options
    }

    pub fn is_abstract(&self) -> bool {
        self.options.is_abstract
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    pub fn methods(&self) -> &[(String, ModelMethod)] {
        &self.methods
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let methods: Vec<&str> = self.methods.iter().map(|(name, _)| name.as_str()).collect();
        f.debug_struct("Resource")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("mixins", &self.mixins)
            .field("properties", &self.properties)
            .field("options", &self.options)
            .field("methods", &methods)
            .finish()
    }
}

/// Builder for a [`Resource`] declaration
pub struct ResourceDef {
    resource: Resource,
}

impl ResourceDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            resource: Resource {
                name: name.into(),
                parent: None,
                mixins: Vec::new(),
                properties: Vec::new(),
                options: ResourceOptions::default(),
                doc: None,
                methods: Vec::new(),
            },
        }
    }

    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.resource.parent = Some(parent.into());
        self
    }

    pub fn mixin(mut self, base: impl Into<String>) -> Self {
        self.resource.mixins.push(base.into());
        self
    }

    pub fn field(self, name: impl Into<String>, field: Field) -> Self {
        self.property(name, Property::Field(field))
    }

    pub fn relationship(self, name: impl Into<String>, relationship: Relationship) -> Self {
        self.property(name, Property::Relationship(relationship))
    }

    pub fn property(mut self, name: impl Into<String>, property: Property) -> Self {
        self.resource.properties.push((name.into(), property));
        self
    }

    pub fn tablename(mut self, tablename: impl Into<String>) -> Self {
        self.resource.options.tablename = Some(tablename.into());
        self
    }

    pub fn tablename_generator(mut self, generator: TableNameGenerator) -> Self {
        self.resource.options.tablename_generator = Some(generator);
        self
    }

    pub fn abstract_resource(mut self) -> Self {
        self.resource.options.is_abstract = true;
        self
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.resource.doc = Some(doc.into());
        self
    }

    pub fn method(
        mut self,
        name: impl Into<String>,
        method: impl Fn(&GeneratedModel) -> String + Send + Sync + 'static,
    ) -> Self {
        self.resource.methods.push((name.into(), Arc::new(method)));
        self
    }

    pub fn name(&self) -> &str {
        &self.resource.name
    }

    pub fn parent(&self) -> Option<&str> {
        self.resource.parent.as_deref()
    }

    pub fn build(self) -> Resource {
        self.resource
    }
}
