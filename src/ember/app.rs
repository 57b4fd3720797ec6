//! Host application surface.
//!
//! A host exposes named, type-erased extensions. The compiler registers its
//! [`CompiledSchema`] under [`EXTENSION_NAME`] once initialization succeeds.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::compiled::CompiledSchema;
use crate::resource::errors::{ResourceError, Result};

pub const EXTENSION_NAME: &str = "ember";

#[derive(Clone, Default)]
pub struct Extensions {
    entries: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl Extensions {
    pub fn insert<T: Any + Send + Sync>(
        &mut self,
        name: impl Into<String>,
        value: Arc<T>,
    ) -> Option<Arc<dyn Any + Send + Sync>> {
        let value: Arc<dyn Any + Send + Sync> = value;
        self.entries.insert(name.into(), value)
    }

    /// Extension `name`, if present and of type `T`
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.entries.get(name).cloned()?.downcast::<T>().ok()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Extensions {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Extensions").field("names", &names).finish()
    }
}

pub trait HostApp {
    fn extensions(&self) -> &Extensions;
    fn extensions_mut(&mut self) -> &mut Extensions;
}

/// Minimal host application
#[derive(Debug, Clone, Default)]
pub struct Application {
    name: String,
    extensions: Extensions,
}

impl Application {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extensions: Extensions::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl HostApp for Application {
    fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }
}

/// Compiled schema registered on `app` by `Ember::init_app`
pub fn get_ember<A: HostApp + ?Sized>(app: &A) -> Result<Arc<CompiledSchema>> {
    app.extensions()
        .get::<CompiledSchema>(EXTENSION_NAME)
        .ok_or(ResourceError::NotInitialized)
}
