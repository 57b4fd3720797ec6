//! Descriptor configurators.
//!
//! Configurators run once per declared resource, after every property has
//! been registered on its descriptor and before any model is generated. They
//! may add properties or adjust existing ones.

use super::descriptor::ResourceDescriptor;
use super::errors::Result;
use super::property::Field;
use crate::config::CompilerConfig;

pub trait ResourceConfigurator: Send + Sync {
    fn name(&self) -> &str;

    fn configure(&self, descriptor: &mut ResourceDescriptor, config: &CompilerConfig)
        -> Result<()>;
}

/// Gives concrete resources without a primary key an integer one, placed
/// ahead of every other column
#[derive(Debug, Default, Clone, Copy)]
pub struct PrimaryKeyConfigurator;

impl ResourceConfigurator for PrimaryKeyConfigurator {
    fn name(&self) -> &str {
        "primary_key"
    }

    fn configure(
        &self,
        descriptor: &mut ResourceDescriptor,
        config: &CompilerConfig,
    ) -> Result<()> {
        if descriptor.is_abstract() || descriptor.has_primary_key() {
            return Ok(());
        }
        if descriptor
            .relationships()
            .iter()
            .any(|entry| entry.relationship.is_identifying())
        {
            return Ok(());
        }

        let column = config.primary_key_column.as_str();
        if descriptor.has_property(column) {
            log::warn!(
                "'{}' has no primary key but already declares '{}', not adding one",
                descriptor.resource_name(),
                column
            );
            return Ok(());
        }

        descriptor.prepend_field(column, Field::integer().primary_key())?;
        log::debug!(
            "Added primary key '{}' to '{}'",
            column,
            descriptor.resource_name()
        );
        Ok(())
    }
}
