pub mod binding;
pub mod collector;
pub mod configurator;
pub mod declaration;
pub mod descriptor;
pub mod errors;
mod field_types;
pub mod options;
pub mod property;
pub mod registry;
pub mod schema_config;

// Re-export commonly used types
pub use collector::{CollectedProperty, PropertyCollector};
pub use configurator::{PrimaryKeyConfigurator, ResourceConfigurator};
pub use declaration::{ModelMethod, Resource, ResourceDef};
pub use descriptor::{PropertyView, ResourceDescriptor};
pub use errors::{ResourceError, Result};
pub use options::ResourceOptions;
pub use property::{Field, Property, Relationship, RelationshipKind, RelationshipTarget};
pub use registry::ResourceRegistry;
pub use schema_config::{ResourceDefinition, ResourceSchemaConfig};
