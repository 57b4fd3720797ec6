//! YAML resource declarations.
//!
//! ```yaml
//! name: blog
//! resources:
//!   - name: UserAccount
//!     tablename: users
//!     fields:
//!       - name: id
//!         type: integer
//!         primary_key: true
//!       - name: email
//!         type: string
//!         length: 255
//!         nullable: false
//!     relationships:
//!       - name: posts
//!         kind: one_to_many
//!         target: Post
//!         inverse: author
//!   - name: Post
//!     fields:
//!       - name: title
//!         type: text
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use super::declaration::{Resource, ResourceDef};
use super::errors::{ResourceError, Result};
use super::property::{Field, Relationship, RelationshipKind};
use crate::ember::Ember;
use crate::model::schema::{ColumnOptions, ReferentialAction, SqlType};
use crate::utils::naming::{is_known_generator, named_generator};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceSchemaConfig {
    #[serde(default)]
    pub name: Option<String>,
    pub resources: Vec<ResourceDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDefinition {
    pub name: String,
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default)]
    pub tablename: Option<String>,
    #[serde(default)]
    pub tablename_generator: Option<String>,
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(default)]
    pub mixins: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
    #[serde(default)]
    pub relationships: Vec<RelationshipDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    /// Length of `string` columns
    #[serde(default)]
    pub length: Option<u32>,
    #[serde(default)]
    pub precision: Option<u32>,
    #[serde(default)]
    pub scale: Option<u32>,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub nullable: Option<bool>,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub index: bool,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub doc: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipDefinition {
    pub name: String,
    pub kind: RelationshipKind,
    pub target: String,
    #[serde(default)]
    pub inverse: Option<String>,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub identifying: bool,
    #[serde(default)]
    pub on_update: Option<ReferentialAction>,
    #[serde(default)]
    pub on_delete: Option<ReferentialAction>,
}

impl FieldDefinition {
    fn sql_type(&self) -> SqlType {
        // FromStr for SqlType never fails
        let parsed = self
            .field_type
            .parse::<SqlType>()
            .unwrap_or_else(|never| match never {});
        match parsed {
            SqlType::String(_) => SqlType::String(self.length),
            SqlType::Numeric { precision, scale } => SqlType::Numeric {
                precision: self.precision.unwrap_or(precision),
                scale: self.scale.unwrap_or(scale),
            },
            other => other,
        }
    }

    pub fn to_field(&self) -> Field {
        let mut field = Field::of(self.sql_type()).with_options(ColumnOptions {
            primary_key: self.primary_key,
            nullable: self.nullable,
            unique: self.unique,
            index: self.index,
            default: self.default.clone(),
        });
        if let Some(doc) = &self.doc {
            field = field.doc(doc.clone());
        }
        field
    }
}

impl RelationshipDefinition {
    pub fn to_relationship(&self) -> Relationship {
        let mut relationship = Relationship::new(self.kind, self.target.clone());
        if let Some(inverse) = &self.inverse {
            relationship = relationship.inverse(inverse.clone());
        }
        if self.primary {
            relationship = relationship.primary();
        }
        if self.identifying {
            relationship = relationship.identifying();
        }
        if let Some(action) = self.on_update {
            relationship = relationship.on_update(action);
        }
        if let Some(action) = self.on_delete {
            relationship = relationship.on_delete(action);
        }
        relationship
    }
}

impl ResourceDefinition {
    pub fn to_resource_def(&self) -> Result<ResourceDef> {
        let mut def = ResourceDef::new(self.name.clone());
        if let Some(parent) = &self.extends {
            def = def.extends(parent.clone());
        }
        for mixin in &self.mixins {
            def = def.mixin(mixin.clone());
        }
        if self.is_abstract {
            def = def.abstract_resource();
        }
        if let Some(tablename) = &self.tablename {
            def = def.tablename(tablename.clone());
        }
        if let Some(generator) = &self.tablename_generator {
            def = def.tablename_generator(named_generator(generator)?);
        }
        if let Some(doc) = &self.doc {
            def = def.doc(doc.clone());
        }
        for field in &self.fields {
            def = def.field(field.name.clone(), field.to_field());
        }
        for relationship in &self.relationships {
            def = def.relationship(relationship.name.clone(), relationship.to_relationship());
        }
        Ok(def)
    }
}

impl ResourceSchemaConfig {
    /// Load resource declarations from YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| ResourceError::ConfigReadError {
            error: e.to_string(),
        })?;

        Self::from_yaml_str(&contents)
    }

    /// Parse resource declarations from YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| ResourceError::ConfigParseError {
            error: e.to_string(),
        })
    }

    /// Basic validation of the declarations
    pub fn validate(&self) -> Result<()> {
        if self.resources.is_empty() {
            return Err(ResourceError::InvalidConfig {
                message: "Declarations must contain at least one resource".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for resource in &self.resources {
            if !seen.insert(resource.name.as_str()) {
                return Err(ResourceError::InvalidConfig {
                    message: format!("Duplicate resource name: {}", resource.name),
                });
            }
        }

        for resource in &self.resources {
            if let Some(parent) = &resource.extends {
                if !seen.contains(parent.as_str()) {
                    return Err(ResourceError::InvalidConfig {
                        message: format!(
                            "Resource '{}' extends unknown resource '{}'",
                            resource.name, parent
                        ),
                    });
                }
            }
            if let Some(generator) = &resource.tablename_generator {
                if !is_known_generator(generator) {
                    return Err(ResourceError::UnknownTableNameGenerator {
                        name: generator.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Resource definitions ordered so every parent precedes its subclasses
    pub fn declaration_order(&self) -> Result<Vec<&ResourceDefinition>> {
        let mut ordered = Vec::with_capacity(self.resources.len());
        let mut placed: HashSet<&str> = HashSet::new();
        let mut remaining: Vec<&ResourceDefinition> = self.resources.iter().collect();

        while !remaining.is_empty() {
            let (ready, blocked): (Vec<_>, Vec<_>) =
                remaining.into_iter().partition(|resource| {
                    resource
                        .extends
                        .as_deref()
                        .map_or(true, |parent| placed.contains(parent))
                });
            if ready.is_empty() {
                let names: Vec<&str> = blocked.iter().map(|r| r.name.as_str()).collect();
                return Err(ResourceError::InvalidConfig {
                    message: format!("Inheritance cycle between resources: {:?}", names),
                });
            }
            for resource in ready {
                placed.insert(resource.name.as_str());
                ordered.push(resource);
            }
            remaining = blocked;
        }

        Ok(ordered)
    }

    /// Validate and declare every resource into `ember`, parents first
    pub fn declare_into(&self, ember: &mut Ember) -> Result<Vec<Arc<Resource>>> {
        self.validate()?;
        let mut declared = Vec::with_capacity(self.resources.len());
        for definition in self.declaration_order()? {
            declared.push(ember.declare(definition.to_resource_def()?)?);
        }
        log::info!(
            "Declared {} resource(s) from '{}'",
            declared.len(),
            self.name.as_deref().unwrap_or("<unnamed>")
        );
        Ok(declared)
    }
}
