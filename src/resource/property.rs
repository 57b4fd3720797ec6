//! Declared properties: fields and relationships.
//!
//! Every property receives a process-wide creation index when it is
//! constructed. The collector orders inherited properties by this index so
//! that ancestors list their properties in declaration order.
//!
//! Properties are plain values. Cloning one yields an independent copy; this
//! is how inherited properties are isolated between a base resource and its
//! subclasses.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::declaration::Resource;
use super::errors::{ResourceError, Result};
use super::registry::ResourceRegistry;
use crate::model::builder::{FieldBuilder, PropertyBuilder};
use crate::model::relationship_builder::RelationshipBuilder;
use crate::model::schema::{ColumnOptions, ReferentialAction, SqlType};

static CREATION_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_creation_index() -> u64 {
    CREATION_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Callback creating the storage type of a field's column
pub type StorageTypeFactory = Arc<dyn Fn() -> SqlType + Send + Sync>;

#[derive(Clone)]
pub struct Field {
    storage_type: StorageTypeFactory,
    pub column_options: ColumnOptions,
    pub doc: Option<String>,
    creation_index: u64,
}

impl Field {
    pub fn new(storage_type: impl Fn() -> SqlType + Send + Sync + 'static) -> Self {
        Self {
            storage_type: Arc::new(storage_type),
            column_options: ColumnOptions::default(),
            doc: None,
            creation_index: next_creation_index(),
        }
    }

    /// Field with a fixed storage type
    pub fn of(sql_type: SqlType) -> Self {
        Self::new(move || sql_type.clone())
    }

    pub fn primary_key(mut self) -> Self {
        self.column_options.primary_key = true;
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.column_options.nullable = Some(nullable);
        self
    }

    pub fn unique(mut self) -> Self {
        self.column_options.unique = true;
        self
    }

    pub fn index(mut self) -> Self {
        self.column_options.index = true;
        self
    }

    pub fn default_value(mut self, expression: impl Into<String>) -> Self {
        self.column_options.default = Some(expression.into());
        self
    }

    pub fn with_options(mut self, options: ColumnOptions) -> Self {
        self.column_options = options;
        self
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn create_storage_type(&self) -> SqlType {
        (self.storage_type)()
    }

    pub fn is_primary_key(&self) -> bool {
        self.column_options.primary_key
    }

    pub fn creation_index(&self) -> u64 {
        self.creation_index
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Field")
            .field("storage_type", &self.create_storage_type())
            .field("column_options", &self.column_options)
            .field("creation_index", &self.creation_index)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    ManyToOne,
    OneToMany,
    OneToOne,
}

impl RelationshipKind {
    /// To-many sides are exposed as collections
    pub fn use_list(self) -> bool {
        matches!(self, RelationshipKind::OneToMany)
    }

    pub fn inverse_kind(self) -> RelationshipKind {
        match self {
            RelationshipKind::ManyToOne => RelationshipKind::OneToMany,
            RelationshipKind::OneToMany => RelationshipKind::ManyToOne,
            RelationshipKind::OneToOne => RelationshipKind::OneToOne,
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RelationshipKind::ManyToOne => write!(f, "many-to-one"),
            RelationshipKind::OneToMany => write!(f, "one-to-many"),
            RelationshipKind::OneToOne => write!(f, "one-to-one"),
        }
    }
}

/// Relationship target named by resource, resolved lazily against the registry
#[derive(Debug, Clone)]
pub struct RelationshipTarget {
    name: String,
    resolved: Option<Arc<Resource>>,
}

impl RelationshipTarget {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resolved: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }

    pub fn resource(&self) -> Option<&Arc<Resource>> {
        self.resolved.as_ref()
    }

    /// Resolve the target name; `context` names the declaring relationship
    pub fn resolve(
        &mut self,
        registry: &ResourceRegistry,
        context: &str,
    ) -> Result<Arc<Resource>> {
        let resource = registry.get(&self.name).cloned().ok_or_else(|| {
            ResourceError::unresolved_target_with_context(self.name.clone(), context)
        })?;
        self.resolved = Some(resource.clone());
        Ok(resource)
    }
}

#[derive(Debug, Clone)]
pub struct Relationship {
    kind: RelationshipKind,
    target: RelationshipTarget,
    inverse: Option<String>,
    primary: bool,
    identifying: bool,
    on_update: Option<ReferentialAction>,
    on_delete: Option<ReferentialAction>,
    synthesized: bool,
    creation_index: u64,
}

impl Relationship {
    pub fn new(kind: RelationshipKind, target: impl Into<String>) -> Self {
        Self {
            kind,
            target: RelationshipTarget::new(target),
            inverse: None,
            // the "one" side of a one-to-many never hosts the key
            primary: matches!(kind, RelationshipKind::OneToMany),
            identifying: false,
            on_update: Some(ReferentialAction::Cascade),
            on_delete: None,
            synthesized: false,
            creation_index: next_creation_index(),
        }
    }

    pub fn many_to_one(target: impl Into<String>) -> Self {
        Self::new(RelationshipKind::ManyToOne, target)
    }

    pub fn one_to_many(target: impl Into<String>) -> Self {
        Self::new(RelationshipKind::OneToMany, target)
    }

    pub fn one_to_one(target: impl Into<String>) -> Self {
        Self::new(RelationshipKind::OneToOne, target)
    }

    pub fn inverse(mut self, name: impl Into<String>) -> Self {
        self.inverse = Some(name.into());
        self
    }

    /// Mark this side as primary: it will not host the generated key
    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    /// Generated key columns become part of this table's primary key
    pub fn identifying(mut self) -> Self {
        self.identifying = true;
        self
    }

    pub fn on_update(mut self, action: ReferentialAction) -> Self {
        self.on_update = Some(action);
        self
    }

    pub fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = Some(action);
        self
    }

    pub(crate) fn synthesized(mut self) -> Self {
        self.synthesized = true;
        self
    }

    pub fn kind(&self) -> RelationshipKind {
        self.kind
    }

    pub fn target(&self) -> &RelationshipTarget {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut RelationshipTarget {
        &mut self.target
    }

    pub fn target_name(&self) -> &str {
        self.target.name()
    }

    pub fn inverse_name(&self) -> Option<&str> {
        self.inverse.as_deref()
    }

    pub(crate) fn set_inverse(&mut self, name: impl Into<String>) {
        self.inverse = Some(name.into());
    }

    pub fn is_primary(&self) -> bool {
        self.primary
    }

    pub fn is_identifying(&self) -> bool {
        self.identifying
    }

    pub fn is_synthesized(&self) -> bool {
        self.synthesized
    }

    pub fn use_list(&self) -> bool {
        self.kind.use_list()
    }

    /// Whether this side hosts the foreign key; evaluated from the current
    /// primary flag, which binding may settle after declaration
    pub fn generate_foreign_key(&self) -> bool {
        !self.primary
    }

    pub fn foreign_key_actions(&self) -> (Option<ReferentialAction>, Option<ReferentialAction>) {
        (self.on_update, self.on_delete)
    }

    pub fn creation_index(&self) -> u64 {
        self.creation_index
    }
}

/// Field or relationship declared on a resource
#[derive(Debug, Clone)]
pub enum Property {
    Field(Field),
    Relationship(Relationship),
}

impl Property {
    pub fn creation_index(&self) -> u64 {
        match self {
            Property::Field(field) => field.creation_index(),
            Property::Relationship(relationship) => relationship.creation_index(),
        }
    }

    pub fn as_field(&self) -> Option<&Field> {
        match self {
            Property::Field(field) => Some(field),
            Property::Relationship(_) => None,
        }
    }

    pub fn as_relationship(&self) -> Option<&Relationship> {
        match self {
            Property::Relationship(relationship) => Some(relationship),
            Property::Field(_) => None,
        }
    }

    /// Fresh builder for this property registered under `name`
    pub fn create_builder(&self, name: &str) -> Box<dyn PropertyBuilder> {
        match self {
            Property::Field(_) => Box::new(FieldBuilder::new(name)),
            Property::Relationship(relationship) => Box::new(RelationshipBuilder::new(
                name,
                relationship.use_list(),
                relationship.is_identifying(),
            )),
        }
    }
}

impl From<Field> for Property {
    fn from(field: Field) -> Self {
        Property::Field(field)
    }
}

impl From<Relationship> for Property {
    fn from(relationship: Relationship) -> Self {
        Property::Relationship(relationship)
    }
}
