pub mod builder;
pub mod ddl;
pub mod generator;
pub mod relationship_builder;
pub mod schema;

// Re-export commonly used types
pub use builder::{BuildContext, BuildPhase, FieldBuilder, ModelBuilder, PropertyBuilder};
pub use generator::{ModelGenerator, ModelRegistry};
pub use relationship_builder::RelationshipBuilder;
pub use schema::{
    Column, ColumnOptions, ForeignKeyConstraint, GeneratedModel, JoinClause, LazyMode,
    MappedProperty, ReferentialAction, Relation, SqlType, Table,
};
