//! Physical schema elements produced by the compiler.
//!
//! These are the storage-engine facing shapes: tables, columns, foreign-key
//! constraints and relation objects. They carry no behavior beyond lookup
//! helpers; the builders in [`crate::model::builder`] populate them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::resource::declaration::ModelMethod;

/// Storage type of a physical column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SqlType {
    Integer,
    BigInteger,
    SmallInteger,
    Float,
    Numeric { precision: u32, scale: u32 },
    String(Option<u32>),
    Text,
    Boolean,
    Date,
    DateTime,
    Binary,
    /// Engine specific type name passed through verbatim
    Custom(String),
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SqlType::Integer => write!(f, "INTEGER"),
            SqlType::BigInteger => write!(f, "BIGINT"),
            SqlType::SmallInteger => write!(f, "SMALLINT"),
            SqlType::Float => write!(f, "FLOAT"),
            SqlType::Numeric { precision, scale } => write!(f, "NUMERIC({}, {})", precision, scale),
            SqlType::String(Some(length)) => write!(f, "VARCHAR({})", length),
            SqlType::String(None) => write!(f, "VARCHAR"),
            SqlType::Text => write!(f, "TEXT"),
            SqlType::Boolean => write!(f, "BOOLEAN"),
            SqlType::Date => write!(f, "DATE"),
            SqlType::DateTime => write!(f, "TIMESTAMP"),
            SqlType::Binary => write!(f, "BLOB"),
            SqlType::Custom(name) => write!(f, "{}", name),
        }
    }
}

/// Parses the lowercase names used in declaration files.
/// Unknown names become [`SqlType::Custom`].
impl FromStr for SqlType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "integer" | "int" => SqlType::Integer,
            "big_integer" | "bigint" => SqlType::BigInteger,
            "small_integer" | "smallint" => SqlType::SmallInteger,
            "float" => SqlType::Float,
            "numeric" | "decimal" => SqlType::Numeric {
                precision: 10,
                scale: 2,
            },
            "string" | "varchar" => SqlType::String(None),
            "text" => SqlType::Text,
            "boolean" | "bool" => SqlType::Boolean,
            "date" => SqlType::Date,
            "datetime" | "timestamp" => SqlType::DateTime,
            "binary" | "blob" => SqlType::Binary,
            _ => SqlType::Custom(s.trim().to_string()),
        })
    }
}

/// Column options passed verbatim to the storage engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnOptions {
    #[serde(default)]
    pub primary_key: bool,
    /// None: engine default (nullable unless part of the primary key)
    #[serde(default)]
    pub nullable: Option<bool>,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub index: bool,
    /// Server-side default expression
    #[serde(default)]
    pub default: Option<String>,
}

impl ColumnOptions {
    pub fn is_nullable(&self) -> bool {
        self.nullable.unwrap_or(!self.primary_key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub sql_type: SqlType,
    pub options: ColumnOptions,
}

impl Column {
    pub fn new(name: impl Into<String>, sql_type: SqlType, options: ColumnOptions) -> Self {
        Self {
            name: name.into(),
            sql_type,
            options,
        }
    }

    pub fn is_primary_key(&self) -> bool {
        self.options.primary_key
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferentialAction {
    Cascade,
    SetNull,
    Restrict,
    NoAction,
}

impl fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ReferentialAction::Cascade => write!(f, "CASCADE"),
            ReferentialAction::SetNull => write!(f, "SET NULL"),
            ReferentialAction::Restrict => write!(f, "RESTRICT"),
            ReferentialAction::NoAction => write!(f, "NO ACTION"),
        }
    }
}

/// Composite-capable foreign key: `columns[i]` references `referred_columns[i]`
/// on `referred_table`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyConstraint {
    pub name: String,
    pub columns: Vec<String>,
    /// Full name of the referenced table (schema qualified when configured)
    pub referred_table: String,
    pub referred_columns: Vec<String>,
    pub on_update: Option<ReferentialAction>,
    pub on_delete: Option<ReferentialAction>,
}

impl ForeignKeyConstraint {
    /// Referenced columns in `table.column` form
    pub fn qualified_references(&self) -> Vec<String> {
        self.referred_columns
            .iter()
            .map(|column| format!("{}.{}", self.referred_table, column))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub schema: Option<String>,
    pub columns: Vec<Column>,
    pub constraints: Vec<ForeignKeyConstraint>,
}

impl Table {
    pub fn new(name: impl Into<String>, schema: Option<String>) -> Self {
        Self {
            name: name.into(),
            schema,
            columns: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// `schema.name` when a schema is set, otherwise `name`
    pub fn fullname(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, self.name),
            None => self.name.clone(),
        }
    }

    pub fn primary_key_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.is_primary_key()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn constraint(&self, name: &str) -> Option<&ForeignKeyConstraint> {
        self.constraints.iter().find(|c| c.name == name)
    }

    pub fn add_column(&mut self, column: Column) {
        self.columns.push(column);
    }

    pub fn add_constraint(&mut self, constraint: ForeignKeyConstraint) {
        self.constraints.push(constraint);
    }
}

/// Equality join between a generated key column and the target column it mirrors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinClause {
    pub local: String,
    pub remote: String,
}

impl fmt::Display for JoinClause {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} = {}", self.local, self.remote)
    }
}

/// Loading strategy of a relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LazyMode {
    /// Query object over the collection, used for to-many sides
    Dynamic,
    /// Single object loaded on access, used for to-one sides
    Select,
}

/// Bidirectional relation object registered on a model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub name: String,
    pub target: String,
    pub lazy: LazyMode,
    pub use_list: bool,
    pub back_populates: Option<String>,
    pub join_clauses: Vec<JoinClause>,
}

/// Property mapped onto a generated model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MappedProperty {
    Column { name: String, column: String },
    Relation(Relation),
}

impl MappedProperty {
    pub fn name(&self) -> &str {
        match self {
            MappedProperty::Column { name, .. } => name,
            MappedProperty::Relation(relation) => &relation.name,
        }
    }
}

/// Compiled physical representation of a resource.
///
/// Concrete models own a [`Table`]; abstract models carry their columns in
/// `mixin_columns` and are never persisted directly.
#[derive(Clone, Serialize)]
pub struct GeneratedModel {
    pub name: String,
    pub resource: String,
    pub doc: Option<String>,
    pub bases: Vec<String>,
    pub is_abstract: bool,
    pub table: Option<Table>,
    pub mixin_columns: Vec<Column>,
    pub properties: Vec<MappedProperty>,
    #[serde(skip)]
    pub methods: BTreeMap<String, ModelMethod>,
}

impl GeneratedModel {
    /// Columns of the table, or of the abstract column set
    pub fn columns(&self) -> &[Column] {
        match &self.table {
            Some(table) => &table.columns,
            None => &self.mixin_columns,
        }
    }

    pub fn tablename(&self) -> Option<&str> {
        self.table.as_ref().map(|t| t.name.as_str())
    }

    pub fn relation(&self, name: &str) -> Option<&Relation> {
        self.properties.iter().find_map(|p| match p {
            MappedProperty::Relation(relation) if relation.name == name => Some(relation),
            _ => None,
        })
    }

    pub fn property(&self, name: &str) -> Option<&MappedProperty> {
        self.properties.iter().find(|p| p.name() == name)
    }

    pub fn method_names(&self) -> Vec<&str> {
        self.methods.keys().map(|k| k.as_str()).collect()
    }

    /// Invoke a method copied from the resource declaration
    pub fn call_method(&self, name: &str) -> Option<String> {
        self.methods.get(name).map(|method| method(self))
    }

    pub fn same_model(a: &Arc<GeneratedModel>, b: &Arc<GeneratedModel>) -> bool {
        Arc::ptr_eq(a, b)
    }
}

impl fmt::Debug for GeneratedModel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("GeneratedModel")
            .field("name", &self.name)
            .field("resource", &self.resource)
            .field("is_abstract", &self.is_abstract)
            .field("bases", &self.bases)
            .field("table", &self.table)
            .field("mixin_columns", &self.mixin_columns)
            .field("properties", &self.properties)
            .field("methods", &self.method_names())
            .finish()
    }
}
