use serde::Serialize;
use std::sync::Arc;

use crate::model::ddl::{create_index_sql, create_table_sql};
use crate::model::schema::{GeneratedModel, Table};

/// Snapshot of every generated model, in resource declaration order
#[derive(Debug, Clone, Default)]
pub struct CompiledSchema {
    models: Vec<Arc<GeneratedModel>>,
}

#[derive(Serialize)]
struct SchemaSummary<'a> {
    models: Vec<&'a GeneratedModel>,
}

impl CompiledSchema {
    pub fn new(models: Vec<Arc<GeneratedModel>>) -> Self {
        Self { models }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<GeneratedModel>> {
        self.models.iter().find(|model| model.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<GeneratedModel>> + '_ {
        self.models.iter()
    }

    /// Tables of concrete models
    pub fn tables(&self) -> impl Iterator<Item = &Table> + '_ {
        self.models.iter().filter_map(|model| model.table.as_ref())
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// DDL of every concrete model
    pub fn to_sql(&self) -> String {
        self.tables()
            .map(|table| {
                let mut statements = vec![create_table_sql(table)];
                statements.extend(create_index_sql(table));
                statements.join("\n")
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&SchemaSummary {
            models: self.models.iter().map(|model| model.as_ref()).collect(),
        })
    }
}
