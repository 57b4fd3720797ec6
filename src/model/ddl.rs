//! `CREATE TABLE` rendering for compiled tables.

use super::schema::{Column, ForeignKeyConstraint, Table};

/// Render a schema element as a DDL fragment
pub trait ToDdl {
    fn to_ddl(&self) -> String;
}

impl ToDdl for Column {
    fn to_ddl(&self) -> String {
        let mut ddl = format!("{} {}", self.name, self.sql_type);
        if !self.options.is_nullable() {
            ddl.push_str(" NOT NULL");
        }
        if self.options.unique {
            ddl.push_str(" UNIQUE");
        }
        if let Some(default) = &self.options.default {
            ddl.push_str(&format!(" DEFAULT {}", default));
        }
        ddl
    }
}

impl ToDdl for ForeignKeyConstraint {
    fn to_ddl(&self) -> String {
        let mut ddl = format!(
            "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
            self.name,
            self.columns.join(", "),
            self.referred_table,
            self.referred_columns.join(", ")
        );
        if let Some(action) = self.on_update {
            ddl.push_str(&format!(" ON UPDATE {}", action));
        }
        if let Some(action) = self.on_delete {
            ddl.push_str(&format!(" ON DELETE {}", action));
        }
        ddl
    }
}

impl ToDdl for Table {
    fn to_ddl(&self) -> String {
        create_table_sql(self)
    }
}

pub fn create_table_sql(table: &Table) -> String {
    let mut lines: Vec<String> = table.columns.iter().map(ToDdl::to_ddl).collect();

    let pk: Vec<&str> = table
        .primary_key_columns()
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    if !pk.is_empty() {
        lines.push(format!("PRIMARY KEY ({})", pk.join(", ")));
    }
    lines.extend(table.constraints.iter().map(ToDdl::to_ddl));

    format!(
        "CREATE TABLE {} (\n    {}\n);",
        table.fullname(),
        lines.join(",\n    ")
    )
}

/// One `CREATE INDEX` per column flagged `index`
pub fn create_index_sql(table: &Table) -> Vec<String> {
    table
        .columns
        .iter()
        .filter(|c| c.options.index)
        .map(|c| {
            format!(
                "CREATE INDEX ix_{}_{} ON {} ({});",
                table.name,
                c.name,
                table.fullname(),
                c.name
            )
        })
        .collect()
}
