//! Foreign-key synthesis for relationships.
//!
//! A side that hosts the key mirrors every primary-key column of its target
//! as `{relationship}_{target_pk}` and groups them in one composite
//! constraint named `{table}_{columns}_fk`:
//!
//! ```text
//! target "pair" PK (id_a, id_b), relationship "pair" on table "link"
//!   columns:    pair_id_a, pair_id_b
//!   constraint: link_pair_id_a_pair_id_b_fk -> pair (id_a, id_b) ON UPDATE CASCADE
//! ```
//!
//! The primary side of a pair hosts nothing; its join clauses are read back
//! from the key the other side generated.

use super::builder::{BuildContext, PropertyBuilder};
use super::schema::{
    Column, ColumnOptions, ForeignKeyConstraint, JoinClause, LazyMode, MappedProperty, Relation,
    Table,
};
use crate::resource::descriptor::PropertyView;
use crate::resource::errors::{ResourceError, Result};
use crate::resource::property::Relationship;

#[derive(Debug, Clone)]
pub struct RelationshipBuilder {
    name: String,
    use_list: bool,
    /// Generated key columns join the owner's primary key
    force_primary_key: bool,
    join_clauses: Vec<JoinClause>,
    /// Phase 1 already ran in this pass
    columns_created: bool,
}

impl RelationshipBuilder {
    pub fn new(name: impl Into<String>, use_list: bool, force_primary_key: bool) -> Self {
        Self {
            name: name.into(),
            use_list,
            force_primary_key,
            join_clauses: Vec::new(),
            columns_created: false,
        }
    }

    pub fn join_clauses(&self) -> &[JoinClause] {
        &self.join_clauses
    }

    fn relationship<'v>(&self, view: &PropertyView<'v>) -> Option<&'v Relationship> {
        let relationship = view.relationship(&self.name);
        if relationship.is_none() {
            log::warn!(
                "No relationship '{}' registered on '{}', skipping builder",
                self.name,
                view.resource_name()
            );
        }
        relationship
    }

    /// Join clauses of the primary side, derived from the constraint the
    /// inverse side generated on the target table: exactly the columns
    /// `{inverse}_{pk}` for every primary-key column of the owner
    fn inverse_join_clauses(owner: &Table, target: &Table, inverse: &str) -> Vec<JoinClause> {
        let owner_fullname = owner.fullname();
        let owner_pk: Vec<&str> = owner
            .primary_key_columns()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        let expected: Vec<String> = owner_pk
            .iter()
            .map(|pk| format!("{}_{}", inverse, pk))
            .collect();

        target
            .constraints
            .iter()
            .find(|fk| {
                fk.referred_table == owner_fullname
                    && fk.columns == expected
                    && fk.referred_columns.iter().map(String::as_str).eq(owner_pk.iter().copied())
            })
            .map(|fk| {
                fk.referred_columns
                    .iter()
                    .zip(fk.columns.iter())
                    .map(|(local, remote)| JoinClause {
                        local: format!("{}.{}", owner_fullname, local),
                        remote: format!("{}.{}", target.fullname(), remote),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl PropertyBuilder for RelationshipBuilder {
    fn property_name(&self) -> &str {
        &self.name
    }

    fn create_non_primary_key_columns(
        &mut self,
        view: &PropertyView<'_>,
        ctx: &mut BuildContext<'_>,
    ) -> Result<()> {
        if self.columns_created {
            return Ok(());
        }
        let Some(relationship) = self.relationship(view) else {
            return Ok(());
        };
        if !relationship.generate_foreign_key() {
            return Ok(());
        }

        let (target_pk, referred_table) = {
            let target = ctx.target_table(relationship.target_name())?;
            let pk: Vec<Column> = target.primary_key_columns().into_iter().cloned().collect();
            if pk.is_empty() {
                return Err(ResourceError::missing_primary_key_with_context(
                    target.name.clone(),
                    format!(
                        "relationship '{}' on resource '{}' needs a key to reference",
                        self.name,
                        view.resource_name()
                    ),
                ));
            }
            (pk, target.fullname())
        };

        let owner = ctx.owner_table_mut()?;
        let owner_fullname = owner.fullname();
        let mut columns = Vec::with_capacity(target_pk.len());
        for pk in &target_pk {
            let column_name = format!("{}_{}", self.name, pk.name);
            if owner.column(&column_name).is_some() {
                return Err(ResourceError::DuplicateProperty {
                    resource: view.resource_name().to_string(),
                    property: column_name,
                });
            }
            owner.add_column(Column::new(
                column_name.clone(),
                pk.sql_type.clone(),
                ColumnOptions {
                    primary_key: self.force_primary_key,
                    ..Default::default()
                },
            ));
            self.join_clauses.push(JoinClause {
                local: format!("{}.{}", owner_fullname, column_name),
                remote: format!("{}.{}", referred_table, pk.name),
            });
            columns.push(column_name);
        }

        let (on_update, on_delete) = relationship.foreign_key_actions();
        let constraint = ForeignKeyConstraint {
            name: format!("{}_{}_fk", owner.name, columns.join("_")),
            columns,
            referred_table,
            referred_columns: target_pk.into_iter().map(|c| c.name).collect(),
            on_update,
            on_delete,
        };
        log::debug!(
            "'{}.{}' generated foreign key '{}'",
            view.resource_name(),
            self.name,
            constraint.name
        );
        owner.add_constraint(constraint);
        self.columns_created = true;
        Ok(())
    }

    fn create_properties(
        &mut self,
        view: &PropertyView<'_>,
        ctx: &mut BuildContext<'_>,
    ) -> Result<()> {
        let Some(relationship) = self.relationship(view) else {
            return Ok(());
        };

        let mut join_clauses = self.join_clauses.clone();
        if join_clauses.is_empty() {
            if let Some(inverse) = relationship.inverse_name() {
                let target = ctx.target_table(relationship.target_name())?;
                join_clauses = Self::inverse_join_clauses(ctx.owner_table()?, target, inverse);
            }
        }

        ctx.add_mapped_property(MappedProperty::Relation(Relation {
            name: self.name.clone(),
            target: relationship.target_name().to_string(),
            lazy: if self.use_list {
                LazyMode::Dynamic
            } else {
                LazyMode::Select
            },
            use_list: self.use_list,
            back_populates: relationship.inverse_name().map(str::to_string),
            join_clauses,
        }))
    }

    fn forces_primary_key(&self) -> bool {
        self.force_primary_key
    }

    fn reset(&mut self) {
        self.join_clauses.clear();
        self.columns_created = false;
    }
}
