//! Table definitions and `CREATE TABLE` rendering

use std::collections::HashSet;

use crate::error::{DbBuilderError, Result};
use crate::util::bracket_list;

use super::column::ColumnDefinition;
use super::foreign_key::ForeignKeyDefinition;
use super::scalar_type::{HostType, ScalarType};

/// Schema used when a table is created from a bare name
pub const DEFAULT_SCHEMA: &str = "dbo";

/// A table with its columns and foreign keys, both kept in insertion order
#[derive(Debug, Clone, PartialEq)]
pub struct TableDefinition {
    pub schema: String,
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
    pub foreign_keys: Vec<ForeignKeyDefinition>,
}

impl TableDefinition {
    /// Table in the `dbo` schema
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_schema(DEFAULT_SCHEMA, name)
    }

    pub fn with_schema(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            columns: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    /// `{schema}_{name}`, the scope for generated constraint names
    pub fn qualified_name(&self) -> String {
        format!("{}_{}", self.schema, self.name)
    }

    /// `[schema].[name]`
    pub fn full_name(&self) -> String {
        format!("[{}].[{}]", self.schema, self.name)
    }

    pub fn column(self, name: impl Into<String>, scalar_type: ScalarType) -> Self {
        self.column_with(name, scalar_type, |c| c)
    }

    pub fn column_with<F>(
        mut self,
        name: impl Into<String>,
        scalar_type: ScalarType,
        configure: F,
    ) -> Self
    where
        F: FnOnce(ColumnDefinition) -> ColumnDefinition,
    {
        let column = configure(ColumnDefinition::new(self.qualified_name(), name, scalar_type));
        self.add_column(column);
        self
    }

    /// Add a column whose type follows the Rust host type `T`.
    pub fn column_of<T: HostType>(
        self,
        name: impl Into<String>,
        configure: impl FnOnce(ColumnDefinition) -> ColumnDefinition,
    ) -> Self {
        self.column_with(name, T::SCALAR_TYPE, configure)
    }

    pub fn foreign_key(mut self, foreign_key: ForeignKeyDefinition) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    /// Append a prebuilt column, re-deriving its table-qualified name.
    pub fn add_column(&mut self, mut column: ColumnDefinition) {
        column.table_qualified_name = self.qualified_name();
        tracing::debug!(
            table = %self.full_name(),
            column = %column.name,
            sql_type = %column.sql_type(),
            "column added"
        );
        self.columns.push(column);
    }

    pub fn add_foreign_key(&mut self, foreign_key: ForeignKeyDefinition) {
        self.foreign_keys.push(foreign_key);
    }

    pub fn primary_key_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Render the `CREATE TABLE` block, terminated by its own `GO`.
    ///
    /// Rendering does not validate: an empty primary key renders as `([])`.
    pub fn render(&self) -> String {
        let scope = self.qualified_name();
        let mut script = format!("CREATE TABLE {} (\n", self.full_name());

        for column in &self.columns {
            script.push_str(&column.render());
            script.push_str(",\n");
        }

        script.push_str(&format!(
            "CONSTRAINT pk_{} PRIMARY KEY ({}),\n",
            scope,
            bracket_list(&self.primary_key_columns())
        ));

        for foreign_key in &self.foreign_keys {
            script.push_str(&foreign_key.render(&scope));
            script.push_str(",\n");
        }

        if script.ends_with(",\n") {
            script.truncate(script.len() - 2);
            script.push('\n');
        }

        script.push_str(");\nGO\n");
        script
    }

    /// Check the invariants the renderer does not enforce.
    pub fn validate(&self) -> Result<()> {
        let primary_key = self.primary_key_columns();
        if primary_key.is_empty() {
            return Err(self.invalid("no primary key column defined".to_string()));
        }

        if let Some(column) = self.columns.iter().find(|c| c.primary_key && c.nullable) {
            return Err(self.invalid(format!(
                "primary key column [{}] must not be nullable",
                column.name
            )));
        }

        let mut seen = HashSet::with_capacity(self.columns.len());
        for column in &self.columns {
            if !seen.insert(column.name.to_lowercase()) {
                return Err(self.invalid(format!("duplicate column [{}]", column.name)));
            }
        }

        let scope = self.qualified_name();
        for foreign_key in &self.foreign_keys {
            let name = foreign_key.constraint_name(&scope);
            if foreign_key.field_names.is_empty() {
                return Err(self.invalid(format!("foreign key {} has no columns", name)));
            }
            if foreign_key.field_names.len() != foreign_key.reference_fields.len() {
                return Err(self.invalid(format!(
                    "foreign key {} has {} column(s) but references {}",
                    name,
                    foreign_key.field_names.len(),
                    foreign_key.reference_fields.len()
                )));
            }
            if let Some(missing) = foreign_key
                .field_names
                .iter()
                .find(|f| !seen.contains(&f.to_lowercase()))
            {
                return Err(self.invalid(format!(
                    "foreign key {} uses unknown column [{}]",
                    name, missing
                )));
            }
        }

        Ok(())
    }

    fn invalid(&self, message: String) -> DbBuilderError {
        DbBuilderError::SchemaValidation {
            table: self.full_name(),
            message,
        }
    }
}
