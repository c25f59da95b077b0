//! Declarative entity registry
//!
//! Types describe their table once through [`Entity::definition`]; the
//! builder turns that description into a [`TableDefinition`]. Field order in
//! the resulting table follows each field's `order`, with ties keeping
//! declaration order.

use super::column::ColumnDefinition;
use super::foreign_key::{ForeignKeyDefinition, ReferentialAction};
use super::scalar_type::{HostType, ScalarType};
use super::table::{TableDefinition, DEFAULT_SCHEMA};

/// A type that maps to one table
pub trait Entity {
    fn definition() -> EntityDefinition;
}

/// Table-level description of an entity
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDefinition {
    /// Defaults to `dbo`
    pub schema: Option<String>,
    pub name: String,
    pub fields: Vec<FieldDefinition>,
}

impl EntityDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    /// Build the table: columns sorted by `order`, one single-column foreign
    /// key per referencing field.
    pub fn into_table(self) -> TableDefinition {
        let schema = self.schema.unwrap_or_else(|| DEFAULT_SCHEMA.to_string());
        let mut table = TableDefinition::with_schema(schema, self.name);

        let mut fields = self.fields;
        fields.sort_by_key(|f| f.order);

        for field in fields {
            let column_name = field.column_name().to_string();

            if let Some(reference) = &field.references {
                table.add_foreign_key(
                    ForeignKeyDefinition::new(
                        [column_name.clone()],
                        &reference.table,
                        [&reference.field],
                    )
                    .target_schema(&reference.schema)
                    .on_update(reference.on_update)
                    .on_delete(reference.on_delete),
                );
            }

            table.add_column(field.into_column(column_name));
        }

        table
    }
}

/// Per-field column metadata
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    pub field_name: String,
    /// Overrides the column name when set
    pub column_name: Option<String>,
    pub scalar_type: ScalarType,
    pub length: u32,
    pub precision: u8,
    pub scale: u8,
    pub primary_key: bool,
    pub identity: bool,
    pub seed: i64,
    pub increment: i64,
    pub nullable: bool,
    pub unique: bool,
    pub default_value: Option<String>,
    pub order: i32,
    pub references: Option<FieldReference>,
}

impl FieldDefinition {
    pub fn new(field_name: impl Into<String>, scalar_type: ScalarType) -> Self {
        Self {
            field_name: field_name.into(),
            column_name: None,
            scalar_type,
            length: 0,
            precision: 0,
            scale: 0,
            primary_key: false,
            identity: false,
            seed: 1,
            increment: 1,
            nullable: true,
            unique: false,
            default_value: None,
            order: 0,
            references: None,
        }
    }

    /// Field typed after the Rust host type `T`
    pub fn of<T: HostType>(field_name: impl Into<String>) -> Self {
        Self::new(field_name, T::SCALAR_TYPE)
    }

    pub fn column_name(&self) -> &str {
        self.column_name.as_deref().unwrap_or(&self.field_name)
    }

    pub fn named(mut self, column_name: impl Into<String>) -> Self {
        self.column_name = Some(column_name.into());
        self
    }

    pub fn length(mut self, length: u32) -> Self {
        self.length = length;
        self
    }

    pub fn precision(mut self, precision: u8, scale: u8) -> Self {
        self.precision = precision;
        self.scale = scale;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn identity(mut self, seed: i64, increment: i64) -> Self {
        self.identity = true;
        self.seed = seed;
        self.increment = increment;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn default_value(mut self, expression: impl Into<String>) -> Self {
        self.default_value = Some(expression.into());
        self
    }

    pub fn order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn references(mut self, reference: FieldReference) -> Self {
        self.references = Some(reference);
        self
    }

    fn into_column(self, column_name: String) -> ColumnDefinition {
        ColumnDefinition {
            table_qualified_name: String::new(),
            name: column_name,
            scalar_type: self.scalar_type,
            length: self.length,
            precision: self.precision,
            scale: self.scale,
            nullable: self.nullable,
            unique: self.unique,
            identity: self.identity,
            seed: self.seed,
            increment: self.increment,
            primary_key: self.primary_key,
            default_value: self.default_value,
            order: self.order,
        }
    }
}

/// Target of a single-column foreign key declared on a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldReference {
    pub schema: String,
    pub table: String,
    pub field: String,
    pub on_update: ReferentialAction,
    pub on_delete: ReferentialAction,
}

impl FieldReference {
    pub fn new(table: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            schema: DEFAULT_SCHEMA.to_string(),
            table: table.into(),
            field: field.into(),
            on_update: ReferentialAction::default(),
            on_delete: ReferentialAction::default(),
        }
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    pub fn on_update(mut self, action: ReferentialAction) -> Self {
        self.on_update = action;
        self
    }

    pub fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = action;
        self
    }
}
