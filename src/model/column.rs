//! Column definitions and their script fragments

use super::scalar_type::ScalarType;

/// A single column of a table definition
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    /// `{schema}_{table}` of the owning table, used to name default constraints
    pub table_qualified_name: String,
    pub name: String,
    pub scalar_type: ScalarType,
    /// Character length; 0 renders as MAX
    pub length: u32,
    pub precision: u8,
    pub scale: u8,
    pub nullable: bool,
    /// Tracked but not rendered
    pub unique: bool,
    pub identity: bool,
    pub seed: i64,
    pub increment: i64,
    pub primary_key: bool,
    /// Literal SQL expression, emitted verbatim
    pub default_value: Option<String>,
    /// Sort key for entity and definition-file columns
    pub order: i32,
}

impl ColumnDefinition {
    pub fn new(
        table_qualified_name: impl Into<String>,
        name: impl Into<String>,
        scalar_type: ScalarType,
    ) -> Self {
        Self {
            table_qualified_name: table_qualified_name.into(),
            name: name.into(),
            scalar_type,
            length: 0,
            precision: 0,
            scale: 0,
            nullable: true,
            unique: false,
            identity: false,
            seed: 1,
            increment: 1,
            primary_key: false,
            default_value: None,
            order: 0,
        }
    }

    pub fn identity(mut self, seed: i64, increment: i64) -> Self {
        self.identity = true;
        self.seed = seed;
        self.increment = increment;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn default_value(mut self, expression: impl Into<String>) -> Self {
        self.default_value = Some(expression.into());
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Set the length, and the precision when given (otherwise precision resets to 0).
    pub fn set_length(mut self, length: u32, precision: Option<u8>) -> Self {
        self.length = length;
        self.precision = precision.unwrap_or(0);
        self
    }

    pub fn precision(mut self, precision: u8, scale: u8) -> Self {
        self.precision = precision;
        self.scale = scale;
        self
    }

    pub fn order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// SQL type token for this column
    pub fn sql_type(&self) -> String {
        self.scalar_type.sql_type(self.length, self.precision, self.scale)
    }

    /// Name of the default constraint, e.g. `df_dbo_Article_Created`
    pub fn default_constraint_name(&self) -> String {
        format!("df_{}_{}", self.table_qualified_name, self.name)
    }

    /// Render the column line used inside `CREATE TABLE`.
    ///
    /// An identity column never carries a default constraint.
    pub fn render(&self) -> String {
        let mut script = format!("[{}] {}", self.name, self.sql_type());

        if self.identity {
            script.push_str(&format!(" IDENTITY({}, {})", self.seed, self.increment));
        }

        script.push_str(if self.nullable { " NULL" } else { " NOT NULL" });

        if let Some(default) = self.default_value.as_deref() {
            if !default.trim().is_empty() && !self.identity {
                script.push_str(&format!(
                    " CONSTRAINT {} DEFAULT {}",
                    self.default_constraint_name(),
                    default
                ));
            }
        }

        script
    }
}
