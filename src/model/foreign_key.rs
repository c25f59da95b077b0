//! Foreign key definitions and their constraint clauses

use std::fmt;

use crate::util::bracket_list;

/// Action applied to dependent rows when the referenced row changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferentialAction {
    Cascade,
    SetNull,
    SetDefault,
    #[default]
    NoAction,
}

impl ReferentialAction {
    pub fn token(&self) -> &'static str {
        match self {
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::SetDefault => "SET DEFAULT",
            ReferentialAction::NoAction => "NO ACTION",
        }
    }
}

impl fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl std::str::FromStr for ReferentialAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "cascade" => Ok(ReferentialAction::Cascade),
            "setnull" => Ok(ReferentialAction::SetNull),
            "setdefault" => Ok(ReferentialAction::SetDefault),
            "noaction" => Ok(ReferentialAction::NoAction),
            _ => Err(format!("Unknown referential action: {}", s)),
        }
    }
}

/// A foreign key constraint owned by a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyDefinition {
    /// Source columns on the owning table
    pub field_names: Vec<String>,
    pub target_schema: String,
    pub target_table: String,
    /// Referenced columns, positionally matched with `field_names`
    pub reference_fields: Vec<String>,
    pub on_update: ReferentialAction,
    pub on_delete: ReferentialAction,
}

impl ForeignKeyDefinition {
    /// Foreign key into `[dbo].[target_table]` with `NO ACTION` on both events
    pub fn new<F, R>(field_names: F, target_table: impl Into<String>, reference_fields: R) -> Self
    where
        F: IntoIterator,
        F::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            field_names: field_names.into_iter().map(Into::into).collect(),
            target_schema: "dbo".to_string(),
            target_table: target_table.into(),
            reference_fields: reference_fields.into_iter().map(Into::into).collect(),
            on_update: ReferentialAction::default(),
            on_delete: ReferentialAction::default(),
        }
    }

    pub fn target_schema(mut self, schema: impl Into<String>) -> Self {
        self.target_schema = schema.into();
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

    /// Constraint name, e.g. `fk_dbo_Order_ArticleId`
    pub fn constraint_name(&self, constraint_scope: &str) -> String {
        format!("fk_{}_{}", constraint_scope, self.field_names.join("_"))
    }

    /// Render the constraint clause. `constraint_scope` is normally the
    /// owning table's `{schema}_{table}`.
    pub fn render(&self, constraint_scope: &str) -> String {
        format!(
            "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES [{}].[{}] ({}) ON UPDATE {} ON DELETE {}",
            self.constraint_name(constraint_scope),
            bracket_list(&self.field_names),
            self.target_schema,
            self.target_table,
            bracket_list(&self.reference_fields),
            self.on_update,
            self.on_delete
        )
    }
}
