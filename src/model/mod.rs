//! Schema model: tables, columns, foreign keys, database settings

mod column;
mod entity;
mod foreign_key;
mod scalar_type;
mod settings;
mod table;

pub use column::ColumnDefinition;
pub use entity::{Entity, EntityDefinition, FieldDefinition, FieldReference};
pub use foreign_key::{ForeignKeyDefinition, ReferentialAction};
pub use scalar_type::{map_type, HostType, ScalarType};
pub use settings::{DatabaseSettings, SqlServerVersion};
pub use table::{TableDefinition, DEFAULT_SCHEMA};
