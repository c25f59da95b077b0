//! Host scalar types and their SQL Server column types

use std::fmt;

use crate::error::{DbBuilderError, Result};

/// Closed set of host value kinds a column can be declared with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Boolean,
    Byte,
    Int16,
    Int32,
    Int64,
    Char,
    CharArray,
    String,
    DateTime,
    Single,
    Double,
    Decimal,
    Guid,
}

impl ScalarType {
    pub const ALL: [ScalarType; 13] = [
        ScalarType::Boolean,
        ScalarType::Byte,
        ScalarType::Int16,
        ScalarType::Int32,
        ScalarType::Int64,
        ScalarType::Char,
        ScalarType::CharArray,
        ScalarType::String,
        ScalarType::DateTime,
        ScalarType::Single,
        ScalarType::Double,
        ScalarType::Decimal,
        ScalarType::Guid,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ScalarType::Boolean => "Boolean",
            ScalarType::Byte => "Byte",
            ScalarType::Int16 => "Int16",
            ScalarType::Int32 => "Int32",
            ScalarType::Int64 => "Int64",
            ScalarType::Char => "Char",
            ScalarType::CharArray => "Char[]",
            ScalarType::String => "String",
            ScalarType::DateTime => "DateTime",
            ScalarType::Single => "Single",
            ScalarType::Double => "Double",
            ScalarType::Decimal => "Decimal",
            ScalarType::Guid => "Guid",
        }
    }

    /// Resolve a textual type identifier for the given column.
    ///
    /// Fails with [`DbBuilderError::UnsupportedType`] naming both the type and
    /// the column when the identifier has no mapping.
    pub fn for_column(type_name: &str, column: &str) -> Result<Self> {
        type_name
            .parse()
            .map_err(|_| DbBuilderError::UnsupportedType {
                type_name: type_name.trim().to_string(),
                column: column.to_string(),
            })
    }

    /// SQL Server column type for this scalar type
    pub fn sql_type(&self, length: u32, precision: u8, scale: u8) -> String {
        map_type(*self, length, precision, scale)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for ScalarType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let name = lower.strip_prefix("system.").unwrap_or(&lower);
        match name {
            "boolean" | "bool" => Ok(ScalarType::Boolean),
            "byte" | "u8" => Ok(ScalarType::Byte),
            "int16" | "i16" | "short" => Ok(ScalarType::Int16),
            "int32" | "i32" | "int" => Ok(ScalarType::Int32),
            "int64" | "i64" | "long" => Ok(ScalarType::Int64),
            "char" => Ok(ScalarType::Char),
            "char[]" | "chararray" => Ok(ScalarType::CharArray),
            "string" | "str" => Ok(ScalarType::String),
            "datetime" => Ok(ScalarType::DateTime),
            "single" | "f32" => Ok(ScalarType::Single),
            "double" | "f64" => Ok(ScalarType::Double),
            "decimal" => Ok(ScalarType::Decimal),
            "guid" | "uuid" => Ok(ScalarType::Guid),
            _ => Err(format!("Unknown scalar type: {}", s)),
        }
    }
}

/// Map a scalar type plus its size facets to an upper-case SQL type token.
pub fn map_type(scalar_type: ScalarType, length: u32, precision: u8, scale: u8) -> String {
    let precision_scale = || format!("({},{})", precision, scale);

    match scalar_type {
        ScalarType::Boolean => "BIT".to_string(),
        ScalarType::Byte => "TINYINT".to_string(),
        ScalarType::Int16 => "SMALLINT".to_string(),
        ScalarType::Int32 => "INT".to_string(),
        ScalarType::Int64 => "BIGINT".to_string(),
        ScalarType::Char => "NCHAR(1)".to_string(),
        ScalarType::CharArray | ScalarType::String => {
            if length > 0 {
                format!("NVARCHAR({})", length)
            } else {
                "NVARCHAR(MAX)".to_string()
            }
        }
        ScalarType::DateTime => "DATETIME".to_string(),
        ScalarType::Single => format!("REAL{}", precision_scale()),
        ScalarType::Double => format!("FLOAT{}", precision_scale()),
        ScalarType::Decimal => format!("NUMERIC{}", precision_scale()),
        ScalarType::Guid => "UNIQUEIDENTIFIER".to_string(),
    }
}

/// Rust types that can back a column, mirroring [`ScalarType`]
pub trait HostType {
    const SCALAR_TYPE: ScalarType;
}

macro_rules! host_type {
    ($($ty:ty => $scalar:ident),* $(,)?) => {
        $(
            impl HostType for $ty {
                const SCALAR_TYPE: ScalarType = ScalarType::$scalar;
            }
        )*
    };
}

host_type! {
    bool => Boolean,
    u8 => Byte,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    char => Char,
    Vec<char> => CharArray,
    String => String,
    &str => String,
    f32 => Single,
    f64 => Double,
    chrono::NaiveDateTime => DateTime,
    chrono::DateTime<chrono::Utc> => DateTime,
    uuid::Uuid => Guid,
}
