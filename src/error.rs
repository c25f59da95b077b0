//! Error types for rust-dbbuilder

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Authentication mode chosen on a [`DatabaseBuilder`](crate::builder::DatabaseBuilder)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Unset,
    Integrated,
    SqlLogin,
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMode::Unset => write!(f, "no authentication"),
            AuthMode::Integrated => write!(f, "integrated security"),
            AuthMode::SqlLogin => write!(f, "SQL Server login"),
        }
    }
}

/// Missing pieces of builder configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurationError {
    MissingServer,
    MissingAuthentication,
    MissingDatabase,
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::MissingServer => {
                write!(f, "Unable to connect to database server. No server defined.")
            }
            ConfigurationError::MissingAuthentication => write!(
                f,
                "Unable to connect to database server. No authentication method defined."
            ),
            ConfigurationError::MissingDatabase => {
                write!(f, "No database defined. Call create_database first.")
            }
        }
    }
}

/// Errors that can occur while defining, rendering, or executing a schema
#[derive(Error, Debug)]
pub enum DbBuilderError {
    #[error("The type '{type_name}' is not supported for column '{column}'.")]
    UnsupportedType { type_name: String, column: String },

    #[error("Connection has already been set with {current}.")]
    ConflictingAuthentication { current: AuthMode },

    #[error("{0}")]
    Configuration(ConfigurationError),

    #[error("Invalid definition for table {table}: {message}")]
    SchemaValidation { table: String, message: String },

    #[error(transparent)]
    Connectivity(Box<dyn std::error::Error + Send + Sync>),

    #[error("Failed to read definition file: {path}")]
    DefinitionReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse definition file: {path}")]
    DefinitionParseError {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("Invalid definition file format: {message}")]
    InvalidDefinition { message: String },

    #[error("Unsupported script encoding: {label}")]
    UnsupportedEncoding { label: String },

    #[error("Script contains characters that cannot be represented in {encoding}")]
    ScriptEncoding { encoding: String },

    #[error("Failed to write script to {path}")]
    ScriptWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<ConfigurationError> for DbBuilderError {
    fn from(err: ConfigurationError) -> Self {
        DbBuilderError::Configuration(err)
    }
}

#[cfg(feature = "mssql")]
impl From<tiberius::error::Error> for DbBuilderError {
    fn from(err: tiberius::error::Error) -> Self {
        DbBuilderError::Connectivity(Box::new(err))
    }
}

pub type Result<T, E = DbBuilderError> = std::result::Result<T, E>;
