//! rust-dbbuilder: Fluent SQL Server schema builder
//!
//! This library describes a SQL Server database in code (or in an XML
//! definition file), renders it as a T-SQL creation script and optionally
//! runs that script against a server.

pub mod builder;
pub mod connection;
pub mod error;
pub mod model;
pub mod project;
pub mod util;

use std::path::PathBuf;

use anyhow::{Context, Result};

pub use builder::{DatabaseBuilder, Secret};
pub use error::{AuthMode, ConfigurationError, DbBuilderError};
pub use model::{
    map_type, ColumnDefinition, DatabaseSettings, Entity, EntityDefinition, FieldDefinition,
    FieldReference, ForeignKeyDefinition, HostType, ReferentialAction, ScalarType,
    SqlServerVersion, TableDefinition,
};

/// Options for generating a creation script from a definition file
#[derive(Debug, Clone)]
pub struct ScriptOptions {
    /// Path to the XML definition file
    pub definition_path: PathBuf,
    /// Where to write the script; `None` only returns it
    pub output_path: Option<PathBuf>,
    /// Output encoding label (e.g., "utf-8", "utf-16le", "windows-1252")
    pub encoding: String,
    /// Validate table definitions before rendering
    pub validate: bool,
}

/// Generate the creation script described by a definition file
pub fn generate_script(options: &ScriptOptions) -> Result<String> {
    tracing::info!(definition = %options.definition_path.display(), "generating script");

    let encoding = builder::resolve_encoding(&options.encoding)?;

    let database = project::parse_definition(&options.definition_path)?;

    if options.validate {
        database.validate()?;
        tracing::debug!(tables = database.tables().len(), "definition validated");
    }

    let script = database.to_script()?;

    if let Some(output_path) = &options.output_path {
        builder::write_script(output_path, &script, encoding)
            .with_context(|| format!("Failed to generate {}", output_path.display()))?;
    }

    tracing::info!(
        bytes = script.len(),
        sha256 = %util::script_checksum(&script),
        "script generated"
    );

    Ok(script)
}

/// Options for creating a database from a definition file
#[derive(Debug, Default)]
pub struct ExecuteOptions {
    /// Path to the XML definition file
    pub definition_path: PathBuf,
    /// Overrides the server named in the definition file
    pub server: Option<String>,
    /// Use Windows integrated security
    pub integrated: bool,
    /// SQL Server login name
    pub user: Option<String>,
    /// SQL Server login password; redacted in `Debug` output
    pub password: Option<Secret>,
    /// Accept the server certificate without validation
    pub trust_server_certificate: bool,
}

/// Create the database described by a definition file
#[cfg(feature = "mssql")]
pub fn execute_definition(options: ExecuteOptions) -> Result<()> {
    let mut database = project::parse_definition(&options.definition_path)?;
    configure_connection(&mut database, options)?;
    database.execute()?;
    Ok(())
}

/// Apply server, authentication and TLS options to a parsed definition.
pub fn configure_connection(database: &mut DatabaseBuilder, options: ExecuteOptions) -> Result<()> {
    if let Some(server) = options.server {
        database.connect_to_server(server);
    }

    match (options.integrated, options.user) {
        (true, None) => {
            database.with_integrated_security()?;
        }
        (false, Some(user)) => {
            let password = options.password.unwrap_or_else(|| Secret::new(""));
            database.with_sql_login(user, password)?;
        }
        (true, Some(_)) => {
            return Err(DbBuilderError::ConflictingAuthentication {
                current: AuthMode::Integrated,
            }
            .into());
        }
        // Left unset; execute reports the missing authentication
        (false, None) => {}
    }

    database.trust_server_certificate(options.trust_server_certificate);
    Ok(())
}
