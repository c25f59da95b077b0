//! Fluent database builder
//!
//! [`DatabaseBuilder`] collects a server, an authentication mode, a database
//! and its tables, then renders everything into one creation script:
//!
//! ```no_run
//! use rust_dbbuilder::{DatabaseBuilder, ScalarType};
//!
//! # fn main() -> rust_dbbuilder::error::Result<()> {
//! let mut builder = DatabaseBuilder::new();
//! builder
//!     .connect_to_server("localhost")
//!     .with_integrated_security()?
//!     .create_database("Shop", |s| s.collation("Latin1_General_100_CI_AS"))
//!     .create_table("dbo", "Article", |t| {
//!         t.column_with("Id", ScalarType::Int32, |c| c.primary_key().identity(1, 1).not_null())
//!             .column_with("Code", ScalarType::String, |c| c.set_length(20, None))
//!     });
//! let script = builder.to_script()?;
//! # Ok(())
//! # }
//! ```

mod output;
mod secret;

pub use output::{encode_script, resolve_encoding, write_script};
pub use secret::Secret;

use std::path::Path;

use encoding_rs::Encoding;

use crate::connection::{
    ConnectionProvider, ConnectionSettings, Credentials, MASTER_CATALOG,
};
use crate::error::{AuthMode, ConfigurationError, DbBuilderError, Result};
use crate::model::{DatabaseSettings, Entity, TableDefinition};

/// Batch separator emitted after every statement group
pub const BATCH_SEPARATOR: &str = "GO";

#[derive(Debug)]
struct SqlLogin {
    user_id: String,
    password: Secret,
}

/// Root of a schema definition
#[derive(Debug, Default)]
pub struct DatabaseBuilder {
    server_name: Option<String>,
    auth_mode: AuthMode,
    login: Option<SqlLogin>,
    trust_server_certificate: bool,
    database_name: Option<String>,
    settings: Option<DatabaseSettings>,
    tables: Vec<TableDefinition>,
}

impl DatabaseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect_to_server(&mut self, server_name: impl Into<String>) -> &mut Self {
        self.server_name = Some(server_name.into());
        self
    }

    /// Use Windows integrated security.
    ///
    /// Fails with [`DbBuilderError::ConflictingAuthentication`] when a SQL
    /// login was already configured; the builder is left unchanged.
    pub fn with_integrated_security(&mut self) -> Result<&mut Self> {
        if self.auth_mode == AuthMode::SqlLogin {
            return Err(DbBuilderError::ConflictingAuthentication {
                current: self.auth_mode,
            });
        }
        self.auth_mode = AuthMode::Integrated;
        self.login = None;
        Ok(self)
    }

    /// Use a SQL Server login. Calling it again replaces the credentials.
    ///
    /// Fails with [`DbBuilderError::ConflictingAuthentication`] when integrated
    /// security was already configured; the builder is left unchanged.
    pub fn with_sql_login(
        &mut self,
        user_id: impl Into<String>,
        password: impl Into<Secret>,
    ) -> Result<&mut Self> {
        if self.auth_mode == AuthMode::Integrated {
            return Err(DbBuilderError::ConflictingAuthentication {
                current: self.auth_mode,
            });
        }
        self.auth_mode = AuthMode::SqlLogin;
        self.login = Some(SqlLogin {
            user_id: user_id.into(),
            password: password.into(),
        });
        Ok(self)
    }

    pub fn trust_server_certificate(&mut self, trust: bool) -> &mut Self {
        self.trust_server_certificate = trust;
        self
    }

    pub fn create_database<F>(&mut self, name: impl Into<String>, configure: F) -> &mut Self
    where
        F: FnOnce(DatabaseSettings) -> DatabaseSettings,
    {
        let name = name.into();
        let settings = configure(DatabaseSettings::default());
        tracing::debug!(database = %name, ?settings, "database defined");
        self.database_name = Some(name);
        self.settings = Some(settings);
        self
    }

    pub fn create_table<F>(
        &mut self,
        schema: impl Into<String>,
        name: impl Into<String>,
        configure: F,
    ) -> &mut Self
    where
        F: FnOnce(TableDefinition) -> TableDefinition,
    {
        let table = configure(TableDefinition::with_schema(schema, name));
        self.add_table(table)
    }

    /// Add the table described by an [`Entity`] implementation.
    pub fn create_table_for<E: Entity>(&mut self) -> &mut Self {
        self.add_table(E::definition().into_table())
    }

    pub fn add_table(&mut self, table: TableDefinition) -> &mut Self {
        tracing::debug!(
            table = %table.full_name(),
            columns = table.columns.len(),
            foreign_keys = table.foreign_keys.len(),
            "table added"
        );
        self.tables.push(table);
        self
    }

    pub fn server_name(&self) -> Option<&str> {
        self.server_name.as_deref()
    }

    pub fn auth_mode(&self) -> AuthMode {
        self.auth_mode
    }

    pub fn user_id(&self) -> Option<&str> {
        self.login.as_ref().map(|l| l.user_id.as_str())
    }

    pub fn database_name(&self) -> Option<&str> {
        self.database_name.as_deref()
    }

    pub fn settings(&self) -> Option<&DatabaseSettings> {
        self.settings.as_ref()
    }

    pub fn tables(&self) -> &[TableDefinition] {
        &self.tables
    }

    /// Validate every table.
    pub fn validate(&self) -> Result<()> {
        self.tables.iter().try_for_each(TableDefinition::validate)
    }

    /// Render the full creation script.
    ///
    /// Order: `CREATE DATABASE`, the three `ALTER DATABASE` statements, `USE`,
    /// then one block per table in the order the tables were added.
    pub fn to_script(&self) -> Result<String> {
        let (database_name, settings) = match (&self.database_name, &self.settings) {
            (Some(name), Some(settings)) => (name, settings),
            _ => return Err(ConfigurationError::MissingDatabase.into()),
        };

        let mut script = String::new();
        let use_statement = format!("USE {}", database_name);
        for statement in settings
            .statements(database_name)
            .iter()
            .chain(std::iter::once(&use_statement))
        {
            script.push_str(statement);
            script.push('\n');
            script.push_str(BATCH_SEPARATOR);
            script.push_str("\n\n");
        }

        for table in &self.tables {
            script.push_str(&table.render());
            script.push('\n');
        }

        Ok(script)
    }

    /// Render the script and write it to `path` in the given encoding.
    pub fn write_script(&self, path: &Path, encoding: &'static Encoding) -> Result<()> {
        let script = self.to_script()?;
        write_script(path, &script, encoding)
    }

    /// Create the database on the configured server.
    #[cfg(feature = "mssql")]
    pub fn execute(self) -> Result<()> {
        self.execute_with(&crate::connection::MssqlProvider::new())
    }

    /// Create the database through `provider`.
    ///
    /// Server, authentication, database and table definitions are checked
    /// before any connection is opened. The whole script is handed to the
    /// connection once; failures are not retried. The builder, and with it
    /// the password, is dropped afterwards.
    #[tracing::instrument(
        skip(self, provider),
        fields(server = self.server_name.as_deref(), database = self.database_name.as_deref())
    )]
    pub fn execute_with(self, provider: &dyn ConnectionProvider) -> Result<()> {
        let server = match self.server_name.as_deref() {
            Some(server) if !server.trim().is_empty() => server,
            _ => return Err(ConfigurationError::MissingServer.into()),
        };

        let credentials = match (self.auth_mode, &self.login) {
            (AuthMode::Integrated, _) => Credentials::Integrated,
            (AuthMode::SqlLogin, Some(login)) => Credentials::SqlLogin {
                user_id: &login.user_id,
                password: &login.password,
            },
            _ => return Err(ConfigurationError::MissingAuthentication.into()),
        };

        let script = self.to_script()?;
        self.validate()?;

        let settings = ConnectionSettings {
            server,
            credentials,
            catalog: MASTER_CATALOG,
            trust_server_certificate: self.trust_server_certificate,
        };

        let mut connection = provider.open(&settings)?;
        tracing::info!(
            tables = self.tables.len(),
            bytes = script.len(),
            "executing creation script"
        );
        connection.execute(&script)?;
        tracing::info!("database created");
        Ok(())
    }
}
