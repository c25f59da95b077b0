//! End-to-end tests for database creation on SQL Server
//!
//! These tests run the creation script against a real SQL Server instance,
//! then verify the result by querying the catalog views.
//!
//! Environment variables (with defaults):
//! - SQL_SERVER_HOST (default: localhost)
//! - SQL_SERVER_PORT (default: 1433)
//! - SQL_SERVER_USER (default: sa)
//! - SQL_SERVER_PASSWORD (default: Password1)
//!
//! Run with: cargo test --test e2e_tests -- --ignored

use std::sync::LazyLock;

use tiberius::{AuthMethod, Client, Config, Row};
use tokio::net::TcpStream;
use tokio::runtime::Runtime;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

use rust_dbbuilder::{configure_connection, ExecuteOptions};

use crate::common::{shop_builder, TestContext};

/// Load environment variables from .env file (if present)
fn load_env() {
    let _ = dotenvy::dotenv();
}

/// SQL Server connection configuration loaded from environment
static SQL_CONFIG: LazyLock<SqlServerConfig> = LazyLock::new(|| {
    load_env();
    SqlServerConfig {
        host: std::env::var("SQL_SERVER_HOST").unwrap_or_else(|_| "localhost".to_string()),
        port: std::env::var("SQL_SERVER_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(1433),
        user: std::env::var("SQL_SERVER_USER").unwrap_or_else(|_| "sa".to_string()),
        password: std::env::var("SQL_SERVER_PASSWORD").unwrap_or_else(|_| "Password1".to_string()),
    }
});

struct SqlServerConfig {
    host: String,
    port: u16,
    user: String,
    password: String,
}

impl SqlServerConfig {
    /// Server name in `host,port` form
    fn server(&self) -> String {
        format!("{},{}", self.host, self.port)
    }
}

/// Type alias for the SQL client
type SqlClient = Client<Compat<TcpStream>>;

/// Create a tiberius client config
fn create_config(database: Option<&str>) -> Config {
    let mut config = Config::new();
    config.host(&SQL_CONFIG.host);
    config.port(SQL_CONFIG.port);
    config.authentication(AuthMethod::sql_server(&SQL_CONFIG.user, &SQL_CONFIG.password));
    config.trust_cert();

    if let Some(db) = database {
        config.database(db);
    }

    config
}

/// Connect to SQL Server
async fn connect(database: Option<&str>) -> Result<SqlClient, Box<dyn std::error::Error>> {
    let config = create_config(database);
    let tcp = TcpStream::connect(config.get_addr()).await?;
    tcp.set_nodelay(true)?;
    let client = Client::connect(config, tcp.compat_write()).await?;
    Ok(client)
}

/// Extract count from row
fn get_count(row: Option<Row>) -> i32 {
    row.and_then(|r| r.get::<i32, _>(0)).unwrap_or(0)
}

/// Drop the test database if it exists
async fn drop_database_if_exists(database: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut client = connect(None).await?;
    let query = format!(
        "IF EXISTS (SELECT 1 FROM sys.databases WHERE name = '{}') \
         BEGIN \
             ALTER DATABASE [{}] SET SINGLE_USER WITH ROLLBACK IMMEDIATE; \
             DROP DATABASE [{}]; \
         END",
        database, database, database
    );
    client.execute(&query, &[]).await?;
    Ok(())
}

/// Get column names for a table
async fn get_columns_for_table(
    client: &mut SqlClient,
    schema: &str,
    table: &str,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let query = format!(
        "SELECT COLUMN_NAME FROM INFORMATION_SCHEMA.COLUMNS WHERE TABLE_SCHEMA = '{}' AND TABLE_NAME = '{}' ORDER BY ORDINAL_POSITION",
        schema, table
    );
    let stream = client.simple_query(&query).await?;
    let rows: Vec<Row> = stream.into_first_result().await?;
    let columns: Vec<String> = rows
        .iter()
        .filter_map(|r| r.get::<&str, _>(0).map(|s| s.to_string()))
        .collect();
    Ok(columns)
}

/// Check if a constraint of the given type exists
async fn constraint_exists(
    client: &mut SqlClient,
    constraint_name: &str,
    constraint_type: &str,
) -> Result<bool, Box<dyn std::error::Error>> {
    let query = format!(
        "SELECT COUNT(*) FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS WHERE CONSTRAINT_NAME = '{}' AND CONSTRAINT_TYPE = '{}'",
        constraint_name, constraint_type
    );
    let row = client.simple_query(&query).await?.into_row().await?;
    Ok(get_count(row) > 0)
}

/// Check if a default constraint exists
async fn default_constraint_exists(
    client: &mut SqlClient,
    constraint_name: &str,
) -> Result<bool, Box<dyn std::error::Error>> {
    let query = format!(
        "SELECT COUNT(*) FROM sys.default_constraints WHERE name = '{}'",
        constraint_name
    );
    let row = client.simple_query(&query).await?.into_row().await?;
    Ok(get_count(row) > 0)
}

/// Read a database option as an integer
async fn database_option(
    client: &mut SqlClient,
    database: &str,
    column: &str,
) -> Result<i32, Box<dyn std::error::Error>> {
    let query = format!(
        "SELECT CAST({} AS INT) FROM sys.databases WHERE name = '{}'",
        column, database
    );
    let row = client.simple_query(&query).await?.into_row().await?;
    Ok(get_count(row))
}

fn runtime() -> Runtime {
    Runtime::new().expect("Failed to create tokio runtime")
}

// ============================================================================
// E2E Tests - SQL Server Connectivity (requires running SQL Server)
// ============================================================================

#[test]
#[ignore = "Requires SQL Server (configure via .env or environment variables)"]
fn test_e2e_create_database_from_builder() {
    const DATABASE: &str = "DbBuilder_E2E_Fluent";
    let rt = runtime();
    rt.block_on(drop_database_if_exists(DATABASE))
        .expect("Should drop leftover database");

    let mut builder = shop_builder(DATABASE);
    builder
        .connect_to_server(SQL_CONFIG.server())
        .with_sql_login(SQL_CONFIG.user.as_str(), SQL_CONFIG.password.as_str())
        .unwrap()
        .trust_server_certificate(true);
    builder.execute().expect("Database creation should succeed");

    rt.block_on(async {
        let mut client = connect(Some(DATABASE)).await.expect("Should connect");

        let columns = get_columns_for_table(&mut client, "dbo", "Article")
            .await
            .unwrap();
        assert_eq!(columns, vec!["Id", "Code", "Name", "Price", "Created"]);

        let columns = get_columns_for_table(&mut client, "dbo", "Order")
            .await
            .unwrap();
        assert_eq!(columns, vec!["Id", "ArticleId", "Quantity"]);

        assert!(constraint_exists(&mut client, "pk_dbo_Article", "PRIMARY KEY")
            .await
            .unwrap());
        assert!(constraint_exists(&mut client, "fk_dbo_Order_ArticleId", "FOREIGN KEY")
            .await
            .unwrap());
        assert!(default_constraint_exists(&mut client, "df_dbo_Article_Created")
            .await
            .unwrap());

        assert_eq!(
            database_option(&mut client, DATABASE, "compatibility_level")
                .await
                .unwrap(),
            150
        );
        assert_eq!(
            database_option(&mut client, DATABASE, "is_read_committed_snapshot_on")
                .await
                .unwrap(),
            1
        );
    });

    rt.block_on(drop_database_if_exists(DATABASE))
        .expect("Should drop test database");
}

#[test]
#[ignore = "Requires SQL Server (configure via .env or environment variables)"]
fn test_e2e_create_database_from_definition() {
    const DATABASE: &str = "Shop";
    let ctx = TestContext::with_fixture("shop");
    let rt = runtime();
    rt.block_on(drop_database_if_exists(DATABASE))
        .expect("Should drop leftover database");

    let mut builder = rust_dbbuilder::project::parse_definition(&ctx.definition_path()).unwrap();
    configure_connection(
        &mut builder,
        ExecuteOptions {
            server: Some(SQL_CONFIG.server()),
            user: Some(SQL_CONFIG.user.clone()),
            password: Some(SQL_CONFIG.password.as_str().into()),
            trust_server_certificate: true,
            ..Default::default()
        },
    )
    .unwrap();
    builder.execute().expect("Database creation should succeed");

    rt.block_on(async {
        let mut client = connect(Some(DATABASE)).await.expect("Should connect");
        let columns = get_columns_for_table(&mut client, "dbo", "Order")
            .await
            .unwrap();
        assert_eq!(columns, vec!["Id", "ArticleId", "Quantity"]);
    });

    rt.block_on(drop_database_if_exists(DATABASE))
        .expect("Should drop test database");
}

#[test]
#[ignore = "Requires SQL Server (configure via .env or environment variables)"]
fn test_e2e_existing_database_fails() {
    const DATABASE: &str = "DbBuilder_E2E_Existing";
    let rt = runtime();
    rt.block_on(drop_database_if_exists(DATABASE))
        .expect("Should drop leftover database");

    let create = || {
        let mut builder = shop_builder(DATABASE);
        builder
            .connect_to_server(SQL_CONFIG.server())
            .with_sql_login(SQL_CONFIG.user.as_str(), SQL_CONFIG.password.as_str())
            .unwrap()
            .trust_server_certificate(true);
        builder.execute()
    };

    create().expect("First creation should succeed");
    let err = create().expect_err("Second creation should fail");
    assert!(matches!(err, rust_dbbuilder::DbBuilderError::Connectivity(_)));

    rt.block_on(drop_database_if_exists(DATABASE))
        .expect("Should drop test database");
}
