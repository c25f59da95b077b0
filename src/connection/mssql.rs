//! SQL Server connectivity using tiberius

use tiberius::{AuthMethod, Client, Config, SqlBrowser};
use tokio::net::TcpStream;
use tokio::runtime::Runtime;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

use crate::error::{DbBuilderError, Result};

use super::{split_batches, Connection, ConnectionProvider, ConnectionSettings, Credentials};

/// Opens blocking tiberius connections
#[derive(Debug, Default, Clone, Copy)]
pub struct MssqlProvider;

impl MssqlProvider {
    pub fn new() -> Self {
        Self
    }
}

impl ConnectionProvider for MssqlProvider {
    fn open(&self, settings: &ConnectionSettings<'_>) -> Result<Box<dyn Connection>> {
        Ok(Box::new(MssqlConnection::connect(settings)?))
    }
}

/// A tiberius client driven by its own current-thread runtime
pub struct MssqlConnection {
    runtime: Runtime,
    client: Client<Compat<TcpStream>>,
}

impl MssqlConnection {
    #[tracing::instrument(skip(settings), fields(server = settings.server, catalog = settings.catalog))]
    pub fn connect(settings: &ConnectionSettings<'_>) -> Result<Self> {
        let (config, named_instance) = build_config(settings)?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(connectivity)?;

        tracing::debug!(addr = %config.get_addr(), named_instance, "connecting to SQL Server");

        let client = runtime.block_on(async {
            // A named instance is resolved through SQL Browser at get_addr()
            let tcp = if named_instance {
                TcpStream::connect_named(&config).await?
            } else {
                TcpStream::connect(config.get_addr())
                    .await
                    .map_err(connectivity)?
            };
            tcp.set_nodelay(true).map_err(connectivity)?;
            Client::connect(config, tcp.compat_write())
                .await
                .map_err(DbBuilderError::from)
        })?;

        tracing::debug!("connected to SQL Server");
        Ok(Self { runtime, client })
    }
}

impl Connection for MssqlConnection {
    fn execute(&mut self, script: &str) -> Result<()> {
        let Self { runtime, client } = self;
        let batches = split_batches(script);

        for (index, batch) in batches.iter().enumerate() {
            tracing::debug!(
                batch = index + 1,
                of = batches.len(),
                line = batch.start_line,
                "executing batch"
            );
            runtime.block_on(async {
                client
                    .simple_query(batch.content)
                    .await?
                    .into_results()
                    .await
                    .map(|_| ())
            })?;
        }

        Ok(())
    }
}

/// Build the tiberius config; the flag is set when the instance name must be
/// resolved through SQL Browser.
///
/// An explicit port always wins over the instance name. Without one, tiberius
/// targets 1433 for a default instance and the browser port 1434 for a named one.
fn build_config(settings: &ConnectionSettings<'_>) -> Result<(Config, bool)> {
    let mut config = Config::new();

    let (host, instance, port) = parse_server(settings.server);
    config.host(host);
    let named_instance = match (instance, port) {
        (_, Some(port)) => {
            config.port(port);
            false
        }
        (Some(instance), None) => {
            config.instance_name(instance);
            true
        }
        (None, None) => false,
    };
    config.database(settings.catalog);

    if settings.trust_server_certificate {
        config.trust_cert();
    }

    match settings.credentials {
        Credentials::SqlLogin { user_id, password } => {
            config.authentication(AuthMethod::sql_server(user_id, password.expose()));
        }
        Credentials::Integrated => {
            #[cfg(windows)]
            {
                config.authentication(AuthMethod::Integrated);
            }
            #[cfg(not(windows))]
            {
                return Err(connectivity(
                    "Integrated security is only supported on Windows",
                ));
            }
        }
    }

    Ok((config, named_instance))
}

/// Split `host`, `host,port` or `host\instance` into its parts.
fn parse_server(server: &str) -> (&str, Option<&str>, Option<u16>) {
    let server = server.trim();
    let (address, port) = match server.rsplit_once(',') {
        Some((address, port)) => (address.trim(), port.trim().parse().ok()),
        None => (server, None),
    };
    match address.split_once('\\') {
        Some((host, instance)) => (host, Some(instance), port),
        None => (address, None, port),
    }
}

fn connectivity<E>(err: E) -> DbBuilderError
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    DbBuilderError::Connectivity(err.into())
}
