//! Database connectivity
//!
//! The builder only needs two things from a server: open a connection and
//! run a script on it. [`ConnectionProvider`] and [`Connection`] are that
//! seam; [`MssqlProvider`] implements it over tiberius.

mod batch;
#[cfg(feature = "mssql")]
mod mssql;

pub use batch::{split_batches, Batch};
#[cfg(feature = "mssql")]
pub use mssql::{MssqlConnection, MssqlProvider};

use crate::builder::Secret;
use crate::error::Result;

/// Catalog the creation script is run against
pub const MASTER_CATALOG: &str = "master";

/// How to authenticate a new connection
#[derive(Debug, Clone, Copy)]
pub enum Credentials<'a> {
    Integrated,
    SqlLogin { user_id: &'a str, password: &'a Secret },
}

/// Everything a provider needs to open a connection
#[derive(Debug, Clone, Copy)]
pub struct ConnectionSettings<'a> {
    /// `host`, `host,port` or `host\instance`
    pub server: &'a str,
    pub credentials: Credentials<'a>,
    pub catalog: &'a str,
    pub trust_server_certificate: bool,
}

/// Opens connections to a database server
pub trait ConnectionProvider {
    fn open(&self, settings: &ConnectionSettings<'_>) -> Result<Box<dyn Connection>>;
}

/// An open connection able to run a script
pub trait Connection {
    /// Run the whole script. The script may contain `GO` batch separators.
    fn execute(&mut self, script: &str) -> Result<()>;
}
