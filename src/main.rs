use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use rust_dbbuilder::{generate_script, ScriptOptions};

#[derive(Parser)]
#[command(name = "rust-dbbuilder")]
#[command(author, version, about = "Fluent SQL Server schema builder")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the creation script for a definition file
    Script {
        /// Path to the XML definition file
        #[arg(short, long)]
        definition: PathBuf,

        /// Output path for the script (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output encoding (utf-8, utf-16le, utf-16be, windows-1252, ...)
        #[arg(long, default_value = "utf-8")]
        encoding: String,

        /// Skip table validation
        #[arg(long)]
        no_validate: bool,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },
    /// Create the database described by a definition file
    Execute {
        /// Path to the XML definition file
        #[arg(short, long)]
        definition: PathBuf,

        /// Server name (host, host,port or host\instance); overrides the definition file
        #[arg(short, long)]
        server: Option<String>,

        /// Use Windows integrated security
        #[arg(long, conflicts_with = "user")]
        integrated: bool,

        /// SQL Server login name
        #[arg(short, long)]
        user: Option<String>,

        /// SQL Server login password
        #[arg(long, env = "DBBUILDER_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Accept the server certificate without validation
        #[arg(long)]
        trust_server_certificate: bool,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Script {
            definition,
            output,
            encoding,
            no_validate,
            verbose,
        } => {
            init_tracing(verbose);

            let print = output.is_none();
            let options = ScriptOptions {
                definition_path: definition,
                output_path: output,
                encoding,
                validate: !no_validate,
            };

            let script = generate_script(&options)?;
            if print {
                std::io::stdout().write_all(script.as_bytes())?;
            }
        }
        Commands::Execute {
            definition,
            server,
            integrated,
            user,
            password,
            trust_server_certificate,
            verbose,
        } => {
            init_tracing(verbose);

            let options = rust_dbbuilder::ExecuteOptions {
                definition_path: definition,
                server,
                integrated,
                user,
                password: password.map(rust_dbbuilder::Secret::from),
                trust_server_certificate,
            };
            execute(options)?;
        }
    }

    Ok(())
}

#[cfg(feature = "mssql")]
fn execute(options: rust_dbbuilder::ExecuteOptions) -> Result<()> {
    rust_dbbuilder::execute_definition(options)
}

#[cfg(not(feature = "mssql"))]
fn execute(_options: rust_dbbuilder::ExecuteOptions) -> Result<()> {
    anyhow::bail!("rust-dbbuilder was built without the mssql feature")
}
