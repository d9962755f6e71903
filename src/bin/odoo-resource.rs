//! Odoo Resource CLI
//!
//! Command-line interface for resolving `odoo://` resources and serving them
//! over HTTP or stdio.

use std::io::Write;
#[cfg(feature = "http")]
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
#[cfg(feature = "http")]
use std::sync::Arc;

use clap::{Parser, Subcommand};
use odoo_resource::{
    load_config, logging, operations, parse, stdio, DispatchError, DispatchOptions, Dispatcher,
    OdooClient, DEFAULT_SEARCH_LIMIT,
};
use serde::Serialize;
use tracing::info;

#[derive(Parser)]
#[command(name = "odoo-resource")]
#[command(about = "Resolve odoo:// resource URIs against an Odoo server")]
#[command(version)]
struct Cli {
    /// Config file (default: ./odoo_config.json, ~/.config/odoo/config.json, ~/.odoo_config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Maximum number of records returned by search resources
    #[arg(long, global = true, env = "ODOO_SEARCH_LIMIT", default_value_t = DEFAULT_SEARCH_LIMIT)]
    search_limit: u32,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a resource URI without contacting the server
    Parse {
        /// Resource URI (e.g. odoo://record/res.partner/1)
        uri: String,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// List the supported resource templates
    Templates {
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Fetch one resource and print its JSON
    Get {
        /// Resource URI (e.g. odoo://models)
        uri: String,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Serve resources over HTTP
    #[cfg(feature = "http")]
    Serve {
        /// Address to bind
        #[arg(long, default_value = "0.0.0.0")]
        host: IpAddr,

        /// Port to listen on
        #[arg(long, env = "PORT", default_value_t = 8080)]
        port: u16,
    },

    /// Serve resources as line-delimited JSON-RPC on stdin/stdout
    Stdio,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    logging::init(if cli.verbose { "debug" } else { "info" });

    let dispatcher = Dispatcher::new(DispatchOptions::new().search_limit(cli.search_limit));
    let config = cli.config.as_deref();

    let result = match cli.command {
        Commands::Parse { uri, pretty } => run_parse(&uri, pretty),
        Commands::Templates { pretty } => print_json(&operations(), pretty, None),
        Commands::Get {
            uri,
            pretty,
            output,
        } => run_get(config, &dispatcher, &uri, pretty, output),
        #[cfg(feature = "http")]
        Commands::Serve { host, port } => {
            run_serve(config, dispatcher, SocketAddr::new(host, port))
        }
        Commands::Stdio => run_stdio(config, &dispatcher),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn run_parse(uri: &str, pretty: bool) -> Result<(), u8> {
    let resolution = parse(uri).map_err(|e| {
        eprintln!("Error: {}", e);
        2u8
    })?;
    print_json(&resolution, pretty, None)
}

fn run_get(
    config: Option<&Path>,
    dispatcher: &Dispatcher,
    uri: &str,
    pretty: bool,
    output: Option<PathBuf>,
) -> Result<(), u8> {
    let client = connect(config)?;
    let value = dispatcher.resolve(uri, &client).map_err(|e| {
        eprintln!("Error: {}", e);
        get_exit_code(&e)
    })?;
    print_json(&value, pretty, output)
}

#[cfg(feature = "http")]
fn run_serve(config: Option<&Path>, dispatcher: Dispatcher, addr: SocketAddr) -> Result<(), u8> {
    let client: odoo_resource::http::SharedBackend = Arc::new(connect(config)?);
    // The HTTP runtime gets a clone so the client is dropped outside it.
    odoo_resource::http::serve(addr, dispatcher, Arc::clone(&client)).map_err(|e| {
        eprintln!("Error: {}", e);
        3u8
    })?;
    info!("HTTP server stopped");
    Ok(())
}

fn run_stdio(config: Option<&Path>, dispatcher: &Dispatcher) -> Result<(), u8> {
    let client = connect(config)?;
    let stdin = std::io::stdin();
    stdio::serve(stdin.lock(), std::io::stdout(), dispatcher, &client).map_err(|e| {
        eprintln!("Error: {}", e);
        3u8
    })
}

/// Load settings and build the backend client.
fn connect(config: Option<&Path>) -> Result<OdooClient, u8> {
    let settings = load_config(config).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;
    info!(config = ?settings, "using Odoo connection");

    OdooClient::new(settings).map_err(|e| {
        eprintln!("Error: {}", e);
        3u8
    })
}

/// Exit code for a failed `get`: 1 not found, 2 bad request, 3 backend.
fn get_exit_code(err: &DispatchError) -> u8 {
    match err {
        DispatchError::NotFound { .. } => 1,
        DispatchError::BadRequest { .. } | DispatchError::UnknownResource { .. } => 2,
        DispatchError::BackendFailure { .. } => 3,
    }
}

fn print_json<T: Serialize + ?Sized>(
    value: &T,
    pretty: bool,
    output: Option<PathBuf>,
) -> Result<(), u8> {
    let json_output = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(&path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", json_output).map_err(|_| 3u8)?;
        }
    }

    Ok(())
}
