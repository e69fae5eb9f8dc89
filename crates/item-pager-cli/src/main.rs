// crates/item-pager-cli/src/main.rs
// ============================================================================
// Module: Item Pager CLI Entry Point
// Description: Command dispatcher for the item pager server and offline tools.
// Purpose: Run the HTTP server and inspect or seed the configured store.
// Dependencies: clap, item-pager-api, item-pager-config, item-pager-core, tokio
// ============================================================================

//! ## Overview
//! The `item-pager` binary starts the HTTP server, validates and prints
//! configuration, and reads or seeds the configured store without a server.
//! Imports go through the same dispatcher as HTTP `POST /items`, so they
//! obey the same validation and duplicate rules.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod import;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use item_pager_api::ApiContext;
use item_pager_api::ItemRequest;
use item_pager_api::ItemResponse;
use item_pager_api::ItemServer;
use item_pager_api::build_item_store;
use item_pager_api::dispatch;
use item_pager_config::ItemPagerConfig;
use item_pager_config::StoreType;
use item_pager_config::config_toml_example;
use item_pager_core::PageRequest;
use item_pager_core::Record;
use item_pager_core::get_page;
use serde_json::Value;
use thiserror::Error;
use time::OffsetDateTime;

use crate::import::import_bodies;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum import file size in bytes.
const MAX_IMPORT_BYTES: usize = 16 * 1024 * 1024;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "item-pager", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server.
    Serve(ServeCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Offline store utilities.
    Items {
        /// Selected items subcommand.
        #[command(subcommand)]
        command: ItemsCommand,
    },
}

/// Configuration for the `serve` command.
#[derive(Args, Debug)]
struct ServeCommand {
    /// Optional config file path (defaults to item-pager.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a configuration file.
    Validate(ConfigValidateCommand),
    /// Print an example configuration file.
    Example,
}

/// Arguments for `config validate`.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Optional config file path (defaults to item-pager.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Items subcommands.
#[derive(Subcommand, Debug)]
enum ItemsCommand {
    /// Print one page of records.
    List(ItemsListCommand),
    /// Submit records from a JSON file.
    Import(ItemsImportCommand),
}

/// Arguments for `items list`.
#[derive(Args, Debug)]
struct ItemsListCommand {
    /// Optional config file path (defaults to item-pager.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// 1-based page number.
    #[arg(long, value_name = "N", default_value_t = 1, allow_negative_numbers = true)]
    page: i64,
    /// Records per page (defaults to pagination.default_page_size).
    #[arg(long = "page-size", value_name = "M", allow_negative_numbers = true)]
    page_size: Option<i64>,
}

/// Arguments for `items import`.
#[derive(Args, Debug)]
struct ItemsImportCommand {
    /// Optional config file path (defaults to item-pager.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// JSON file holding records or a posts object.
    #[arg(long, value_name = "FILE")]
    input: PathBuf,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&format!("item-pager {version}"))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Serve(command) => command_serve(command).await,
        Commands::Config {
            command,
        } => command_config(command),
        Commands::Items {
            command,
        } => match command {
            ItemsCommand::List(command) => command_items_list(&command),
            ItemsCommand::Import(command) => command_items_import(&command),
        },
    }
}

/// Prints top-level help.
fn show_help() -> CliResult<()> {
    let help = Cli::command().render_help().to_string();
    write_stdout_line(&help).map_err(|err| CliError::new(output_error("stdout", &err)))
}

// ============================================================================
// SECTION: Serve Command
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(command: ServeCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let bind = config.server.bind.clone();
    let server = tokio::task::spawn_blocking(move || ItemServer::from_config(config))
        .await
        .map_err(|err| CliError::new(format!("server init failed: init join failed: {err}")))?
        .map_err(|err| CliError::new(format!("server init failed: {err}")))?;
    write_stderr_line(&format!("item-pager: listening on http://{bind}/items"))
        .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    server.serve().await.map_err(|err| CliError::new(format!("server failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(command) => {
            let _config = load_config(command.config.as_deref())?;
            write_stdout_line("config ok")
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
        ConfigCommand::Example => {
            write_stdout_bytes(config_toml_example().as_bytes())
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Loads configuration with process environment overrides.
fn load_config(path: Option<&Path>) -> CliResult<ItemPagerConfig> {
    ItemPagerConfig::load(path).map_err(|err| CliError::new(format!("config load failed: {err}")))
}

// ============================================================================
// SECTION: Items Commands
// ============================================================================

/// Executes `items list`.
fn command_items_list(command: &ItemsListCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let page = render_page(&config, command.page, command.page_size)?;
    write_stdout_line(&page).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Resolves one 1-based page from the configured store as pretty JSON.
fn render_page(config: &ItemPagerConfig, page: i64, page_size: Option<i64>) -> CliResult<String> {
    let store = build_item_store(&config.store)
        .map_err(|err| CliError::new(format!("store open failed: {err}")))?;
    let page_size = page_size.unwrap_or(config.pagination.default_page_size);
    let records = match PageRequest::from_page_number(page, page_size) {
        None => Vec::new(),
        Some(request) => get_page(&store, request)
            .map_err(|err| CliError::new(format!("store scan failed: {err}")))?,
    };
    let page = Value::Array(records.into_iter().map(Record::into_value).collect());
    Ok(ItemResponse::json(200, &page).text().into_owned())
}

/// Executes `items import`.
fn command_items_import(command: &ItemsImportCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let bytes = read_bytes_with_limit(&command.input, MAX_IMPORT_BYTES).map_err(|err| match err {
        ReadLimitError::Io(err) => CliError::new(format!(
            "failed to read import file {}: {err}",
            command.input.display()
        )),
        ReadLimitError::TooLarge {
            size,
            limit,
        } => CliError::new(format!(
            "import file {} is too large ({size} bytes, limit {limit})",
            command.input.display()
        )),
    })?;
    let bodies = import_bodies(&bytes).map_err(|err| CliError::new(err.to_string()))?;
    let context = ApiContext::from_config(&config)
        .map_err(|err| CliError::new(format!("store open failed: {err}")))?;
    if config.store.store_type == StoreType::Memory {
        write_stderr_line("item-pager: store type is memory; imported records are not persisted")
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }
    for line in import_records(&context, bodies, OffsetDateTime::now_utc()) {
        write_stdout_line(&line).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Submits each body as `POST /items` and returns one progress line each.
fn import_records(context: &ApiContext, bodies: Vec<String>, now: OffsetDateTime) -> Vec<String> {
    let total = bodies.len();
    bodies
        .into_iter()
        .enumerate()
        .map(|(index, body)| {
            let response = dispatch(context, &ItemRequest::post(body), now);
            format!("[{}/{total}]: {}, {}", index + 1, response.status, compact_body(&response))
        })
        .collect()
}

/// Renders a response body on one line.
fn compact_body(response: &ItemResponse) -> String {
    serde_json::from_slice::<Value>(&response.body)
        .map_or_else(|_| response.text().into_owned(), |value| value.to_string())
}

// ============================================================================
// SECTION: File Helpers
// ============================================================================

/// Errors returned by bounded file reads.
#[derive(Debug)]
enum ReadLimitError {
    /// File I/O failure.
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let size = file.metadata().map_err(ReadLimitError::Io)?.len();
    let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX);
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }
    let mut bytes = Vec::new();
    file.take(limit.saturating_add(1)).read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        return Err(ReadLimitError::TooLarge {
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes raw bytes to stdout without adding a newline.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
