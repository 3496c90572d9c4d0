use crate::{
    commands::FormatArgs,
    conn::{ConnectionPinger, PostgresConnectionPinger},
    env::EnvManager,
    error::CliError,
};
use clap::Parser;
use commands::Commands;
use connectors::sql::{
    base::{adapter::SqlAdapter, copy_options::CopyOptions},
    postgres::{adapter::PgAdapter, copy::CopyBuffer},
};
use model::core::data_type::DataType;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod conn;
mod env;
mod error;
mod json;
mod output;

#[derive(Parser)]
#[command(
    name = "copyfy",
    version = "0.1.0",
    about = "Encode rows as Postgres COPY text and bulk-load them"
)]
struct Cli {
    #[arg(long, global = true, help = "Load KEY=VALUE pairs from this file")]
    env_file: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    // Logs go to stderr so `encode` output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut env = EnvManager::new();
    if let Some(path) = &cli.env_file {
        env.load_from_file(path)?;
    }

    match cli.command {
        Commands::Encode {
            input,
            types,
            output,
            format,
        } => {
            let types = parse_types(types.as_deref().unwrap_or_default())?;
            let buffer = encode_rows(&input, &types, copy_options(format)?).await?;
            info!(rows = buffer.rows(), "Encoded rows");
            output::write_payload(buffer.as_bytes(), output.as_deref()).await?;
        }
        Commands::Load {
            conn_str,
            table,
            columns,
            input,
            format,
        } => {
            let options = copy_options(format)?;
            let adapter = PgAdapter::connect(&env.conn_str(conn_str)?).await?;
            let reader = output::open_input(&input).await?;
            let rows = adapter
                .copy_to_table(&table, &columns, reader, &options)
                .await?;
            info!("Loaded {} rows into {}", rows, table);
        }
        Commands::Dump {
            conn_str,
            table,
            columns,
            format,
        } => {
            let options = copy_options(format)?;
            let adapter = PgAdapter::connect(&env.conn_str(conn_str)?).await?;
            let rows = adapter.copy_out(&table, &columns, &options).await?;

            let mut payload = String::new();
            for row in &rows {
                let cells: Vec<_> = row.iter().map(json::value_to_json).collect();
                payload.push_str(&serde_json::to_string(&cells)?);
                payload.push('\n');
            }
            output::write_payload(payload.as_bytes(), None).await?;
        }
        Commands::TestConn { conn_str } => {
            let conn_str = env.conn_str(conn_str)?;
            PostgresConnectionPinger { conn_str }.ping().await?;
        }
    }

    Ok(())
}

fn copy_options(args: FormatArgs) -> Result<CopyOptions, CliError> {
    let mut options = CopyOptions::default();
    if let Some(delimiter) = args.delimiter {
        options = options.with_delimiter(delimiter);
    }
    if let Some(null) = args.null {
        options = options.with_null(null);
    }
    options.validate()?;
    Ok(options)
}

fn parse_types(names: &[String]) -> Result<Vec<DataType>, CliError> {
    names
        .iter()
        .map(|name| DataType::from_postgres_type(name).map_err(CliError::from))
        .collect()
}

/// Reads one JSON array per line and encodes it as a COPY row.
async fn encode_rows(
    input: &str,
    types: &[DataType],
    options: CopyOptions,
) -> Result<CopyBuffer, CliError> {
    let mut buffer = CopyBuffer::new(options)?;
    let mut lines = BufReader::new(output::open_input(input).await?).lines();
    let mut line_num = 0;

    while let Some(line) = lines.next_line().await? {
        line_num += 1;
        if line.trim().is_empty() {
            continue;
        }

        let cells: Vec<serde_json::Value> =
            serde_json::from_str(&line).map_err(|e| CliError::InvalidInput {
                line: line_num,
                reason: e.to_string(),
            })?;

        if !types.is_empty() && types.len() != cells.len() {
            return Err(CliError::InvalidInput {
                line: line_num,
                reason: format!("expected {} values, found {}", types.len(), cells.len()),
            });
        }

        let values = cells
            .iter()
            .enumerate()
            .map(|(idx, cell)| json::json_to_value(cell, types.get(idx)))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CliError::InvalidInput {
                line: line_num,
                reason: e.to_string(),
            })?;

        buffer.push_row(&values)?;
    }

    Ok(buffer)
}
