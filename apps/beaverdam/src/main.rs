//! beaverdam CLI - browse nested metadata documents
//!
//! Reads a TOML configuration naming a JSON document store and the fields
//! to project, applies checklist-style filters and prints the visible rows.

mod output;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use beaverdam_core::{BeaverdamConfig, BrowseSession, DocumentStore, Primitive, SessionEvent, Value};
use beaverdam_store::JsonFileStore;

/// beaverdam - browse and filter metadata documents
#[derive(Parser)]
#[command(name = "beaverdam")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the documents passing the given filters
    View {
        /// Path to the TOML configuration
        config: PathBuf,
        /// Allowed value for a field; repeat to allow several
        #[arg(short, long = "filter", value_name = "FIELD=VALUE")]
        filters: Vec<String>,
        /// Restrict to these document ids
        #[arg(short, long = "select", value_name = "ID")]
        select: Vec<String>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// List the values a field takes, with document counts
    Options {
        /// Path to the TOML configuration
        config: PathBuf,
        /// Display name of the field
        field: String,
    },
    /// Insert documents from a JSON file (one object or an array of objects)
    Insert {
        /// Path to the TOML configuration
        config: PathBuf,
        /// JSON file to read
        file: PathBuf,
    },
    /// Delete a document by id
    Delete {
        /// Path to the TOML configuration
        config: PathBuf,
        /// Document id
        id: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::View {
            config,
            filters,
            select,
            format,
        } => view(&config, &filters, select, format),
        Commands::Options { config, field } => options(&config, &field),
        Commands::Insert { config, file } => insert(&config, &file),
        Commands::Delete { config, id } => delete(&config, &id),
    }
}

fn open(config_path: &Path) -> Result<(BeaverdamConfig, JsonFileStore), Box<dyn std::error::Error>> {
    let config = BeaverdamConfig::load(config_path)?;
    let store = JsonFileStore::open(config.database_location())?;
    Ok((config, store))
}

fn view(
    config_path: &Path,
    filters: &[String],
    select: Vec<String>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let (config, store) = open(config_path)?;
    let mut session = BrowseSession::open(config, &store)?;

    for (field, labels) in group_filters(filters)? {
        let options = session.table().distinct_values(&field);
        let selected = labels
            .iter()
            .map(|label| match_option(&options, label))
            .collect();
        session.handle(SessionEvent::ChecklistChanged { field, selected })?;
    }
    if !select.is_empty() {
        session.handle(SessionEvent::PointsSelected { ids: select })?;
    }

    match format {
        OutputFormat::Table => output::print_rows(&session),
        OutputFormat::Json => output::print_rows_json(&session)?,
    }
    Ok(())
}

fn options(config_path: &Path, field: &str) -> Result<(), Box<dyn std::error::Error>> {
    let (config, store) = open(config_path)?;
    let session = BrowseSession::open(config, &store)?;
    session.registry().path_for(field)?;
    output::print_options(&session, field);
    Ok(())
}

fn insert(config_path: &Path, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (_, mut store) = open(config_path)?;
    let text = std::fs::read_to_string(file)?;
    let documents = match serde_json::from_str::<Value>(&text)? {
        Value::Array(documents) => documents,
        document => vec![document],
    };
    for document in documents {
        let id = store.insert(document)?;
        println!("{id}");
    }
    info!(documents = store.len(), "insert complete");
    Ok(())
}

fn delete(config_path: &Path, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let (_, mut store) = open(config_path)?;
    if store.delete_by_id(id)? {
        println!("deleted {id}");
        Ok(())
    } else {
        Err(format!("no document with id {id}").into())
    }
}

/// Group repeated `FIELD=VALUE` arguments by field, in first-seen order.
fn group_filters(filters: &[String]) -> Result<Vec<(String, Vec<String>)>, String> {
    let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
    for filter in filters {
        let (field, value) = filter
            .split_once('=')
            .ok_or_else(|| format!("filter '{filter}' is not FIELD=VALUE"))?;
        match grouped.iter_mut().find(|(f, _)| f == field) {
            Some((_, values)) => values.push(value.to_string()),
            None => grouped.push((field.to_string(), vec![value.to_string()])),
        }
    }
    Ok(grouped)
}

/// The column value printed as `label`, or the label as a string.
fn match_option(options: &[Primitive], label: &str) -> Primitive {
    options
        .iter()
        .find(|option| option.to_string() == label)
        .cloned()
        .unwrap_or_else(|| Primitive::from(label))
}
