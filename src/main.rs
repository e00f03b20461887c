//! # Gridform - Headless Record Editor
//!
//! Loads a column file and a record, applies edits the way an input control
//! would, plans and realizes the editors, and optionally saves the result.
//!
//! ## Quick Start
//!
//! ```bash
//! # Show the editors and tabs for a record
//! cargo run -- --columns form.toml --record customer.json
//!
//! # Edit two fields and save
//! cargo run -- --columns form.toml --record customer.json \
//!     --set Age=41 --set Starts=2024-W05 --commit out.json
//! ```

mod headless;
mod store;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gridform_binding::Record;
use gridform_core::{
    CommitOutcome, Config, Direction, EditSession, EditorPlanner, EditorSpec, EventHandler,
    FormDefinition, GridCatalog,
};

use crate::headless::HeadlessRenderer;
use crate::store::JsonFileStore;

/// Gridform - edit one record the way a grid's edit form would
#[derive(Parser, Debug)]
#[command(name = "gridform")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Column definitions (TOML)
    #[arg(long, value_name = "FILE")]
    columns: PathBuf,

    /// Record to edit (JSON)
    #[arg(long, value_name = "FILE")]
    record: PathBuf,

    /// Config file (defaults to the user config directory)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Raw input for a column, as an input control would send it
    #[arg(long = "set", value_name = "COLUMN=VALUE")]
    edits: Vec<String>,

    /// Display direction handed to child grids
    #[arg(long, value_enum)]
    direction: Option<DirectionArg>,

    /// Save the edited record to this file
    #[arg(long, value_name = "FILE")]
    commit: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DirectionArg {
    Ltr,
    Rtl,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Ltr => Direction::Ltr,
            DirectionArg::Rtl => Direction::Rtl,
        }
    }
}

/// Splits a `COLUMN=VALUE` edit. The value may be empty.
fn parse_edit(edit: &str) -> anyhow::Result<(&str, &str)> {
    let (column, value) = edit
        .split_once('=')
        .with_context(|| format!("Edit `{edit}` is not COLUMN=VALUE"))?;
    let column = column.trim();
    anyhow::ensure!(!column.is_empty(), "Edit `{edit}` has no column name");
    Ok((column, value))
}

/// Logs the events queued so far and returns how many there were.
fn log_events(events: &mut EventHandler) -> usize {
    let mut count = 0;
    while let Some(event) = events.try_next() {
        tracing::info!(?event, "Session event");
        count += 1;
    }
    count
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    tracing::info!("Starting Gridform v{}", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Loading config {}", path.display()))?,
        None => Config::load(),
    };

    let form = FormDefinition::load_from(&args.columns)
        .with_context(|| format!("Loading columns {}", args.columns.display()))?;

    let json = std::fs::read_to_string(&args.record)
        .with_context(|| format!("Reading record {}", args.record.display()))?;
    let record = Record::from_json(&serde_json::from_str(&json)?)
        .with_context(|| format!("Parsing record {}", args.record.display()))?;

    let direction = args
        .direction
        .map(Direction::from)
        .unwrap_or(config.form.direction);
    let catalog: GridCatalog = form.grids.iter().collect();
    let planner = EditorPlanner::new(direction, Arc::new(catalog));

    let mut session = EditSession::new(record, form.columns, planner)
        .with_strings(Box::new(config.messages.clone()));
    let mut events = EventHandler::new(session.subscribe());

    // Blank column names only exist after the first pass
    session.render().await?;

    for edit in &args.edits {
        let (column, value) = parse_edit(edit)?;
        session
            .change_value(column, value)
            .with_context(|| format!("Applying `{edit}`"))?;
    }

    session.render().await?;
    let mut renderer = HeadlessRenderer::new(&config.form.components);
    session.realize(&mut renderer)?;

    println!("Editors:");
    for (name, descriptor) in &session.plan().editors {
        let kind = match &descriptor.spec {
            EditorSpec::Custom { component } => format!("custom `{component}`"),
            EditorSpec::Nested(child) => format!("grid `{}` of {}", child.grid, child.element_type),
        };
        let shown = session
            .editor(name)
            .map(HeadlessRenderer::describe)
            .unwrap_or_default();
        println!("  {name}: {kind} {shown}");
    }
    println!("Tabs: {}", session.tabs().join(", "));
    log_events(&mut events);

    if let Some(path) = &args.commit {
        let store = JsonFileStore::new(path);
        match session.commit(&store).await {
            CommitOutcome::Saved => println!("Saved to {}", path.display()),
            CommitOutcome::Rejected(message) => {
                println!("Not saved: {message}");
                for (column, error) in &session.errors().columns {
                    println!("  {column}: {error}");
                }
            }
        }
        log_events(&mut events);
    }

    println!("{}", serde_json::to_string_pretty(&session.record().to_json())?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridform_core::{EventBus, SessionEvent};

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["gridform", "--columns", "f.toml", "--record", "r.json"]);
        assert_eq!(args.columns, PathBuf::from("f.toml"));
        assert!(args.edits.is_empty());
        assert!(args.commit.is_none());
        assert!(args.direction.is_none());
    }

    #[test]
    fn test_args_with_edits() {
        let args = Args::parse_from([
            "gridform",
            "--columns",
            "f.toml",
            "--record",
            "r.json",
            "--set",
            "Age=41",
            "--set",
            "Name=",
            "--direction",
            "rtl",
            "-vv",
        ]);
        assert_eq!(args.edits, ["Age=41", "Name="]);
        assert_eq!(args.direction, Some(DirectionArg::Rtl));
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_parse_edit() {
        assert_eq!(parse_edit("Age=41").unwrap(), ("Age", "41"));
        assert_eq!(parse_edit("Name=").unwrap(), ("Name", ""));
        assert_eq!(parse_edit("Note=a=b").unwrap(), ("Note", "a=b"));
        assert!(parse_edit("Age").is_err());
        assert!(parse_edit(" =1").is_err());
    }

    #[test]
    fn test_log_events_drains_queue() {
        let bus = EventBus::new();
        let mut events = EventHandler::new(bus.subscribe());
        assert_eq!(log_events(&mut events), 0);

        bus.emit(SessionEvent::CommitStarted);
        bus.emit(SessionEvent::CommitSucceeded);
        assert_eq!(log_events(&mut events), 2);
        assert_eq!(log_events(&mut events), 0);
    }
}
