//! # Plan Inspector
//!
//! Compiles a filter/sort request against the todo schema and prints either
//! the query plan or the assembled SQL with its bound parameters. No database
//! connection is made.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use serde_json::{json, Value};
use std::process;
use todo_core::config::{ConfigManager, QueryConfig};
use todo_core::logging::init_structured_logging;
use todo_core::filter::QueryPlanner;
use todo_core::metadata::todo_schema;
use todo_core::query_builder::QueryAssembler;
use todo_core::services::ListQuery;
use todo_core::validation::validate_query_input;
use tracing::{debug, error, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "plan-inspector")]
#[command(about = "Compile todo filter/sort documents into query plans and SQL")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Root entity (Todo, User)
    #[arg(short, long, default_value = "Todo")]
    entity: String,

    /// Filter document as JSON
    #[arg(short, long)]
    filter: Option<String>,

    /// Sort document as JSON
    #[arg(short, long)]
    order: Option<String>,

    /// Page number (1-indexed); requires --per-page or uses the configured default
    #[arg(long)]
    page: Option<u32>,

    #[arg(long)]
    per_page: Option<u32>,

    /// Read limits and logging from the layered configuration instead of built-in defaults
    #[arg(long)]
    use_config: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Verbose output level (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// The compiled plan: predicate tree, order terms, joins
    Json,
    /// Assembled SQL and parameters
    Sql,
}

fn main() {
    let cli = Cli::parse();

    let manager = if cli.use_config {
        match ConfigManager::load() {
            Ok(manager) => Some(manager),
            Err(e) => {
                eprintln!("❌ {e}");
                process::exit(1);
            }
        }
    } else {
        None
    };

    match &manager {
        Some(manager) => init_structured_logging(&manager.config().logging),
        None => {
            let level = match cli.verbose {
                0 => Level::WARN,
                1 => Level::INFO,
                2 => Level::DEBUG,
                _ => Level::TRACE,
            };
            let _subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_target(false)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }

    let query_config = manager
        .map(|manager| manager.config().query.clone())
        .unwrap_or_default();

    match run(&cli, &query_config) {
        Ok(output) => println!("{output}"),
        Err(e) => {
            error!("Plan inspection failed: {e:#}");
            eprintln!("❌ {e:#}");
            process::exit(1);
        }
    }
}

fn parse_document(label: &str, raw: Option<&str>) -> anyhow::Result<Option<Value>> {
    raw.map(|text| {
        let value: Value =
            serde_json::from_str(text).with_context(|| format!("--{label} is not valid JSON"))?;
        validate_query_input(&value)?;
        Ok(value)
    })
    .transpose()
}

fn run(cli: &Cli, query_config: &QueryConfig) -> anyhow::Result<String> {
    debug!(?query_config, "query limits");

    let filter = parse_document("filter", cli.filter.as_deref())?;
    let order = parse_document("order", cli.order.as_deref())?;

    let registry = todo_schema()?;
    let plan = QueryPlanner::new(&registry)
        .with_max_depth(query_config.max_filter_depth)
        .plan_wire(&cli.entity, filter.as_ref(), order.as_ref())?;

    match cli.format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
            "plan": plan,
            "predicate": plan.predicate.as_ref().map(ToString::to_string),
        }))?),
        OutputFormat::Sql => {
            let page = ListQuery {
                page: cli.page,
                per_page: cli.per_page,
                ..ListQuery::default()
            }
            .page(query_config.default_page_size);
            let built = QueryAssembler::new(&registry)
                .with_max_page_size(query_config.max_page_size)
                .assemble_page(&plan, page)?
                .build();
            Ok(serde_json::to_string_pretty(&json!({
                "sql": built.sql,
                "params": built.params,
            }))?)
        }
    }
}
