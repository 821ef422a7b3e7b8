//! mysqlite — run MySQL statements against SQLite
//!
//! # Usage
//!
//! ```bash
//! # Execute a statement against a database file
//! mysqlite -d wordpress.sqlite "SELECT option_value FROM wp_options WHERE option_name = 'home'"
//!
//! # Show the SQLite statements without touching a database
//! mysqlite "UPDATE wp_posts SET post_status = 'draft' ORDER BY ID LIMIT 5" --dry-run
//!
//! # Print the parse tree
//! mysqlite explain "SELECT 1 + 2"
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use mysqlite::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mysqlite")]
#[command(version)]
#[command(about = "Run MySQL-dialect SQL against SQLite", long_about = None)]
#[command(after_help = "EXAMPLES:
    mysqlite -d blog.sqlite 'SELECT * FROM wp_posts LIMIT 10'
    mysqlite 'CREATE TABLE t (id INT AUTO_INCREMENT PRIMARY KEY, k VARCHAR(20), KEY k (k))' --dry-run
    mysqlite explain 'SELECT a FROM t WHERE b <=> NULL'")]
struct Cli {
    /// The MySQL statement to execute
    query: Option<String>,

    /// SQLite database file (":memory:" for a scratch database)
    #[arg(short, long, env = "MYSQLITE_DATABASE")]
    database: Option<String>,

    /// Configuration file (default: ./mysqlite.toml, then the user config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run against a scratch in-memory database and print the SQLite statements
    #[arg(long)]
    dry_run: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Fail with the underlying error instead of a diagnostic result
    #[arg(long)]
    debug: bool,

    /// Verbose output (debug logging)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a statement and print its parse tree
    Explain {
        /// The MySQL statement to explain
        query: String,
    },
    /// List the keywords the grammar knows
    Keywords,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let outcome = match &cli.command {
        Some(Commands::Explain { query }) => explain_query(query),
        Some(Commands::Keywords) => {
            show_keywords();
            Ok(())
        }
        None => match &cli.query {
            Some(query) => execute_query(query, &cli),
            None => {
                println!("{}", "mysqlite — MySQL on SQLite".cyan().bold());
                println!();
                println!("Usage: mysqlite <QUERY> [OPTIONS]");
                println!();
                println!("Try: mysqlite --help");
                Ok(())
            }
        },
    };

    if let Err(e) = outcome {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "mysqlite=debug" } else { "mysqlite=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => Config::discover()?,
    };
    if let Some(database) = &cli.database {
        config.database.path = database.clone();
    }
    if cli.dry_run {
        config.database.path = ":memory:".to_string();
    }
    if cli.debug {
        config.debug = true;
    }
    Ok(config)
}

fn execute_query(query: &str, cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    if cli.verbose {
        println!("{} {}", "Input:".dimmed(), query.yellow());
        println!("{} {}", "Database:".dimmed(), config.database.path);
    }

    let mut driver = Driver::open(config)?;
    let result = driver.query(query)?;

    if cli.dry_run {
        println!("{}", "SQLite statements:".green().bold());
        for statement in &result.executed {
            println!("  {}", statement.to_string().white());
        }
    }
    if let Some(error) = &result.error {
        bail!("{}", error);
    }
    if cli.dry_run {
        return Ok(());
    }

    match &result.return_value {
        ReturnValue::Rows(rows) => format_output(rows, &cli.format),
        ReturnValue::AffectedRows(affected) => {
            println!("{} {} rows affected", "✓".green(), affected);
            if let Some(id) = result.last_insert_id.filter(|id| *id > 0) {
                println!("{} last insert id {}", "✓".green(), id);
            }
        }
        ReturnValue::Bool(success) => {
            let mark = if *success { "✓".green() } else { "✗".red() };
            println!("{} {}", mark, result.query.trim());
        }
    }
    Ok(())
}

fn format_output(rows: &[serde_json::Value], format: &OutputFormat) {
    if rows.is_empty() {
        println!("{}", "(no results)".dimmed());
        return;
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(rows).unwrap_or_default());
        }
        OutputFormat::Table => {
            let columns: Vec<String> = match &rows[0] {
                serde_json::Value::Object(map) => map.keys().cloned().collect(),
                serde_json::Value::Array(values) => (0..values.len()).map(|i| i.to_string()).collect(),
                _ => vec!["value".to_string()],
            };
            let table: Vec<Vec<String>> = rows
                .iter()
                .map(|row| match row {
                    serde_json::Value::Object(map) => columns
                        .iter()
                        .map(|c| map.get(c).map(val_to_string).unwrap_or_default())
                        .collect(),
                    serde_json::Value::Array(values) => values.iter().map(val_to_string).collect(),
                    other => vec![val_to_string(other)],
                })
                .collect();

            let mut widths: Vec<usize> = columns.iter().map(|c| c.len()).collect();
            for row in &table {
                for (width, cell) in widths.iter_mut().zip(row) {
                    *width = (*width).max(cell.chars().count());
                }
            }

            let header: Vec<String> = columns
                .iter()
                .zip(&widths)
                .map(|(c, width)| format!("{:width$}", c, width = width))
                .collect();
            println!("{}", header.join(" │ ").white().bold());

            let sep: Vec<String> = widths.iter().map(|width| "─".repeat(*width)).collect();
            println!("{}", sep.join("─┼─").dimmed());

            for row in &table {
                let cells: Vec<String> = row
                    .iter()
                    .zip(&widths)
                    .map(|(cell, width)| format!("{:width$}", cell, width = width))
                    .collect();
                println!("{}", cells.join(" │ "));
            }

            println!();
            println!("{} row(s) returned", rows.len().to_string().cyan());
        }
    }
}

fn val_to_string(val: &serde_json::Value) -> String {
    match val {
        serde_json::Value::Null => "NULL".to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.clone(),
        _ => val.to_string(),
    }
}

fn explain_query(query: &str) -> Result<()> {
    println!("{}", "mysqlite Query Explanation".cyan().bold());
    println!();
    println!("{} {}", "Query:".dimmed(), query.yellow());
    println!();

    let grammar = Grammar::mysql();
    let tree = mysqlite::parse(&grammar, query)?;
    println!("{}", "Parse Tree:".green().bold());
    println!("{}", tree.outline());

    println!("{}", "Translated SQL:".green().bold());
    match Translator::new("wp").translate_to_sql(&tree) {
        Ok(Some(sql)) => println!("  {}", sql.white()),
        Ok(None) => println!("  {}", "(nothing to execute)".dimmed()),
        Err(e) => println!("  {} {}", "✗".red(), e),
    }
    Ok(())
}

fn show_keywords() {
    println!("{}", "mysqlite Keyword Reference".cyan().bold());
    println!();

    let grammar = Grammar::mysql();
    let keywords = grammar.keywords();
    for keyword in &keywords {
        if keyword.is_reserved() {
            println!("  {} {}", keyword.as_str().cyan().bold(), "(reserved)".dimmed());
        } else {
            println!("  {}", keyword.as_str().white());
        }
    }
    println!();
    println!(
        "{} keywords, {} grammar rules",
        keywords.len().to_string().cyan(),
        grammar.rule_count().to_string().cyan()
    );
}
