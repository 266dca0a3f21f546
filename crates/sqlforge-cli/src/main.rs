//! sqlforge command line
//!
//! Reads a JSON expression document, resolves it against the standard
//! operator catalog, and renders it as SQL for a dialect, lowers it to a host
//! expression, or evaluates it against one row.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use sqlforge_dialect::{DatabaseProduct, Dialect};
use sqlforge_enumerable::{evaluate, MethodTable, NullAs, Translator};
use sqlforge_registry::OperatorTable;
use std::io::Read;
use std::path::PathBuf;

mod config;
mod document;
mod logging;

use config::Config;
use document::ExprDocument;

/// Render and lower SQL operator calls
#[derive(Parser)]
#[command(name = "sqlforge", version, about)]
struct Cli {
    /// Configuration file
    #[arg(short, long, global = true, env = "SQLFORGE_CONFIG", default_value = "sqlforge.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct Input {
    /// Expression document as inline JSON
    #[arg(short, long, conflicts_with = "file")]
    expr: Option<String>,

    /// File holding the expression document; stdin when neither is given
    #[arg(short, long)]
    file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Render the expression as SQL
    Render {
        #[command(flatten)]
        input: Input,

        /// Target dialect, overriding the configuration
        #[arg(short, long)]
        dialect: Option<String>,

        /// Target dialect version, e.g. 2.1
        #[arg(long)]
        dialect_version: Option<String>,
    },
    /// Lower the expression to a host expression
    Lower {
        #[command(flatten)]
        input: Input,

        #[arg(long, value_enum, default_value_t = NullAsArg::Null)]
        null_as: NullAsArg,

        /// Print the lowered tree as JSON
        #[arg(long)]
        json: bool,
    },
    /// Lower and evaluate the expression against one row
    Eval {
        #[command(flatten)]
        input: Input,

        /// Input row as a JSON array
        #[arg(short, long, default_value = "[]")]
        row: String,

        #[arg(long, value_enum, default_value_t = NullAsArg::Null)]
        null_as: NullAsArg,
    },
    /// List the built-in dialect profiles
    Dialects,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum NullAsArg {
    Null,
    NotPossible,
    False,
    True,
}

impl From<NullAsArg> for NullAs {
    fn from(arg: NullAsArg) -> Self {
        match arg {
            NullAsArg::Null => NullAs::Null,
            NullAsArg::NotPossible => NullAs::NotPossible,
            NullAsArg::False => NullAs::False,
            NullAsArg::True => NullAs::True,
        }
    }
}

impl Input {
    fn read(&self) -> Result<String> {
        if let Some(expr) = &self.expr {
            return Ok(expr.clone());
        }
        if let Some(path) = &self.file {
            return std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()));
        }
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text).context("reading stdin")?;
        Ok(text)
    }

    fn resolve(&self) -> Result<sqlforge_ir::RexNode> {
        let doc = ExprDocument::parse(&self.read()?)?;
        Ok(doc.resolve(OperatorTable::standard())?)
    }
}

fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = Config::load_or_default(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    logging::init(&config.logging)?;

    match cli.command {
        Command::Render { input, dialect, dialect_version } => {
            if let Some(product) = dialect {
                config.dialect.product = product;
                config.dialect.version = None;
            }
            if let Some(version) = dialect_version {
                config.dialect.version = Some(version);
            }
            let dialect = config.dialect.resolve()?;
            let rex = input.resolve()?;
            tracing::info!(dialect = %dialect.product(), "rendering");
            println!("{}", dialect.renderer().render_rex(&rex, 0, 0));
        }
        Command::Lower { input, null_as, json } => {
            let rex = input.resolve()?;
            let expr = Translator::standard().translate(&rex, null_as.into())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&expr)?);
            } else {
                println!("{}", expr);
            }
        }
        Command::Eval { input, row, null_as } => {
            let rex = input.resolve()?;
            let row = document::parse_row(&row)?;
            let expr = Translator::standard().translate(&rex, null_as.into())?;
            tracing::debug!(expression = %expr, "evaluating");
            let value = evaluate(&expr, &row, MethodTable::standard())?;
            println!("{}", value);
        }
        Command::Dialects => {
            for product in [
                DatabaseProduct::Ansi,
                DatabaseProduct::Hive,
                DatabaseProduct::Spark,
                DatabaseProduct::MySql,
                DatabaseProduct::PostgreSql,
                DatabaseProduct::BigQuery,
            ] {
                let dialect = Dialect::standard(product);
                let features: Vec<String> = dialect.features().map(|f| format!("{:?}", f)).collect();
                println!(
                    "{:<12} nulls={:?} trim={:?} limit={:?} features=[{}]",
                    product.name(),
                    dialect.null_collation(),
                    dialect.trim_style(),
                    dialect.limit_style(),
                    features.join(", ")
                );
            }
        }
    }

    Ok(())
}
