//! quire command-line tool.
//!
//! Opens a JSON block document, applies one edit through the engine and
//! prints the resulting document, or writes it back with `--write`.
//!
//! Usage:
//!   quire notes.json outline
//!   quire notes.json split a 5
//!   quire --write notes.json merge a b
//!   quire notes.json move n --after a
//!   quire --compact notes.json convert a quote
//!   RUST_LOG=debug quire notes.json validate

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use quire_engine::{Block, Engine, EngineConfig, FileSink, InsertPosition, JsonAdapter, MoveRequest};

/// Inspect and edit quire block documents.
#[derive(Parser, Debug)]
#[command(name = "quire")]
#[command(about = "Inspect and edit quire block documents")]
struct Args {
    /// Engine config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the result back to the document instead of printing it
    #[arg(short, long)]
    write: bool,

    /// Emit compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,

    /// Document to open (JSON array of blocks)
    document: PathBuf,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Print the block tree
    Outline,
    /// Check every block against the block catalog
    Validate,
    /// Split a text block at a character offset
    Split {
        block: String,
        at: usize,
        #[arg(long)]
        field: Option<String>,
    },
    /// Append SECOND's text to FIRST and remove SECOND
    Merge {
        first: String,
        second: String,
        #[arg(long)]
        field: Option<String>,
    },
    /// Remove a block and everything under it
    Remove { block: String },
    /// Copy a block (with fresh ids) right after itself
    Duplicate { block: String },
    /// Change a block's type
    Convert { block: String, to: String },
    /// Move a block; with no target it goes to the end of the document
    Move {
        block: String,
        #[arg(long, conflicts_with_all = ["after", "inside"])]
        before: Option<String>,
        #[arg(long, conflicts_with = "inside")]
        after: Option<String>,
        #[arg(long)]
        inside: Option<String>,
        /// Region for --inside
        #[arg(long, default_value = "body")]
        region: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    if let Some(output) = run(args).await? {
        println!("{output}");
    }
    Ok(())
}

/// Run one invocation. Returns what should go to stdout, if anything.
async fn run(args: Args) -> Result<Option<String>> {
    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    }
    .without_autosave();

    let text = tokio::fs::read_to_string(&args.document)
        .await
        .with_context(|| format!("reading {}", args.document.display()))?;

    let adapter = if args.compact {
        JsonAdapter::new().compact()
    } else {
        JsonAdapter::new()
    };
    let mut engine = Engine::new(Arc::new(adapter), config);
    if args.write {
        engine = engine.with_sink(Arc::new(FileSink::new(&args.document)));
    }
    let blocks = engine.load_document(&text).await?;
    tracing::debug!(document = %args.document.display(), blocks, "opened");

    let changed = match args.command {
        Cmd::Outline => {
            return Ok(Some(outline(engine.tree(), &engine.config().text.default_field)));
        }
        Cmd::Validate => {
            let issues = engine.validate_document().await;
            if issues.is_empty() {
                return Ok(Some("ok".to_string()));
            }
            for issue in &issues {
                eprintln!("{}", serde_json::to_string(issue)?);
            }
            bail!("{} validation issue(s)", issues.len());
        }
        Cmd::Split { block, at, field } => {
            let new_id = engine
                .split_block(&block, at, field.as_deref())
                .await?
                .with_context(|| format!("no block {block}"))?;
            tracing::info!(block = %block, new_block = %new_id, "split");
            true
        }
        Cmd::Merge { first, second, field } => {
            engine.merge_blocks(&first, &second, field.as_deref()).await?
        }
        Cmd::Remove { block } => engine.delete_block(&block).await?,
        Cmd::Duplicate { block } => engine.duplicate_block(&block, None).await?.is_some(),
        Cmd::Convert { block, to } => engine.convert_block(&block, &to, None).await?,
        Cmd::Move {
            block,
            before,
            after,
            inside,
            region,
        } => {
            let target = match (before, after, inside) {
                (Some(target), _, _) => Some(InsertPosition::before(target)),
                (_, Some(target), _) => Some(InsertPosition::after(target)),
                (_, _, Some(target)) => Some(InsertPosition::inside(target, region)),
                _ => None,
            };
            engine.move_block(MoveRequest::new(block, target)).await?
        }
    };

    if !changed {
        tracing::warn!("nothing changed");
    }

    if args.write {
        let document = engine.save().await?;
        tracing::info!(path = %args.document.display(), bytes = document.len(), "written");
        Ok(None)
    } else {
        Ok(Some(engine.serialize().await?))
    }
}

/// Indented one-line-per-block rendering of the tree.
fn outline(tree: &[Block], text_field: &str) -> String {
    let mut out = String::new();
    push_outline(tree, text_field, 0, &mut out);
    out
}

fn push_outline(blocks: &[Block], text_field: &str, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    for block in blocks {
        out.push_str(&format!("{indent}{} ({})", block.id, block.block_type));
        if let Some(text) = block.text_field(text_field) {
            out.push_str(&format!(" {text:?}"));
        }
        out.push('\n');
        for (region, children) in block.regions_iter() {
            out.push_str(&format!("{indent}  {region}:\n"));
            push_outline(children, text_field, depth + 2, out);
        }
    }
}
