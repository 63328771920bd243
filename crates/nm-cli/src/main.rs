mod config;
mod input;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use nm_core::{CoOccurrence, EntityIndex, EntityMiner, Statement, build_table, mine_entities};

use crate::config::Config;
use crate::input::{Bundle, load_entities, load_statements};

#[derive(Parser)]
#[command(name = "nm", about = "Narrative co-occurrence statistics and entity mining")]
struct Cli {
    /// Configuration file (TOML). Falls back to $NM_CONFIG, then built-in roles
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count narratives, most frequent first
    Counts(NarrativeArgs),

    /// Score narratives by pointwise mutual information, highest first
    Pmi(NarrativeArgs),

    /// Mine a fixed entity vocabulary out of postprocessed roles
    Mine {
        /// Postprocessed statements (JSON array)
        #[arg(long)]
        statements: PathBuf,

        /// Entity vocabulary, one entity per line
        #[arg(long)]
        entities: PathBuf,

        /// Mine in batches of this many statements (0 = one batch)
        #[arg(long, default_value_t = 0)]
        batch_size: usize,

        /// Write the statements with matched roles emptied to this file
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct NarrativeArgs {
    /// Input bundle (statements, clustering, labels) as JSON
    #[arg(long)]
    input: PathBuf,

    /// Comma-separated role subset (default: every declared role)
    #[arg(long, value_delimiter = ',')]
    roles: Option<Vec<String>>,

    /// Print only the first N narratives
    #[arg(long)]
    top: Option<usize>,
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::load(cli.config.as_deref())?;

    match &cli.command {
        Commands::Counts(args) => cmd_counts(&config, args),
        Commands::Pmi(args) => cmd_pmi(&config, args),
        Commands::Mine {
            statements,
            entities,
            batch_size,
            output,
        } => cmd_mine(&config, statements, entities, *batch_size, output.as_deref()),
    }
}

fn build_engine(config: &Config, args: &NarrativeArgs) -> Result<CoOccurrence> {
    let roles = config.used_roles()?;
    let bundle = Bundle::load(&args.input)?;
    let labels = bundle.label_table(&roles)?;

    let assembled = build_table(
        &roles,
        &bundle.clustering,
        &bundle.statements,
        bundle.mask.as_ref(),
    )
    .context("failed to assemble role table")?;
    if !assembled.warnings.is_empty() {
        eprintln!(
            "{} data-quality warning(s) while assembling roles",
            assembled.warnings.len()
        );
    }

    let mut engine = CoOccurrence::with_display_order(
        assembled.table,
        labels,
        roles,
        config.roles.display_order.iter().cloned(),
    )?;
    if let Some(subset) = &args.roles {
        let subset: BTreeSet<String> = subset.iter().map(|r| r.trim().to_string()).collect();
        engine
            .set_subset(Some(&subset))
            .context("invalid --roles")?;
    }
    Ok(engine)
}

fn cmd_counts(config: &Config, args: &NarrativeArgs) -> Result<()> {
    let engine = build_engine(config, args)?;
    let counts = engine
        .narratives_counts()
        .context("failed to label narratives")?;

    if counts.is_empty() {
        println!("(no complete narratives)");
    }
    for (narrative, count) in counts.iter().take(args.top.unwrap_or(usize::MAX)) {
        println!("{count}\t{narrative}");
    }
    Ok(())
}

fn cmd_pmi(config: &Config, args: &NarrativeArgs) -> Result<()> {
    let engine = build_engine(config, args)?;
    let scores = engine
        .narratives_pmi()
        .context("failed to label narratives")?;

    if scores.is_empty() {
        println!("(no complete narratives)");
    }
    for (narrative, score) in scores.iter().take(args.top.unwrap_or(usize::MAX)) {
        println!("{score:.4}\t{narrative}");
    }
    Ok(())
}

fn cmd_mine(
    config: &Config,
    statements_path: &Path,
    entities_path: &Path,
    batch_size: usize,
    output: Option<&Path>,
) -> Result<()> {
    let statements = load_statements(statements_path)?;
    let entities = load_entities(entities_path)?;
    let roles = &config.entities.roles;

    let (index, stripped): (EntityIndex, Vec<Statement>) = if batch_size == 0 {
        let mined = mine_entities(&statements, &entities, 0, EntityIndex::default(), roles);
        (mined.index, mined.statements)
    } else {
        let mut miner = EntityMiner::with_roles(roles.iter().cloned());
        let mut stripped = Vec::with_capacity(statements.len());
        for batch in statements.chunks(batch_size) {
            stripped.extend(miner.mine(batch, &entities));
        }
        (miner.into_index(), stripped)
    };

    let json = serde_json::to_string_pretty(&index).context("failed to serialize entity index")?;
    println!("{json}");

    if let Some(path) = output {
        let json =
            serde_json::to_string_pretty(&stripped).context("failed to serialize statements")?;
        std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("wrote {} statements to {}", stripped.len(), path.display());
    }
    Ok(())
}
