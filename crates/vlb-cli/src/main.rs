//! VLB CLI: Vault Link Builder for markdown knowledge vaults.
//!
//! Commands: analyze, suggest, apply, run, review, completions

mod config;

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use vlb_core::snapshot::write_json;
use vlb_core::{Confidence, LinkFormat, StrategyName, SuggestionMap, VaultSnapshot};
use vlb_suggest::formatter::{filter_confidence, format_suggestions, OutputFormat};
use vlb_suggest::{total_suggestions, Suggester};
use vlb_vault::{analyze_vault, ApplyOptions, ApplyReport, LinkApplier, ScanOptions};

use crate::config::Config;

const DEFAULT_ANALYSIS: &str = "vault_analysis.json";
const DEFAULT_SUGGESTIONS: &str = "link_suggestions.json";

#[derive(Parser)]
#[command(
    name = "vlb",
    version,
    about = "Vault Link Builder - find and insert links between markdown notes"
)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a vault and write its analysis snapshot
    Analyze {
        /// Vault root directory
        vault: PathBuf,

        /// Output JSON file
        #[arg(short, long, default_value = DEFAULT_ANALYSIS)]
        output: PathBuf,
    },

    /// Generate link suggestions from an analysis snapshot
    Suggest {
        /// Vault root directory
        vault: PathBuf,

        /// Analysis JSON file
        #[arg(short, long, default_value = DEFAULT_ANALYSIS)]
        analysis: PathBuf,

        /// Output JSON file
        #[arg(short, long, default_value = DEFAULT_SUGGESTIONS)]
        output: PathBuf,

        /// Strategy profile: conservative, balanced or aggressive
        #[arg(short, long)]
        strategy: Option<StrategyName>,
    },

    /// Insert suggested links into the vault's notes
    Apply {
        /// Vault root directory
        vault: PathBuf,

        /// Suggestions JSON file
        #[arg(short, long, default_value = DEFAULT_SUGGESTIONS)]
        suggestions: PathBuf,

        #[command(flatten)]
        apply: ApplyArgs,
    },

    /// Analyze, suggest and apply in one pass
    Run {
        /// Vault root directory
        vault: PathBuf,

        /// Strategy profile: conservative, balanced or aggressive
        #[arg(short, long)]
        strategy: Option<StrategyName>,

        /// Where to write the analysis snapshot
        #[arg(long, default_value = DEFAULT_ANALYSIS)]
        analysis: PathBuf,

        /// Where to write the suggestions
        #[arg(long, default_value = DEFAULT_SUGGESTIONS)]
        suggestions: PathBuf,

        #[command(flatten)]
        apply: ApplyArgs,
    },

    /// Print suggestions for inspection
    Review {
        /// Suggestions JSON file
        suggestions: PathBuf,

        /// Output format: table, markdown or json
        #[arg(long, default_value = "table")]
        format: OutputFormat,

        /// Only show suggestions at or above this confidence
        #[arg(short, long)]
        confidence: Option<Confidence>,
    },

    /// Print a shell completion script
    Completions {
        shell: Shell,
    },
}

#[derive(clap::Args)]
struct ApplyArgs {
    /// Link format: markdown or wikilink
    #[arg(short, long)]
    format: Option<LinkFormat>,

    /// Minimum confidence to apply: low, medium or high
    #[arg(short, long)]
    confidence: Option<Confidence>,

    /// Report what would change without writing
    #[arg(short, long)]
    dry_run: bool,

    /// Keep a timestamped .bak copy of every modified note
    #[arg(long)]
    backup: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    let config_flag = cli.config.as_deref();

    match cli.command {
        Commands::Analyze { vault, output } => {
            let cfg = config::load_config(config_flag, Some(&vault))?;
            cmd_analyze(&cfg, &vault, &output).map(|_| ())
        }
        Commands::Suggest {
            vault,
            analysis,
            output,
            strategy,
        } => {
            let cfg = config::load_config(config_flag, Some(&vault))?;
            let snapshot = VaultSnapshot::load(&analysis)
                .with_context(|| format!("cannot load analysis {}", analysis.display()))?;
            cmd_suggest(&cfg, &snapshot, &output, strategy).map(|_| ())
        }
        Commands::Apply {
            vault,
            suggestions,
            apply,
        } => {
            let cfg = config::load_config(config_flag, Some(&vault))?;
            let map = read_suggestions(&suggestions)?;
            cmd_apply(&cfg, &vault, &map, &apply)
        }
        Commands::Run {
            vault,
            strategy,
            analysis,
            suggestions,
            apply,
        } => {
            let cfg = config::load_config(config_flag, Some(&vault))?;
            let snapshot = cmd_analyze(&cfg, &vault, &analysis)?;
            println!();
            let map = cmd_suggest(&cfg, &snapshot, &suggestions, strategy)?;
            println!();
            cmd_apply(&cfg, &vault, &map, &apply)
        }
        Commands::Review {
            suggestions,
            format,
            confidence,
        } => cmd_review(&suggestions, format, confidence),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "vlb", &mut io::stdout());
            Ok(())
        }
    }
}

fn cmd_analyze(cfg: &Config, vault: &Path, output: &Path) -> Result<VaultSnapshot> {
    let options = ScanOptions {
        exclude_dirs: cfg.analyze.exclude_dirs.clone(),
    };
    let snapshot = analyze_vault(vault, &options)
        .with_context(|| format!("cannot analyze vault {}", vault.display()))?;
    snapshot
        .save(output)
        .with_context(|| format!("cannot write {}", output.display()))?;

    let stats = &snapshot.stats;
    println!("Analysis complete");
    println!("  total_files: {}", stats.total_files);
    println!("  total_links: {}", stats.total_links);
    println!("  files_with_links: {}", stats.files_with_links);
    println!("  files_without_links: {}", stats.files_without_links);
    println!("  avg_links_per_file: {:.2}", stats.avg_links_per_file);
    println!("  total_concepts: {}", stats.total_concepts);
    println!("  total_tags: {}", stats.total_tags);
    println!("Results saved to: {}", output.display());
    Ok(snapshot)
}

fn cmd_suggest(
    cfg: &Config,
    snapshot: &VaultSnapshot,
    output: &Path,
    strategy: Option<StrategyName>,
) -> Result<SuggestionMap> {
    let strategy = cfg.strategy(strategy)?;
    let profile = cfg.profile(strategy)?;
    let suggester = Suggester::new(snapshot, profile).context("analysis snapshot is inconsistent")?;
    let map = suggester.suggest_all();
    write_json(output, &map).with_context(|| format!("cannot write {}", output.display()))?;

    println!("Link suggestions generated");
    println!("  Files with suggestions: {}", map.len());
    println!("  Total suggestions: {}", total_suggestions(&map));
    println!("  Strategy: {strategy}");
    println!("Results saved to: {}", output.display());
    Ok(map)
}

fn cmd_apply(cfg: &Config, vault: &Path, map: &SuggestionMap, args: &ApplyArgs) -> Result<()> {
    let options = ApplyOptions {
        min_confidence: cfg.min_confidence(args.confidence)?,
        format: cfg.link_format(args.format)?,
        dry_run: args.dry_run,
        backup: args.backup || cfg.apply.backup,
        related_heading: cfg.apply.related_heading.clone(),
    };
    let applier = LinkApplier::new(vault, options)
        .with_context(|| format!("cannot open vault {}", vault.display()))?;
    let report = applier.apply(map);
    print_report(&report);
    Ok(())
}

fn print_report(report: &ApplyReport) {
    let prefix = if report.dry_run { "[dry run] " } else { "" };
    for file in &report.missing {
        println!("File not found: {file}");
    }
    for (file, error) in &report.failed {
        println!("Error updating {file}: {error}");
    }
    for change in &report.changes {
        let verb = if report.dry_run { "Would update" } else { "Updated" };
        println!(
            "{prefix}{verb}: {} (+{} links, {} inline, {} in section)",
            change.file, change.links_added, change.inline, change.section
        );
        if let Some(backup) = &change.backup {
            println!("  backup: {}", backup.display());
        }
    }

    println!("{prefix}Link addition complete");
    println!("  Files modified: {}", report.files_modified);
    println!("  Links added: {}", report.links_added);
    if report.dry_run && report.links_added > 0 {
        println!("Run without --dry-run to apply changes");
    }
}

fn cmd_review(path: &Path, format: OutputFormat, confidence: Option<Confidence>) -> Result<()> {
    let map = read_suggestions(path)?;
    let map = match confidence {
        Some(floor) => filter_confidence(&map, floor),
        None => map,
    };
    let out = format_suggestions(&map, format);
    if out.ends_with('\n') {
        print!("{out}");
    } else {
        println!("{out}");
    }
    Ok(())
}

fn read_suggestions(path: &Path) -> Result<SuggestionMap> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read suggestions {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("invalid suggestions JSON in {}", path.display()))
}
