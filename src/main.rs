use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use glossa::glossary::{self, GlossaryKey, GlossarySource, SourceFormat};
use glossa::index::{self, stats};
use glossa::output;
use glossa::query::{LookupRequest, lookup};
use glossa::utils::{AppConfig, get_config_path, get_index_dir, remove_index};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter directive
const LOG_ENV: &str = "GLOSSA_LOG";

#[derive(Parser)]
#[command(name = "glossa")]
#[command(about = "Bilingual glossary indexing and term lookup")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Term to look up (when no subcommand is given)
    #[arg(trailing_var_arg = true)]
    query: Vec<String>,

    /// Glossary repository root (the directory holding `projects/`)
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Print lookup results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Do not rebuild the index after changing a glossary
    #[arg(long, global = true)]
    no_index: bool,

    #[command(flatten)]
    filters: LookupFilters,
}

#[derive(clap::Args, Default)]
struct LookupFilters {
    /// Only show terms from this source language
    #[arg(short, long = "source-lang")]
    source_language: Option<String>,

    /// Only show terms into this target language
    #[arg(short, long = "target-lang")]
    target_language: Option<String>,

    /// List hits from this glossary first
    #[arg(short, long = "prefer")]
    preferred_glossary: Option<String>,

    /// Maximum number of hits
    #[arg(short = 'n', long)]
    limit: Option<usize>,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Yml,
    Csv,
    Tsv,
}

impl From<FormatArg> for SourceFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Yml => SourceFormat::Yaml,
            FormatArg::Csv => SourceFormat::Csv,
            FormatArg::Tsv => SourceFormat::Tsv,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build or rebuild the index from every glossary file
    Index,
    /// Look up a term
    Lookup {
        /// Term to look up
        #[arg(required = true)]
        term: Vec<String>,

        #[command(flatten)]
        filters: LookupFilters,
    },
    /// Add a term to a glossary
    Add {
        /// Glossary as <name>.<source_language>.<target_language>
        glossary: String,
        source_term: String,
        target_term: String,

        #[arg(long, default_value = "")]
        note: String,

        /// Project holding the glossary, when the name is ambiguous
        #[arg(long)]
        project: Option<String>,
    },
    /// Change the translation or note of an existing term
    Update {
        /// Glossary as <name>.<source_language>.<target_language>
        glossary: String,
        source_term: String,
        target_term: String,

        /// New target term
        #[arg(long = "to")]
        new_target: Option<String>,

        /// New note (an empty string clears it)
        #[arg(long)]
        note: Option<String>,

        #[arg(long)]
        project: Option<String>,
    },
    /// Delete a term; without a target, delete every translation of the source term
    Delete {
        /// Glossary as <name>.<source_language>.<target_language>
        glossary: String,
        source_term: String,
        target_term: Option<String>,

        /// Delete all translations even if there are several
        #[arg(short, long)]
        force: bool,

        #[arg(long)]
        project: Option<String>,
    },
    /// Create a project, or an empty glossary inside a project
    New {
        project: String,

        /// Glossary as <name>.<source_language>.<target_language>
        glossary: Option<String>,

        #[arg(long, value_enum, default_value = "yml")]
        format: FormatArg,
    },
    /// Copy an existing glossary file into a project
    Register { project: String, file: PathBuf },
    /// Remove a project, or one glossary from it
    Unregister {
        project: String,

        /// Glossary as <name>.<source_language>.<target_language>
        glossary: Option<String>,
    },
    /// List projects and glossaries
    List,
    /// Show index statistics
    Stats,
    /// Remove the index for the repository
    Remove,
    /// Show or change settings
    Config {
        /// Setting name; omit to print every setting
        key: Option<String>,

        /// New value; an empty string clears the setting
        value: Option<String>,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = if verbose > 0 {
        EnvFilter::new(format!("glossa={default}"))
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load()?;
    let root = config.resolve_root(cli.root.as_deref());
    let color = config.color && !cli.no_color;
    let reindex = !cli.no_index;

    match cli.command {
        Some(Commands::Index) => {
            let summary = rebuild(&root, false)?;
            if summary.skipped_files + summary.skipped_rows > 0 {
                eprintln!(
                    "({} files and {} rows skipped, run with -v for details)",
                    summary.skipped_files, summary.skipped_rows
                );
            }
        }
        Some(Commands::Lookup { term, filters }) => {
            run_lookup(&root, &config, &term.join(" "), filters, color, cli.json)?;
        }
        Some(Commands::Add {
            glossary,
            source_term,
            target_term,
            note,
            project,
        }) => {
            let mut source = open_glossary(&root, &glossary, project.as_deref())?;
            source.add(&source_term, &target_term, &note)?;
            source.save()?;
            println!("Added '{source_term}' -> '{target_term}' to {}", source.file().key);
            after_mutation(&root, reindex)?;
        }
        Some(Commands::Update {
            glossary,
            source_term,
            target_term,
            new_target,
            note,
            project,
        }) => {
            if new_target.is_none() && note.is_none() {
                bail!("nothing to update: pass --to and/or --note");
            }
            let mut source = open_glossary(&root, &glossary, project.as_deref())?;
            source.update(
                &source_term,
                &target_term,
                new_target.as_deref(),
                note.as_deref(),
            )?;
            source.save()?;
            println!("Updated '{source_term}' in {}", source.file().key);
            after_mutation(&root, reindex)?;
        }
        Some(Commands::Delete {
            glossary,
            source_term,
            target_term,
            force,
            project,
        }) => {
            let mut source = open_glossary(&root, &glossary, project.as_deref())?;
            let removed = match target_term {
                Some(target_term) => vec![source.delete(&source_term, &target_term)?],
                None => source.delete_all(&source_term, force)?,
            };
            source.save()?;
            for row in &removed {
                println!(
                    "Deleted '{}' -> '{}' from {}",
                    row.source_term,
                    row.target_term,
                    source.file().key
                );
            }
            after_mutation(&root, reindex)?;
        }
        Some(Commands::New {
            project,
            glossary,
            format,
        }) => match glossary {
            None => {
                let dir = glossary::project::create_project(&root, &project)?;
                println!("Created project {project} at {}", dir.display());
            }
            Some(glossary) => {
                let key: GlossaryKey = glossary.parse()?;
                let file =
                    glossary::project::create_glossary(&root, &project, &key, format.into())?;
                println!("Created {}", file.path.display());
            }
        },
        Some(Commands::Register { project, file }) => {
            let registered = glossary::project::register(&root, &project, &file)?;
            println!("Registered {}", registered.path.display());
            after_mutation(&root, reindex)?;
        }
        Some(Commands::Unregister { project, glossary }) => {
            let key = glossary.map(|g| g.parse::<GlossaryKey>()).transpose()?;
            glossary::project::unregister(&root, &project, key.as_ref())?;
            match key {
                Some(key) => println!("Unregistered {key} from {project}"),
                None => println!("Unregistered project {project}"),
            }
            after_mutation(&root, reindex)?;
        }
        Some(Commands::List) => {
            stats::list_glossaries(&root)?;
        }
        Some(Commands::Stats) => {
            stats::show_stats(&get_index_dir(&root)?)?;
        }
        Some(Commands::Remove) => {
            if remove_index(&root)? {
                println!("Removed index for: {}", root.display());
            } else {
                println!("No index for: {}", root.display());
            }
        }
        Some(Commands::Config { key, value }) => {
            run_config(config, key, value)?;
        }
        None => {
            if cli.query.is_empty() {
                bail!("no term given; try 'glossa <TERM>' or 'glossa --help'");
            }
            run_lookup(
                &root,
                &config,
                &cli.query.join(" "),
                cli.filters,
                color,
                cli.json,
            )?;
        }
    }

    Ok(())
}

fn run_lookup(
    root: &Path,
    config: &AppConfig,
    term: &str,
    filters: LookupFilters,
    color: bool,
    json: bool,
) -> Result<()> {
    let request = LookupRequest {
        term: term.to_string(),
        source_language: filters
            .source_language
            .or_else(|| config.source_language.clone()),
        target_language: filters
            .target_language
            .or_else(|| config.target_language.clone()),
        preferred_glossary: filters
            .preferred_glossary
            .or_else(|| config.preferred_glossary.clone()),
        limit: filters.limit.or(config.effective_limit()),
    };

    let hits = lookup(&get_index_dir(root)?, &request)?;
    if json {
        output::print_hits_json(&hits)?;
    } else {
        output::print_hits(&hits, color)?;
        output::print_hit_count(hits.len(), color)?;
    }
    Ok(())
}

fn open_glossary(root: &Path, glossary: &str, project: Option<&str>) -> Result<GlossarySource> {
    let key: GlossaryKey = glossary.parse()?;
    let file = glossary::find_glossary(root, &key, project)?;
    Ok(GlossarySource::open(file)?)
}

fn rebuild(root: &Path, silent: bool) -> Result<index::RebuildSummary> {
    let index_dir = get_index_dir(root)?;
    let summary = index::rebuild_with_progress(root, &index_dir, silent)
        .with_context(|| format!("Failed to index {}", root.display()))?;
    Ok(summary)
}

fn after_mutation(root: &Path, reindex: bool) -> Result<()> {
    if reindex {
        let summary = rebuild(root, true)?;
        println!(
            "Reindexed {} records from {} glossaries",
            summary.records, summary.glossaries
        );
    }
    Ok(())
}

fn run_config(mut config: AppConfig, key: Option<String>, value: Option<String>) -> Result<()> {
    match (key, value) {
        (None, _) => {
            println!("# {}", get_config_path()?.display());
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        (Some(key), None) => println!("{}", config.get(&key)?),
        (Some(key), Some(value)) => {
            config.set(&key, &value)?;
            config.save()?;
            println!("{key} = {}", config.get(&key)?);
        }
    }
    Ok(())
}
