use std::collections::HashMap;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use dom_flip_lib::{
    ConfigError, Dictionary, DictionaryError, ReplaceOptions, ReplacementSession, ReplacerConfig,
    RewriteError,
};
use rayon::prelude::*;
use thiserror::Error;
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Swap dictionary terms inside HTML documents.
///
/// Every replaced term is wrapped in a marker element so the result can be
/// styled and audited.
///
/// Examples:
///   dom-flip replace -d gender.json --from men --to women page.html
///   dom-flip replace -d nightday.json --from night --to day --both-ways \
///       --css style.css --base-url https://en.wikipedia.org -o out/ a.html b.html
///   dom-flip terms -d gender.json men
#[derive(Debug, Parser)]
#[command(name = "dom-flip")]
#[command(version)]
#[command(about = "Swap dictionary terms inside HTML documents")]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    log_verbosity: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

/// Dictionary selection shared by every subcommand
#[derive(clap::Args, Debug, Clone)]
struct DictionaryArgs {
    /// Path to the JSON dictionary definition
    #[arg(long, short = 'd', value_name = "FILE")]
    dictionary: PathBuf,
}

/// Arguments for the replace command
#[derive(clap::Args, Debug, Clone)]
struct ReplaceArgs {
    #[command(flatten)]
    dictionary: DictionaryArgs,

    /// Dictionary key whose terms are searched for
    #[arg(long, value_name = "KEY")]
    from: String,

    /// Dictionary key whose terms replace the matches
    #[arg(long, value_name = "KEY")]
    to: String,

    /// Also replace in the reverse direction
    #[arg(long)]
    both_ways: bool,

    /// Base URL written into a <base href> element
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Stylesheet file injected into <head>
    #[arg(long, value_name = "FILE")]
    css: Option<PathBuf>,

    /// JSON configuration file (camelCase replacer options)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Annotate candidates instead of replacing
    #[arg(long)]
    suggest: bool,

    /// Seed for reproducible choice among multiple replacement options
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// Directory for output files (required for more than one input)
    #[arg(long, short = 'o', value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// HTML files to process ("-" reads stdin)
    #[arg(value_name = "INPUT", num_args = 1.., required = true)]
    inputs: Vec<PathBuf>,
}

/// Arguments for the terms command
#[derive(clap::Args, Debug, Clone)]
struct TermsArgs {
    #[command(flatten)]
    dictionary: DictionaryArgs,

    /// Only list terms under this key
    #[arg(value_name = "KEY")]
    key: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Replace terms in one or more HTML documents
    Replace(ReplaceArgs),
    /// List the terms registered in a dictionary
    Terms(TermsArgs),
    /// Show the dictionary name and its keys
    Keys(DictionaryArgs),
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Dictionary(#[from] DictionaryError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to read {path}: {source}")]
    Read { path: String, source: io::Error },

    #[error("failed to write {path}: {source}")]
    Write { path: String, source: io::Error },

    #[error("failed to rewrite {path}: {source}")]
    Rewrite { path: String, source: RewriteError },

    #[error("--out-dir is required when processing more than one input")]
    OutDirRequired,

    #[error("inputs {first} and {second} would both be written to {name}")]
    OutputCollision {
        name: String,
        first: String,
        second: String,
    },
}

fn init_tracing(verbose: u8, json: bool) {
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => "warn".to_string(),
            1 => "warn,dom_flip_lib=info,dom_flip=info".to_string(),
            2 => "info,dom_flip_lib=debug,dom_flip=debug".to_string(),
            _ => "debug,dom_flip_lib=trace,dom_flip=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_file(verbose >= 3)
                    .with_line_number(verbose >= 3)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    }
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_tracing(cli.log_verbosity, cli.json);

    match cli.command {
        Command::Replace(args) => run_replace(args),
        Command::Terms(args) => run_terms(args),
        Command::Keys(args) => run_keys(args),
    }
}

fn run_replace(args: ReplaceArgs) -> Result<(), CliError> {
    if args.inputs.len() > 1 && args.out_dir.is_none() {
        return Err(CliError::OutDirRequired);
    }
    if args.out_dir.is_some() {
        check_output_names(&args.inputs)?;
    }

    let dictionary = Arc::new(Dictionary::from_path(&args.dictionary.dictionary)?);
    let config = build_config(&args)?;
    let options = ReplaceOptions {
        base_url: args.base_url.clone(),
        replace_both_ways: args.both_ways,
    };
    let base = ReplacementSession::new(dictionary, config);

    // Each document gets its own session; only the dictionary is shared.
    let outputs = args
        .inputs
        .par_iter()
        .enumerate()
        .map(|(index, input)| {
            let mut session = match args.seed {
                Some(seed) => base.fork().with_seed(seed.wrapping_add(index as u64)),
                None => base.fork(),
            };
            let html = read_input(input)?;
            let output = session
                .process(&html, &args.from, &args.to, &options)
                .map_err(|source| CliError::Rewrite {
                    path: input.display().to_string(),
                    source,
                })?;
            tracing::info!(input = %input.display(), bytes = output.len(), "Processed document");
            Ok((input.as_path(), output))
        })
        .collect::<Result<Vec<_>, CliError>>()?;

    match &args.out_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|source| CliError::Write {
                path: dir.display().to_string(),
                source,
            })?;
            for (input, output) in outputs {
                let target = dir.join(output_name(input));
                std::fs::write(&target, output).map_err(|source| CliError::Write {
                    path: target.display().to_string(),
                    source,
                })?;
            }
        }
        None => {
            for (_, output) in outputs {
                println!("{output}");
            }
        }
    }

    Ok(())
}

fn build_config(args: &ReplaceArgs) -> Result<ReplacerConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => ReplacerConfig::from_path(path)?,
        None => ReplacerConfig::default(),
    };

    if let Some(path) = &args.css {
        let css = std::fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.display().to_string(),
            source,
        })?;
        config.css = Some(css);
    }
    if args.suggest {
        config.suggestion_mode = true;
    }

    Ok(config)
}

fn read_input(input: &Path) -> Result<String, CliError> {
    if input == Path::new("-") {
        let mut html = String::new();
        io::stdin()
            .read_to_string(&mut html)
            .map_err(|source| CliError::Read {
                path: "<stdin>".to_string(),
                source,
            })?;
        return Ok(html);
    }

    std::fs::read_to_string(input).map_err(|source| CliError::Read {
        path: input.display().to_string(),
        source,
    })
}

fn output_name(input: &Path) -> PathBuf {
    input
        .file_name()
        .filter(|_| input != Path::new("-"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("stdin.html"))
}

/// Fails if two inputs map to the same file name in the output directory.
fn check_output_names(inputs: &[PathBuf]) -> Result<(), CliError> {
    let mut seen: HashMap<PathBuf, &Path> = HashMap::new();
    for input in inputs {
        let name = output_name(input);
        if let Some(first) = seen.get(&name) {
            return Err(CliError::OutputCollision {
                name: name.display().to_string(),
                first: first.display().to_string(),
                second: input.display().to_string(),
            });
        }
        seen.insert(name, input);
    }
    Ok(())
}

fn run_terms(args: TermsArgs) -> Result<(), CliError> {
    let dictionary = Dictionary::from_path(&args.dictionary.dictionary)?;
    for term in dictionary.store().all_terms(args.key.as_deref()) {
        println!("{term}");
    }
    Ok(())
}

fn run_keys(args: DictionaryArgs) -> Result<(), CliError> {
    let dictionary = Dictionary::from_path(&args.dictionary)?;
    println!("{}", dictionary.name());
    for key in dictionary.store().keys() {
        println!("  {key} ({} terms)", dictionary.store().all_terms(Some(key)).len());
    }
    Ok(())
}
