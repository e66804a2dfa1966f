use clap::{CommandFactory, Parser, ValueEnum};
use envlayer::diff::{colorize_diff, format_environment_diff};
use envlayer::loader::ProjectLoader;
use envlayer::render::{OutputFormat, render};
use envlayer::{ConfigService, ConfigTree, resolve_document};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "envlayer",
    about = "Resolve project configuration with per-environment overrides",
    version
)]
struct Cli {
    /// Project directory containing metadata.yaml (default: current directory)
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,

    /// Explicit configuration document (overrides --dir discovery)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Environment whose overrides are applied
    #[arg(short, long, env = "ENVLAYER_ENV", global = true)]
    env: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputArg {
    Yaml,
    Json,
    Toml,
}

impl From<OutputArg> for OutputFormat {
    fn from(arg: OutputArg) -> Self {
        match arg {
            OutputArg::Yaml => OutputFormat::Yaml,
            OutputArg::Json => OutputFormat::Json,
            OutputArg::Toml => OutputFormat::Toml,
        }
    }
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Print the resolved configuration
    Resolve {
        /// Output format
        #[arg(short, long, value_enum, default_value = "yaml")]
        output: OutputArg,
    },
    /// Print a single value by dotted path (e.g. features.polars)
    Get {
        /// Dotted key path; numeric segments index sequences
        path: String,
        /// Output format for non-scalar values
        #[arg(short, long, value_enum, default_value = "yaml")]
        output: OutputArg,
    },
    /// List environments declared under `overrides`
    Envs,
    /// Show what the selected environment changes relative to the base
    Diff,
    /// Validate the configuration document
    Check,
    /// Generate shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let service = ConfigService::global();
    let env = cli.env.as_deref();

    match cli.command {
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "envlayer", &mut std::io::stdout());
        }
        Commands::Resolve { output } => {
            let loader = load_document(&cli.dir, cli.file.as_deref())?;
            let resolved = service.resolve_as(loader.source(), loader.format(), env)?;
            print!("{}", render(resolved.tree(), output.into())?);
        }
        Commands::Get { path, output } => {
            let loader = load_document(&cli.dir, cli.file.as_deref())?;
            let resolved = service.resolve_as(loader.source(), loader.format(), env)?;
            match resolved.get(&path) {
                Some(ConfigTree::Scalar(scalar)) => println!("{scalar}"),
                Some(node) => print!("{}", render(node, output.into())?),
                None => {
                    eprintln!("error: no value at '{path}'");
                    std::process::exit(1);
                }
            }
        }
        Commands::Envs => {
            let loader = load_document(&cli.dir, cli.file.as_deref())?;
            let resolved = service.resolve_as(loader.source(), loader.format(), None)?;
            if resolved.environments().is_empty() {
                println!("No environments defined.");
            }
            for name in resolved.environments() {
                println!("{name}");
            }
        }
        Commands::Diff => {
            let loader = load_document(&cli.dir, cli.file.as_deref())?;
            let base = service.resolve_as(loader.source(), loader.format(), None)?;
            let resolved = service.resolve_as(loader.source(), loader.format(), env)?;
            if let Some(name) = resolved.environment() {
                if !resolved.override_applied() {
                    eprintln!("warning: no overrides defined for environment '{name}'");
                }
            }

            let diff = format_environment_diff(
                &render(base.tree(), OutputFormat::Yaml)?,
                &render(resolved.tree(), OutputFormat::Yaml)?,
                resolved.environment(),
            );
            if std::io::stdout().is_terminal() {
                print!("{}", colorize_diff(&diff));
            } else {
                print!("{diff}");
            }
        }
        Commands::Check => {
            let loader = load_document(&cli.dir, cli.file.as_deref())?;
            match resolve_document(loader.source(), loader.format(), None) {
                Ok(resolved) => {
                    println!("Configuration is valid.");
                    if !resolved.environments().is_empty() {
                        println!("Environments: {}", resolved.environments().join(", "));
                    }
                }
                Err(e) => {
                    eprintln!("Configuration errors in {}:", loader.path().display());
                    eprintln!("  - {e}");
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

fn load_document(dir: &Path, file: Option<&Path>) -> anyhow::Result<ProjectLoader> {
    match file {
        Some(file) => ProjectLoader::from_file(file),
        None => ProjectLoader::new(dir),
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
