use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use indexmap::IndexMap;
use log::debug;

use opslice_core::config::{self, CONFIG_FILE_NAME, OpsliceConfig};
use opslice_core::pipeline::{self, SliceRequest};
use opslice_core::select::Style;
use opslice_core::source::{DocumentCache, FileSource};
use opslice_core::write::{self, Dialect, Syntax};

#[derive(Parser)]
#[command(
    name = "opslice",
    about = "Slice OpenAPI documents down to selected operations",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the selected operations and everything they reference
    Slice {
        #[command(flatten)]
        document: DocumentArgs,

        /// Comma-separated operation ids, or `*` for all operations
        #[arg(long, value_name = "LIST")]
        operation_ids: Option<String>,

        /// Comma-separated tags
        #[arg(long, value_name = "LIST")]
        tags: Option<String>,

        /// Output dialect
        #[arg(long)]
        openapi_version: Option<VersionArg>,

        /// Output syntax
        #[arg(long)]
        format: Option<FormatArg>,

        /// Consumer style; powershell and power-platform collapse anyOf unions
        #[arg(long)]
        style: Option<StyleArg>,

        /// Title of the produced document
        #[arg(long)]
        title: Option<String>,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List operations grouped by tag, as markdown
    Index {
        #[command(flatten)]
        document: DocumentArgs,

        /// Heading of the listing
        #[arg(long)]
        heading: Option<String>,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Emit the whole document with anyOf unions collapsed
    Full {
        #[command(flatten)]
        document: DocumentArgs,

        /// Output dialect
        #[arg(long)]
        openapi_version: Option<VersionArg>,

        /// Output syntax
        #[arg(long)]
        format: Option<FormatArg>,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Initialize a new opslice configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(clap::Args)]
struct DocumentArgs {
    /// Document variant, e.g. v1.0 or beta
    #[arg(long)]
    variant: Option<String>,

    /// Read the variant from this file instead of the configured location
    #[arg(short, long)]
    input: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum VersionArg {
    V2,
    V3,
}

impl From<VersionArg> for Dialect {
    fn from(arg: VersionArg) -> Self {
        match arg {
            VersionArg::V2 => Dialect::V2,
            VersionArg::V3 => Dialect::V3,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Yaml,
    Json,
}

impl From<FormatArg> for Syntax {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Yaml => Syntax::Yaml,
            FormatArg::Json => Syntax::Json,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum StyleArg {
    Plain,
    Powershell,
    PowerPlatform,
}

impl From<StyleArg> for Style {
    fn from(arg: StyleArg) -> Self {
        match arg {
            StyleArg::Plain => Style::Plain,
            StyleArg::Powershell => Style::Powershell,
            StyleArg::PowerPlatform => Style::PowerPlatform,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let cfg = match cli.command {
        Commands::Init { .. } | Commands::Completions { .. } => OpsliceConfig::default(),
        _ => try_load_config()?.unwrap_or_default(),
    };

    match cli.command {
        Commands::Slice {
            document,
            operation_ids,
            tags,
            openapi_version,
            format,
            style,
            title,
            output,
        } => {
            let request = SliceRequest {
                variant: document.variant(&cfg),
                operation_ids,
                tags,
                dialect: openapi_version.map_or(cfg.defaults.openapi_version, Dialect::from),
                syntax: format.map_or(cfg.defaults.format, Syntax::from),
                style: style.map_or(cfg.defaults.style, Style::from),
                title: title.unwrap_or_else(|| cfg.defaults.title.clone()),
            };
            cmd_slice(&cfg, &document, &request, output)
        }

        Commands::Index {
            document,
            heading,
            output,
        } => {
            let heading = heading.unwrap_or_else(|| cfg.index.heading.clone());
            cmd_index(&cfg, &document, &heading, output)
        }

        Commands::Full {
            document,
            openapi_version,
            format,
            output,
        } => {
            let dialect = openapi_version.map_or(cfg.defaults.openapi_version, Dialect::from);
            let syntax = format.map_or(cfg.defaults.format, Syntax::from);
            cmd_full(&cfg, &document, dialect, syntax, output)
        }

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "opslice", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Try to load the project config file from the current directory.
fn try_load_config() -> Result<Option<OpsliceConfig>> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    let loaded = config::load_config(&config_path).map_err(|e| anyhow::anyhow!(e))?;
    if loaded.is_none() {
        debug!("no {CONFIG_FILE_NAME} found, using built-in defaults");
    }
    Ok(loaded)
}

impl DocumentArgs {
    fn variant(&self, cfg: &OpsliceConfig) -> String {
        self.variant
            .clone()
            .unwrap_or_else(|| cfg.defaults.variant.clone())
    }

    /// A cache over the configured variants, with `--input` standing in for
    /// the selected one.
    fn cache(&self, cfg: &OpsliceConfig) -> Result<DocumentCache<FileSource>> {
        let mut paths: IndexMap<String, PathBuf> = cfg.variant_paths();
        if let Some(ref input) = self.input {
            paths.insert(self.variant(cfg), input.clone());
        }
        let cwd = env::current_dir().context("failed to resolve the working directory")?;
        Ok(DocumentCache::new(FileSource::new(paths).relative_to(&cwd)))
    }
}

/// Write to `output`, or stdout when none is given.
fn emit(content: &str, output: Option<PathBuf>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(&path, content)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("  wrote {}", path.display());
        }
        None => print!("{content}"),
    }
    Ok(())
}

fn cmd_slice(
    cfg: &OpsliceConfig,
    document: &DocumentArgs,
    request: &SliceRequest,
    output: Option<PathBuf>,
) -> Result<()> {
    let cache = document.cache(cfg)?;
    let text = pipeline::slice(&cache, request)
        .with_context(|| format!("failed to slice variant '{}'", request.variant))?;
    emit(&text, output)
}

fn cmd_index(
    cfg: &OpsliceConfig,
    document: &DocumentArgs,
    heading: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let variant = document.variant(cfg);
    let cache = document.cache(cfg)?;
    let listing = pipeline::operation_index(&cache, &variant, heading)
        .with_context(|| format!("failed to index variant '{variant}'"))?;
    emit(&listing, output)
}

fn cmd_full(
    cfg: &OpsliceConfig,
    document: &DocumentArgs,
    dialect: Dialect,
    syntax: Syntax,
    output: Option<PathBuf>,
) -> Result<()> {
    let variant = document.variant(cfg);
    let cache = document.cache(cfg)?;
    let full = pipeline::full_document(&cache, &variant)
        .with_context(|| format!("failed to load variant '{variant}'"))?;
    let text = write::write(&full, dialect, syntax)?;
    emit(&text, output)
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
