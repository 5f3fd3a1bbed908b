//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use instructgen_core::{Composer, GenerateOutcome, ProgressReporter};
use instructgen_fragments::{DeploymentContext, FragmentLoader, LoaderOptions, effective_base_url};
use instructgen_markdown::list_sections;
use instructgen_shared::{
    AppConfig, Feature, Language, OperatingSystem, ProjectType, Selection, SelectionInput,
    init_config, load_config, load_config_from, load_selection_from, write_default_config,
};
use tracing::{info, warn};

/// Exit status for selections rejected by the validation gate.
const EXIT_INVALID_SELECTION: u8 = 2;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// instructgen: build coding-assistant instruction files from remote templates.
#[derive(Parser)]
#[command(
    name = "instructgen",
    version,
    about = "Generate AI coding assistant instruction files from project settings.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.instructgen/instructgen.toml.
    #[arg(long, global = true, env = "INSTRUCTGEN_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Generate an instruction document.
    Generate {
        #[command(flatten)]
        selection: SelectionArgs,

        #[command(flatten)]
        source: SourceArgs,

        /// Output file (defaults to the configured file name in the current directory).
        #[arg(short, long, conflicts_with = "stdout")]
        out: Option<PathBuf>,

        /// Print the document to stdout instead of writing a file.
        #[arg(long)]
        stdout: bool,
    },

    /// Print the fragment base URL for the deployment context.
    Resolve {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Load one fragment and list its second-level headings.
    Sections {
        /// Fragment path relative to the base URL (e.g. /core/common-guidelines.md).
        path: String,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Project settings for `generate`. Flags override the selection file.
#[derive(Args, Debug, Default)]
pub(crate) struct SelectionArgs {
    /// Selection file (.toml or .json).
    #[arg(long)]
    pub selection: Option<PathBuf>,

    /// Project name.
    #[arg(long)]
    pub name: Option<String>,

    /// Project description.
    #[arg(long)]
    pub description: Option<String>,

    /// Project type (e.g. WEB_APPLICATION or web-application).
    #[arg(long)]
    pub project_type: Option<ProjectType>,

    /// Development operating system.
    #[arg(long)]
    pub os: Option<OperatingSystem>,

    /// Programming language; repeat for several, order is kept.
    #[arg(long = "language", short = 'l')]
    pub languages: Vec<Language>,

    /// Feature to include; repeat for several.
    #[arg(long = "feature", short = 'f')]
    pub features: Vec<Feature>,
}

/// Where fragments come from.
#[derive(Args, Debug, Default)]
pub(crate) struct SourceArgs {
    /// Host the generator is served from.
    #[arg(long)]
    pub host: Option<String>,

    /// Page path the generator is served under.
    #[arg(long)]
    pub path: Option<String>,

    /// Fragment base URL, bypassing host/path resolution.
    #[arg(long)]
    pub base_url: Option<String>,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "instructgen=info",
        1 => "instructgen=debug",
        _ => "instructgen=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<ExitCode> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Generate {
            selection,
            source,
            out,
            stdout,
        } => cmd_generate(config_path, selection, &source, out, stdout).await,
        Command::Resolve { source } => cmd_resolve(config_path, &source),
        Command::Sections { path, source } => cmd_sections(config_path, &path, &source).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(config_path),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_generate(
    config_path: Option<&Path>,
    args: SelectionArgs,
    source: &SourceArgs,
    out: Option<PathBuf>,
    stdout: bool,
) -> Result<ExitCode> {
    let config = resolve_config(config_path, source)?;
    let context = deployment_context(&config, source);

    let selection = match selection_input(args)?.validate() {
        Ok(selection) => selection,
        Err(alert) => {
            eprintln!("{alert}");
            return Ok(ExitCode::from(EXIT_INVALID_SELECTION));
        }
    };
    warn_on_ignored_features(&selection);

    info!(
        project = %selection.project_name,
        languages = selection.languages.len(),
        features = selection.features.len(),
        "generating instructions"
    );

    let composer = Composer::from_config(&config, context)?;
    let reporter = CliProgress::new();
    let document = match composer.generate(&selection, &reporter).await {
        GenerateOutcome::Document(document) => document,
        GenerateOutcome::Failed { message } => {
            eprintln!("{message}");
            return Ok(ExitCode::FAILURE);
        }
    };

    let text = document.text();
    if stdout {
        println!("{text}");
        return Ok(ExitCode::SUCCESS);
    }

    let out_path = out.unwrap_or_else(|| PathBuf::from(&config.output.file_name));
    std::fs::write(&out_path, &text)
        .map_err(|e| eyre!("failed to write '{}': {e}", out_path.display()))?;

    println!();
    println!("  Instructions generated!");
    println!("  File:      {}", out_path.display());
    println!("  Blocks:    {}", document.blocks.len());
    println!("  Fetched:   {}", composer.loader().cache().misses());
    println!("  From cache: {}", composer.loader().cache().hits());
    println!();

    Ok(ExitCode::SUCCESS)
}

fn cmd_resolve(config_path: Option<&Path>, source: &SourceArgs) -> Result<ExitCode> {
    let config = resolve_config(config_path, source)?;
    let context = deployment_context(&config, source);
    println!("{}", effective_base_url(&context, &config.source));
    Ok(ExitCode::SUCCESS)
}

async fn cmd_sections(
    config_path: Option<&Path>,
    relative_path: &str,
    source: &SourceArgs,
) -> Result<ExitCode> {
    let config = resolve_config(config_path, source)?;
    let context = deployment_context(&config, source);
    let base_url = effective_base_url(&context, &config.source);

    let loader = FragmentLoader::new(&base_url, context, &LoaderOptions::from(&config.source))?;
    info!(base_url = %loader.base_url(), relative_path, "listing fragment sections");
    let content = loader.load(relative_path).await;

    let sections = list_sections(&content);
    if sections.is_empty() {
        warn!(relative_path, "fragment has no second-level headings");
    }
    for title in sections {
        println!("{title}");
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_config_init(config_path: Option<&Path>) -> Result<ExitCode> {
    let path = match config_path {
        Some(path) => {
            write_default_config(path)?;
            path.to_path_buf()
        }
        None => init_config()?,
    };
    println!("Config initialized at: {}", path.display());
    Ok(ExitCode::SUCCESS)
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<ExitCode> {
    let config: AppConfig = read_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(ExitCode::SUCCESS)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_config(config_path: Option<&Path>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

/// Load the config file and apply source overrides from flags.
fn resolve_config(config_path: Option<&Path>, source: &SourceArgs) -> Result<AppConfig> {
    let mut config = read_config(config_path)?;
    if let Some(base_url) = &source.base_url {
        config.source.base_url = Some(base_url.clone());
    }
    Ok(config)
}

fn deployment_context(config: &AppConfig, source: &SourceArgs) -> DeploymentContext {
    let mut context = DeploymentContext::from(&config.deployment);
    if let Some(host) = &source.host {
        context.host = host.clone();
    }
    if let Some(path) = &source.path {
        context.path = path.clone();
    }
    context
}

/// Merge the selection file (if any) with flags; flags win.
fn selection_input(args: SelectionArgs) -> Result<SelectionInput> {
    let base = match &args.selection {
        Some(path) => load_selection_from(path)?,
        None => SelectionInput::default(),
    };

    Ok(base.overlay(SelectionInput {
        project_name: args.name,
        project_description: args.description,
        project_type: args.project_type,
        operating_system: args.os,
        languages: args.languages,
        features: args.features,
    }))
}

fn warn_on_ignored_features(selection: &Selection) {
    if selection.features.contains(&Feature::ScssSupport) && !selection.has_script_language() {
        warn!("SCSS_SUPPORT only applies with JavaScript or TypeScript and will be skipped");
    }
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self) {
        self.spinner.finish_and_clear();
    }
}
