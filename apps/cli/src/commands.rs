//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use routeman_core::pipeline::{
    GenerateConfig, GenerateResult, OutputTarget, ProgressReporter, RouteSource, SilentProgress,
};
use routeman_shared::{AppConfig, init_config, load_config, resolve_config_path, validate_config};
use tracing::info;
use url::Url;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// routeman — turn a route listing into a Postman collection.
#[derive(Parser)]
#[command(
    name = "routeman",
    version,
    about = "Generate a Postman collection from `php artisan route:list --json`.",
    long_about = None,
    args_conflicts_with_subcommands = true,
)]
pub(crate) struct Cli {
    /// Config file (defaults to ./routeman.toml, then ~/.routeman/routeman.toml).
    #[arg(long, global = true, env = "ROUTEMAN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Flags for the default `generate` action.
    #[command(flatten)]
    pub generate: GenerateArgs,

    /// Defaults to `generate`.
    #[command(subcommand)]
    pub command: Option<Command>,
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
    /// Build the collection and write it to disk.
    Generate(GenerateArgs),

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Flags for `generate`. Each one overrides the matching config value.
#[derive(Args, Debug, Default)]
pub(crate) struct GenerateArgs {
    /// Read the route listing from a file instead of running the command.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output file path.
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Default value of the `base_url` collection variable.
    #[arg(long, value_parser = parse_base_url)]
    pub base_url: Option<String>,

    /// Collection title.
    #[arg(short, long)]
    pub name: Option<String>,

    /// Directory to run the route listing command in.
    #[arg(long)]
    pub project_dir: Option<PathBuf>,

    /// Print the collection to stdout instead of writing a file.
    #[arg(long, conflicts_with = "out")]
    pub stdout: bool,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write a default routeman.toml into the current directory.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Show resolved configuration.
    Show,
}

/// Accept only absolute URLs, but keep the text as typed.
///
/// `Url` normalizes `http://host:8000` to `http://host:8000/`, which would
/// double the slash in `{{base_url}}/api/...`.
fn parse_base_url(s: &str) -> std::result::Result<String, String> {
    Url::parse(s)
        .map(|_| s.trim_end_matches('/').to_string())
        .map_err(|e| format!("invalid URL '{s}': {e}"))
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "routeman=info",
        1 => "routeman=debug",
        _ => "routeman=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
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
pub(crate) fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir().wrap_err("cannot determine working directory")?;
    let config_path = cli.config.as_deref();

    match cli.command {
        None => cmd_generate(config_path, &cwd, cli.generate),
        Some(Command::Generate(args)) => cmd_generate(config_path, &cwd, args),
        Some(Command::Config { action }) => match action {
            ConfigAction::Init { force } => cmd_config_init(&cwd, force),
            ConfigAction::Show => cmd_config_show(config_path, &cwd),
        },
    }
}

/// Fold CLI overrides into the loaded config.
fn apply_overrides(config: &mut AppConfig, args: &GenerateArgs) {
    if let Some(out) = &args.out {
        config.output.path = out.clone();
    }
    if let Some(base_url) = &args.base_url {
        config.collection.base_url = base_url.clone();
    }
    if let Some(name) = &args.name {
        config.collection.name = name.clone();
    }
    if let Some(dir) = &args.project_dir {
        config.routes.working_dir = Some(dir.clone());
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

/// Load the config file, fold in CLI overrides, then validate the result.
fn resolve_config(config_path: Option<&Path>, cwd: &Path, args: &GenerateArgs) -> Result<AppConfig> {
    let mut config = load_config(config_path, cwd)?;
    apply_overrides(&mut config, args);
    validate_config(&config)?;
    Ok(config)
}

fn cmd_generate(config_path: Option<&Path>, cwd: &Path, args: GenerateArgs) -> Result<()> {
    let config = resolve_config(config_path, cwd, &args)?;

    let mut generate_config = GenerateConfig::from(&config);
    if let Some(input) = &args.input {
        generate_config.source = RouteSource::File(input.clone());
    }
    if args.stdout {
        generate_config.output = OutputTarget::Stdout;
    }

    info!(
        source = ?generate_config.source,
        output = ?generate_config.output,
        "generating collection"
    );

    // No spinner when the collection itself is the output.
    let progress: Box<dyn ProgressReporter> = if args.stdout {
        Box::new(SilentProgress)
    } else {
        Box::new(CliProgress::new())
    };

    let result = routeman_core::pipeline::generate(&generate_config, progress.as_ref())
        .wrap_err("failed to generate collection")?;

    if let Some(text) = &result.rendered {
        println!("{text}");
        return Ok(());
    }

    let path = result
        .output_path
        .as_ref()
        .ok_or_else(|| eyre!("pipeline finished without an output file"))?;

    println!();
    println!("  Collection generated successfully.");
    println!("  Folders:  {}", result.folder_count);
    println!("  Requests: {}", result.request_count);
    if result.skipped > 0 {
        println!("  Skipped:  {} (HEAD-only)", result.skipped);
    }
    println!("  Path:     {}", path.display());
    println!(
        "  Time:     {:.1}s",
        result.elapsed.as_secs_f64()
    );
    println!();

    Ok(())
}

fn cmd_config_init(cwd: &Path, force: bool) -> Result<()> {
    let path = init_config(cwd, force)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>, cwd: &Path) -> Result<()> {
    let source = resolve_config_path(config_path, cwd)?;
    let config: AppConfig = load_config(config_path, cwd)?;
    let toml_str = toml::to_string_pretty(&config)?;
    match source {
        Some(path) => println!("# {}", path.display()),
        None => println!("# built-in defaults"),
    }
    println!("{toml_str}");
    Ok(())
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
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _result: &GenerateResult) {
        self.spinner.finish_and_clear();
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        // Clears the spinner when the pipeline bails out early.
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_generate() {
        let cli = Cli::try_parse_from(["routeman"]).expect("parse");
        assert!(cli.command.is_none());
        assert!(!cli.generate.stdout);
    }

    #[test]
    fn generate_flags_without_subcommand() {
        let cli = Cli::try_parse_from(["routeman", "--stdout", "--input", "routes.json"])
            .expect("parse");
        assert!(cli.command.is_none());
        assert!(cli.generate.stdout);
        assert_eq!(cli.generate.input, Some(PathBuf::from("routes.json")));
    }

    #[test]
    fn generate_flags_parse() {
        let cli = Cli::try_parse_from([
            "routeman",
            "generate",
            "-v",
            "--input",
            "routes.json",
            "--base-url",
            "https://api.example.com/",
            "--name",
            "Shop API",
        ])
        .expect("parse");
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Some(Command::Generate(args)) => {
                assert_eq!(args.input, Some(PathBuf::from("routes.json")));
                assert_eq!(args.base_url.as_deref(), Some("https://api.example.com"));
                assert_eq!(args.name.as_deref(), Some("Shop API"));
                assert!(!args.stdout);
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn invalid_base_url_rejected() {
        assert!(Cli::try_parse_from(["routeman", "generate", "--base-url", "localhost"]).is_err());
    }

    #[test]
    fn stdout_conflicts_with_out() {
        assert!(
            Cli::try_parse_from(["routeman", "generate", "--stdout", "--out", "x.json"]).is_err()
        );
    }

    #[test]
    fn base_url_flag_overrides_invalid_file_value() {
        let dir = std::env::temp_dir().join(format!("routeman-cli-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).expect("mkdir");
        let path = dir.join("routeman.toml");
        std::fs::write(&path, "[collection]\nbase_url = \"not a url\"\n").expect("write");

        assert!(resolve_config(Some(&path), &dir, &GenerateArgs::default()).is_err());

        let args = GenerateArgs {
            base_url: Some("https://api.example.com".into()),
            ..GenerateArgs::default()
        };
        let config = resolve_config(Some(&path), &dir, &args).expect("override wins");
        assert_eq!(config.collection.base_url, "https://api.example.com");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn overrides_replace_config_values() {
        let mut config = AppConfig::default();
        let args = GenerateArgs {
            out: Some(PathBuf::from("out/api.json")),
            base_url: Some("https://staging.example.com".into()),
            name: Some("Staging".into()),
            project_dir: Some(PathBuf::from("/srv/app")),
            ..GenerateArgs::default()
        };
        apply_overrides(&mut config, &args);
        assert_eq!(config.output.path, PathBuf::from("out/api.json"));
        assert_eq!(config.collection.base_url, "https://staging.example.com");
        assert_eq!(config.collection.name, "Staging");
        assert_eq!(config.routes.working_dir, Some(PathBuf::from("/srv/app")));
        // Untouched values keep their defaults.
        assert_eq!(config.routes.command, "php");
    }
}
