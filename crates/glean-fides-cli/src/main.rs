use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use colored::Colorize;

use glean_fides_core::category::{extract_simplified_categories, CategoryStats};
use glean_fides_core::config::Config;
use glean_fides_core::{
    BatchRunner, Category, CategorySnapshot, ClaudeCliGenerator, Classifier, ClassifierSettings,
    FidesClient, GleanFidesError, LlmProvider, MetricProvider, ProbeInfoClient, PromptMode,
    QuoteStyle, ReportWriter, Result, SensitivityStats, TextGenerator, VertexGenerator,
};

mod args;
use args::{CategoriesAction, Cli, Commands, ConfigAction, MetricsAction, Mode, Provider, Shell};

fn main() -> ExitCode {
    let cli = Cli::parse();

    load_dotenv();
    init_logging(cli.verbose);

    let base_dir = match resolve_base_dir(cli.base_dir) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("{} {}", "[ERROR]".red().bold(), e);
            return ExitCode::from(e.exit_code() as u8);
        }
    };

    log::debug!("Base directory: {}", base_dir.display());

    let result = match cli.command {
        Some(Commands::Categories { action }) => handle_categories(action, &base_dir),
        Some(Commands::Metrics { action }) => handle_metrics(action, &base_dir),
        Some(Commands::Classify {
            app,
            mode,
            provider,
            strict,
            escape,
            output,
            snapshot,
        }) => handle_classify(
            &base_dir,
            &app,
            ClassifyOptions {
                mode,
                provider,
                strict,
                escape,
                output,
                snapshot,
            },
        ),
        Some(Commands::Config { action }) => handle_config(action, &base_dir),
        Some(Commands::Completions { shell }) => {
            handle_completions(shell);
            Ok(())
        }
        None => {
            Cli::command().print_help().ok();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "[ERROR]".red().bold(), e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn load_dotenv() {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("{} Failed to load .env: {}", "[WARN]".yellow().bold(), e);
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn handle_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let shell = match shell {
        Shell::Bash => clap_complete::Shell::Bash,
        Shell::Zsh => clap_complete::Shell::Zsh,
        Shell::Fish => clap_complete::Shell::Fish,
        Shell::PowerShell => clap_complete::Shell::PowerShell,
        Shell::Elvish => clap_complete::Shell::Elvish,
    };
    generate(shell, &mut cmd, "glean-fides", &mut io::stdout());
}

fn resolve_base_dir(cli_base: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(base) = cli_base {
        return Ok(base);
    }

    if let Ok(base) = std::env::var("GLEAN_FIDES_BASE") {
        return Ok(PathBuf::from(base));
    }

    dirs::home_dir()
        .map(|h| h.join(".glean-fides"))
        .ok_or(GleanFidesError::HomeNotFound)
}

// ============================================================================
// categories
// ============================================================================

fn handle_categories(action: CategoriesAction, base_dir: &Path) -> Result<()> {
    let config = Config::load(base_dir)?;

    let categories = match action {
        CategoriesAction::Fetch { output } => {
            let client = FidesClient::from_env(&config.fides.api_url, &config.fides.token_env)?;
            let raw = client.fetch_categories()?;
            let categories = extract_simplified_categories(&raw)?;
            println!(
                "{} Fetched {} Fides categories",
                "✓".green(),
                categories.len()
            );

            let snapshot = output
                .map(CategorySnapshot::new)
                .unwrap_or_else(|| config.snapshot(base_dir));
            snapshot.save(&categories)?;
            println!(
                "Saved {} categories to {}",
                categories.len(),
                snapshot.path().display()
            );
            categories
        }
        CategoriesAction::Load { file } => {
            let snapshot = file
                .map(CategorySnapshot::new)
                .unwrap_or_else(|| config.snapshot(base_dir));
            let categories = snapshot.load()?;
            println!(
                "{} Loaded {} categories from {}",
                "✓".green(),
                categories.len(),
                snapshot.path().display()
            );
            categories
        }
    };

    print_category_stats(&categories);
    Ok(())
}

fn print_category_stats(categories: &[Category]) {
    let stats = CategoryStats::of(categories);

    println!();
    println!("Total categories: {}", stats.total.to_string().bold());

    if !stats.examples.is_empty() {
        println!();
        println!("Example categories:");
        for (i, category) in stats.examples.iter().enumerate() {
            println!("{}. {}", i + 1, category.fides_key.cyan());
            println!("   Description: {}", category.description);
        }
    }
}

// ============================================================================
// metrics
// ============================================================================

fn handle_metrics(action: MetricsAction, base_dir: &Path) -> Result<()> {
    let config = Config::load(base_dir)?;
    let client = ProbeInfoClient::new(&config.glean.api_url)?;

    match action {
        MetricsAction::Apps => {
            let apps = client.fetch_apps()?;
            println!();
            println!("Applications ({}):", apps.len());
            println!();
            for app in apps {
                match app.app_id {
                    Some(app_id) => println!("  {} {}", app.name.cyan(), app_id.dimmed()),
                    None => println!("  {}", app.name.cyan()),
                }
            }
        }
        MetricsAction::Stats { apps, show_missing } => {
            let apps = if apps.is_empty() {
                client.fetch_apps()?.into_iter().map(|a| a.name).collect()
            } else {
                apps
            };

            let mut total = SensitivityStats::default();
            for app in &apps {
                let metrics = client.fetch_metrics(app)?;
                let stats = SensitivityStats::of(&metrics);
                if show_missing {
                    for name in &stats.missing {
                        println!("  {} {}", "-".dimmed(), name);
                    }
                }
                println!(
                    "{}:\t{} metrics with data_sensitivity, {} metrics without data_sensitivity",
                    app.cyan(),
                    stats.with_sensitivity,
                    stats.without_sensitivity
                );
                total.merge(&stats);
            }

            println!();
            println!(
                "{}:\t{} metrics with data_sensitivity, {} metrics without data_sensitivity ({} metrics in {} apps)",
                "Total".bold(),
                total.with_sensitivity,
                total.without_sensitivity,
                total.total(),
                apps.len()
            );
        }
    }

    Ok(())
}

// ============================================================================
// classify
// ============================================================================

struct ClassifyOptions {
    mode: Option<Mode>,
    provider: Option<Provider>,
    strict: bool,
    escape: bool,
    output: Option<PathBuf>,
    snapshot: Option<PathBuf>,
}

fn handle_classify(base_dir: &Path, app: &str, options: ClassifyOptions) -> Result<()> {
    let config = Config::load(base_dir)?;

    let mode = match options.mode {
        Some(Mode::Plain) => PromptMode::Plain,
        Some(Mode::FewShot) => PromptMode::FewShot,
        None => config.classifier.mode,
    };
    let provider = match options.provider {
        Some(Provider::Vertex) => LlmProvider::Vertex,
        Some(Provider::ClaudeCli) => LlmProvider::ClaudeCli,
        None => config.classifier.provider,
    };
    let style = if options.escape {
        QuoteStyle::Escaped
    } else {
        config.report.quote_style()
    };

    let snapshot = options
        .snapshot
        .map(CategorySnapshot::new)
        .unwrap_or_else(|| config.snapshot(base_dir));
    if !snapshot.exists() {
        println!(
            "{} No category snapshot at {}",
            "Hint:".yellow(),
            snapshot.path().display()
        );
        println!("  Run: glean-fides categories fetch");
    }

    let settings = config.classifier.settings();
    let generator = build_generator(provider, &settings, &config.classifier.token_env)?;
    let classifier =
        Classifier::new(settings, generator).with_strict(options.strict || config.classifier.strict);
    let metrics = ProbeInfoClient::new(&config.glean.api_url)?;
    let writer = ReportWriter::new(options.output.unwrap_or(config.report.output.clone()))
        .with_style(style);

    println!(
        "Classifying {} with {} ({}, {} mode{})",
        app.cyan().bold(),
        classifier.model_id(),
        provider,
        mode,
        if classifier.is_strict() { ", strict" } else { "" }
    );
    println!();

    let runner = BatchRunner::new(&classifier, &metrics, snapshot);
    let results = runner.run_to_report(app, mode, &writer, |result| {
        let category = if result.category_key == glean_fides_core::NO_CATEGORY {
            result.category_key.dimmed()
        } else {
            result.category_key.green()
        };
        println!("  {} {}", category, result.metric_name);
    })?;

    println!();
    println!(
        "{} Wrote {} results to {}",
        "✓".green(),
        results.len(),
        writer.path().display()
    );
    Ok(())
}

fn build_generator(
    provider: LlmProvider,
    settings: &ClassifierSettings,
    token_env: &str,
) -> Result<Box<dyn TextGenerator>> {
    match provider {
        LlmProvider::Vertex => Ok(Box::new(VertexGenerator::from_env(settings, token_env)?)),
        LlmProvider::ClaudeCli => Ok(Box::new(ClaudeCliGenerator::detect(
            std::env::current_dir()?,
        )?)),
    }
}

// ============================================================================
// config
// ============================================================================

fn handle_config(action: ConfigAction, base_dir: &Path) -> Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load(base_dir)?;
            match config.get(&key) {
                Some(value) => {
                    println!("{}", value);
                }
                None => {
                    return Err(GleanFidesError::ConfigKeyNotFound { key });
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load(base_dir)?;
            config.set(&key, &value)?;
            config.save(base_dir)?;
            println!("{} {} = {}", "Set:".green(), key, value);
        }
        ConfigAction::List => {
            let config = Config::load(base_dir)?;
            println!();
            for (key, value) in config.list() {
                println!("{} = {}", key.cyan(), value);
            }
            println!();
        }
        ConfigAction::Path => {
            let path = Config::path(base_dir);
            println!("{}", path.display());
        }
        ConfigAction::Init => {
            let path = Config::init(base_dir)?;
            println!("{} {}", "Initialized:".green(), path.display());
        }
    }

    Ok(())
}
