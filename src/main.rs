use clap::Parser;
use indas_mapper::cache::MappingStore;
use indas_mapper::classifier::{ClassifierGateway, ModelBackend};
use indas_mapper::cli::{Cli, Commands, MappingOptions};
use indas_mapper::config::{Config, API_KEY_ENV};
use indas_mapper::error::Result;
use indas_mapper::export;
use indas_mapper::ingest::{self, TrialBalanceRow};
use indas_mapper::reconcile::{Reconciler, RunInterrupted, RunReport};
use indas_mapper::review::{self, ReviewMode};
use indas_mapper_common::{LabelCatalog, Taxonomy};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Map { file, sheet, options } => {
            println!("📒 indas-mapper - trial balance mapping\n");

            let catalog = load_catalog(options.taxonomy.as_deref())?;
            let backend = ModelBackend::from_config(cli.ai_provider, &config)?;

            println!("[1/3] Reading {}...", file.display());
            let sheet = sheet.unwrap_or_else(|| config.sheet_name.clone());
            let rows = ingest::read_trial_balance(&file, &sheet)?;
            println!("✔ {} rows\n", rows.len());

            println!("[2/3] Mapping with {}...", cli.ai_provider.display_name());
            let report = map_rows(&rows, &options, &config, &catalog, backend).await?;
            println!("✔ Mapping finished\n");

            println!("[3/3] Results");
            finish(&report, &options)?;
        }

        Commands::Classify { text, context, options } => {
            let catalog = load_catalog(options.taxonomy.as_deref())?;
            let backend = ModelBackend::from_config(cli.ai_provider, &config)?;

            let rows = [TrialBalanceRow::entry(&text, context)];
            let report = map_rows(&rows, &options, &config, &catalog, backend).await?;
            finish(&report, &options)?;
        }

        Commands::Labels { taxonomy } => {
            let catalog = load_catalog(taxonomy.as_deref())?;
            for (idx, label) in catalog.options().iter().enumerate() {
                println!("{:>3}. {}", idx + 1, label);
            }
            println!("\n{} labels", catalog.len());
        }

        Commands::Cache { info, history, context, db } => {
            let path = db.unwrap_or_else(|| config.database.clone());
            let store = MappingStore::open(&path)?;

            if let (Some(text), Some(context)) = (history.as_deref(), context) {
                let records = store.history(text, context)?;
                if records.is_empty() {
                    println!("No records for {} ({})", text, context);
                }
                for record in records {
                    let created = record
                        .created_at
                        .map(|t| t.to_string())
                        .unwrap_or_else(|| "-".into());
                    println!(
                        "#{} {} [{}] {}",
                        record.id,
                        created,
                        if record.confirmed { "confirmed" } else { "rejected" },
                        record.result.label_path
                    );
                }
            }

            if info || history.is_none() {
                let stats = store.stats()?;
                println!("Mapping database:");
                println!("  Path: {}", path.display());
                println!("  Records: {}", stats.total);
                println!("  Confirmed: {}", stats.confirmed);
                println!("  Rejected: {}", stats.rejected);
            }
        }

        Commands::Config { set_api_key, show } => {
            let mut config = config;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ API key saved");
            }

            if show {
                let key_status = if std::env::var(API_KEY_ENV).is_ok() {
                    format!("set ({})", API_KEY_ENV)
                } else if config.api_key.is_some() {
                    "set (config file)".to_string()
                } else {
                    "not set".to_string()
                };

                println!("Configuration:");
                println!("  Path: {}", Config::config_path()?.display());
                println!("  Model: {}", config.model);
                println!("  Temperature: {}", config.temperature);
                println!("  Base URL: {}", config.base_url);
                println!("  Timeout: {}s", config.timeout_seconds);
                println!("  Database: {}", config.database.display());
                println!("  Sheet: {}", config.sheet_name);
                println!("  Label match: {}", config.label_match);
                println!("  API key: {}", key_status);
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        "indas_mapper=debug,indas_mapper_common=debug"
    } else {
        "warn"
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn load_catalog(taxonomy: Option<&Path>) -> Result<LabelCatalog> {
    match taxonomy {
        Some(path) => Ok(LabelCatalog::new(Taxonomy::from_json_file(path)?)),
        None => Ok(LabelCatalog::ind_as()),
    }
}

async fn map_rows(
    rows: &[TrialBalanceRow],
    options: &MappingOptions,
    config: &Config,
    catalog: &LabelCatalog,
    backend: ModelBackend,
) -> Result<RunReport> {
    let db = options.db.as_deref().unwrap_or(&config.database);
    let store = MappingStore::open(db)?;
    let label_match = options.label_match.unwrap_or(config.label_match);
    let gateway = ClassifierGateway::new(backend, catalog, label_match);

    let bar = ProgressBar::new(rows.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} rows")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    if rows.len() <= 1 {
        bar.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    }

    let mut reviewer = ReviewMode::select(options.policy, review::terminal_attached(), Some(bar.clone()));
    let reconciler = Reconciler::new(gateway, &store).with_progress(bar.clone());
    let outcome = reconciler.run(rows, &mut reviewer).await;
    bar.finish_and_clear();

    match outcome {
        Ok(report) => Ok(report),
        Err(interrupted) => {
            let RunInterrupted { report, error } = *interrupted;
            eprintln!("✗ Mapping stopped: {}", error);
            // rows handled before the error are still reported and exported
            finish(&report, options)?;
            Err(error)
        }
    }
}

fn finish(report: &RunReport, options: &MappingOptions) -> Result<()> {
    export::print_summary(report);

    if let Some(output) = &options.output {
        export::export_results(&report.rows, options.format, output)?;
    }

    Ok(())
}
