use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

mod cli;

use account_search::{
    config::Config,
    models::{DraftEdit, Field, RecordId},
    search::{AccountSearch, CommitOutcome},
    source::SqliteSource,
    tui,
};
use cli::{Cli, Commands};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Tui { account_type: None });

    // Set default log level to INFO if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "account_search=info");
    }

    let mut config = Config::from_env()?;
    if let Some(database) = cli.database {
        config.database_path = database.into();
    }
    if let Some(ordering) = cli.fetch_ordering {
        config.controller.fetch_ordering = ordering.parse()?;
    }
    config.validate()?;

    init_logging(&config, command.is_interactive())?;

    let source = Arc::new(
        SqliteSource::new(config.database_path_str())
            .await
            .with_context(|| format!("Cannot open account store {}", config.database_path.display()))?,
    );
    let mut search = AccountSearch::new(Arc::clone(&source), config.controller.clone());

    match command {
        Commands::Tui { account_type } => {
            info!("Launching TUI interface");
            if let Some(label) = account_type {
                search.set_selected_label(label);
            }
            tui::run_tui(search).await?;
        }

        Commands::Types => {
            search.mount();
            search.settle().await;
            match search.type_options() {
                Some(options) => {
                    for option in options {
                        println!("{:<30} {}", option.label, option.value);
                    }
                }
                None => {
                    if let Some(e) = search.catalog_error() {
                        error!("{}", e);
                        eprintln!("{}", e.source_error().message());
                    }
                    std::process::exit(1);
                }
            }
        }

        Commands::List { account_type, json } => {
            search.set_selected_label(account_type);
            search.mount();
            search.settle().await;

            if let Some(e) = search.record_error() {
                error!("{}", e);
                eprintln!("{}", e.source_error().message());
                std::process::exit(1);
            }
            if json {
                println!("{}", serde_json::to_string_pretty(search.rows())?);
            } else {
                println!("Found {} accounts:", search.rows().len());
                for row in search.rows() {
                    println!(
                        "{} - {} ({})",
                        row.id,
                        row.name,
                        row.account_type.as_deref().unwrap_or("-")
                    );
                }
            }
        }

        Commands::Update { id, name } => {
            search.mount();
            search.settle().await;

            search.save(vec![DraftEdit::new(RecordId::new(id)).with_field(Field::Name, &name)]);
            search.settle().await;

            for toast in search.drain_toasts() {
                println!("{}: {}", toast.title, toast.message);
            }
            if let Some(CommitOutcome::SomeFailed { .. }) = search.last_commit() {
                std::process::exit(1);
            }
        }

        Commands::Seed { csv } => {
            info!("Importing accounts from {}", csv);
            match source.import_csv(&csv).await {
                Ok(count) => println!("Imported {} accounts", count),
                Err(e) => {
                    error!("Import failed: {}", e);
                    return Err(e.into());
                }
            }
        }
    }

    Ok(())
}

/// Log to a file always; also to stderr unless the terminal belongs to the TUI
fn init_logging(config: &Config, interactive: bool) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let directory = config
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| std::path::Path::new("."));
    let file_name = config
        .log_file
        .file_name()
        .context("ACCOUNT_SEARCH_LOG_FILE must name a file")?;
    let file_appender = tracing_appender::rolling::never(directory, file_name);

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_filter(EnvFilter::from_default_env());

    let stderr_layer = (!interactive).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(EnvFilter::from_default_env())
    });

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .init();

    Ok(())
}
