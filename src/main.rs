use anecdotes_confluence_sync::utils::error::{ErrorSeverity, SyncError};
use anecdotes_confluence_sync::utils::{logger, validation::Validate};
use anecdotes_confluence_sync::{
    AnecdotesClient, CliArgs, ConfluenceClient, DryRunPageStore, LocalStorage, LogFormat,
    SyncConfig, SyncEngine, SyncOptions, SyncOutcome,
};
use clap::Parser;

fn report_failure(e: &SyncError) -> ! {
    tracing::error!(
        "❌ Sync failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

async fn run(args: &CliArgs) -> Result<SyncOutcome, SyncError> {
    args.validate()?;

    let config = SyncConfig::load(&args.config)?;
    tracing::debug!("Loaded configuration: {:?}", config);

    let source = AnecdotesClient::from_config(&config);
    let pages = ConfluenceClient::from_config(&config);
    let options = SyncOptions::from_config(&config, args.strict_placeholders);

    if args.dry_run {
        tracing::info!("📝 Dry run: output goes to {}", args.output_path);
        let storage = LocalStorage::new(args.output_path.clone());
        let engine = SyncEngine::new(source, DryRunPageStore::new(pages, storage), options);
        engine.run().await
    } else {
        SyncEngine::new(source, pages, options).run().await
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    match args.log_format {
        LogFormat::Text => logger::init_cli_logger(args.verbose),
        LogFormat::Json => logger::init_json_logger(args.verbose),
    }

    tracing::info!("Starting anecdotes-confluence-sync");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    match run(&args).await {
        Ok(SyncOutcome::Published(page)) => match page.local_path {
            Some(path) => {
                println!("📝 Rendered page {} written to {}", page.id, path);
            }
            None => {
                println!(
                    "✅ Confluence page {} updated to version {}",
                    page.id, page.version
                );
            }
        },
        Ok(SyncOutcome::TemplateMissing { template_page_id }) => {
            println!(
                "Failed to fetch the template content from page {}. Ensure the template page exists and has valid content.",
                template_page_id
            );
        }
        Err(e) => report_failure(&e),
    }

    Ok(())
}
